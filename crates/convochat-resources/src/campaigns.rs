use convochat_core::{ApiClient, Envelope, Payload, Result};

pub const RESOURCE: &str = "Campaigns";

pub mod endpoints {
    use convochat_core::Endpoint;

    pub const LIST: Endpoint = Endpoint::get("/api/campaigns");
    pub const CREATE: Endpoint =
        Endpoint::post("/api/campaigns").requires(&["name", "message", "recipients"]);
    pub const SHOW: Endpoint = Endpoint::get("/api/campaigns/{id}");
    pub const UPDATE: Endpoint = Endpoint::put("/api/campaigns/{id}");
    pub const DELETE: Endpoint = Endpoint::delete("/api/campaigns/{id}");
}

/// Campaign CRUD. Unlike the rest of the API the id travels in the path.
#[derive(Debug, Clone)]
pub struct CampaignsService {
    client: ApiClient,
}

impl CampaignsService {
    pub fn new(client: &ApiClient) -> Self {
        Self {
            client: client.for_resource(RESOURCE),
        }
    }

    pub async fn get_campaigns(&self, filters: Payload) -> Result<Envelope> {
        self.client.call(&endpoints::LIST, filters).await
    }

    pub async fn create_campaign(&self, fields: Payload) -> Result<Envelope> {
        self.client.call(&endpoints::CREATE, fields).await
    }

    pub async fn get_campaign(&self, campaign_id: &str) -> Result<Envelope> {
        self.client
            .call_with_id(&endpoints::SHOW, campaign_id, Payload::new())
            .await
    }

    pub async fn update_campaign(&self, campaign_id: &str, fields: Payload) -> Result<Envelope> {
        self.client
            .call_with_id(&endpoints::UPDATE, campaign_id, fields)
            .await
    }

    pub async fn delete_campaign(&self, campaign_id: &str) -> Result<Envelope> {
        self.client
            .call_with_id(&endpoints::DELETE, campaign_id, Payload::new())
            .await
    }
}
