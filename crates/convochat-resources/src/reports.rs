use convochat_core::{ApiClient, Envelope, Payload, Result};

pub const RESOURCE: &str = "Reports";

pub mod endpoints {
    use convochat_core::Endpoint;

    pub const SMS: Endpoint = Endpoint::get("/api/reports/sms");
    pub const WHATSAPP: Endpoint = Endpoint::get("/api/reports/whatsapp");
    pub const CAMPAIGNS: Endpoint = Endpoint::get("/api/reports/campaigns");
}

/// Delivery reporting per channel. Filters are passed through untouched
/// (`start_date`, `end_date`, `status`...).
#[derive(Debug, Clone)]
pub struct ReportsService {
    client: ApiClient,
}

impl ReportsService {
    pub fn new(client: &ApiClient) -> Self {
        Self {
            client: client.for_resource(RESOURCE),
        }
    }

    pub async fn get_sms_report(&self, filters: Payload) -> Result<Envelope> {
        self.client.call(&endpoints::SMS, filters).await
    }

    pub async fn get_whatsapp_report(&self, filters: Payload) -> Result<Envelope> {
        self.client.call(&endpoints::WHATSAPP, filters).await
    }

    pub async fn get_campaigns_report(&self, filters: Payload) -> Result<Envelope> {
        self.client.call(&endpoints::CAMPAIGNS, filters).await
    }
}
