use convochat_core::{payload, ApiClient, Envelope, Payload, Result};

pub const RESOURCE: &str = "Lists";

pub mod endpoints {
    use convochat_core::Endpoint;

    pub const LIST: Endpoint = Endpoint::get("/api/lists");
    pub const CREATE: Endpoint = Endpoint::post("/api/lists").requires(&["name"]);
    pub const SHOW: Endpoint = Endpoint::get("/api/lists/{id}");
    pub const UPDATE: Endpoint = Endpoint::put("/api/lists/{id}");
    pub const DELETE: Endpoint = Endpoint::delete("/api/lists/{id}");
    pub const ADD_CONTACTS: Endpoint =
        Endpoint::post("/api/lists/{id}/contacts").requires(&["contacts"]);
}

/// Named recipient lists used as campaign targets.
#[derive(Debug, Clone)]
pub struct ListsService {
    client: ApiClient,
}

impl ListsService {
    pub fn new(client: &ApiClient) -> Self {
        Self {
            client: client.for_resource(RESOURCE),
        }
    }

    pub async fn get_lists(&self, filters: Payload) -> Result<Envelope> {
        self.client.call(&endpoints::LIST, filters).await
    }

    pub async fn create_list(&self, fields: Payload) -> Result<Envelope> {
        self.client.call(&endpoints::CREATE, fields).await
    }

    pub async fn get_list(&self, list_id: &str) -> Result<Envelope> {
        self.client
            .call_with_id(&endpoints::SHOW, list_id, Payload::new())
            .await
    }

    pub async fn update_list(&self, list_id: &str, fields: Payload) -> Result<Envelope> {
        self.client
            .call_with_id(&endpoints::UPDATE, list_id, fields)
            .await
    }

    pub async fn delete_list(&self, list_id: &str) -> Result<Envelope> {
        self.client
            .call_with_id(&endpoints::DELETE, list_id, Payload::new())
            .await
    }

    pub async fn add_contacts<S: AsRef<str>>(
        &self,
        list_id: &str,
        contacts: &[S],
    ) -> Result<Envelope> {
        let contacts: Vec<&str> = contacts.iter().map(|c| c.as_ref()).collect();
        self.client
            .call_with_id(
                &endpoints::ADD_CONTACTS,
                list_id,
                payload! { "contacts" => contacts },
            )
            .await
    }
}
