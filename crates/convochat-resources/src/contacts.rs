use convochat_core::{ApiClient, Envelope, Payload, Result};

use crate::shared::id_payload;

pub const RESOURCE: &str = "Contacts";

pub mod endpoints {
    use convochat_core::Endpoint;

    pub const CONTACTS: Endpoint = Endpoint::get("/get/contacts");
    pub const CREATE_CONTACT: Endpoint =
        Endpoint::post("/create/contact").requires(&["phone", "name", "groups"]);
    pub const DELETE_CONTACT: Endpoint = Endpoint::get("/delete/contact").identified_by(&["id"]);
    pub const GROUPS: Endpoint = Endpoint::get("/get/groups");
    pub const CREATE_GROUP: Endpoint = Endpoint::post("/create/group").requires(&["name"]);
    pub const DELETE_GROUP: Endpoint = Endpoint::get("/delete/group").identified_by(&["id"]);
    pub const UNSUBSCRIBED: Endpoint = Endpoint::get("/get/unsubscribed");
    pub const DELETE_UNSUBSCRIBED: Endpoint =
        Endpoint::get("/delete/unsubscribed").identified_by(&["id"]);
}

/// Address book: contacts, groups and unsubscribed numbers.
#[derive(Debug, Clone)]
pub struct ContactsService {
    client: ApiClient,
}

impl ContactsService {
    pub fn new(client: &ApiClient) -> Self {
        Self {
            client: client.for_resource(RESOURCE),
        }
    }

    pub async fn get_contacts(&self, filters: Payload) -> Result<Envelope> {
        self.client.call(&endpoints::CONTACTS, filters).await
    }

    /// `groups` is a comma separated list of group ids.
    pub async fn create_contact(&self, fields: Payload) -> Result<Envelope> {
        self.client.call(&endpoints::CREATE_CONTACT, fields).await
    }

    pub async fn delete_contact(&self, contact_id: u64) -> Result<Envelope> {
        self.client
            .call(&endpoints::DELETE_CONTACT, id_payload("id", contact_id))
            .await
    }

    pub async fn get_groups(&self, filters: Payload) -> Result<Envelope> {
        self.client.call(&endpoints::GROUPS, filters).await
    }

    pub async fn create_group(&self, fields: Payload) -> Result<Envelope> {
        self.client.call(&endpoints::CREATE_GROUP, fields).await
    }

    pub async fn delete_group(&self, group_id: u64) -> Result<Envelope> {
        self.client
            .call(&endpoints::DELETE_GROUP, id_payload("id", group_id))
            .await
    }

    pub async fn get_unsubscribed(&self, filters: Payload) -> Result<Envelope> {
        self.client.call(&endpoints::UNSUBSCRIBED, filters).await
    }

    pub async fn delete_unsubscribed(&self, contact_id: u64) -> Result<Envelope> {
        self.client
            .call(&endpoints::DELETE_UNSUBSCRIBED, id_payload("id", contact_id))
            .await
    }
}
