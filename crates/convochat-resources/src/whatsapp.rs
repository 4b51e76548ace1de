use convochat_core::{payload, ApiClient, Envelope, Payload, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::shared::{id_payload, merge, send_with_defaults};

pub const RESOURCE: &str = "WhatsApp";

pub const TEXT_TYPE: &str = "text";
pub const MEDIA_TYPE: &str = "media";
pub const DOCUMENT_TYPE: &str = "document";
pub const DEFAULT_MEDIA_TYPE: &str = "image";
pub const DEFAULT_DOCUMENT_TYPE: &str = "pdf";

pub mod endpoints {
    use convochat_core::Endpoint;

    pub const SEND: Endpoint =
        Endpoint::post("/send/whatsapp").requires(&["account", "recipient", "message"]);
    pub const SEND_BULK: Endpoint =
        Endpoint::post("/send/whatsapp.bulk").requires(&["recipients", "message"]);
    pub const PENDING: Endpoint = Endpoint::get("/get/wa.pending");
    pub const RECEIVED: Endpoint = Endpoint::get("/get/wa.received");
    pub const SENT: Endpoint = Endpoint::get("/get/wa.sent");
    pub const MESSAGE: Endpoint =
        Endpoint::get("/get/wa.message").identified_by(&["id"]).requires(&["type"]);
    pub const CAMPAIGNS: Endpoint = Endpoint::get("/get/wa.campaigns");
    pub const GROUPS: Endpoint = Endpoint::get("/get/wa.groups");
    pub const GROUP_CONTACTS: Endpoint =
        Endpoint::get("/get/wa.group.contacts").requires(&["group"]);
    pub const QR: Endpoint = Endpoint::get("/get/wa.qr").requires(&["unique"]);
    pub const SERVERS: Endpoint = Endpoint::get("/get/wa.servers");
    pub const ACCOUNTS: Endpoint = Endpoint::get("/get/wa.accounts");
    pub const INFO: Endpoint = Endpoint::get("/get/wa.info").requires(&["unique"]);
    pub const VALIDATE: Endpoint =
        Endpoint::get("/validate/whatsapp").requires(&["unique", "phone"]);
    pub const START_CAMPAIGN: Endpoint =
        Endpoint::get("/remote/start.chats").identified_by(&["campaign"]);
    pub const STOP_CAMPAIGN: Endpoint =
        Endpoint::get("/remote/stop.chats").identified_by(&["campaign"]);
    pub const LINK: Endpoint = Endpoint::get("/create/wa.link");
    pub const RELINK: Endpoint = Endpoint::get("/create/wa.relink").requires(&["unique"]);
    pub const DELETE_RECEIVED: Endpoint =
        Endpoint::get("/delete/wa.received").identified_by(&["id"]);
    pub const DELETE_SENT: Endpoint = Endpoint::get("/delete/wa.sent").identified_by(&["id"]);
    pub const DELETE_ACCOUNT: Endpoint = Endpoint::get("/delete/wa.account").requires(&["unique"]);
    pub const DELETE_CAMPAIGN: Endpoint =
        Endpoint::get("/delete/wa.campaign").identified_by(&["id"]);
    pub const SUBSCRIPTION: Endpoint = Endpoint::get("/get/subscription");
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WhatsAppDefaults {
    /// Account used by tooling when none is given explicitly.
    pub default_account: String,
    pub default_priority: u8,
}

impl Default for WhatsAppDefaults {
    fn default() -> Self {
        Self {
            default_account: String::new(),
            default_priority: 2,
        }
    }
}

/// Attachment for [`WhatsAppService::send_media`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Media<'a> {
    pub url: &'a str,
    pub kind: &'a str,
}

impl<'a> Media<'a> {
    /// An image at `url`.
    pub fn new(url: &'a str) -> Self {
        Self {
            url,
            kind: DEFAULT_MEDIA_TYPE,
        }
    }

    pub fn kind(mut self, kind: &'a str) -> Self {
        self.kind = kind;
        self
    }
}

/// Attachment for [`WhatsAppService::send_document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Document<'a> {
    pub url: &'a str,
    pub name: &'a str,
    pub kind: &'a str,
}

impl<'a> Document<'a> {
    /// A PDF named `name` at `url`.
    pub fn new(url: &'a str, name: &'a str) -> Self {
        Self {
            url,
            name,
            kind: DEFAULT_DOCUMENT_TYPE,
        }
    }

    pub fn kind(mut self, kind: &'a str) -> Self {
        self.kind = kind;
        self
    }
}

/// WhatsApp messaging, linked accounts, groups and campaigns.
#[derive(Debug, Clone)]
pub struct WhatsAppService {
    client: ApiClient,
    defaults: WhatsAppDefaults,
}

impl WhatsAppService {
    pub fn new(client: &ApiClient) -> Self {
        Self::with_defaults(client, WhatsAppDefaults::default())
    }

    pub fn with_defaults(client: &ApiClient, defaults: WhatsAppDefaults) -> Self {
        Self {
            client: client.for_resource(RESOURCE),
            defaults,
        }
    }

    pub fn defaults(&self) -> &WhatsAppDefaults {
        &self.defaults
    }

    /// Generic send. Requires `account`, `recipient` and `message`; `type`
    /// defaults to `text` and `priority` to the configured priority.
    pub async fn send_message(&self, fields: Payload) -> Result<Envelope> {
        let defaults = vec![
            ("type", Value::from(TEXT_TYPE)),
            ("priority", Value::from(self.defaults.default_priority)),
        ];
        send_with_defaults(&self.client, &endpoints::SEND, fields, defaults).await
    }

    pub async fn send_text(
        &self,
        account: &str,
        recipient: &str,
        message: &str,
        priority: Option<u8>,
    ) -> Result<Envelope> {
        let mut fields = self.base(account, recipient, message, TEXT_TYPE);
        self.set_priority(&mut fields, priority);
        self.send_message(fields).await
    }

    pub async fn send_media(
        &self,
        account: &str,
        recipient: &str,
        message: &str,
        media: Media<'_>,
        priority: Option<u8>,
    ) -> Result<Envelope> {
        let mut fields = merge(
            self.base(account, recipient, message, MEDIA_TYPE),
            payload! { "media_url" => media.url, "media_type" => media.kind },
        );
        self.set_priority(&mut fields, priority);
        self.send_message(fields).await
    }

    pub async fn send_document(
        &self,
        account: &str,
        recipient: &str,
        message: &str,
        document: Document<'_>,
        priority: Option<u8>,
    ) -> Result<Envelope> {
        let mut fields = merge(
            self.base(account, recipient, message, DOCUMENT_TYPE),
            payload! {
                "document_url" => document.url,
                "document_name" => document.name,
                "document_type" => document.kind,
            },
        );
        self.set_priority(&mut fields, priority);
        self.send_message(fields).await
    }

    pub async fn send_bulk_whatsapp<S: AsRef<str>>(
        &self,
        recipients: &[S],
        message: &str,
        options: Payload,
    ) -> Result<Envelope> {
        let recipients: Vec<&str> = recipients.iter().map(|r| r.as_ref()).collect();
        let fields = merge(
            options,
            payload! { "recipients" => recipients, "message" => message },
        );
        self.client.call(&endpoints::SEND_BULK, fields).await
    }

    pub async fn get_whatsapp_pending(&self, filters: Payload) -> Result<Envelope> {
        self.client.call(&endpoints::PENDING, filters).await
    }

    pub async fn get_whatsapp_received(&self, filters: Payload) -> Result<Envelope> {
        self.client.call(&endpoints::RECEIVED, filters).await
    }

    pub async fn get_whatsapp_sent(&self, filters: Payload) -> Result<Envelope> {
        self.client.call(&endpoints::SENT, filters).await
    }

    pub async fn get_whatsapp_message(&self, message_id: u64, message_type: &str) -> Result<Envelope> {
        self.client
            .call(
                &endpoints::MESSAGE,
                payload! { "id" => message_id, "type" => message_type },
            )
            .await
    }

    pub async fn get_whatsapp_campaigns(&self, filters: Payload) -> Result<Envelope> {
        self.client.call(&endpoints::CAMPAIGNS, filters).await
    }

    pub async fn get_whatsapp_groups(&self, filters: Payload) -> Result<Envelope> {
        self.client.call(&endpoints::GROUPS, filters).await
    }

    pub async fn get_whatsapp_group_contacts(
        &self,
        group_id: &str,
        filters: Payload,
    ) -> Result<Envelope> {
        let fields = merge(filters, id_payload("group", group_id));
        self.client.call(&endpoints::GROUP_CONTACTS, fields).await
    }

    pub async fn get_whatsapp_qr(&self, account_id: &str) -> Result<Envelope> {
        self.client
            .call(&endpoints::QR, id_payload("unique", account_id))
            .await
    }

    pub async fn get_whatsapp_servers(&self) -> Result<Envelope> {
        self.client.call(&endpoints::SERVERS, Payload::new()).await
    }

    pub async fn get_whatsapp_accounts(&self) -> Result<Envelope> {
        self.client.call(&endpoints::ACCOUNTS, Payload::new()).await
    }

    pub async fn get_whatsapp_info(&self, account_id: &str) -> Result<Envelope> {
        self.client
            .call(&endpoints::INFO, id_payload("unique", account_id))
            .await
    }

    pub async fn validate_whatsapp_number(&self, account_id: &str, phone: &str) -> Result<Envelope> {
        self.client
            .call(
                &endpoints::VALIDATE,
                payload! { "unique" => account_id, "phone" => phone },
            )
            .await
    }

    pub async fn start_whatsapp_campaign(&self, campaign_id: u64) -> Result<Envelope> {
        self.client
            .call(&endpoints::START_CAMPAIGN, id_payload("campaign", campaign_id))
            .await
    }

    pub async fn stop_whatsapp_campaign(&self, campaign_id: u64) -> Result<Envelope> {
        self.client
            .call(&endpoints::STOP_CAMPAIGN, id_payload("campaign", campaign_id))
            .await
    }

    pub async fn get_whatsapp_subscription(&self) -> Result<Envelope> {
        self.client.call(&endpoints::SUBSCRIPTION, Payload::new()).await
    }

    /// Start linking a new account. `sid` is only sent when a server is chosen.
    pub async fn link_whatsapp_account(&self, server_id: Option<u64>) -> Result<Envelope> {
        let mut fields = Payload::new();
        if let Some(sid) = server_id {
            fields.insert("sid".to_string(), Value::from(sid));
        }
        self.client.call(&endpoints::LINK, fields).await
    }

    pub async fn relink_whatsapp_account(
        &self,
        unique_id: &str,
        server_id: Option<u64>,
    ) -> Result<Envelope> {
        let mut fields = id_payload("unique", unique_id);
        if let Some(sid) = server_id {
            fields.insert("sid".to_string(), Value::from(sid));
        }
        self.client.call(&endpoints::RELINK, fields).await
    }

    pub async fn delete_whatsapp_received(&self, message_id: u64) -> Result<Envelope> {
        self.client
            .call(&endpoints::DELETE_RECEIVED, id_payload("id", message_id))
            .await
    }

    pub async fn delete_whatsapp_sent(&self, message_id: u64) -> Result<Envelope> {
        self.client
            .call(&endpoints::DELETE_SENT, id_payload("id", message_id))
            .await
    }

    pub async fn delete_whatsapp_account(&self, unique_id: &str) -> Result<Envelope> {
        self.client
            .call(&endpoints::DELETE_ACCOUNT, id_payload("unique", unique_id))
            .await
    }

    pub async fn delete_whatsapp_campaign(&self, campaign_id: u64) -> Result<Envelope> {
        self.client
            .call(&endpoints::DELETE_CAMPAIGN, id_payload("id", campaign_id))
            .await
    }

    fn base(&self, account: &str, recipient: &str, message: &str, kind: &str) -> Payload {
        payload! {
            "account" => account,
            "recipient" => recipient,
            "message" => message,
            "type" => kind,
        }
    }

    fn set_priority(&self, fields: &mut Payload, priority: Option<u8>) {
        let priority = priority.unwrap_or(self.defaults.default_priority);
        fields.insert("priority".to_string(), Value::from(priority));
    }
}
