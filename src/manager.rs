use std::sync::Arc;

use convochat_core::{ApiClient, Transport};
use convochat_http::ReqwestTransport;
use convochat_resources::{
    AuthService, CampaignsService, ContactsService, ListsService, OtpService, ReportsService,
    SettingsService, SmsDefaults, SmsService, UssdService, WebhooksService, WhatsAppDefaults,
    WhatsAppService,
};

use crate::config::AppConfig;

/// Every resource facade over one shared client and transport.
///
/// Construct it once and hand it (or the individual facades) to whoever needs
/// them; nothing here is global.
#[derive(Debug, Clone)]
pub struct ConvoChat {
    client: ApiClient,
    sms: SmsService,
    whatsapp: WhatsAppService,
    otp: OtpService,
    ussd: UssdService,
    contacts: ContactsService,
    campaigns: CampaignsService,
    settings: SettingsService,
    auth: AuthService,
    reports: ReportsService,
    webhooks: WebhooksService,
    lists: ListsService,
}

impl ConvoChat {
    pub fn new(client: ApiClient) -> Self {
        Self::with_defaults(client, SmsDefaults::default(), WhatsAppDefaults::default())
    }

    pub fn with_defaults(
        client: ApiClient,
        sms: SmsDefaults,
        whatsapp: WhatsAppDefaults,
    ) -> Self {
        Self {
            sms: SmsService::with_defaults(&client, sms),
            whatsapp: WhatsAppService::with_defaults(&client, whatsapp),
            otp: OtpService::new(&client),
            ussd: UssdService::new(&client),
            contacts: ContactsService::new(&client),
            campaigns: CampaignsService::new(&client),
            settings: SettingsService::new(&client),
            auth: AuthService::new(&client),
            reports: ReportsService::new(&client),
            webhooks: WebhooksService::new(&client),
            lists: ListsService::new(&client),
            client,
        }
    }

    /// Validates the configuration and talks HTTP through `reqwest`.
    pub fn from_config(config: &AppConfig) -> convochat_core::Result<Self> {
        Self::with_transport(config, Arc::new(ReqwestTransport::new()))
    }

    pub fn with_transport(
        config: &AppConfig,
        transport: Arc<dyn Transport>,
    ) -> convochat_core::Result<Self> {
        let client = ApiClient::new(config.client_config()?, transport);
        Ok(Self::with_defaults(
            client,
            config.sms.clone(),
            config.whatsapp.clone(),
        ))
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn sms(&self) -> &SmsService {
        &self.sms
    }

    pub fn whatsapp(&self) -> &WhatsAppService {
        &self.whatsapp
    }

    pub fn otp(&self) -> &OtpService {
        &self.otp
    }

    pub fn ussd(&self) -> &UssdService {
        &self.ussd
    }

    pub fn contacts(&self) -> &ContactsService {
        &self.contacts
    }

    pub fn campaigns(&self) -> &CampaignsService {
        &self.campaigns
    }

    pub fn settings(&self) -> &SettingsService {
        &self.settings
    }

    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    pub fn reports(&self) -> &ReportsService {
        &self.reports
    }

    pub fn webhooks(&self) -> &WebhooksService {
        &self.webhooks
    }

    pub fn lists(&self) -> &ListsService {
        &self.lists
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use convochat_core::testing::StubTransport;
    use convochat_core::TransportError;
    use convochat_resources::SmsMode;
    use serde_json::json;

    fn config() -> AppConfig {
        AppConfig {
            api_key: "test-key".into(),
            ..AppConfig::default()
        }
    }

    #[test]
    fn invalid_config_fails_before_any_call() {
        let err = ConvoChat::with_transport(&AppConfig::default(), StubTransport::new())
            .unwrap_err();
        assert!(err.to_string().contains("API key"));
    }

    #[tokio::test]
    async fn facades_share_one_transport() {
        let stub = StubTransport::new();
        let convochat = ConvoChat::with_transport(&config(), stub.clone()).unwrap();

        convochat.sms().get_credits().await.unwrap();
        convochat.whatsapp().get_whatsapp_accounts().await.unwrap();
        convochat.otp().verify_otp("123456").await.unwrap();

        assert_eq!(stub.requests().len(), 3);
        assert!(stub.requests().iter().all(|r| r.body["secret"] == "test-key"));
    }

    #[tokio::test]
    async fn errors_name_the_originating_resource() {
        let stub = StubTransport::new();
        let convochat = ConvoChat::with_transport(&config(), stub.clone()).unwrap();

        stub.fail("DNS failure");
        let err = convochat.contacts().get_groups(Default::default()).await.unwrap_err();
        assert!(matches!(
            err,
            convochat_core::ConvoChatError::Transport(TransportError::Request { resource: "Contacts", .. })
        ));
    }

    #[tokio::test]
    async fn configured_sms_defaults_reach_the_facade() {
        let stub = StubTransport::new();
        stub.respond_json(200, json!({"status": "success"}));
        let mut config = config();
        config.sms.default_mode = SmsMode::Credits;
        config.sms.default_gateway = Some("gw_1".into());
        let convochat = ConvoChat::with_transport(&config, stub.clone()).unwrap();

        convochat
            .sms()
            .send_sms(convochat_core::payload! { "phone" => "+57300", "message" => "hi" })
            .await
            .unwrap();

        let body = stub.last_request().unwrap().body;
        assert_eq!(body["mode"], "credits");
        assert_eq!(body["gateway"], "gw_1");
    }
}
