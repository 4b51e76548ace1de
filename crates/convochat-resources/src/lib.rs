//! # ConvoChat Resources
//!
//! One facade per ConvoChat resource family. Each facade is a table of
//! [`Endpoint`](convochat_core::Endpoint) descriptors plus the defaults that
//! shape its requests; the actual call goes through a shared
//! [`ApiClient`](convochat_core::ApiClient).
//!
//! ```rust,ignore
//! use convochat_resources::SmsService;
//!
//! let sms = SmsService::new(&client);
//! let envelope = sms.send_sms_with_credits("+573001234567", "hi", None, Payload::new()).await?;
//! ```

pub mod auth;
pub mod campaigns;
pub mod contacts;
pub mod lists;
pub mod otp;
pub mod reports;
pub mod settings;
pub mod sms;
pub mod ussd;
pub mod webhooks;
pub mod whatsapp;

mod shared;

pub use auth::AuthService;
pub use campaigns::CampaignsService;
pub use contacts::ContactsService;
pub use lists::ListsService;
pub use otp::OtpService;
pub use reports::ReportsService;
pub use settings::SettingsService;
pub use shared::fill_default;
pub use sms::{SmsDefaults, SmsMode, SmsService};
pub use ussd::UssdService;
pub use webhooks::WebhooksService;
pub use whatsapp::{Document, Media, WhatsAppDefaults, WhatsAppService};
