//! # ConvoChat
//!
//! Client for the ConvoChat messaging gateway (SMS, WhatsApp, OTP, USSD,
//! contacts, campaigns and account endpoints) plus the pieces an application
//! needs around it.
//!
//! ## Features
//!
//! - **Resource facades**: one method per vendor endpoint, see [`ConvoChat`]
//! - **Bulk sending**: [`jobs::SendBulkSmsJob`] with per-recipient requeue
//! - **Rate limiting**: fixed-window [`rate_limiter::RateLimiter`] over a [`store::CacheStore`]
//! - **Response caching**: [`cache::ResponseCache`] for devices, credits, rates...
//! - **Configuration**: layered files and `CONVOCHAT_*` environment variables
//! - **Diagnostics**: the checks behind the `convochat test` command
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use convochat::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let convochat = ConvoChat::from_config(&config)?;
//!
//!     let envelope = convochat
//!         .sms()
//!         .send_sms_with_device("+573001234567", "Hello from ConvoChat!", "dev_1", Payload::new())
//!         .await?;
//!
//!     if !envelope.is_success() {
//!         eprintln!("rejected: {:?}", envelope.message());
//!     }
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod config;
pub mod diagnostics;
pub mod jobs;
pub mod manager;
pub mod rate_limiter;
pub mod store;

pub use config::AppConfig;
pub use manager::ConvoChat;

/// Common imports for ConvoChat usage
pub mod prelude {
    pub use crate::cache::ResponseCache;
    pub use crate::config::{AppConfig, QueueConfig};
    pub use crate::jobs::{
        BulkOptions, BulkReport, JobQueue, JobSettings, MemoryQueue, SendBulkSmsJob, SmsSender,
    };
    pub use crate::manager::ConvoChat;
    pub use crate::rate_limiter::{RateLimitRecord, RateLimiter};
    pub use crate::store::{CacheStore, MemoryStore, StoreError};
    pub use convochat_core::{
        payload, ApiClient, ClientConfig, ConvoChatError, Envelope, EnvelopeStatus, Payload,
        TransportError,
    };
    pub use convochat_resources::*;
}
