//! Queued bulk SMS delivery.
//!
//! A [`SendBulkSmsJob`] walks its recipients in order and sends each one
//! through an [`SmsSender`]. Vendor-reported failures are logged and skipped.
//! A recipient whose send raises is logged and, while the job is below its
//! attempt limit, handed back to the [`JobQueue`] as a fresh single-recipient
//! job after a fixed delay.
//!
//! Delivery is at-least-once: if the queue redelivers a whole job, recipients
//! that already succeeded are sent again.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use convochat_core::{ConvoChatError, Envelope, Payload};
use convochat_resources::SmsService;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSettings {
    /// Attempts per recipient, the first one included.
    pub max_attempts: u32,
    /// Pause between two recipients; zero disables it.
    pub rate_limit_delay: Duration,
    pub retry_delay: Duration,
}

impl Default for JobSettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            rate_limit_delay: Duration::ZERO,
            retry_delay: Duration::from_secs(300),
        }
    }
}

/// Routing for a bulk job. `device_id` wins when both are set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkOptions {
    pub device_id: Option<String>,
    pub gateway_id: Option<String>,
}

/// The two send shapes the job needs from the SMS facade.
#[async_trait]
pub trait SmsSender: Send + Sync {
    async fn send_with_device(
        &self,
        phone: &str,
        message: &str,
        device_id: &str,
    ) -> convochat_core::Result<Envelope>;

    async fn send_with_credits(
        &self,
        phone: &str,
        message: &str,
        gateway_id: Option<&str>,
    ) -> convochat_core::Result<Envelope>;
}

#[async_trait]
impl SmsSender for SmsService {
    async fn send_with_device(
        &self,
        phone: &str,
        message: &str,
        device_id: &str,
    ) -> convochat_core::Result<Envelope> {
        self.send_sms_with_device(phone, message, device_id, Payload::new())
            .await
    }

    async fn send_with_credits(
        &self,
        phone: &str,
        message: &str,
        gateway_id: Option<&str>,
    ) -> convochat_core::Result<Envelope> {
        self.send_sms_with_credits(phone, message, gateway_id, Payload::new())
            .await
    }
}

/// External job queue the bulk job re-enqueues failed recipients on.
#[async_trait]
pub trait JobQueue: Send + Sync {
    async fn dispatch(&self, job: SendBulkSmsJob, delay: Duration) -> convochat_core::Result<()>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendBulkSmsJob {
    pub id: Uuid,
    pub recipients: Vec<String>,
    pub message: String,
    pub options: BulkOptions,
    /// 1 for a fresh job, incremented on every re-enqueue.
    pub attempt: u32,
}

/// What one run of a job did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkReport {
    pub sent: Vec<String>,
    /// Answered, but with a non-success status.
    pub rejected: Vec<String>,
    /// Raised a transport or validation error.
    pub failed: Vec<String>,
    pub requeued: Vec<String>,
}

impl SendBulkSmsJob {
    pub fn new(recipients: Vec<String>, message: impl Into<String>, options: BulkOptions) -> Self {
        Self {
            id: Uuid::new_v4(),
            recipients,
            message: message.into(),
            options,
            attempt: 1,
        }
    }

    fn retry_for(&self, phone: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            recipients: vec![phone.to_string()],
            message: self.message.clone(),
            options: self.options.clone(),
            attempt: self.attempt + 1,
        }
    }

    async fn send_one(&self, sender: &dyn SmsSender, phone: &str) -> convochat_core::Result<Envelope> {
        match (&self.options.device_id, &self.options.gateway_id) {
            (Some(device), _) => sender.send_with_device(phone, &self.message, device).await,
            (None, gateway) => {
                sender
                    .send_with_credits(phone, &self.message, gateway.as_deref())
                    .await
            }
        }
    }

    /// Send to every recipient in order. Never fails as a whole.
    pub async fn handle(
        &self,
        sender: &dyn SmsSender,
        queue: &dyn JobQueue,
        settings: &JobSettings,
    ) -> BulkReport {
        let mut report = BulkReport::default();
        info!(
            job_id = %self.id,
            attempt = self.attempt,
            recipients = self.recipients.len(),
            "running bulk SMS job"
        );

        for (index, phone) in self.recipients.iter().enumerate() {
            if index > 0 && !settings.rate_limit_delay.is_zero() {
                tokio::time::sleep(settings.rate_limit_delay).await;
            }

            match self.send_one(sender, phone).await {
                Ok(result) if result.is_success() => {
                    debug!(job_id = %self.id, phone = %phone, "SMS sent");
                    report.sent.push(phone.clone());
                }
                Ok(result) => {
                    warn!(
                        job_id = %self.id,
                        phone = %phone,
                        result = %result.as_value(),
                        "Failed to send SMS to {}",
                        phone
                    );
                    report.rejected.push(phone.clone());
                }
                Err(e) => {
                    error!(
                        job_id = %self.id,
                        phone = %phone,
                        error = %e,
                        "SMS job failed for {}",
                        phone
                    );
                    report.failed.push(phone.clone());
                    if self.attempt < settings.max_attempts {
                        self.requeue(queue, phone, settings.retry_delay, &mut report)
                            .await;
                    }
                }
            }
        }

        report
    }

    async fn requeue(
        &self,
        queue: &dyn JobQueue,
        phone: &str,
        delay: Duration,
        report: &mut BulkReport,
    ) {
        let retry = self.retry_for(phone);
        let retry_id = retry.id;
        match queue.dispatch(retry, delay).await {
            Ok(()) => {
                debug!(job_id = %self.id, retry_id = %retry_id, phone, "recipient re-enqueued");
                report.requeued.push(phone.to_string());
            }
            Err(e) => error!(job_id = %self.id, phone, error = %e, "could not re-enqueue recipient"),
        }
    }
}

/// One job handed to a [`MemoryQueue`].
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatched {
    pub queue: String,
    pub job: SendBulkSmsJob,
    pub delay: Duration,
}

/// In-process [`JobQueue`]: keeps dispatched jobs until drained.
#[derive(Debug)]
pub struct MemoryQueue {
    name: String,
    jobs: Mutex<Vec<Dispatched>>,
}

impl MemoryQueue {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            jobs: Mutex::new(Vec::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Everything dispatched so far, oldest first.
    pub fn drain(&self) -> Vec<Dispatched> {
        std::mem::take(&mut *self.jobs.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

#[async_trait]
impl JobQueue for MemoryQueue {
    async fn dispatch(&self, job: SendBulkSmsJob, delay: Duration) -> convochat_core::Result<()> {
        if job.recipients.is_empty() {
            return Err(ConvoChatError::Queue(format!(
                "job {} has no recipients",
                job.id
            )));
        }
        self.jobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Dispatched {
                queue: self.name.clone(),
                job,
                delay,
            });
        Ok(())
    }
}
