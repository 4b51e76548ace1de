//! Connectivity checks run by `convochat test`.
//!
//! Each check prints a human-readable summary to the supplied writer and
//! returns an [`Outcome`]; the collected [`Report`] decides the exit status.

use std::io::{self, Write};

use convochat_core::{Envelope, Payload};
use serde_json::Value;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::warn;

use crate::manager::ConvoChat;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Passed,
    /// The call worked but something looks off (no devices, no accounts...).
    Warning,
    Failed,
}

#[derive(Debug, Default)]
pub struct Report {
    checks: Vec<(&'static str, Outcome)>,
}

impl Report {
    pub fn record(&mut self, check: &'static str, outcome: Outcome) {
        self.checks.push((check, outcome));
    }

    pub fn checks(&self) -> &[(&'static str, Outcome)] {
        &self.checks
    }

    pub fn has_failures(&self) -> bool {
        self.checks.iter().any(|(_, o)| *o == Outcome::Failed)
    }
}

/// Body of a test message, stamped with the current UTC time.
pub fn test_message(channel: &str) -> String {
    let now = OffsetDateTime::now_utc();
    let stamp = now
        .format(&Rfc3339)
        .unwrap_or_else(|_| now.unix_timestamp().to_string());
    format!("Test {} from ConvoChat gateway - {}", channel, stamp)
}

pub struct Diagnostics<'a, W> {
    convochat: &'a ConvoChat,
    out: W,
    report: Report,
}

impl<'a, W: Write> Diagnostics<'a, W> {
    pub fn new(convochat: &'a ConvoChat, out: W) -> Self {
        Self {
            convochat,
            out,
            report: Report::default(),
        }
    }

    pub fn report(&self) -> &Report {
        &self.report
    }

    pub fn into_report(self) -> Report {
        self.report
    }

    /// Subscription lookup; proves the key and base URL are usable.
    pub async fn check_configuration(&mut self) -> io::Result<Outcome> {
        writeln!(self.out, "Testing configuration...")?;

        let outcome = match self.convochat.sms().get_subscription().await {
            Ok(envelope) if envelope.is_success() => {
                writeln!(self.out, "✓ Connection successful")?;
                if let Some(package) = envelope.get("package") {
                    writeln!(self.out, "  Package: {}", text(package.get("name")))?;
                    writeln!(self.out, "  Expires: {}", text(package.get("expires_at")))?;
                }
                Outcome::Passed
            }
            Ok(envelope) => {
                writeln!(self.out, "! Connection issue: {}", reason(&envelope))?;
                Outcome::Failed
            }
            Err(e) => {
                writeln!(self.out, "✗ Connection failed: {}", e)?;
                Outcome::Failed
            }
        };

        writeln!(self.out)?;
        self.report.record("configuration", outcome);
        Ok(outcome)
    }

    /// Devices, credits and gateway rates.
    pub async fn check_sms_info(&mut self) -> io::Result<Outcome> {
        writeln!(self.out, "Fetching SMS information...")?;
        let sms = self.convochat.sms();

        let result = async {
            let devices = sms.get_devices(10, 1).await?;
            let credits = sms.get_credits().await?;
            let rates = sms.get_rates().await?;
            Ok::<_, convochat_core::ConvoChatError>((devices, credits, rates))
        }
        .await;

        let (devices, credits, rates) = match result {
            Ok(responses) => responses,
            Err(e) => {
                writeln!(self.out, "✗ SMS info test failed: {}", e)?;
                writeln!(self.out)?;
                self.report.record("sms-info", Outcome::Failed);
                return Ok(Outcome::Failed);
            }
        };

        let mut outcome = Outcome::Passed;

        match devices.get("devices").and_then(Value::as_array) {
            Some(list) => {
                writeln!(self.out, "✓ Found {} device(s)", list.len())?;
                for device in list {
                    writeln!(
                        self.out,
                        "  - {} ({})",
                        text(device.get("name")),
                        text(device.get("id"))
                    )?;
                }
            }
            None => {
                writeln!(self.out, "! No devices found")?;
                outcome = Outcome::Warning;
            }
        }

        match credits.get("credits") {
            Some(balance) => writeln!(self.out, "✓ Credits balance: {}", text(Some(balance)))?,
            None => {
                writeln!(self.out, "! Credits unavailable: {}", reason(&credits))?;
                outcome = Outcome::Warning;
            }
        }

        match rates.get("rates").map(count) {
            Some(n) => writeln!(self.out, "✓ Gateway rates available: {}", n)?,
            None => {
                writeln!(self.out, "! Gateway rates unavailable: {}", reason(&rates))?;
                outcome = Outcome::Warning;
            }
        }

        writeln!(self.out)?;
        self.report.record("sms-info", outcome);
        Ok(outcome)
    }

    /// Linked accounts and available servers.
    pub async fn check_whatsapp_info(&mut self) -> io::Result<Outcome> {
        writeln!(self.out, "Fetching WhatsApp information...")?;
        let whatsapp = self.convochat.whatsapp();

        let result = async {
            let accounts = whatsapp.get_whatsapp_accounts().await?;
            let servers = whatsapp.get_whatsapp_servers().await?;
            Ok::<_, convochat_core::ConvoChatError>((accounts, servers))
        }
        .await;

        let (accounts, servers) = match result {
            Ok(responses) => responses,
            Err(e) => {
                writeln!(self.out, "✗ WhatsApp info test failed: {}", e)?;
                writeln!(self.out)?;
                self.report.record("whatsapp-info", Outcome::Failed);
                return Ok(Outcome::Failed);
            }
        };

        let mut outcome = Outcome::Passed;

        match accounts.get("accounts").and_then(Value::as_array) {
            Some(list) => {
                writeln!(self.out, "✓ Found {} WhatsApp account(s)", list.len())?;
                for account in list {
                    writeln!(
                        self.out,
                        "  - {} ({})",
                        text(account.get("phone")),
                        text(account.get("unique"))
                    )?;
                }
            }
            None => {
                writeln!(self.out, "! No WhatsApp accounts found")?;
                outcome = Outcome::Warning;
            }
        }

        match servers.get("servers").map(count) {
            Some(n) => writeln!(self.out, "✓ Available servers: {}", n)?,
            None => {
                writeln!(self.out, "! No WhatsApp servers listed")?;
                outcome = Outcome::Warning;
            }
        }

        writeln!(self.out)?;
        self.report.record("whatsapp-info", outcome);
        Ok(outcome)
    }

    /// Sends through `device` when given, otherwise billed in credits.
    pub async fn send_test_sms(
        &mut self,
        phone: &str,
        device: Option<&str>,
        message: &str,
    ) -> io::Result<Outcome> {
        writeln!(self.out, "Sending test SMS to {}...", phone)?;
        let sms = self.convochat.sms();

        let result = match device {
            Some(device) => {
                sms.send_sms_with_device(phone, message, device, Payload::new())
                    .await
            }
            None => {
                sms.send_sms_with_credits(phone, message, None, Payload::new())
                    .await
            }
        };

        let outcome = self.delivery("SMS", result)?;
        self.report.record("sms-send", outcome);
        Ok(outcome)
    }

    pub async fn send_test_whatsapp(
        &mut self,
        account: &str,
        phone: &str,
        message: &str,
    ) -> io::Result<Outcome> {
        writeln!(self.out, "Sending test WhatsApp message to {}...", phone)?;
        let result = self
            .convochat
            .whatsapp()
            .send_text(account, phone, message, None)
            .await;

        let outcome = self.delivery("WhatsApp message", result)?;
        self.report.record("whatsapp-send", outcome);
        Ok(outcome)
    }

    fn delivery(
        &mut self,
        what: &str,
        result: convochat_core::Result<Envelope>,
    ) -> io::Result<Outcome> {
        let outcome = match result {
            Ok(envelope) if envelope.is_success() => {
                writeln!(self.out, "✓ {} sent successfully", what)?;
                if let Some(id) = envelope.get("id").filter(|id| !id.is_null()) {
                    writeln!(self.out, "  Message ID: {}", text(Some(id)))?;
                }
                Outcome::Passed
            }
            Ok(envelope) => {
                let reason = reason(&envelope);
                warn!(reason = %reason, "test {} rejected", what);
                writeln!(self.out, "✗ Failed to send {}: {}", what, reason)?;
                Outcome::Failed
            }
            Err(e) => {
                writeln!(self.out, "✗ {} test failed: {}", what, e)?;
                Outcome::Failed
            }
        };
        writeln!(self.out)?;
        Ok(outcome)
    }
}

fn reason(envelope: &Envelope) -> &str {
    envelope.message().unwrap_or("Unknown error")
}

fn text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => "N/A".to_string(),
        Some(other) => other.to_string(),
    }
}

fn count(value: &Value) -> usize {
    match value {
        Value::Array(items) => items.len(),
        Value::Object(map) => map.len(),
        _ => 0,
    }
}
