use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use convochat::config::AppConfig;
use convochat::diagnostics::{self, Diagnostics};
use convochat::manager::ConvoChat;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "convochat")]
#[command(about = "ConvoChat SMS and WhatsApp gateway tools")]
#[command(version)]
#[command(after_help = "Configuration is read from config/default, config/{RUN_MODE},
config/local and CONVOCHAT_* environment variables (e.g. CONVOCHAT_API_KEY).")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check connectivity and optionally send test messages
    #[command(after_help = "Examples:
  convochat test                              Configuration, SMS and WhatsApp info
  convochat test --sms --phone +573001234567  Send a test SMS
  convochat test --whatsapp --account acc_1   Send a test WhatsApp message")]
    Test(TestArgs),
}

#[derive(Args)]
struct TestArgs {
    /// Send a test SMS
    #[arg(long)]
    sms: bool,
    /// Send a test WhatsApp message
    #[arg(long)]
    whatsapp: bool,
    /// Run every informational check
    #[arg(long)]
    all: bool,
    /// Recipient in E.164 format
    #[arg(long)]
    phone: Option<String>,
    /// WhatsApp account unique id
    #[arg(long)]
    account: Option<String>,
    /// Device id for the test SMS (credits are used when omitted)
    #[arg(long)]
    device: Option<String>,
}

impl TestArgs {
    fn info_checks(&self) -> bool {
        self.all || !(self.sms || self.whatsapp)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    match run(Cli::parse()).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("✗ {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("CONVOCHAT_LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));

    // stdout belongs to the check output
    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_writer(io::stderr))
            .init();
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = AppConfig::load().context("failed to load configuration")?;

    match cli.command {
        Commands::Test(args) => test(config, args).await,
    }
}

async fn test(config: AppConfig, args: TestArgs) -> anyhow::Result<ExitCode> {
    println!("ConvoChat gateway test");
    println!("======================");
    println!();

    if !config.has_api_key() {
        eprintln!("✗ ConvoChat API key not configured. Set CONVOCHAT_API_KEY.");
        return Ok(ExitCode::FAILURE);
    }
    println!("✓ API key configured: {}", config.masked_api_key());
    println!("  Base URL: {}", config.base_url);
    println!();

    let convochat = ConvoChat::from_config(&config)?;
    let mut diag = Diagnostics::new(&convochat, io::stdout());

    if args.info_checks() {
        diag.check_configuration().await?;
        diag.check_sms_info().await?;
        diag.check_whatsapp_info().await?;
    }

    if args.sms {
        let phone = match args.phone.clone() {
            Some(phone) => phone,
            None => prompt("Enter phone number (E.164, e.g. +573001234567): ")?,
        };
        let device = args
            .device
            .clone()
            .or_else(|| config.sms.default_device.clone());
        diag.send_test_sms(&phone, device.as_deref(), &diagnostics::test_message("SMS"))
            .await?;
    }

    if args.whatsapp {
        let account = match args.account.clone() {
            Some(account) => account,
            None if !config.whatsapp.default_account.is_empty() => {
                config.whatsapp.default_account.clone()
            }
            None => prompt("Enter WhatsApp account unique id: ")?,
        };
        let phone = match args.phone.clone() {
            Some(phone) => phone,
            None => prompt("Enter WhatsApp phone number (E.164, e.g. +573001234567): ")?,
        };
        diag.send_test_whatsapp(&account, &phone, &diagnostics::test_message("WhatsApp"))
            .await?;
    }

    let report = diag.into_report();
    if report.has_failures() {
        println!("✗ Test finished with failures");
        Ok(ExitCode::FAILURE)
    } else {
        println!("✓ Test completed");
        Ok(ExitCode::SUCCESS)
    }
}

fn prompt(question: &str) -> anyhow::Result<String> {
    print!("{}", question);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    let answer = answer.trim().to_string();

    if answer.is_empty() {
        anyhow::bail!("no value entered");
    }
    Ok(answer)
}
