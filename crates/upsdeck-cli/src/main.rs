//! upsdeck - terminal front end for UPS device management
//!
//! Talks to the UPS management backend API and drives the same controllers
//! the graphical front end uses.

mod config;
mod term;
mod wizard;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use upsdeck_client::ApiClient;
use upsdeck_core::DeviceId;
use upsdeck_ui::{Confirmer, RegistryController, SetupWorkflow};

use term::{AutoConfirmer, TermConfirmer, TermNotifier, TermRegistryView, TermSetupView};

#[derive(Parser, Debug)]
#[command(name = "upsdeck")]
#[command(about = "UPS device management client")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "upsdeck.toml")]
    config: PathBuf,

    /// Backend base URL (overrides the config file)
    #[arg(short, long)]
    backend: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List devices with registry stats
    List,
    /// Add a new device
    Add {
        /// NUT driver section name
        #[arg(long)]
        name: String,
        /// NUT driver binary (e.g. usbhid-ups)
        #[arg(long)]
        driver: String,
        /// Driver port specifier (e.g. auto)
        #[arg(long)]
        port: String,
        /// Host running the driver (defaults from config)
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        friendly_name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Create the device disabled
        #[arg(long)]
        disabled: bool,
        /// Designate as primary
        #[arg(long)]
        primary: bool,
    },
    /// Edit an existing device
    Edit {
        id: u64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        driver: Option<String>,
        #[arg(long)]
        port: Option<String>,
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        friendly_name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        enabled: Option<bool>,
        #[arg(long)]
        primary: Option<bool>,
    },
    /// Enable or disable a device
    Toggle {
        id: u64,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Delete a device
    Delete {
        id: u64,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Test the driver connection for a device
    Test { id: u64 },
    /// Select and configure devices from scan results
    Setup {
        /// Wizard mode (standalone, netserver)
        #[arg(long, default_value = "standalone")]
        mode: String,
        /// Path to scan-results JSON file
        #[arg(long)]
        candidates: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = config::load_config(&args.config)?;
    if let Some(backend) = args.backend {
        config.backend.base_url = backend;
    }
    info!(backend = %config.backend.base_url, "Configuration loaded");

    let notifier = Arc::new(TermNotifier);

    match args.command {
        Command::Setup { mode, candidates } => {
            let candidates = wizard::load_candidates(&candidates)?;
            let mut workflow = SetupWorkflow::with_policy(
                TermSetupView::default(),
                notifier,
                config.primary_policy(),
            );
            match wizard::run(&mut workflow, &mode, &candidates)? {
                Some(selected) => {
                    println!("{}", serde_json::to_string_pretty(&selected)?);
                }
                None => println!("Selection abandoned"),
            }
        }
        command => {
            let client = ApiClient::new(
                &config.backend.base_url,
                Duration::from_secs(config.backend.timeout_secs),
            )?;
            let confirmer: Arc<dyn Confirmer> = match &command {
                Command::Toggle { yes: true, .. } | Command::Delete { yes: true, .. } => {
                    Arc::new(AutoConfirmer)
                }
                _ => Arc::new(TermConfirmer),
            };
            let mut controller = RegistryController::new(
                client,
                TermRegistryView::default(),
                notifier,
                confirmer,
            );
            run_registry_command(&mut controller, command, &config).await;
        }
    }

    Ok(())
}

async fn run_registry_command(
    controller: &mut RegistryController<TermRegistryView>,
    command: Command,
    config: &config::Config,
) {
    match command {
        Command::List => controller.load_devices().await,
        Command::Add {
            name,
            driver,
            port,
            host,
            friendly_name,
            description,
            disabled,
            primary,
        } => {
            controller.open_add();
            let mut draft = match controller.draft() {
                Some(draft) => draft.clone(),
                None => return,
            };
            draft.name = name;
            draft.driver = driver;
            draft.port = port;
            draft.host = host.unwrap_or_else(|| config.defaults.host.clone());
            draft.friendly_name = friendly_name.unwrap_or_default();
            draft.description = description.unwrap_or_default();
            draft.is_enabled = !disabled;
            draft.is_primary = primary;
            controller.set_draft(draft);
            controller.save().await;
        }
        Command::Edit {
            id,
            name,
            driver,
            port,
            host,
            friendly_name,
            description,
            enabled,
            primary,
        } => {
            controller.open_edit(DeviceId(id)).await;
            let mut draft = match controller.draft() {
                Some(draft) => draft.clone(),
                // open_edit already reported the failure
                None => return,
            };
            if let Some(value) = name {
                draft.name = value;
            }
            if let Some(value) = driver {
                draft.driver = value;
            }
            if let Some(value) = port {
                draft.port = value;
            }
            if let Some(value) = host {
                draft.host = value;
            }
            if let Some(value) = friendly_name {
                draft.friendly_name = value;
            }
            if let Some(value) = description {
                draft.description = value;
            }
            if let Some(value) = enabled {
                draft.is_enabled = value;
            }
            if let Some(value) = primary {
                draft.is_primary = value;
            }
            controller.set_draft(draft);
            controller.save().await;
        }
        Command::Toggle { id, .. } => controller.toggle(DeviceId(id)).await,
        Command::Delete { id, .. } => controller.delete(DeviceId(id)).await,
        Command::Test { id } => controller.test_connection(DeviceId(id)).await,
        Command::Setup { .. } => unreachable!("handled in main"),
    }
}
