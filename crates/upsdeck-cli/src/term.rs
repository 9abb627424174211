//! Terminal implementations of the UI seams

use async_trait::async_trait;
use upsdeck_core::{DeviceDraft, DeviceId, DeviceStats, UpsDevice};
use upsdeck_ui::{
    AlertLevel, Confirmer, ConnectionIndicator, DeviceConfigForm, Notifier, RegistryView,
    SetupView,
};

/// Notifier that prints level-tagged lines to stdout
#[derive(Debug, Default)]
pub struct TermNotifier;

impl Notifier for TermNotifier {
    fn notify(&self, message: &str, level: AlertLevel) {
        let tag = match level {
            AlertLevel::Success => "ok",
            AlertLevel::Error => "error",
            AlertLevel::Warning => "warn",
            AlertLevel::Info => "info",
        };
        println!("[{tag}] {message}");
    }
}

/// Confirmer that prompts on the terminal
///
/// Only an explicit `y`/`yes` proceeds; EOF and anything else decline.
#[derive(Debug, Default)]
pub struct TermConfirmer;

#[async_trait]
impl Confirmer for TermConfirmer {
    async fn confirm(&self, prompt: &str) -> bool {
        let prompt = prompt.to_string();
        tokio::task::spawn_blocking(move || {
            use std::io::Write;
            print!("{prompt} [y/N] ");
            let _ = std::io::stdout().flush();
            let mut line = String::new();
            if std::io::stdin().read_line(&mut line).is_err() {
                return false;
            }
            matches!(line.trim().to_lowercase().as_str(), "y" | "yes")
        })
        .await
        .unwrap_or(false)
    }
}

/// Confirmer used with `--yes`; approves everything
#[derive(Debug, Default)]
pub struct AutoConfirmer;

#[async_trait]
impl Confirmer for AutoConfirmer {
    async fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

/// Registry view that renders to stdout
#[derive(Debug, Default)]
pub struct TermRegistryView;

impl RegistryView for TermRegistryView {
    fn show_stats(&mut self, stats: &DeviceStats) {
        println!(
            "{} device(s): {} enabled, {} disabled, primary: {}",
            stats.total,
            stats.enabled,
            stats.disabled,
            stats.primary_name.as_deref().unwrap_or("none")
        );
    }

    fn show_devices(&mut self, devices: &[UpsDevice]) {
        for device in devices {
            let id = device
                .id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "-".to_string());
            let mut flags = Vec::new();
            if device.is_primary {
                flags.push("primary");
            }
            flags.push(if device.is_enabled { "enabled" } else { "disabled" });
            println!(
                "  [{}] {} ({}@{}:{}) {}",
                id,
                device.display_name(),
                device.driver,
                device.host,
                device.port,
                flags.join(", ")
            );
        }
    }

    fn open_editor(&mut self, draft: &DeviceDraft) {
        match draft.editing {
            Some(id) => println!("Editing device {id}"),
            None => println!("Adding new device"),
        }
    }

    fn close_editor(&mut self) {}

    fn set_connection_indicator(&mut self, id: DeviceId, indicator: &ConnectionIndicator) {
        println!(
            "  device {} live: {} (checked {})",
            id,
            indicator.ups_status,
            indicator.checked_at.format("%H:%M:%S")
        );
    }

    fn toggle_menu(&mut self, _id: DeviceId) {}
}

/// Setup view that renders to stdout
#[derive(Debug, Default)]
pub struct TermSetupView;

impl SetupView for TermSetupView {
    fn show_selection_count(&mut self, mode: &str, count: usize) {
        if count > 0 {
            println!("{count} device(s) selected for {mode}");
        }
    }

    fn clear_selection_marks(&mut self, mode: &str) {
        println!("Selection cleared for {mode}");
    }

    fn open_config(&mut self, form: &DeviceConfigForm) {
        println!("Configuring {} ({})", form.name, form.mode);
    }

    fn close_config(&mut self) {}
}
