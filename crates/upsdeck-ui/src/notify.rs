//! Notification and confirmation seams
//!
//! The original page called a global toast function when present and fell
//! back to console output plus a blocking alert. Here both concerns are
//! traits: hosts plug in their own implementations, and the fallback logs
//! through `tracing` without ever blocking the event loop.

use async_trait::async_trait;
use tracing::{error, info, warn};

/// Severity of a user-facing notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertLevel {
    Success,
    Error,
    Warning,
    Info,
}

/// Sink for user-facing notices
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str, level: AlertLevel);
}

/// Interactive yes/no gate for destructive actions
///
/// Implementations must only resolve `true` on an explicit affirmative
/// response; anything else (dismissal, timeout, EOF) declines.
#[async_trait]
pub trait Confirmer: Send + Sync {
    async fn confirm(&self, prompt: &str) -> bool;
}

/// Fallback notifier that writes to the log
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str, level: AlertLevel) {
        match level {
            AlertLevel::Success | AlertLevel::Info => info!("{message}"),
            AlertLevel::Warning => warn!("{message}"),
            AlertLevel::Error => error!("{message}"),
        }
    }
}
