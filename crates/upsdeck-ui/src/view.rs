//! What the controllers push back to their host
//!
//! The original mutated DOM nodes directly; these traits carry the same
//! updates as typed calls so a terminal host (or a test double) can render
//! them however it likes. All methods are synchronous and must not block.

use chrono::{DateTime, Utc};
use upsdeck_core::{DeviceDraft, DeviceId, DeviceStats, UpsDevice};

/// Inline connection indicator state for one device card
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionIndicator {
    /// Raw `ups.status` value reported by the driver (e.g. "OL")
    pub ups_status: String,
    /// When the probe completed
    pub checked_at: DateTime<Utc>,
}

/// Host surface for the device registry page
pub trait RegistryView: Send + Sync {
    /// Replace the header stats
    fn show_stats(&mut self, stats: &DeviceStats);

    /// Replace the rendered device cards
    fn show_devices(&mut self, devices: &[UpsDevice]);

    /// Open the add/edit editor with the given draft
    fn open_editor(&mut self, draft: &DeviceDraft);

    /// Close the editor
    fn close_editor(&mut self);

    /// Mark one device card as live-connected; only ever called after a
    /// positive probe
    fn set_connection_indicator(&mut self, id: DeviceId, indicator: &ConnectionIndicator);

    /// Toggle the per-card action menu
    fn toggle_menu(&mut self, id: DeviceId);
}

/// Host surface for the multi-device selection step
pub trait SetupView: Send + Sync {
    /// Update the selected-count badge for a mode; zero hides the badge
    fn show_selection_count(&mut self, mode: &str, count: usize);

    /// Uncheck every row and drop the selected styling for a mode
    fn clear_selection_marks(&mut self, mode: &str);

    /// Open the per-device configuration form
    fn open_config(&mut self, form: &crate::setup::DeviceConfigForm);

    /// Close the configuration form
    fn close_config(&mut self);
}
