//! Typed per-device actions
//!
//! The original page recovered the action kind by matching CSS class names
//! on the clicked element; the controller instead takes a discriminated
//! action and dispatches through one table.

use serde::{Deserialize, Serialize};

/// An action the host can raise for one device card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeviceAction {
    /// Open the editor pre-populated with the device
    Edit,
    /// Probe the driver connection
    Test,
    /// Flip the enabled state (confirmation-gated)
    Toggle,
    /// Remove the device (confirmation-gated)
    Delete,
    /// Open or close the card's action menu
    MenuToggle,
}
