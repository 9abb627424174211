//! UPS device records mirroring the backend API schema

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Backend-assigned identifier for a persisted device
///
/// The backend hands out integer ids but the client treats them as opaque;
/// they only ever travel back into URL path segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceId(pub u64);

impl std::fmt::Display for DeviceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A UPS device as the backend stores and returns it
///
/// `id` is `None` for records the user is still composing; its absence is the
/// discriminator between create and update on save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpsDevice {
    /// Backend id, present only for persisted devices
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<DeviceId>,
    /// Unique NUT driver section name (e.g. "ups1")
    pub name: String,
    /// Optional display label
    #[serde(default)]
    pub friendly_name: Option<String>,
    /// NUT driver binary (e.g. "usbhid-ups")
    pub driver: String,
    /// Driver port specifier ("auto", "/dev/ttyUSB0", ...)
    pub port: String,
    /// Host running the driver
    #[serde(default = "default_host")]
    pub host: String,
    /// Optional free-text description
    #[serde(default)]
    pub description: Option<String>,
    /// Whether the device participates in monitoring
    #[serde(default = "default_true")]
    pub is_enabled: bool,
    /// Designated target for critical alerting; at most one per selection set
    #[serde(default)]
    pub is_primary: bool,
    /// Connection kind hint ("local_usb", "remote", ...)
    #[serde(default)]
    pub connection_type: Option<String>,
    /// USB vendor id match hint
    #[serde(default)]
    pub vendor_id: Option<String>,
    /// USB product id match hint
    #[serde(default)]
    pub product_id: Option<String>,
    /// USB serial match hint
    #[serde(default)]
    pub serial: Option<String>,
    /// Backend display ordering
    #[serde(default)]
    pub order_index: Option<u32>,
    /// Nominal power rating in watts, set during multi-device setup
    #[serde(default)]
    pub realpower_nominal: Option<f64>,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_true() -> bool {
    true
}

impl UpsDevice {
    /// Create a fresh, not-yet-persisted device with registry defaults
    pub fn new(name: impl Into<String>, driver: impl Into<String>, port: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            friendly_name: None,
            driver: driver.into(),
            port: port.into(),
            host: default_host(),
            description: None,
            is_enabled: true,
            is_primary: false,
            connection_type: None,
            vendor_id: None,
            product_id: None,
            serial: None,
            order_index: None,
            realpower_nominal: None,
        }
    }

    /// Label shown to the user, falling back to the NUT name
    pub fn display_name(&self) -> &str {
        self.friendly_name.as_deref().unwrap_or(&self.name)
    }
}

/// A required field missing from the editor draft
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Name is required")]
    MissingName,
    #[error("Driver is required")]
    MissingDriver,
    #[error("Port is required")]
    MissingPort,
}

/// Editor form state for the add/edit dialog
///
/// Mirrors the device fields the form exposes. `editing` carries the id of
/// the record being updated; `None` means the save will create a new device.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceDraft {
    pub editing: Option<DeviceId>,
    pub name: String,
    pub friendly_name: String,
    pub driver: String,
    pub port: String,
    pub host: String,
    pub description: String,
    pub is_enabled: bool,
    pub is_primary: bool,
}

impl DeviceDraft {
    /// Blank draft with registry defaults applied
    pub fn blank() -> Self {
        Self {
            editing: None,
            host: default_host(),
            is_enabled: true,
            ..Self::default()
        }
    }

    /// Draft pre-populated from a persisted record
    pub fn from_device(device: &UpsDevice) -> Self {
        Self {
            editing: device.id,
            name: device.name.clone(),
            friendly_name: device.friendly_name.clone().unwrap_or_default(),
            driver: device.driver.clone(),
            port: device.port.clone(),
            host: device.host.clone(),
            description: device.description.clone().unwrap_or_default(),
            is_enabled: device.is_enabled,
            is_primary: device.is_primary,
        }
    }

    /// Check the required fields, first failure wins
    ///
    /// A failing draft must never produce a network request.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingName);
        }
        if self.driver.trim().is_empty() {
            return Err(ValidationError::MissingDriver);
        }
        if self.port.trim().is_empty() {
            return Err(ValidationError::MissingPort);
        }
        Ok(())
    }

    /// Build the API payload for this draft
    ///
    /// Empty optional fields collapse to `None` so the backend keeps its own
    /// defaults rather than storing empty strings.
    pub fn to_device(&self) -> UpsDevice {
        UpsDevice {
            id: self.editing,
            name: self.name.trim().to_string(),
            friendly_name: non_empty(&self.friendly_name),
            driver: self.driver.trim().to_string(),
            port: self.port.trim().to_string(),
            host: if self.host.trim().is_empty() {
                default_host()
            } else {
                self.host.trim().to_string()
            },
            description: non_empty(&self.description),
            is_enabled: self.is_enabled,
            is_primary: self.is_primary,
            connection_type: None,
            vendor_id: None,
            product_id: None,
            serial: None,
            order_index: None,
            realpower_nominal: None,
        }
    }
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
