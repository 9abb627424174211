//! Aggregate counts shown on the registry page header

use serde::{Deserialize, Serialize};

use crate::device::UpsDevice;

/// Registry header stats, recomputed from the full device list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceStats {
    pub total: usize,
    pub enabled: usize,
    pub disabled: usize,
    /// Display name of the primary device, if one is designated
    pub primary_name: Option<String>,
}

impl DeviceStats {
    /// Compute stats over a freshly fetched device list
    pub fn compute(devices: &[UpsDevice]) -> Self {
        let enabled = devices.iter().filter(|d| d.is_enabled).count();
        Self {
            total: devices.len(),
            enabled,
            disabled: devices.len() - enabled,
            primary_name: devices
                .iter()
                .find(|d| d.is_primary)
                .map(|d| d.display_name().to_string()),
        }
    }
}
