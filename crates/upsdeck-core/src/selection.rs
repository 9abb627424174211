//! Per-mode selection sets for multi-device setup
//!
//! A selection set is an ordered list of devices keyed by NUT name. Order is
//! insertion order (it feeds the "first selected becomes primary" default),
//! inserts are idempotent by name, and the set enforces the single-primary
//! invariant when a member is promoted.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

use crate::device::UpsDevice;

/// Why a selection set failed validation before wizard advance
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("Please select at least one UPS device")]
    Empty,
    #[error("Duplicate device name in selection: {0}")]
    DuplicateName(String),
}

/// Ordered, name-keyed collection of selected devices
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SelectionSet {
    devices: Vec<UpsDevice>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a device unless one with the same name is already present
    ///
    /// Returns true when the set changed.
    pub fn insert(&mut self, device: UpsDevice) -> bool {
        if self.contains(&device.name) {
            debug!(name = %device.name, "Device already selected, ignoring");
            return false;
        }
        self.devices.push(device);
        true
    }

    /// Remove exactly the entry with the given name
    ///
    /// Returns true when an entry was removed.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.devices.len();
        self.devices.retain(|d| d.name != name);
        self.devices.len() != before
    }

    pub fn contains(&self, name: &str) -> bool {
        self.devices.iter().any(|d| d.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&UpsDevice> {
        self.devices.iter().find(|d| d.name == name)
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Live view of the selection in insertion order
    pub fn devices(&self) -> &[UpsDevice] {
        &self.devices
    }

    pub fn clear(&mut self) {
        self.devices.clear();
    }

    /// Replace the entry matching `key` with the given record, in place
    ///
    /// `key` is the entry's current name; the record may carry a new one
    /// (the configuration form lets the user rename). When the record
    /// carries `is_primary`, the flag is cleared on every other member so at
    /// most one device stays primary. Returns false when no entry matches.
    pub fn update(&mut self, key: &str, device: UpsDevice) -> bool {
        let Some(index) = self.devices.iter().position(|d| d.name == key) else {
            return false;
        };
        let promote = device.is_primary;
        self.devices[index] = device;
        if promote {
            for (i, other) in self.devices.iter_mut().enumerate() {
                if i != index {
                    other.is_primary = false;
                }
            }
        }
        true
    }

    /// Check the set is non-empty and free of duplicate names
    pub fn validate(&self) -> Result<(), SelectionError> {
        if self.devices.is_empty() {
            return Err(SelectionError::Empty);
        }
        let mut seen = std::collections::HashSet::new();
        for device in &self.devices {
            if !seen.insert(device.name.as_str()) {
                return Err(SelectionError::DuplicateName(device.name.clone()));
            }
        }
        Ok(())
    }
}

/// Wizard-mode name to selection set mapping
///
/// The two shipped wizard modes are predeclared; reads of unknown modes see
/// an empty set so callers never branch on mode existence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionMap {
    sets: HashMap<String, SelectionSet>,
}

/// Wizard modes known at startup
pub const PREDECLARED_MODES: [&str; 2] = ["standalone", "netserver"];

impl Default for SelectionMap {
    fn default() -> Self {
        let mut sets = HashMap::new();
        for mode in PREDECLARED_MODES {
            sets.insert(mode.to_string(), SelectionSet::new());
        }
        Self { sets }
    }
}

impl SelectionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selection for a mode, creating it lazily for open-ended mode names
    pub fn get_mut(&mut self, mode: &str) -> &mut SelectionSet {
        self.sets.entry(mode.to_string()).or_default()
    }

    /// Read-only selection view; unknown modes read as empty
    pub fn get(&self, mode: &str) -> &SelectionSet {
        static EMPTY: SelectionSet = SelectionSet { devices: Vec::new() };
        self.sets.get(mode).unwrap_or(&EMPTY)
    }

    pub fn modes(&self) -> impl Iterator<Item = &str> {
        self.sets.keys().map(String::as_str)
    }
}
