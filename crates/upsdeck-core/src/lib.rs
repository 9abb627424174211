//! Upsdeck Core - Core types for UPS device management
//!
//! This crate provides the foundational types shared by the upsdeck client
//! and UI layers:
//! - UPS device records mirroring the backend API schema
//! - Editor drafts with required-field validation
//! - Per-mode selection sets with the single-primary invariant
//! - Aggregate registry statistics

pub mod device;
pub mod selection;
pub mod stats;

pub use device::{DeviceDraft, DeviceId, UpsDevice, ValidationError};
pub use selection::{SelectionError, SelectionMap, SelectionSet};
pub use stats::DeviceStats;
