//! Upsdeck UI - Host-agnostic controllers for UPS device management
//!
//! The original feature rendered into a browser page; here the rendering
//! substrate is abstracted behind small traits so the same controllers drive
//! a terminal front end and the test suite alike:
//! - [`registry::RegistryController`] — device list, add/edit editor,
//!   toggle/delete/test-connection actions
//! - [`setup::SetupWorkflow`] — per-mode multi-device selection with a
//!   per-device configuration form
//! - [`notify`] — alert levels, notification and confirmation seams
//! - [`view`] — what each controller pushes back to its host

pub mod action;
pub mod notify;
pub mod registry;
pub mod setup;
pub mod view;

pub use action::DeviceAction;
pub use notify::{AlertLevel, Confirmer, LogNotifier, Notifier};
pub use registry::RegistryController;
pub use setup::{DeviceConfigForm, PrimaryPolicy, SetupWorkflow};
pub use view::{ConnectionIndicator, RegistryView, SetupView};
