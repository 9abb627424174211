//! Device registry controller
//!
//! Mediates the registry page: header stats, the add/edit editor, and the
//! per-card toggle/delete/test-connection actions. Every mutation is
//! followed by a re-fetch of the device list so the view is patched from
//! fresh server data rather than trusting local state.
//!
//! Error surfacing follows the three-tier taxonomy: draft validation fails
//! before any request, API-level failures show the server message verbatim,
//! and transport/decode failures show a generic message while the full error
//! goes to the log.

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error, info};
use upsdeck_client::{ApiClient, Mutation};
use upsdeck_core::{DeviceDraft, DeviceId, DeviceStats, UpsDevice};

use crate::action::DeviceAction;
use crate::notify::{AlertLevel, Confirmer, Notifier};
use crate::view::{ConnectionIndicator, RegistryView};

/// Controller for the device registry page
///
/// Owns its view and the last fetched device list; one instance per page.
pub struct RegistryController<V: RegistryView> {
    client: ApiClient,
    view: V,
    notifier: Arc<dyn Notifier>,
    confirmer: Arc<dyn Confirmer>,
    devices: Vec<UpsDevice>,
    stats: DeviceStats,
    draft: Option<DeviceDraft>,
}

impl<V: RegistryView> RegistryController<V> {
    pub fn new(
        client: ApiClient,
        view: V,
        notifier: Arc<dyn Notifier>,
        confirmer: Arc<dyn Confirmer>,
    ) -> Self {
        Self {
            client,
            view,
            notifier,
            confirmer,
            devices: Vec::new(),
            stats: DeviceStats::default(),
            draft: None,
        }
    }

    /// Last fetched device list
    pub fn devices(&self) -> &[UpsDevice] {
        &self.devices
    }

    /// Current header stats
    pub fn stats(&self) -> &DeviceStats {
        &self.stats
    }

    /// Editor draft, when the editor is open
    pub fn draft(&self) -> Option<&DeviceDraft> {
        self.draft.as_ref()
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    /// Fetch the device list and patch stats and cards
    ///
    /// On failure the previous stats stay on screen; there is no retry.
    pub async fn load_devices(&mut self) {
        match self.client.list_devices().await {
            Ok(devices) => {
                self.stats = DeviceStats::compute(&devices);
                self.devices = devices;
                self.view.show_stats(&self.stats);
                self.view.show_devices(&self.devices);
                debug!(total = self.stats.total, "Device list refreshed");
            }
            Err(e) => {
                error!(error = %e, "Failed to load devices");
                self.notifier.notify(&e.user_message(), AlertLevel::Error);
            }
        }
    }

    /// Open the editor with a blank draft (create mode)
    pub fn open_add(&mut self) {
        let draft = DeviceDraft::blank();
        self.view.open_editor(&draft);
        self.draft = Some(draft);
    }

    /// Open the editor pre-populated from the persisted record (update mode)
    ///
    /// The list endpoint is the only read contract, so the record is located
    /// in a fresh fetch of the full collection.
    pub async fn open_edit(&mut self, id: DeviceId) {
        let devices = match self.client.list_devices().await {
            Ok(devices) => devices,
            Err(e) => {
                error!(error = %e, device = %id, "Failed to fetch device for editing");
                self.notifier.notify(&e.user_message(), AlertLevel::Error);
                return;
            }
        };
        let Some(device) = devices.iter().find(|d| d.id == Some(id)) else {
            self.notifier
                .notify(&format!("UPS device with ID {id} not found"), AlertLevel::Error);
            return;
        };
        let draft = DeviceDraft::from_device(device);
        self.view.open_editor(&draft);
        self.draft = Some(draft);
        self.devices = devices;
    }

    /// Replace the editor draft with the host's current form state
    pub fn set_draft(&mut self, draft: DeviceDraft) {
        self.draft = Some(draft);
    }

    /// Validate and persist the editor draft
    ///
    /// An invalid draft is reported and never leaves the client. On success
    /// the editor closes and the list is re-fetched; on API failure the
    /// editor stays open for correction.
    pub async fn save(&mut self) {
        let Some(draft) = self.draft.clone() else {
            debug!("Save requested with no editor open");
            return;
        };

        if let Err(e) = draft.validate() {
            self.notifier.notify(&e.to_string(), AlertLevel::Error);
            return;
        }

        let payload = draft.to_device();
        let result = match draft.editing {
            Some(id) => self.client.update_device(id, &payload).await,
            None => self.client.add_device(&payload).await,
        };

        match result {
            Ok(mutation) => {
                info!(name = %payload.name, "Device saved");
                self.notify_mutation(&mutation, "UPS device saved successfully");
                self.view.close_editor();
                self.draft = None;
                self.load_devices().await;
            }
            Err(e) => {
                error!(error = %e, name = %payload.name, "Failed to save device");
                self.notifier.notify(&e.user_message(), AlertLevel::Error);
            }
        }
    }

    /// Flip a device's enabled state, behind a confirmation gate
    pub async fn toggle(&mut self, id: DeviceId) {
        if !self
            .confirmer
            .confirm("Enable/disable this UPS device?")
            .await
        {
            debug!(device = %id, "Toggle declined");
            return;
        }
        match self.client.toggle_device(id).await {
            Ok(mutation) => {
                info!(device = %id, enabled = ?mutation.is_enabled, "Device toggled");
                self.notify_mutation(&mutation, "UPS device toggled successfully");
                self.load_devices().await;
            }
            Err(e) => {
                error!(error = %e, device = %id, "Failed to toggle device");
                self.notifier.notify(&e.user_message(), AlertLevel::Error);
            }
        }
    }

    /// Remove a device, behind a stronger confirmation gate
    pub async fn delete(&mut self, id: DeviceId) {
        if !self
            .confirmer
            .confirm("Permanently delete this UPS device? This action cannot be undone.")
            .await
        {
            debug!(device = %id, "Delete declined");
            return;
        }
        match self.client.delete_device(id).await {
            Ok(mutation) => {
                info!(device = %id, "Device deleted");
                self.notify_mutation(&mutation, "UPS device deleted successfully");
                self.load_devices().await;
            }
            Err(e) => {
                error!(error = %e, device = %id, "Failed to delete device");
                self.notifier.notify(&e.user_message(), AlertLevel::Error);
            }
        }
    }

    /// Probe a device's driver connection
    ///
    /// An immediate notice is posted before the request so the user sees the
    /// probe started; the card indicator is only ever touched on a positive
    /// verdict.
    pub async fn test_connection(&mut self, id: DeviceId) {
        self.notifier
            .notify("Testing connection...", AlertLevel::Info);

        match self.client.test_connection(id).await {
            Ok(test) if test.connected => {
                let ups_status = test.ups_status.unwrap_or_else(|| "ONLINE".to_string());
                let message = test
                    .message
                    .unwrap_or_else(|| "Connection successful".to_string());
                info!(device = %id, ups_status = %ups_status, "Connection test succeeded");
                self.notifier
                    .notify(&format!("{message} ({ups_status})"), AlertLevel::Success);
                self.view.set_connection_indicator(
                    id,
                    &ConnectionIndicator {
                        ups_status,
                        checked_at: Utc::now(),
                    },
                );
            }
            Ok(test) => {
                // The backend reports "warning" for a driver refusal and
                // "error" for a probe timeout.
                let level = if test.status == "error" {
                    AlertLevel::Error
                } else {
                    AlertLevel::Warning
                };
                let message = test
                    .message
                    .unwrap_or_else(|| "Connection test failed".to_string());
                info!(device = %id, status = %test.status, "Connection test negative");
                self.notifier.notify(&message, level);
            }
            Err(e) => {
                error!(error = %e, device = %id, "Connection test request failed");
                self.notifier.notify(&e.user_message(), AlertLevel::Error);
            }
        }
    }

    /// Dispatch a typed per-device action
    pub async fn dispatch(&mut self, action: DeviceAction, id: DeviceId) {
        match action {
            DeviceAction::Edit => self.open_edit(id).await,
            DeviceAction::Test => self.test_connection(id).await,
            DeviceAction::Toggle => self.toggle(id).await,
            DeviceAction::Delete => self.delete(id).await,
            DeviceAction::MenuToggle => self.view.toggle_menu(id),
        }
    }

    fn notify_mutation(&self, mutation: &Mutation, fallback: &str) {
        let message = if mutation.message.is_empty() {
            fallback
        } else {
            &mutation.message
        };
        self.notifier.notify(message, AlertLevel::Success);
    }
}
