//! Multi-device selection workflow for the setup wizard
//!
//! One selection set per wizard mode (`standalone`, `netserver`, open-ended
//! beyond that). The workflow owns the sets, the per-device configuration
//! form, and the single-primary invariant; wizard step sequencing stays with
//! the outer controller, which reads the selections through
//! [`SetupWorkflow::selections`].

use std::sync::Arc;
use tracing::{debug, info, warn};
use upsdeck_core::{SelectionMap, UpsDevice};

use crate::notify::{AlertLevel, Notifier};
use crate::view::SetupView;

/// How a newly configured device gets the primary flag by default
///
/// The first device selected in a mode becoming primary is a default, not a
/// rule; the user can always override it in the configuration form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrimaryPolicy {
    /// Pre-check primary for the mode's first selection
    #[default]
    FirstSelected,
    /// Never pre-check; the user opts in explicitly
    Explicit,
}

/// Per-device configuration form state
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceConfigForm {
    /// Wizard mode the device was selected under
    pub mode: String,
    /// Name the entry is keyed by in the selection set; stable while the
    /// form is open even if `name` is edited
    original_name: String,
    /// NUT driver section name (editable)
    pub name: String,
    pub friendly_name: String,
    pub description: String,
    /// Nominal power rating in watts
    pub realpower_nominal: Option<f64>,
    pub is_primary: bool,
}

impl DeviceConfigForm {
    fn from_device(device: &UpsDevice, mode: &str, primary_default: bool) -> Self {
        Self {
            mode: mode.to_string(),
            original_name: device.name.clone(),
            name: device.name.clone(),
            friendly_name: device.friendly_name.clone().unwrap_or_default(),
            description: device.description.clone().unwrap_or_default(),
            realpower_nominal: device.realpower_nominal,
            is_primary: device.is_primary || primary_default,
        }
    }
}

/// Controller for the multi-device selection step
pub struct SetupWorkflow<V: SetupView> {
    selections: SelectionMap,
    view: V,
    notifier: Arc<dyn Notifier>,
    policy: PrimaryPolicy,
    form: Option<DeviceConfigForm>,
}

impl<V: SetupView> SetupWorkflow<V> {
    pub fn new(view: V, notifier: Arc<dyn Notifier>) -> Self {
        Self::with_policy(view, notifier, PrimaryPolicy::default())
    }

    pub fn with_policy(view: V, notifier: Arc<dyn Notifier>, policy: PrimaryPolicy) -> Self {
        Self {
            selections: SelectionMap::new(),
            view,
            notifier,
            policy,
            form: None,
        }
    }

    /// Raw selection map, for the outer wizard controller
    pub fn selections(&self) -> &SelectionMap {
        &self.selections
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    /// Configuration form state, when the form is open
    pub fn form(&self) -> Option<&DeviceConfigForm> {
        self.form.as_ref()
    }

    /// Add a scan-discovered device to a mode's selection
    ///
    /// Adding the same name twice is a no-op; either way the count badge is
    /// refreshed. Returns true when the selection changed.
    pub fn select(&mut self, mode: &str, device: UpsDevice) -> bool {
        let name = device.name.clone();
        let changed = self.selections.get_mut(mode).insert(device);
        if changed {
            debug!(mode, name = %name, "Device selected");
        }
        self.refresh_count(mode);
        changed
    }

    /// Remove exactly the entry with the given name from a mode's selection
    pub fn deselect(&mut self, mode: &str, name: &str) -> bool {
        let changed = self.selections.get_mut(mode).remove(name);
        if changed {
            debug!(mode, name, "Device deselected");
        }
        self.refresh_count(mode);
        changed
    }

    /// Devices currently selected for a mode; empty for unknown modes
    pub fn selected(&self, mode: &str) -> &[UpsDevice] {
        self.selections.get(mode).devices()
    }

    /// Open the configuration form for one selected device
    ///
    /// Primary pre-checks when the device already carries the flag or, under
    /// [`PrimaryPolicy::FirstSelected`], when it is the mode's first (or
    /// about-to-be-first) selection.
    pub fn configure(&mut self, mode: &str, name: &str) {
        let set = self.selections.get(mode);
        let Some(device) = set.get(name) else {
            warn!(mode, name, "Configure requested for an unselected device");
            self.notifier
                .notify("Select the device before configuring it", AlertLevel::Warning);
            return;
        };
        let primary_default = match self.policy {
            PrimaryPolicy::FirstSelected => {
                set.devices().first().map(|d| d.name.as_str()) == Some(name)
            }
            PrimaryPolicy::Explicit => false,
        };
        let form = DeviceConfigForm::from_device(device, mode, primary_default);
        self.view.open_config(&form);
        self.form = Some(form);
    }

    /// Replace the open form with the host's current field values
    pub fn set_form(&mut self, form: DeviceConfigForm) {
        self.form = Some(form);
    }

    /// Write the form back onto the selected device and close the form
    ///
    /// Promoting a device to primary clears the flag on every other device
    /// in the mode's selection.
    pub fn apply_config(&mut self) {
        let Some(form) = self.form.take() else {
            debug!("Apply requested with no configuration form open");
            return;
        };

        let set = self.selections.get_mut(&form.mode);
        let Some(existing) = set.get(&form.original_name).cloned() else {
            warn!(mode = %form.mode, name = %form.original_name, "Configured device no longer selected");
            self.notifier
                .notify("Device is no longer selected", AlertLevel::Warning);
            self.view.close_config();
            return;
        };

        let updated = UpsDevice {
            name: form.name.trim().to_string(),
            friendly_name: non_empty(&form.friendly_name),
            description: non_empty(&form.description),
            realpower_nominal: form.realpower_nominal,
            is_primary: form.is_primary,
            ..existing
        };
        set.update(&form.original_name, updated);
        info!(mode = %form.mode, name = %form.name, primary = form.is_primary, "Device configuration applied");
        self.view.close_config();
    }

    /// Empty a mode's selection and reset the view's row marks
    pub fn clear(&mut self, mode: &str) {
        self.selections.get_mut(mode).clear();
        self.view.clear_selection_marks(mode);
        self.refresh_count(mode);
        debug!(mode, "Selection cleared");
    }

    /// Check the mode's selection before the wizard advances
    ///
    /// Empty selections and duplicate names fail with a user-facing alert.
    pub fn validate(&self, mode: &str) -> bool {
        match self.selections.get(mode).validate() {
            Ok(()) => true,
            Err(e) => {
                self.notifier.notify(&e.to_string(), AlertLevel::Error);
                false
            }
        }
    }

    fn refresh_count(&mut self, mode: &str) {
        let count = self.selections.get(mode).len();
        self.view.show_selection_count(mode, count);
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::Notifier;
    use std::sync::Mutex;

    /// Records every view call for assertion
    #[derive(Default)]
    struct RecordingView {
        counts: Vec<(String, usize)>,
        cleared: Vec<String>,
        opened: Vec<DeviceConfigForm>,
        closed: usize,
    }

    impl SetupView for RecordingView {
        fn show_selection_count(&mut self, mode: &str, count: usize) {
            self.counts.push((mode.to_string(), count));
        }
        fn clear_selection_marks(&mut self, mode: &str) {
            self.cleared.push(mode.to_string());
        }
        fn open_config(&mut self, form: &DeviceConfigForm) {
            self.opened.push(form.clone());
        }
        fn close_config(&mut self) {
            self.closed += 1;
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        messages: Mutex<Vec<(String, AlertLevel)>>,
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, message: &str, level: AlertLevel) {
            self.messages.lock().unwrap().push((message.to_string(), level));
        }
    }

    fn device(name: &str) -> UpsDevice {
        UpsDevice::new(name, "usbhid-ups", "auto")
    }

    fn workflow() -> (SetupWorkflow<RecordingView>, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::default());
        let workflow = SetupWorkflow::new(RecordingView::default(), notifier.clone());
        (workflow, notifier)
    }

    #[test]
    fn test_select_is_idempotent() {
        let (mut wf, _) = workflow();
        assert!(wf.select("standalone", device("ups1")));
        assert!(!wf.select("standalone", device("ups1")));
        assert_eq!(wf.selected("standalone").len(), 1);
        // Both attempts refresh the count badge.
        assert_eq!(
            wf.view().counts,
            vec![("standalone".to_string(), 1), ("standalone".to_string(), 1)]
        );
    }

    #[test]
    fn test_deselect_removes_exact_entry() {
        let (mut wf, _) = workflow();
        wf.select("standalone", device("ups1"));
        wf.select("standalone", device("ups2"));
        assert!(wf.deselect("standalone", "ups1"));
        let names: Vec<_> = wf.selected("standalone").iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["ups2"]);
    }

    #[test]
    fn test_modes_are_independent() {
        let (mut wf, _) = workflow();
        wf.select("standalone", device("ups1"));
        wf.select("netserver", device("ups2"));
        assert_eq!(wf.selected("standalone").len(), 1);
        assert_eq!(wf.selected("netserver").len(), 1);
        wf.clear("standalone");
        assert!(wf.selected("standalone").is_empty());
        assert_eq!(wf.selected("netserver").len(), 1);
    }

    #[test]
    fn test_unknown_mode_reads_empty() {
        let (wf, _) = workflow();
        assert!(wf.selected("cluster").is_empty());
    }

    #[test]
    fn test_first_selection_defaults_primary() {
        let (mut wf, _) = workflow();
        wf.select("standalone", device("ups1"));
        wf.select("standalone", device("ups2"));

        wf.configure("standalone", "ups1");
        assert!(wf.form().unwrap().is_primary);

        wf.apply_config();
        wf.configure("standalone", "ups2");
        assert!(!wf.form().unwrap().is_primary);
    }

    #[test]
    fn test_explicit_policy_never_prechecks() {
        let notifier = Arc::new(RecordingNotifier::default());
        let mut wf = SetupWorkflow::with_policy(
            RecordingView::default(),
            notifier,
            PrimaryPolicy::Explicit,
        );
        wf.select("standalone", device("ups1"));
        wf.configure("standalone", "ups1");
        assert!(!wf.form().unwrap().is_primary);
    }

    #[test]
    fn test_apply_config_enforces_single_primary() {
        let (mut wf, _) = workflow();
        let mut first = device("ups1");
        first.is_primary = true;
        wf.select("standalone", first);
        wf.select("standalone", device("ups2"));

        wf.configure("standalone", "ups2");
        let mut form = wf.form().unwrap().clone();
        form.is_primary = true;
        wf.set_form(form);
        wf.apply_config();

        let primaries: Vec<_> = wf
            .selected("standalone")
            .iter()
            .filter(|d| d.is_primary)
            .map(|d| d.name.as_str())
            .collect();
        assert_eq!(primaries, vec!["ups2"]);
        assert_eq!(wf.view().closed, 1);
    }

    #[test]
    fn test_apply_config_writes_fields_back() {
        let (mut wf, _) = workflow();
        wf.select("standalone", device("ups1"));
        wf.configure("standalone", "ups1");

        let mut form = wf.form().unwrap().clone();
        form.friendly_name = "Rack A".to_string();
        form.realpower_nominal = Some(900.0);
        wf.set_form(form);
        wf.apply_config();

        let updated = &wf.selected("standalone")[0];
        assert_eq!(updated.friendly_name.as_deref(), Some("Rack A"));
        assert_eq!(updated.realpower_nominal, Some(900.0));
    }

    #[test]
    fn test_apply_config_rename_keeps_entry() {
        let (mut wf, _) = workflow();
        wf.select("standalone", device("ups1"));
        wf.configure("standalone", "ups1");

        let mut form = wf.form().unwrap().clone();
        form.name = "rack-a".to_string();
        wf.set_form(form);
        wf.apply_config();

        assert_eq!(wf.selected("standalone")[0].name, "rack-a");
        assert_eq!(wf.selected("standalone").len(), 1);
    }

    #[test]
    fn test_configure_unselected_device_warns() {
        let (mut wf, notifier) = workflow();
        wf.configure("standalone", "ups1");
        assert!(wf.form().is_none());
        let messages = notifier.messages.lock().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].1, AlertLevel::Warning);
    }

    #[test]
    fn test_validate_empty_selection() {
        let (wf, notifier) = workflow();
        assert!(!wf.validate("standalone"));
        let messages = notifier.messages.lock().unwrap();
        assert_eq!(messages[0].1, AlertLevel::Error);
    }

    #[test]
    fn test_validate_accepts_populated_selection() {
        let (mut wf, _) = workflow();
        wf.select("standalone", device("ups1"));
        wf.select("standalone", device("ups2"));
        assert!(wf.validate("standalone"));
    }

    #[test]
    fn test_clear_resets_view_marks() {
        let (mut wf, _) = workflow();
        wf.select("netserver", device("ups1"));
        wf.clear("netserver");
        assert_eq!(wf.view().cleared, vec!["netserver"]);
        assert_eq!(wf.view().counts.last(), Some(&("netserver".to_string(), 0)));
    }
}
