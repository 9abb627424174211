//! Controller tests against an in-process stub of the backend contract.
//!
//! The stub records every request it sees so the tests can assert not just
//! on outcomes but on which calls were (or were not) issued.

use async_trait::async_trait;
use axum::extract::{Path, State};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use upsdeck_client::ApiClient;
use upsdeck_core::{DeviceDraft, DeviceId, DeviceStats, UpsDevice};
use upsdeck_ui::{
    AlertLevel, Confirmer, ConnectionIndicator, DeviceAction, Notifier, RegistryController,
    RegistryView,
};

/// One recorded backend request: method and path.
type RequestLog = Arc<Mutex<Vec<(String, String)>>>;

struct Stub {
    log: RequestLog,
    devices: Value,
    test_connection: Value,
}

impl Stub {
    fn new(devices: Value, test_connection: Value) -> Self {
        Self {
            log: Arc::new(Mutex::new(Vec::new())),
            devices,
            test_connection,
        }
    }

    async fn serve(self) -> (ApiClient, RequestLog) {
        let log = self.log.clone();
        let state = Arc::new(self);

        async fn record(state: &Stub, method: &str, path: String) {
            state.log.lock().unwrap().push((method.to_string(), path));
        }

        let app = Router::new()
            .route(
                "/ups-management/api/devices",
                get(|State(s): State<Arc<Stub>>| async move {
                    record(&s, "GET", "/devices".to_string()).await;
                    Json(json!({
                        "status": "success",
                        "count": s.devices.as_array().map(|a| a.len()).unwrap_or(0),
                        "devices": s.devices.clone()
                    }))
                }),
            )
            .route(
                "/ups-management/api/add",
                post(|State(s): State<Arc<Stub>>, Json(_): Json<Value>| async move {
                    record(&s, "POST", "/add".to_string()).await;
                    Json(json!({"status": "success", "message": "Device added", "device_id": 10}))
                }),
            )
            .route(
                "/ups-management/api/update/{id}",
                put(
                    |State(s): State<Arc<Stub>>, Path(id): Path<u64>, Json(_): Json<Value>| async move {
                        record(&s, "PUT", format!("/update/{id}")).await;
                        Json(json!({"status": "success", "message": "Device updated"}))
                    },
                ),
            )
            .route(
                "/ups-management/api/toggle/{id}",
                post(|State(s): State<Arc<Stub>>, Path(id): Path<u64>| async move {
                    record(&s, "POST", format!("/toggle/{id}")).await;
                    Json(json!({"status": "success", "message": "Device toggled", "is_enabled": false}))
                }),
            )
            .route(
                "/ups-management/api/delete/{id}",
                delete(|State(s): State<Arc<Stub>>, Path(id): Path<u64>| async move {
                    record(&s, "DELETE", format!("/delete/{id}")).await;
                    Json(json!({"status": "success", "message": "Device deleted"}))
                }),
            )
            .route(
                "/ups-management/api/test-connection/{id}",
                post(|State(s): State<Arc<Stub>>, Path(id): Path<u64>| async move {
                    record(&s, "POST", format!("/test-connection/{id}")).await;
                    Json(s.test_connection.clone())
                }),
            )
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        let client = ApiClient::new(format!("http://{addr}"), Duration::from_secs(5)).unwrap();
        (client, log)
    }
}

#[derive(Default)]
struct TestView {
    stats: Option<DeviceStats>,
    devices: Vec<UpsDevice>,
    editor_open: bool,
    indicators: Vec<(DeviceId, ConnectionIndicator)>,
    menu_toggles: Vec<DeviceId>,
}

impl RegistryView for TestView {
    fn show_stats(&mut self, stats: &DeviceStats) {
        self.stats = Some(stats.clone());
    }
    fn show_devices(&mut self, devices: &[UpsDevice]) {
        self.devices = devices.to_vec();
    }
    fn open_editor(&mut self, _draft: &DeviceDraft) {
        self.editor_open = true;
    }
    fn close_editor(&mut self) {
        self.editor_open = false;
    }
    fn set_connection_indicator(&mut self, id: DeviceId, indicator: &ConnectionIndicator) {
        self.indicators.push((id, indicator.clone()));
    }
    fn toggle_menu(&mut self, id: DeviceId) {
        self.menu_toggles.push(id);
    }
}

#[derive(Default)]
struct TestNotifier {
    messages: Mutex<Vec<(String, AlertLevel)>>,
}

impl Notifier for TestNotifier {
    fn notify(&self, message: &str, level: AlertLevel) {
        self.messages.lock().unwrap().push((message.to_string(), level));
    }
}

impl TestNotifier {
    fn messages(&self) -> Vec<(String, AlertLevel)> {
        self.messages.lock().unwrap().clone()
    }
}

struct FixedConfirmer(bool);

#[async_trait]
impl Confirmer for FixedConfirmer {
    async fn confirm(&self, _prompt: &str) -> bool {
        self.0
    }
}

fn sample_devices() -> Value {
    json!([
        {
            "id": 3,
            "name": "ups1",
            "friendly_name": "Server Room",
            "driver": "usbhid-ups",
            "port": "auto",
            "host": "localhost",
            "is_enabled": true,
            "is_primary": true
        },
        {
            "id": 5,
            "name": "ups2",
            "driver": "snmp-ups",
            "port": "161",
            "host": "10.0.0.20",
            "is_enabled": false,
            "is_primary": false
        }
    ])
}

fn connected_response() -> Value {
    json!({
        "status": "success",
        "message": "Successfully connected to Server Room",
        "ups_status": "OL",
        "connected": true
    })
}

async fn controller(
    devices: Value,
    test_connection: Value,
    confirm: bool,
) -> (RegistryController<TestView>, Arc<TestNotifier>, RequestLog) {
    let (client, log) = Stub::new(devices, test_connection).serve().await;
    let notifier = Arc::new(TestNotifier::default());
    let controller = RegistryController::new(
        client,
        TestView::default(),
        notifier.clone(),
        Arc::new(FixedConfirmer(confirm)),
    );
    (controller, notifier, log)
}

#[tokio::test]
async fn load_devices_patches_stats() {
    let (mut ctl, _, _) = controller(sample_devices(), connected_response(), true).await;
    ctl.load_devices().await;

    let stats = ctl.view().stats.clone().unwrap();
    assert_eq!(stats.total, 2);
    assert_eq!(stats.enabled, 1);
    assert_eq!(stats.disabled, 1);
    assert_eq!(stats.primary_name.as_deref(), Some("Server Room"));
    assert_eq!(ctl.view().devices.len(), 2);
}

#[tokio::test]
async fn invalid_draft_issues_no_request() {
    let (mut ctl, notifier, log) = controller(sample_devices(), connected_response(), true).await;

    ctl.open_add();
    let mut draft = ctl.draft().unwrap().clone();
    draft.name = "ups1".to_string();
    // driver left empty
    draft.port = "auto".to_string();
    ctl.set_draft(draft);
    ctl.save().await;

    assert!(log.lock().unwrap().is_empty());
    let messages = notifier.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0], ("Driver is required".to_string(), AlertLevel::Error));
    // Editor stays open for correction.
    assert!(ctl.view().editor_open);
}

#[tokio::test]
async fn add_flow_posts_and_closes_editor() {
    let (mut ctl, notifier, log) = controller(sample_devices(), connected_response(), true).await;

    ctl.open_add();
    let mut draft = ctl.draft().unwrap().clone();
    assert_eq!(draft.host, "localhost");
    assert!(draft.is_enabled);
    draft.name = "ups1".to_string();
    draft.driver = "usbhid-ups".to_string();
    draft.port = "auto".to_string();
    ctl.set_draft(draft);
    ctl.save().await;

    let requests = log.lock().unwrap().clone();
    assert_eq!(requests[0], ("POST".to_string(), "/add".to_string()));
    // Refresh follows the successful save.
    assert_eq!(requests[1], ("GET".to_string(), "/devices".to_string()));
    assert!(!ctl.view().editor_open);
    assert!(ctl.draft().is_none());
    assert!(notifier
        .messages()
        .iter()
        .any(|(m, l)| m == "Device added" && *l == AlertLevel::Success));
}

#[tokio::test]
async fn edit_flow_puts_to_update_path() {
    let (mut ctl, _, log) = controller(sample_devices(), connected_response(), true).await;

    ctl.open_edit(DeviceId(3)).await;
    let draft = ctl.draft().unwrap().clone();
    assert_eq!(draft.editing, Some(DeviceId(3)));
    assert_eq!(draft.name, "ups1");
    assert_eq!(draft.friendly_name, "Server Room");

    ctl.save().await;

    let requests = log.lock().unwrap().clone();
    // open_edit re-fetches the list, then save PUTs to the id path.
    assert_eq!(requests[0], ("GET".to_string(), "/devices".to_string()));
    assert_eq!(requests[1], ("PUT".to_string(), "/update/3".to_string()));
}

#[tokio::test]
async fn edit_unknown_id_reports_error() {
    let (mut ctl, notifier, _) = controller(sample_devices(), connected_response(), true).await;
    ctl.open_edit(DeviceId(99)).await;
    assert!(ctl.draft().is_none());
    let messages = notifier.messages();
    assert_eq!(
        messages[0],
        ("UPS device with ID 99 not found".to_string(), AlertLevel::Error)
    );
}

#[tokio::test]
async fn toggle_declined_issues_no_request() {
    let (mut ctl, _, log) = controller(sample_devices(), connected_response(), false).await;
    ctl.toggle(DeviceId(3)).await;
    assert!(log.lock().unwrap().is_empty());
}

#[tokio::test]
async fn toggle_confirmed_posts_and_refreshes() {
    let (mut ctl, _, log) = controller(sample_devices(), connected_response(), true).await;
    ctl.toggle(DeviceId(3)).await;
    let requests = log.lock().unwrap().clone();
    assert_eq!(requests[0], ("POST".to_string(), "/toggle/3".to_string()));
    assert_eq!(requests[1], ("GET".to_string(), "/devices".to_string()));
}

#[tokio::test]
async fn delete_confirmed_issues_delete() {
    let (mut ctl, _, log) = controller(sample_devices(), connected_response(), true).await;
    ctl.delete(DeviceId(5)).await;
    let requests = log.lock().unwrap().clone();
    assert_eq!(requests[0], ("DELETE".to_string(), "/delete/5".to_string()));
}

#[tokio::test]
async fn successful_probe_updates_indicator() {
    let (mut ctl, notifier, _) = controller(sample_devices(), connected_response(), true).await;
    ctl.test_connection(DeviceId(3)).await;

    let messages = notifier.messages();
    assert_eq!(messages[0], ("Testing connection...".to_string(), AlertLevel::Info));
    assert_eq!(messages[1].1, AlertLevel::Success);
    assert!(messages[1].0.contains("OL"));

    let indicators = &ctl.view().indicators;
    assert_eq!(indicators.len(), 1);
    assert_eq!(indicators[0].0, DeviceId(3));
    assert_eq!(indicators[0].1.ups_status, "OL");
}

#[tokio::test]
async fn failed_probe_warns_and_leaves_indicator_untouched() {
    let failure = json!({
        "status": "warning",
        "message": "timeout",
        "connected": false
    });
    let (mut ctl, notifier, _) = controller(sample_devices(), failure, true).await;
    ctl.test_connection(DeviceId(5)).await;

    let messages = notifier.messages();
    assert_eq!(messages[1], ("timeout".to_string(), AlertLevel::Warning));
    assert!(ctl.view().indicators.is_empty());
}

#[tokio::test]
async fn timed_out_probe_reports_error_level() {
    let failure = json!({
        "status": "error",
        "message": "Connection test timed out",
        "connected": false
    });
    let (mut ctl, notifier, _) = controller(sample_devices(), failure, true).await;
    ctl.test_connection(DeviceId(5)).await;

    let messages = notifier.messages();
    assert_eq!(
        messages[1],
        ("Connection test timed out".to_string(), AlertLevel::Error)
    );
    assert!(ctl.view().indicators.is_empty());
}

#[tokio::test]
async fn dispatch_routes_typed_actions() {
    let (mut ctl, _, log) = controller(sample_devices(), connected_response(), true).await;

    ctl.dispatch(DeviceAction::MenuToggle, DeviceId(3)).await;
    assert_eq!(ctl.view().menu_toggles, vec![DeviceId(3)]);
    assert!(log.lock().unwrap().is_empty());

    ctl.dispatch(DeviceAction::Toggle, DeviceId(3)).await;
    assert_eq!(
        log.lock().unwrap().first().cloned(),
        Some(("POST".to_string(), "/toggle/3".to_string()))
    );
}

#[tokio::test]
async fn api_failure_keeps_editor_open_with_server_message() {
    // Backend that rejects the add with a duplicate-name error.
    let app = Router::new().route(
        "/ups-management/api/add",
        post(|| async {
            Json(json!({
                "status": "error",
                "message": "UPS device with name \"ups1\" already exists"
            }))
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    let client = ApiClient::new(format!("http://{addr}"), Duration::from_secs(5)).unwrap();

    let notifier = Arc::new(TestNotifier::default());
    let mut ctl = RegistryController::new(
        client,
        TestView::default(),
        notifier.clone(),
        Arc::new(FixedConfirmer(true)),
    );

    ctl.open_add();
    let mut draft = ctl.draft().unwrap().clone();
    draft.name = "ups1".to_string();
    draft.driver = "usbhid-ups".to_string();
    draft.port = "auto".to_string();
    ctl.set_draft(draft);
    ctl.save().await;

    assert!(ctl.view().editor_open);
    let messages = notifier.messages();
    assert_eq!(
        messages[0],
        (
            "UPS device with name \"ups1\" already exists".to_string(),
            AlertLevel::Error
        )
    );
}
