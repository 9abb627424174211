//! Typed calls against the fixed backend contract

use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};
use upsdeck_core::{DeviceId, UpsDevice};

use crate::error::ApiError;

/// Payload status value the backend uses for successful calls
const STATUS_SUCCESS: &str = "success";

/// Outcome of a mutating call (add/update/toggle/delete)
#[derive(Debug, Clone, PartialEq)]
pub struct Mutation {
    /// Server-supplied human-readable message
    pub message: String,
    /// Id of the created record (add only)
    pub device_id: Option<DeviceId>,
    /// New enabled state (toggle only)
    pub is_enabled: Option<bool>,
}

/// Outcome of a connection probe
///
/// A failed probe is still an `Ok` result at the API level; `connected`
/// carries the verdict and `status` distinguishes a driver refusal
/// (`warning`) from a probe timeout (`error`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConnectionTest {
    #[serde(default)]
    pub connected: bool,
    #[serde(default)]
    pub status: String,
    /// Raw `ups.status` line reported by the driver (e.g. "OL")
    #[serde(default)]
    pub ups_status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// List envelope: `{status, count, devices}`
#[derive(Debug, Deserialize)]
struct DeviceListEnvelope {
    status: String,
    #[serde(default)]
    count: usize,
    #[serde(default)]
    devices: Vec<UpsDevice>,
    #[serde(default)]
    message: Option<String>,
}

/// Mutation envelope: `{status, message, device_id?, is_enabled?}`
#[derive(Debug, Deserialize)]
struct MutationEnvelope {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    device_id: Option<u64>,
    #[serde(default)]
    is_enabled: Option<bool>,
}

impl MutationEnvelope {
    fn into_mutation(self) -> Result<Mutation, ApiError> {
        let message = self.message.unwrap_or_default();
        if self.status != STATUS_SUCCESS {
            return Err(ApiError::Api { message });
        }
        Ok(Mutation {
            message,
            device_id: self.device_id.map(DeviceId),
            is_enabled: self.is_enabled,
        })
    }
}

/// REST client bound to one backend base URL
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for the given base URL (e.g. "http://localhost:5050")
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/ups-management/api/{}", self.base_url, path)
    }

    /// Fetch the full device collection
    pub async fn list_devices(&self) -> Result<Vec<UpsDevice>, ApiError> {
        let url = self.url("devices");
        debug!(url = %url, "Fetching device list");
        let body = self.http.get(&url).send().await?.text().await?;
        let envelope: DeviceListEnvelope = serde_json::from_str(&body)?;
        if envelope.status != STATUS_SUCCESS {
            return Err(ApiError::Api {
                message: envelope.message.unwrap_or_default(),
            });
        }
        if envelope.count != envelope.devices.len() {
            warn!(
                count = envelope.count,
                actual = envelope.devices.len(),
                "Device list count disagrees with payload length"
            );
        }
        Ok(envelope.devices)
    }

    /// Create a new device
    pub async fn add_device(&self, device: &UpsDevice) -> Result<Mutation, ApiError> {
        let url = self.url("add");
        debug!(url = %url, name = %device.name, "Adding device");
        let body = self
            .http
            .post(&url)
            .json(device)
            .send()
            .await?
            .text()
            .await?;
        serde_json::from_str::<MutationEnvelope>(&body)?.into_mutation()
    }

    /// Update an existing device
    pub async fn update_device(
        &self,
        id: DeviceId,
        device: &UpsDevice,
    ) -> Result<Mutation, ApiError> {
        let url = self.url(&format!("update/{id}"));
        debug!(url = %url, "Updating device");
        let body = self
            .http
            .put(&url)
            .json(device)
            .send()
            .await?
            .text()
            .await?;
        serde_json::from_str::<MutationEnvelope>(&body)?.into_mutation()
    }

    /// Flip a device's enabled state
    pub async fn toggle_device(&self, id: DeviceId) -> Result<Mutation, ApiError> {
        let url = self.url(&format!("toggle/{id}"));
        debug!(url = %url, "Toggling device");
        let body = self.http.post(&url).send().await?.text().await?;
        serde_json::from_str::<MutationEnvelope>(&body)?.into_mutation()
    }

    /// Remove a device
    pub async fn delete_device(&self, id: DeviceId) -> Result<Mutation, ApiError> {
        let url = self.url(&format!("delete/{id}"));
        debug!(url = %url, "Deleting device");
        let body = self.http.delete(&url).send().await?.text().await?;
        serde_json::from_str::<MutationEnvelope>(&body)?.into_mutation()
    }

    /// Probe a device's driver connection
    ///
    /// A negative verdict (`connected: false`) is a normal result, not an
    /// error; only transport and decode failures map to `Err`.
    pub async fn test_connection(&self, id: DeviceId) -> Result<ConnectionTest, ApiError> {
        let url = self.url(&format!("test-connection/{id}"));
        debug!(url = %url, "Testing device connection");
        let body = self.http.post(&url).send().await?.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}
