use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An entry of the `deviceList` returned by `GET /v1.1/devices`. Fields the
/// tool does not know about are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    pub device_id: String,
    #[serde(default)]
    pub device_name: String,
    #[serde(default)]
    pub device_type: Option<String>,
    #[serde(default)]
    pub hub_device_id: Option<String>,
    #[serde(default)]
    pub enable_cloud_service: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DeviceInfo {
    pub fn id(&self) -> &str {
        &self.device_id
    }

    pub fn name(&self) -> &str {
        &self.device_name
    }

    pub fn device_type(&self) -> &str {
        self.device_type.as_deref().unwrap_or_default()
    }

    /// The hub id, empty if the device is its own hub ("000000000000").
    pub fn hub(&self) -> &str {
        match self.hub_device_id.as_deref() {
            None | Some("000000000000") => "",
            Some(hub) => hub,
        }
    }

    pub fn cloud_enabled(&self) -> bool {
        self.enable_cloud_service.unwrap_or(false)
    }
}

impl std::fmt::Display for DeviceInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "deviceId={:?} deviceName={:?} deviceType={:?}",
            self.device_id,
            self.device_name,
            self.device_type()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_device_info() {
        let device: DeviceInfo = serde_json::from_value(json!({
            "deviceId": "ABC123",
            "deviceName": "Kettle",
            "deviceType": "Bot",
            "enableCloudService": true,
            "hubDeviceId": "000000000000",
            "deviceMode": "pressMode"
        }))
        .unwrap();

        assert_eq!(device.id(), "ABC123");
        assert_eq!(device.name(), "Kettle");
        assert_eq!(device.device_type(), "Bot");
        assert_eq!(device.hub(), "");
        assert!(device.cloud_enabled());
        assert_eq!(device.extra["deviceMode"], "pressMode");
    }

    #[test]
    fn minimal_device_info() {
        let device: DeviceInfo = serde_json::from_value(json!({"deviceId": "x"})).unwrap();
        assert_eq!(device.id(), "x");
        assert_eq!(device.name(), "");
        assert_eq!(device.device_type(), "");
        assert!(!device.cloud_enabled());
        assert_eq!(
            device.to_string(),
            r#"deviceId="x" deviceName="" deviceType="""#
        );
    }
}
