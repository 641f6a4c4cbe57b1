use std::str::FromStr;

use reqwest::blocking::Client;
use serde_json::{json, Value};

use crate::auth::AuthHeaders;
use crate::error::Result;

pub const DEFAULT_BASE_URL: &str = "https://api.switch-bot.com";

const DEVICES_PATH: &str = "/v1.1/devices";

// -=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Device commands that are forwarded verbatim as the `command` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceCommand {
    Press,
    TurnOn,
    TurnOff,
}

impl DeviceCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceCommand::Press => "press",
            DeviceCommand::TurnOn => "turnOn",
            DeviceCommand::TurnOff => "turnOff",
        }
    }
}

impl std::fmt::Display for DeviceCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceCommand {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "press" => Ok(DeviceCommand::Press),
            "turnOn" => Ok(DeviceCommand::TurnOn),
            "turnOff" => Ok(DeviceCommand::TurnOff),
            _ => Err(format!("unknown device command {s:?}")),
        }
    }
}

/// The requests the tool knows how to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    ListDevices,
    DeviceStatus { device_id: String },
    Command { device_id: String, command: DeviceCommand },
}

impl Request {
    pub fn method(&self) -> Method {
        match self {
            Request::ListDevices | Request::DeviceStatus { .. } => Method::Get,
            Request::Command { .. } => Method::Post,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Request::ListDevices => DEVICES_PATH.to_string(),
            Request::DeviceStatus { device_id } => format!("{DEVICES_PATH}/{device_id}/status"),
            Request::Command { device_id, .. } => format!("{DEVICES_PATH}/{device_id}/commands"),
        }
    }

    /// GET requests carry an empty json object as body.
    pub fn body(&self) -> Value {
        match self {
            Request::ListDevices | Request::DeviceStatus { .. } => json!({}),
            Request::Command { command, .. } => json!({
                "command": command.as_str(),
                "commandType": "command",
            }),
        }
    }
}

// -=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-

/// A request that is ready to go over the wire.
#[derive(Debug, Clone)]
pub struct SignedRequest {
    pub method: Method,
    pub path: String,
    pub headers: AuthHeaders,
    pub body: Vec<u8>,
}

/// Sends a signed request and returns the raw response text.
pub trait Transport {
    fn send(&self, request: &SignedRequest) -> Result<String>;
}

/// Sends raw HTTPS requests to the SwitchBot cloud.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    base_url: String,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl ToString) -> Self {
        let base_url = base_url.to_string().trim_end_matches('/').to_string();
        HttpTransport { base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &SignedRequest) -> Result<String> {
        let url = format!("{}{}", self.base_url, request.path);
        // the client and its connection are dropped when this returns
        let client = Client::new();
        let mut builder = match request.method {
            Method::Get => client.get(&url),
            Method::Post => client.post(&url),
        };
        for (name, value) in request.headers.pairs() {
            builder = builder.header(name, value);
        }
        let response = builder.body(request.body.clone()).send()?;
        let status = response.status();
        info!(
            "[switchbot api] {} {} status: {:?} {:?}",
            request.method,
            request.path,
            status,
            status.canonical_reason().unwrap_or_default()
        );

        Ok(response.text()?)
    }
}

// -=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-
