use serde_json::Value;

use crate::api::{DeviceCommand, HttpTransport, Request, SignedRequest, Transport};
use crate::auth::{AuthHeaders, Credentials};
use crate::devices::DeviceInfo;
use crate::envelope::{self, Reply};
use crate::error::{Result, SwitchBotError};

/// The main interface to the SwitchBot cloud API. Every call sends exactly one
/// request, there are no retries.
pub struct SwitchBotClient<T = HttpTransport> {
    credentials: Credentials,
    transport: T,
}

impl SwitchBotClient<HttpTransport> {
    pub fn new(credentials: Credentials) -> Self {
        Self::with_transport(credentials, HttpTransport::new())
    }
}

impl<T: Transport> SwitchBotClient<T> {
    pub fn with_transport(credentials: Credentials, transport: T) -> Self {
        SwitchBotClient {
            credentials,
            transport,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns the raw `deviceList` entries.
    pub fn list_devices(&self) -> Result<Vec<Value>> {
        let reply = self.request(&Request::ListDevices)?;
        if let Reply::Body(Value::Object(body)) = &reply {
            if let Some(Value::Array(devices)) = body.get("deviceList") {
                return Ok(devices.clone());
            }
        }
        Err(SwitchBotError::UnexpectedReply(reply.into_value()))
    }

    /// Like [`SwitchBotClient::list_devices`] but parsed into [`DeviceInfo`]s.
    pub fn devices(&self) -> Result<Vec<DeviceInfo>> {
        self.list_devices()?
            .into_iter()
            .map(|device| serde_json::from_value(device).map_err(SwitchBotError::from))
            .collect()
    }

    pub fn device_status(&self, device_id: impl ToString) -> Result<Reply> {
        let device_id = device_id.to_string();
        self.request(&Request::DeviceStatus { device_id })
    }

    pub fn send_command(&self, device_id: impl ToString, command: DeviceCommand) -> Result<Reply> {
        let device_id = device_id.to_string();
        self.request(&Request::Command { device_id, command })
    }

    /// Runs `request` and returns what should be shown to the user: the device
    /// array for [`Request::ListDevices`], the reply value otherwise.
    pub fn execute(&self, request: &Request) -> Result<Value> {
        match request {
            Request::ListDevices => Ok(Value::Array(self.list_devices()?)),
            request => Ok(self.request(request)?.into_value()),
        }
    }

    // -=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-

    fn request(&self, request: &Request) -> Result<Reply> {
        let signed = SignedRequest {
            method: request.method(),
            path: request.path(),
            headers: AuthHeaders::new(&self.credentials),
            body: serde_json::to_vec(&request.body())?,
        };
        debug!(
            "{} {} t={} nonce={}",
            signed.method, signed.path, signed.headers.t, signed.headers.nonce
        );
        let text = self.transport.send(&signed)?;
        envelope::parse(&text)
    }
}

// -=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-
