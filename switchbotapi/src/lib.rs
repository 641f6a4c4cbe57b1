//! Library for talking to the SwitchBot cloud API (v1.1)
//! <https://github.com/OpenWonderLabs/SwitchBotAPI>.
//!
//! It is used by the `switchbotctrl` utility.
//!
//! ## Example
//!
//! ### List devices
//!
//! ```ignore
//! let credentials = switchbotapi::Credentials::new(&token, &secret)?;
//! let client = switchbotapi::SwitchBotClient::new(credentials);
//!
//! let devices = client.devices()?;
//! for device in &devices {
//!     println!("{device}");
//! }
//!
//! // Press the first one
//! let reply = client.send_command(devices[0].id(), switchbotapi::DeviceCommand::Press)?;
//! ```

#[macro_use]
extern crate tracing;

pub mod api;
pub mod auth;
pub(crate) mod client;
pub mod devices;
pub mod envelope;
pub mod error;

pub use api::{DeviceCommand, HttpTransport, Method, Request, SignedRequest, Transport};
pub use auth::{sign, AuthHeaders, Credentials};
pub use client::SwitchBotClient;
pub use devices::DeviceInfo;
pub use envelope::Reply;
pub use error::{Result, SwitchBotError};
