use switchbotapi::{DeviceCommand, Request};

use crate::secrets::Secrets;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum UsageError {
    #[error("invalid args, expected `list` or `<command> <device>`")]
    InvalidArgs,
    #[error("invalid command specified, {0:?}")]
    InvalidCommand(String),
    #[error("--table is only supported by `list`")]
    TableRequiresList,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    List,
    Status,
    Command(DeviceCommand),
}

/// A validated command line: what to do and on which device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub action: Action,
    pub device: Option<String>,
}

impl Invocation {
    /// `list` may be given alone, everything else needs exactly a command and
    /// a device.
    pub fn from_args(args: &[String]) -> Result<Self, UsageError> {
        let (command, device) = match args {
            [command] if command == "list" => (command, None),
            [command, device] => (command, Some(device.clone())),
            _ => return Err(UsageError::InvalidArgs),
        };

        let action = match command.as_str() {
            "list" => Action::List,
            "status" => Action::Status,
            other => other
                .parse()
                .map(Action::Command)
                .map_err(|_| UsageError::InvalidCommand(other.to_string()))?,
        };

        Ok(Invocation { action, device })
    }

    /// Builds the request, replacing the device with its alias target from
    /// `secrets` if there is one.
    pub fn request(&self, secrets: &Secrets) -> Request {
        let device_id = || {
            let device = self.device.as_deref().unwrap_or_default();
            secrets.resolve_device(device)
        };
        match self.action {
            Action::List => Request::ListDevices,
            Action::Status => Request::DeviceStatus {
                device_id: device_id(),
            },
            Action::Command(command) => Request::Command {
                device_id: device_id(),
                command,
            },
        }
    }
}
