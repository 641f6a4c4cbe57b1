#[macro_use]
extern crate tracing;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::process::exit;
use switchbotapi::{api::DEFAULT_BASE_URL, HttpTransport, Request, SwitchBotClient, Transport};
use tracing_subscriber::prelude::*;

mod invocation;
mod output;
mod secrets;

use invocation::{Action, Invocation, UsageError};
use output::Format;
use secrets::Secrets;

/// Controls SwitchBot devices through the SwitchBot cloud API.
///
/// Meant to be called from Home Assistant `command_line` sensors and
/// `shell_command`s, e.g. `switchbotctrl status switchbot_kettle_id`.
#[derive(Parser, Debug)]
#[clap(author, version)]
struct Args {
    #[clap(short, long, action)]
    verbose: bool,
    #[clap(short, long, env = "SWITCHBOT_SECRETS", help = "secrets.yaml to use instead of searching for one")]
    secrets: Option<PathBuf>,
    #[clap(long, env = "SWITCHBOT_API_URL", default_value = DEFAULT_BASE_URL)]
    api_url: String,
    #[clap(long, action, help = "print json on a single line")]
    compact: bool,
    #[clap(long, action, conflicts_with = "compact", help = "print `list` as a table")]
    table: bool,
    #[clap(
        value_name = "COMMAND [DEVICE]",
        help = "list | status <device> | press <device> | turnOn <device> | turnOff <device>"
    )]
    args: Vec<String>,
}

impl Args {
    fn format(&self, invocation: &Invocation) -> Result<Format, UsageError> {
        match (self.table, self.compact, invocation.action) {
            (true, _, Action::List) => Ok(Format::Table),
            (true, _, _) => Err(UsageError::TableRequiresList),
            (_, true, _) => Ok(Format::Compact),
            _ => Ok(Format::Pretty),
        }
    }
}

fn main() {
    dotenv::dotenv().ok();

    let args = Args::parse();

    let log_level = if args.verbose {
        "info,switchbotapi=debug,switchbotctrl=debug,reqwest=debug"
    } else {
        "warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(err) = run(args) {
        eprintln!("Error: {err:#}");
        exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    // validate before touching the secrets or the network
    let invocation = Invocation::from_args(&args.args)?;
    let format = args.format(&invocation)?;

    let secrets = Secrets::load(args.secrets.as_deref())?;
    let transport = HttpTransport::with_base_url(&args.api_url);
    let client = SwitchBotClient::with_transport(secrets.credentials()?, transport);

    println!("{}", invoke(&client, &invocation, format, &secrets)?);
    Ok(())
}

/// Sends the one request of this invocation and renders the result.
fn invoke<T: Transport>(
    client: &SwitchBotClient<T>,
    invocation: &Invocation,
    format: Format,
    secrets: &Secrets,
) -> Result<String> {
    let request = invocation.request(secrets);
    debug!("{} {}", request.method(), request.path());

    let rendered = match (&request, format) {
        (Request::ListDevices, Format::Table) => {
            let devices = client.devices()?;
            info!("found {} devices", devices.len());
            output::device_table(&devices).to_string()
        }
        (request, format) => output::render_json(&client.execute(request)?, format)?,
    };
    Ok(rendered)
}

// -=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::cell::RefCell;
    use switchbotapi::{Credentials, SignedRequest};

    struct FakeTransport {
        response: Value,
        sent: RefCell<Vec<SignedRequest>>,
    }

    impl Transport for FakeTransport {
        fn send(&self, request: &SignedRequest) -> switchbotapi::Result<String> {
            self.sent.borrow_mut().push(request.clone());
            Ok(self.response.to_string())
        }
    }

    const SECRETS: &str = "switchbot_api_token: token
switchbot_secret_key: secret
my_kettle: ABC123
";

    fn parse_args(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("switchbotctrl").chain(args.iter().copied()))
            .expect("parse args")
    }

    fn client(response: Value) -> SwitchBotClient<FakeTransport> {
        SwitchBotClient::with_transport(
            Credentials::new("token", "secret").unwrap(),
            FakeTransport {
                response,
                sent: RefCell::new(Vec::new()),
            },
        )
    }

    fn invoke_args(args: &[&str], response: Value) -> (Result<String>, Vec<SignedRequest>) {
        let args = parse_args(args);
        let secrets = Secrets::from_string(SECRETS).unwrap();
        let client = client(response);
        let result = Invocation::from_args(&args.args)
            .map_err(anyhow::Error::from)
            .and_then(|invocation| {
                let format = args.format(&invocation)?;
                invoke(&client, &invocation, format, &secrets)
            });
        let sent = client.transport().sent.borrow().clone();
        (result, sent)
    }

    #[test]
    fn list_prints_device_array() {
        let (out, sent) = invoke_args(
            &["list"],
            json!({"statusCode": 100, "body": {"deviceList": [{"deviceId": "x"}]}}),
        );
        let out: Value = serde_json::from_str(&out.unwrap()).unwrap();
        assert_eq!(out, json!([{"deviceId": "x"}]));
        assert_eq!(sent.len(), 1);
    }

    #[test]
    fn list_as_table() {
        let (out, _) = invoke_args(
            &["--table", "list"],
            json!({"statusCode": 100, "body": {"deviceList": [{"deviceId": "x", "deviceName": "Kettle"}]}}),
        );
        assert!(out.unwrap().contains("Kettle"));
    }

    #[test]
    fn table_requires_list() {
        let (out, sent) = invoke_args(&["--table", "status", "x"], json!({}));
        let err = out.unwrap_err();
        assert_eq!(
            err.downcast_ref::<UsageError>(),
            Some(&UsageError::TableRequiresList)
        );
        assert!(sent.is_empty());
    }

    #[test]
    fn status_via_alias() {
        let (out, sent) = invoke_args(
            &["status", "my_kettle"],
            json!({"statusCode": 100, "body": {"power": "on", "battery": 100}}),
        );
        let out: Value = serde_json::from_str(&out.unwrap()).unwrap();
        assert_eq!(out, json!({"power": "on", "battery": 100}));
        assert_eq!(sent[0].path, "/v1.1/devices/ABC123/status");
    }

    #[test]
    fn press_prints_message() {
        let (out, sent) = invoke_args(
            &["--compact", "press", "ABC123"],
            json!({"statusCode": 100, "body": {}, "message": "success"}),
        );
        assert_eq!(out.unwrap(), "\"success\"");
        assert_eq!(sent[0].path, "/v1.1/devices/ABC123/commands");
    }

    #[test]
    fn vendor_error_is_printed_verbatim() {
        let (out, _) = invoke_args(
            &["--compact", "turnOn", "ABC123"],
            json!({"statusCode": 152, "message": "device not found"}),
        );
        let out: Value = serde_json::from_str(&out.unwrap()).unwrap();
        assert_eq!(out, json!({"statusCode": 152, "message": "device not found"}));
    }

    #[test]
    fn usage_errors_send_nothing() {
        let cases: [&[&str]; 4] = [&[], &["status"], &["status", "a", "b"], &["dance", "x"]];
        for args in cases {
            let (out, sent) = invoke_args(args, json!({"statusCode": 100}));
            assert!(out.unwrap_err().downcast_ref::<UsageError>().is_some());
            assert!(sent.is_empty(), "{args:?} sent a request");
        }
    }

    #[test]
    fn flags() {
        let args = parse_args(&["-v", "--api-url", "http://localhost:1234", "list"]);
        assert!(args.verbose);
        assert_eq!(args.api_url, "http://localhost:1234");
        assert_eq!(args.args, vec!["list".to_string()]);
        assert!(Args::try_parse_from(["switchbotctrl", "--table", "--compact", "list"]).is_err());
    }
}
