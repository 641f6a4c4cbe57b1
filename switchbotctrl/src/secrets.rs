use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::de::{DeserializeSeed, Deserializer, IgnoredAny, MapAccess, Visitor};
use serde_yaml::Value;
use switchbotapi::Credentials;

pub const SECRETS_FILE: &str = "secrets.yaml";
/// Where Home Assistant keeps its secrets.
pub const HOME_ASSISTANT_SECRETS: &str = "/config/secrets.yaml";

pub const TOKEN_KEY: &str = "switchbot_api_token";
pub const SECRET_KEY: &str = "switchbot_secret_key";

#[derive(thiserror::Error, Debug)]
pub enum SecretsError {
    #[error("missing secrets.yaml, searched {0:?}")]
    NotFound(Vec<PathBuf>),
    #[error("unable to open secrets file: {0}")]
    Io(#[from] std::io::Error),
    #[error("unable to parse secrets file: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("`{0}` is missing in the secrets file")]
    MissingKey(&'static str),
    #[error(transparent)]
    Credentials(#[from] switchbotapi::SwitchBotError),
}

pub type Result<T> = std::result::Result<T, SecretsError>;

/// The key/value pairs of a Home Assistant style `secrets.yaml`. Besides the
/// api token and secret it may hold device aliases, e.g.
/// `switchbot_kettle_id: ABC123`.
///
/// Strings and numbers are kept as their source text, so an unquoted device id
/// like `123456789E01` is not read as a float.
#[derive(Debug, Default)]
pub struct Secrets {
    values: BTreeMap<String, String>,
    /// Keys holding something other than a string or a number.
    other: BTreeSet<String>,
}

impl Secrets {
    /// Finds and reads the secrets file, see [`locate`].
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = locate(explicit)?;
        info!("reading secrets from {path:?}");
        Self::from_yaml_file(path)
    }

    pub fn from_yaml_file(p: impl AsRef<Path>) -> Result<Self> {
        let f = std::fs::File::open(p)?;
        Self::from_yaml(f)
    }

    pub fn from_yaml(mut yaml_reader: impl Read) -> Result<Self> {
        let mut content = String::new();
        yaml_reader.read_to_string(&mut content)?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        // first pass finds the keys that are not plain text
        let parsed: BTreeMap<String, Value> = serde_yaml::from_str(&content)?;
        let other: BTreeSet<String> = parsed
            .into_iter()
            .filter(|(_, value)| !matches!(value, Value::String(_) | Value::Number(_)))
            .map(|(key, _)| key)
            .collect();

        let values = SourceText { skip: &other }
            .deserialize(serde_yaml::Deserializer::from_str(&content))?;
        Ok(Secrets { values, other })
    }

    pub fn from_string(s: impl ToString) -> Result<Self> {
        Secrets::from_yaml(s.to_string().as_bytes())
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    pub fn credentials(&self) -> Result<Credentials> {
        let token = self.get(TOKEN_KEY).ok_or(SecretsError::MissingKey(TOKEN_KEY))?;
        let secret = self.get(SECRET_KEY).ok_or(SecretsError::MissingKey(SECRET_KEY))?;
        Ok(Credentials::new(token, secret)?)
    }

    /// Returns the value stored under `device` if there is one, `device`
    /// otherwise.
    pub fn resolve_device(&self, device: &str) -> String {
        if let Some(id) = self.values.get(device) {
            debug!("resolved device alias {device:?} to {id:?}");
            return id.clone();
        }
        if self.other.contains(device) {
            warn!("secret {device:?} is not a string, using it as device id");
        }
        device.to_string()
    }
}

/// Reads the secrets mapping with every value taken as its source text.
/// Values under `skip` are ignored.
struct SourceText<'a> {
    skip: &'a BTreeSet<String>,
}

impl<'de> DeserializeSeed<'de> for SourceText<'_> {
    type Value = BTreeMap<String, String>;

    fn deserialize<D>(self, deserializer: D) -> std::result::Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(self)
    }
}

impl<'de> Visitor<'de> for SourceText<'_> {
    type Value = BTreeMap<String, String>;

    fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str("a mapping of secrets")
    }

    fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut values = BTreeMap::new();
        while let Some(key) = map.next_key::<String>()? {
            if self.skip.contains(&key) {
                map.next_value::<IgnoredAny>()?;
            } else {
                // serde_yaml hands out plain scalars as written when asked for a string
                values.insert(key, map.next_value::<String>()?);
            }
        }
        Ok(values)
    }
}

// -=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-

/// The places searched for `secrets.yaml`, in order: the working directory and
/// its parent, the directory of the executable and its parent, and the Home
/// Assistant config directory.
pub fn search_paths() -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        dirs.extend(dir_and_parent(&cwd));
    }
    if let Some(exe_dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        dirs.extend(dir_and_parent(&exe_dir));
    }

    let mut paths: Vec<PathBuf> = Vec::new();
    for path in dirs.into_iter().map(|dir| dir.join(SECRETS_FILE)) {
        if !paths.contains(&path) {
            paths.push(path);
        }
    }
    paths.push(PathBuf::from(HOME_ASSISTANT_SECRETS));
    paths
}

fn dir_and_parent(dir: &Path) -> Vec<PathBuf> {
    let mut dirs = vec![dir.to_path_buf()];
    if let Some(parent) = dir.parent() {
        dirs.push(parent.to_path_buf());
    }
    dirs
}

/// An explicitly given path must exist, otherwise the first existing entry of
/// [`search_paths`] wins.
pub fn locate(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) if path.is_file() => Ok(path.to_path_buf()),
        Some(path) => Err(SecretsError::NotFound(vec![path.to_path_buf()])),
        None => first_existing(search_paths()),
    }
}

fn first_existing(candidates: Vec<PathBuf>) -> Result<PathBuf> {
    match candidates.iter().find(|path| path.is_file()) {
        Some(path) => Ok(path.clone()),
        None => Err(SecretsError::NotFound(candidates)),
    }
}

// -=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-
