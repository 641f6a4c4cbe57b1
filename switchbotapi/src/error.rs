#[derive(thiserror::Error, Debug)]
pub enum SwitchBotError {
    #[error("missing credential: `{0}`")]
    MissingCredential(&'static str),

    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("cannot parse json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed response envelope: `{0}`")]
    MalformedEnvelope(String),

    #[error("unexpected reply from switchbot api: {0}")]
    UnexpectedReply(serde_json::Value),
}

pub type Result<T> = std::result::Result<T, SwitchBotError>;
