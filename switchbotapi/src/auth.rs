use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::{Result, SwitchBotError};

type HmacSha256 = Hmac<Sha256>;

pub(crate) const CONTENT_TYPE: &str = "application/json; charset=utf8";

/// Token and secret from the SwitchBot app (Profile > Preferences > Developer
/// Options).
#[derive(Clone)]
pub struct Credentials {
    token: String,
    secret: String,
}

impl Credentials {
    pub fn new(token: impl ToString, secret: impl ToString) -> Result<Self> {
        let token = token.to_string();
        let secret = secret.to_string();
        if token.is_empty() {
            return Err(SwitchBotError::MissingCredential("switchbot_api_token"));
        }
        if secret.is_empty() {
            return Err(SwitchBotError::MissingCredential("switchbot_secret_key"));
        }
        Ok(Credentials { token, secret })
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"***")
            .field("secret", &"***")
            .finish()
    }
}

/// Computes the `sign` header value.
/// 1. Concat token, the decimal timestamp and the nonce, no separators
/// 2. HMAC-SHA256 the UTF-8 bytes of that string, keyed with the secret
/// 3. base64 (standard alphabet, padded) the raw digest
pub fn sign(credentials: &Credentials, timestamp_ms: i64, nonce: &str) -> String {
    let string_to_sign = format!("{}{}{}", credentials.token, timestamp_ms, nonce);
    // hmac accepts keys of any length
    let mut mac = HmacSha256::new_from_slice(credentials.secret.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(string_to_sign.as_bytes());
    STANDARD.encode(mac.finalize().into_bytes())
}

/// The authentication headers of a single request. Build a new one for every
/// request, nonce and timestamp must not be reused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthHeaders {
    pub token: String,
    pub t: i64,
    pub sign: String,
    pub nonce: String,
}

impl AuthHeaders {
    pub fn new(credentials: &Credentials) -> Self {
        let t = chrono::Utc::now().timestamp_millis();
        let nonce = uuid::Uuid::new_v4().to_string();
        Self::with(credentials, t, nonce)
    }

    pub fn with(credentials: &Credentials, t: i64, nonce: impl ToString) -> Self {
        let nonce = nonce.to_string();
        AuthHeaders {
            token: credentials.token.clone(),
            t,
            sign: sign(credentials, t, &nonce),
            nonce,
        }
    }

    /// Header name / value pairs in the order they are sent.
    pub fn pairs(&self) -> [(&'static str, String); 5] {
        [
            ("Authorization", self.token.clone()),
            ("t", self.t.to_string()),
            ("sign", self.sign.clone()),
            ("nonce", self.nonce.clone()),
            ("Content-Type", CONTENT_TYPE.to_string()),
        ]
    }
}

// -=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-

#[cfg(test)]
mod tests {
    use super::*;

    fn creds(token: &str, secret: &str) -> Credentials {
        Credentials::new(token, secret).unwrap()
    }

    #[test]
    fn sign_known_value() {
        let sig = sign(
            &creds("token", "secret"),
            1700000000000,
            "0f8fad5b-d9cb-469f-a165-70867728950e",
        );
        assert_eq!(sig, "5ZGeiy8OaOwCGoBL8Jmy82Z3BJiU7scrofGxzE5e/mg=");
    }

    #[test]
    fn sign_is_deterministic() {
        let c = creds("abc", "k");
        assert_eq!(sign(&c, 42, "n"), sign(&c, 42, "n"));
    }

    #[test]
    fn any_single_change_changes_signature() {
        // token ending in digits right in front of the timestamp
        let base = sign(&creds("abc1", "k"), 23, "n");
        assert_ne!(base, sign(&creds("abc12", "k"), 23, "n"));
        assert_ne!(base, sign(&creds("abc1", "k"), 3, "n"));
        assert_ne!(base, sign(&creds("abc1", "k"), 230, "n"));
        assert_ne!(base, sign(&creds("abc1", "k"), 23, "n2"));
        assert_ne!(base, sign(&creds("abc1", "k2"), 23, "n"));
    }

    #[test]
    fn string_to_sign_has_no_separators() {
        // token "abc1" + t 23 and token "abc" + t 123 both sign "abc123n"
        let a = sign(&creds("abc1", "k"), 23, "n");
        let b = sign(&creds("abc", "k"), 123, "n");
        assert_eq!(a, "+v4YQQIsYIAvMK07reCzBiquiG9eTjBywbtIMC4ZkRc=");
        assert_eq!(a, b);
    }

    #[test]
    fn headers_sign_the_sent_timestamp() {
        let c = creds("token", "secret");
        let headers = AuthHeaders::new(&c);
        assert_eq!(headers.sign, sign(&c, headers.t, &headers.nonce));
        assert_eq!(headers.token, "token");

        let pairs = headers.pairs();
        assert_eq!(pairs[1], ("t", headers.t.to_string()));
        assert_eq!(pairs[4], ("Content-Type", CONTENT_TYPE.to_string()));
    }

    #[test]
    fn fresh_nonce_per_request() {
        let c = creds("token", "secret");
        let a = AuthHeaders::new(&c);
        let b = AuthHeaders::new(&c);
        assert_ne!(a.nonce, b.nonce);
        assert_eq!(a.nonce.len(), 36);
    }

    #[test]
    fn empty_credentials_are_rejected() {
        assert!(matches!(
            Credentials::new("", "secret"),
            Err(SwitchBotError::MissingCredential("switchbot_api_token"))
        ));
        assert!(matches!(
            Credentials::new("token", ""),
            Err(SwitchBotError::MissingCredential("switchbot_secret_key"))
        ));
    }

    #[test]
    fn debug_hides_secrets() {
        let out = format!("{:?}", creds("token-value", "secret-value"));
        assert!(!out.contains("token-value"));
        assert!(!out.contains("secret-value"));
    }
}
