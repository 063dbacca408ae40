//! Session authentication for long-lived connections.
//!
//! The web tier stores a passport session in a cookie as base64-encoded JSON.
//! [`SessionAuthenticator`] reads that cookie from a handshake `Cookie` header
//! and yields the user it belongs to. Anything it cannot read is treated as an
//! anonymous connection, never as a failure.

use agora_config::AuthConfig;
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine as _;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, warn};

// Session writers differ on padding and alphabet, so decoding accepts both.
const LENIENT_STANDARD: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);
const LENIENT_URL_SAFE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("session cookie `{0}` not present")]
    MissingCookie(String),
    #[error("malformed session credential: {0}")]
    MalformedCredential(String),
    #[error("session carries no user")]
    EmptyIdentity,
}

impl AuthError {
    fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedCredential(reason.into())
    }
}

/// Who a connection belongs to, resolved once at handshake time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    Authenticated(String),
    Anonymous,
}

impl Identity {
    pub fn user_id(&self) -> Option<&str> {
        match self {
            Identity::Authenticated(id) => Some(id),
            Identity::Anonymous => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Identity::Authenticated(_))
    }
}

#[derive(Debug, Clone)]
pub struct SessionAuthenticator {
    cookie_name: String,
}

impl SessionAuthenticator {
    pub fn new(config: &AuthConfig) -> Self {
        Self::with_cookie_name(config.session_cookie.clone())
    }

    pub fn with_cookie_name(cookie_name: impl Into<String>) -> Self {
        Self {
            cookie_name: cookie_name.into(),
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Resolve the identity carried by a raw `Cookie` header.
    pub fn authenticate(&self, cookie_header: Option<&str>) -> Identity {
        let Some(header) = cookie_header else {
            debug!("handshake without cookie header");
            return Identity::Anonymous;
        };

        match self.decode(header) {
            Ok(user_id) => Identity::Authenticated(user_id),
            Err(AuthError::MalformedCredential(reason)) => {
                warn!(cookie = %self.cookie_name, %reason, "ignoring malformed session cookie");
                Identity::Anonymous
            }
            Err(error) => {
                debug!(%error, "connection is not authenticated");
                Identity::Anonymous
            }
        }
    }

    /// The user id stored in the session cookie, or why there is none.
    pub fn decode(&self, cookie_header: &str) -> Result<String, AuthError> {
        let raw = cookie_value(cookie_header, &self.cookie_name)
            .ok_or_else(|| AuthError::MissingCookie(self.cookie_name.clone()))?;
        decode_session(&raw)
    }

    /// A `name=value` cookie pair that [`Self::authenticate`] resolves to `user_id`.
    pub fn issue_cookie(&self, user_id: &str) -> String {
        format!(
            "{}={}",
            self.cookie_name,
            urlencoding::encode(&encode_session(user_id))
        )
    }
}

/// Encode a passport session for `user_id` the way the web tier stores it.
pub fn encode_session(user_id: &str) -> String {
    let payload = json!({ "passport": { "user": user_id } });
    LENIENT_STANDARD.encode(payload.to_string())
}

/// Decode a session cookie value down to its `passport.user` id.
pub fn decode_session(value: &str) -> Result<String, AuthError> {
    let value = value.trim();
    let bytes = LENIENT_STANDARD
        .decode(value)
        .or_else(|_| LENIENT_URL_SAFE.decode(value))
        .map_err(|e| AuthError::malformed(format!("base64: {e}")))?;
    let text =
        String::from_utf8(bytes).map_err(|e| AuthError::malformed(format!("utf-8: {e}")))?;
    let session: Value =
        serde_json::from_str(&text).map_err(|e| AuthError::malformed(format!("json: {e}")))?;

    if !session.is_object() {
        return Err(AuthError::malformed("session is not an object"));
    }

    let user = session
        .get("passport")
        .and_then(|passport| passport.get("user"))
        .ok_or(AuthError::EmptyIdentity)?;

    identity_from_value(user).ok_or(AuthError::EmptyIdentity)
}

fn identity_from_value(user: &Value) -> Option<String> {
    let id = match user {
        Value::String(id) => id.trim().to_string(),
        Value::Number(id) => id.to_string(),
        Value::Object(fields) => {
            return ["id", "_id"]
                .iter()
                .find_map(|key| fields.get(*key))
                .and_then(identity_from_value);
        }
        _ => return None,
    };
    (!id.is_empty()).then_some(id)
}

/// Look up a cookie by name in a `Cookie` header. The first occurrence wins.
pub fn cookie_value(header: &str, name: &str) -> Option<String> {
    header
        .split(';')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| {
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .unwrap_or(value);
            urlencoding::decode(value)
                .map(|decoded| decoded.into_owned())
                .unwrap_or_else(|_| value.to_string())
        })
}
