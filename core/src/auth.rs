//! Credentials and the auth key returned by the key exchange.

use std::fmt;

use serde::Deserialize;

use crate::payload::ApiResult;

/// Header carrying the auth key on every call after the key exchange.
pub const AUTH_HEADER: &str = "auth_key";

/// Account credentials, sent once as `email`/`password` headers.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Opaque key returned by `GET /api/key`. Never mutated after creation and
/// has no expiry handling.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthToken {
    pub key: String,
}

impl AuthToken {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    /// Extract the key from a successful key-exchange result.
    pub fn from_result(result: &ApiResult) -> Option<Self> {
        if !result.is_success() {
            return None;
        }
        result.get("key")?.as_str().map(Self::new)
    }
}

/// The header pair injected into every authenticated request.
pub fn auth_header(token: &AuthToken) -> (String, String) {
    (AUTH_HEADER.to_string(), token.key.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::Payload;
    use serde_json::json;

    #[test]
    fn auth_header_uses_auth_key_name() {
        let token = AuthToken::new("ea738148a1f19838e1c5d1413877f3691a3731380e733e877b0ae729");
        assert_eq!(
            auth_header(&token),
            (
                "auth_key".to_string(),
                "ea738148a1f19838e1c5d1413877f3691a3731380e733e877b0ae729".to_string()
            )
        );
    }

    #[test]
    fn token_from_successful_result() {
        let result = ApiResult {
            status: 200,
            payload: Payload::Structured(json!({"key": "abc"})),
        };
        assert_eq!(AuthToken::from_result(&result), Some(AuthToken::new("abc")));
    }

    #[test]
    fn no_token_from_forbidden_result() {
        let result = ApiResult {
            status: 403,
            payload: Payload::Structured(json!({"key": "abc"})),
        };
        assert_eq!(AuthToken::from_result(&result), None);

        let result = ApiResult {
            status: 403,
            payload: Payload::Text("This user wasn't found in database".to_string()),
        };
        assert_eq!(AuthToken::from_result(&result), None);
    }

    #[test]
    fn non_string_key_is_ignored() {
        let result = ApiResult {
            status: 200,
            payload: Payload::Structured(json!({"key": 12})),
        };
        assert_eq!(AuthToken::from_result(&result), None);
    }

    #[test]
    fn token_deserializes_from_key_object() {
        let token: AuthToken = serde_json::from_str(r#"{"key":"xyz"}"#).unwrap();
        assert_eq!(token.key, "xyz");
    }

    #[test]
    fn debug_hides_password() {
        let creds = Credentials::new("user@example.com", "hunter2");
        let shown = format!("{creds:?}");
        assert!(shown.contains("user@example.com"));
        assert!(!shown.contains("hunter2"));
    }
}
