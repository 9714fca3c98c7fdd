//! Response normalization.
//!
//! # Design
//! The service answers with JSON on success and on most errors, but some error
//! paths return plain text or HTML. `normalize` tries a JSON parse and, only
//! when that fails, keeps the body as text. Neither branch is an error: the
//! caller decides what a status means.

use serde_json::Value;

use crate::http::HttpResponse;
use crate::types::PetRecord;

/// Interpreted body of a response.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// The body parsed as JSON.
    Structured(Value),
    /// The body was not JSON; holds the text exactly as received.
    Text(String),
}

impl Payload {
    pub fn as_structured(&self) -> Option<&Value> {
        match self {
            Payload::Structured(value) => Some(value),
            Payload::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Payload::Text(text) => Some(text),
            Payload::Structured(_) => None,
        }
    }
}

/// Uniform outcome of every client operation: the status as sent by the
/// service plus the normalized body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResult {
    pub status: u16,
    pub payload: Payload,
}

impl ApiResult {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Field of a structured object payload. `None` for text payloads,
    /// non-object JSON, or a missing field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.payload.as_structured()?.as_object()?.get(field)
    }

    pub fn contains_field(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    /// Pet records under the `pets` field of a list response.
    ///
    /// Returns `None` when the field is absent or does not have the expected
    /// shape; no other validation happens here.
    pub fn pets(&self) -> Option<Vec<PetRecord>> {
        let pets = self.get("pets")?;
        serde_json::from_value(pets.clone()).ok()
    }

    /// The payload as a JSON value, with text wrapped in a JSON string.
    pub fn into_value(self) -> Value {
        match self.payload {
            Payload::Structured(value) => value,
            Payload::Text(text) => Value::String(text),
        }
    }
}

/// Turn a raw response into an `ApiResult`. Never fails.
pub fn normalize(response: HttpResponse) -> ApiResult {
    let payload = match serde_json::from_slice::<Value>(&response.body) {
        Ok(value) => Payload::Structured(value),
        Err(err) => {
            log::trace!("body is not JSON ({err}), keeping it as text");
            Payload::Text(String::from_utf8_lossy(&response.body).into_owned())
        }
    };
    ApiResult {
        status: response.status,
        payload,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.as_bytes().to_vec(),
        }
    }

    #[test]
    fn json_body_is_structured() {
        let result = normalize(response(200, r#"{"key":"abc"}"#));
        assert_eq!(result.status, 200);
        assert_eq!(result.payload, Payload::Structured(json!({"key": "abc"})));
        assert_eq!(result.get("key"), Some(&json!("abc")));
    }

    #[test]
    fn html_error_falls_back_to_text() {
        let body = "<!doctype html><title>403 Forbidden</title>";
        let result = normalize(response(403, body));
        assert_eq!(result.status, 403);
        assert_eq!(result.payload.as_text(), Some(body));
        assert!(!result.contains_field("key"));
    }

    #[test]
    fn empty_body_is_empty_text() {
        let result = normalize(response(200, ""));
        assert_eq!(result.payload, Payload::Text(String::new()));
    }

    #[test]
    fn truncated_json_is_text() {
        let result = normalize(response(500, r#"{"key":"#));
        assert_eq!(result.payload.as_text(), Some(r#"{"key":"#));
    }

    #[test]
    fn invalid_utf8_is_decoded_lossily() {
        let result = normalize(HttpResponse {
            status: 502,
            headers: Vec::new(),
            body: vec![b'o', b'k', 0xff],
        });
        assert_eq!(result.payload.as_text(), Some("ok\u{fffd}"));
    }

    #[test]
    fn status_is_not_interpreted() {
        let result = normalize(response(404, r#"{"pets":[]}"#));
        assert!(!result.is_success());
        assert_eq!(result.pets(), Some(Vec::new()));
    }

    #[test]
    fn scalar_json_has_no_fields() {
        let result = normalize(response(200, "42"));
        assert_eq!(result.payload, Payload::Structured(json!(42)));
        assert!(result.get("age").is_none());
    }

    #[test]
    fn pets_extracts_records_with_string_or_numeric_age() {
        let result = normalize(response(
            200,
            r#"{"pets":[
                {"id":"a1","name":"Rex","animal_type":"dog","age":"3","pet_photo":""},
                {"id":"b2","name":"Tom","animal_type":"cat","age":5,"pet_photo":"data:image/jpeg;base64,AA=="}
            ]}"#,
        ));
        let pets = result.pets().unwrap();
        assert_eq!(pets.len(), 2);
        assert_eq!(pets[0].age, "3");
        assert_eq!(pets[1].age, "5");
        assert_eq!(pets[1].pet_photo, "data:image/jpeg;base64,AA==");
    }

    #[test]
    fn into_value_wraps_text() {
        let result = normalize(response(400, "Pet not found"));
        assert_eq!(result.into_value(), json!("Pet not found"));
    }
}
