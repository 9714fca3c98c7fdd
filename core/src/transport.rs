//! Blocking executor for `HttpRequest` values.
//!
//! # Design
//! `HttpExecutor` performs exactly one round trip per call and returns
//! whatever status and body came back. Status codes are never turned into
//! errors; only failures to complete the exchange are.

use std::time::Duration;

use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::Client;
use reqwest::Method;

use crate::error::TransportError;
use crate::http::{FilePart, HttpMethod, HttpRequest, HttpResponse, RequestBody};

static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Executes requests over a single blocking HTTP agent.
///
/// Holds no per-request state, so one executor can be shared by reference
/// across threads.
#[derive(Debug, Clone)]
pub struct HttpExecutor {
    agent: Client,
    timeout: Option<Duration>,
}

impl HttpExecutor {
    /// Build an executor. `None` disables the timeout entirely.
    pub fn new(timeout: Option<Duration>) -> Result<Self, TransportError> {
        let agent = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self { agent, timeout })
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Send `request` and return the raw response, whatever its status.
    pub fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        log::debug!(
            "{} {} query={:?} body={}",
            request.method,
            request.path,
            request.query,
            request.body.kind()
        );

        let mut builder = self.agent.request(method(request.method), &request.path);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Form(fields) => builder.form(fields),
            RequestBody::Multipart { fields, files } => {
                let mut form = Form::new();
                for (name, value) in fields {
                    form = form.text(name.clone(), value.clone());
                }
                for file in files {
                    form = form.part(file.field_name.clone(), file_part(file)?);
                }
                builder.multipart(form)
            }
        };

        let response = builder.send()?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response.bytes()?.to_vec();
        log::debug!("{} {} -> {status} ({} bytes)", request.method, request.path, body.len());

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
    }
}

/// Read a file part into memory. `fs::read` closes the handle before
/// returning on every path, so no descriptor outlives this call.
fn file_part(file: &FilePart) -> Result<Part, TransportError> {
    let bytes = std::fs::read(&file.path).map_err(|source| TransportError::FileUnreadable {
        path: file.path.clone(),
        source,
    })?;
    Part::bytes(bytes)
        .file_name(file.file_name.clone())
        .mime_str(&file.media_type)
        .map_err(|e| TransportError::InvalidRequest(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn missing_file_is_unreadable() {
        let part = FilePart {
            field_name: "pet_photo".to_string(),
            file_name: "missing.jpg".to_string(),
            path: PathBuf::from("/definitely/not/here/missing.jpg"),
            media_type: "image/jpeg".to_string(),
        };
        let err = file_part(&part).unwrap_err();
        assert!(
            matches!(err, TransportError::FileUnreadable { ref path, .. } if path == &part.path)
        );
    }

    #[test]
    fn timeout_is_kept() {
        let executor = HttpExecutor::new(Some(Duration::from_millis(250))).unwrap();
        assert_eq!(executor.timeout(), Some(Duration::from_millis(250)));
        assert_eq!(HttpExecutor::new(None).unwrap().timeout(), None);
    }

    #[test]
    fn methods_map_one_to_one() {
        assert_eq!(method(HttpMethod::Get), Method::GET);
        assert_eq!(method(HttpMethod::Post), Method::POST);
        assert_eq!(method(HttpMethod::Put), Method::PUT);
        assert_eq!(method(HttpMethod::Delete), Method::DELETE);
    }
}
