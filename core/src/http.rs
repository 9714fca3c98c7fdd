//! HTTP transport types for the pet service.
//!
//! # Design
//! Requests and responses are described as plain data. `PetClient::build_*`
//! methods produce `HttpRequest` values without touching the network; the
//! `HttpExecutor` is the only piece that performs I/O. Request construction
//! is therefore deterministic and testable without a server.
//!
//! File parts carry a local path rather than an open handle, so a built
//! request holds no OS resources until it is executed.

use std::fmt;
use std::path::PathBuf;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A binary file attached to a multipart request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    /// Form field the file is submitted under.
    pub field_name: String,
    /// File name reported in the part's `Content-Disposition`.
    pub file_name: String,
    /// Local path read by the executor when the request is sent.
    pub path: PathBuf,
    /// Declared media type of the part.
    pub media_type: String,
}

/// Encoded body of an `HttpRequest`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    Empty,
    /// `application/x-www-form-urlencoded` fields.
    Form(Vec<(String, String)>),
    /// `multipart/form-data` combining text fields and file parts.
    Multipart {
        fields: Vec<(String, String)>,
        files: Vec<FilePart>,
    },
}

impl RequestBody {
    /// Pick the body encoding: any file part forces multipart, otherwise
    /// fields are urlencoded, otherwise no body is sent.
    pub fn new(fields: Vec<(String, String)>, files: Vec<FilePart>) -> Self {
        if !files.is_empty() {
            RequestBody::Multipart { fields, files }
        } else if !fields.is_empty() {
            RequestBody::Form(fields)
        } else {
            RequestBody::Empty
        }
    }

    /// Short label used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            RequestBody::Empty => "empty",
            RequestBody::Form(_) => "form",
            RequestBody::Multipart { .. } => "multipart",
        }
    }

    /// Text fields of a form or multipart body.
    pub fn fields(&self) -> &[(String, String)] {
        match self {
            RequestBody::Empty => &[],
            RequestBody::Form(fields) => fields,
            RequestBody::Multipart { fields, .. } => fields,
        }
    }

    /// File parts of a multipart body.
    pub fn files(&self) -> &[FilePart] {
        match self {
            RequestBody::Multipart { files, .. } => files,
            _ => &[],
        }
    }
}

/// An HTTP request described as plain data.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    /// Absolute URL: the client's base URL joined with the endpoint path.
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
}

impl HttpRequest {
    /// Look up a header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// An HTTP response as received, before any interpretation.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(k: &str, v: &str) -> (String, String) {
        (k.to_string(), v.to_string())
    }

    fn photo() -> FilePart {
        FilePart {
            field_name: "pet_photo".to_string(),
            file_name: "cat.jpg".to_string(),
            path: PathBuf::from("cat.jpg"),
            media_type: "image/jpeg".to_string(),
        }
    }

    #[test]
    fn files_force_multipart() {
        let body = RequestBody::new(vec![field("name", "Rex")], vec![photo()]);
        assert_eq!(body.kind(), "multipart");
        assert_eq!(body.fields(), &[field("name", "Rex")]);
        assert_eq!(body.files().len(), 1);
    }

    #[test]
    fn files_without_fields_is_still_multipart() {
        let body = RequestBody::new(Vec::new(), vec![photo()]);
        assert!(matches!(body, RequestBody::Multipart { ref fields, .. } if fields.is_empty()));
    }

    #[test]
    fn fields_only_is_urlencoded_form() {
        let body = RequestBody::new(vec![field("age", "3")], Vec::new());
        assert_eq!(body, RequestBody::Form(vec![field("age", "3")]));
        assert!(body.files().is_empty());
    }

    #[test]
    fn nothing_means_no_body() {
        assert_eq!(RequestBody::new(Vec::new(), Vec::new()), RequestBody::Empty);
    }

    #[test]
    fn header_lookup_ignores_case() {
        let req = HttpRequest {
            method: HttpMethod::Get,
            path: "http://localhost/api/pets".to_string(),
            headers: vec![field("auth_key", "abc")],
            query: Vec::new(),
            body: RequestBody::Empty,
        };
        assert_eq!(req.header("AUTH_KEY"), Some("abc"));
        assert_eq!(req.header("email"), None);
    }

    #[test]
    fn method_display_is_uppercase() {
        assert_eq!(HttpMethod::Delete.to_string(), "DELETE");
    }
}
