//! Request builders and operations for the pet service API.
//!
//! # Design
//! `PetClient` holds the base URL and an `HttpExecutor`; it carries no state
//! between calls. Every operation is split into a `build_*` method that
//! produces an `HttpRequest` and an executing method that sends it and
//! normalizes the response:
//!
//! ```text
//! build_* -> HttpExecutor::execute -> normalize -> ApiResult
//! ```
//!
//! No operation retries, caches, or validates its arguments; the only
//! check is that a pet id stays inside its own path segment.

use std::path::Path;
use std::time::Duration;

use crate::auth::{auth_header, AuthToken, Credentials};
use crate::error::TransportError;
use crate::http::{FilePart, HttpMethod, HttpRequest, RequestBody};
use crate::payload::{normalize, ApiResult};
use crate::transport::HttpExecutor;
use crate::types::{PetFields, PetFilter};

/// Form field photos are uploaded under.
pub const PHOTO_FIELD: &str = "pet_photo";

/// Media type declared for every uploaded photo.
pub const PHOTO_MEDIA_TYPE: &str = "image/jpeg";

/// Blocking client for the pet service. Construct once per session and pass
/// by reference.
#[derive(Debug, Clone)]
pub struct PetClient {
    base_url: String,
    executor: HttpExecutor,
}

impl PetClient {
    /// Create a client for `base_url`. `timeout` bounds each call; `None`
    /// waits indefinitely.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, TransportError> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            executor: HttpExecutor::new(timeout)?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(
        &self,
        method: HttpMethod,
        path: &str,
        headers: Vec<(String, String)>,
        body: RequestBody,
    ) -> HttpRequest {
        HttpRequest {
            method,
            path: format!("{}{path}", self.base_url),
            headers,
            query: Vec::new(),
            body,
        }
    }

    fn send(&self, request: HttpRequest) -> Result<ApiResult, TransportError> {
        let response = self.executor.execute(&request)?;
        Ok(normalize(response))
    }

    // -----------------------------------------------------------------------
    // Builders
    // -----------------------------------------------------------------------

    pub fn build_get_api_key(&self, credentials: &Credentials) -> HttpRequest {
        let headers = vec![
            ("email".to_string(), credentials.email.clone()),
            ("password".to_string(), credentials.password.clone()),
        ];
        self.request(HttpMethod::Get, "/api/key", headers, RequestBody::Empty)
    }

    pub fn build_list_pets(&self, token: &AuthToken, filter: &PetFilter) -> HttpRequest {
        let mut req = self.request(
            HttpMethod::Get,
            "/api/pets",
            vec![auth_header(token)],
            RequestBody::Empty,
        );
        req.query = vec![("filter".to_string(), filter.as_str().to_string())];
        req
    }

    pub fn build_create_pet(
        &self,
        token: &AuthToken,
        pet: &PetFields,
        photo: impl AsRef<Path>,
    ) -> HttpRequest {
        self.request(
            HttpMethod::Post,
            "/api/pets",
            vec![auth_header(token)],
            RequestBody::new(pet.to_form(), vec![photo_part(photo.as_ref())]),
        )
    }

    pub fn build_create_pet_simple(&self, token: &AuthToken, pet: &PetFields) -> HttpRequest {
        self.request(
            HttpMethod::Post,
            "/api/create_pet_simple",
            vec![auth_header(token)],
            RequestBody::new(pet.to_form(), Vec::new()),
        )
    }

    pub fn build_update_pet(
        &self,
        token: &AuthToken,
        pet_id: &str,
        pet: &PetFields,
    ) -> Result<HttpRequest, TransportError> {
        Ok(self.request(
            HttpMethod::Put,
            &pet_path("/api/pets", pet_id)?,
            vec![auth_header(token)],
            RequestBody::new(pet.to_form(), Vec::new()),
        ))
    }

    pub fn build_delete_pet(
        &self,
        token: &AuthToken,
        pet_id: &str,
    ) -> Result<HttpRequest, TransportError> {
        Ok(self.request(
            HttpMethod::Delete,
            &pet_path("/api/pets", pet_id)?,
            vec![auth_header(token)],
            RequestBody::Empty,
        ))
    }

    pub fn build_set_photo(
        &self,
        token: &AuthToken,
        pet_id: &str,
        photo: impl AsRef<Path>,
    ) -> Result<HttpRequest, TransportError> {
        Ok(self.request(
            HttpMethod::Post,
            &pet_path("/api/pets/set_photo", pet_id)?,
            vec![auth_header(token)],
            RequestBody::new(Vec::new(), vec![photo_part(photo.as_ref())]),
        ))
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// Exchange credentials for an auth key. The key, when present, is in
    /// the `key` field of a 2xx payload; see `AuthToken::from_result`.
    pub fn get_api_key(&self, credentials: &Credentials) -> Result<ApiResult, TransportError> {
        self.send(self.build_get_api_key(credentials))
    }

    pub fn list_pets(
        &self,
        token: &AuthToken,
        filter: &PetFilter,
    ) -> Result<ApiResult, TransportError> {
        self.send(self.build_list_pets(token, filter))
    }

    /// Create a pet with a photo read from `photo`.
    pub fn create_pet(
        &self,
        token: &AuthToken,
        pet: &PetFields,
        photo: impl AsRef<Path>,
    ) -> Result<ApiResult, TransportError> {
        self.send(self.build_create_pet(token, pet, photo))
    }

    pub fn create_pet_simple(
        &self,
        token: &AuthToken,
        pet: &PetFields,
    ) -> Result<ApiResult, TransportError> {
        self.send(self.build_create_pet_simple(token, pet))
    }

    pub fn update_pet(
        &self,
        token: &AuthToken,
        pet_id: &str,
        pet: &PetFields,
    ) -> Result<ApiResult, TransportError> {
        self.send(self.build_update_pet(token, pet_id, pet)?)
    }

    pub fn delete_pet(&self, token: &AuthToken, pet_id: &str) -> Result<ApiResult, TransportError> {
        self.send(self.build_delete_pet(token, pet_id)?)
    }

    /// Add or replace the photo of an existing pet.
    pub fn set_photo(
        &self,
        token: &AuthToken,
        pet_id: &str,
        photo: impl AsRef<Path>,
    ) -> Result<ApiResult, TransportError> {
        self.send(self.build_set_photo(token, pet_id, photo)?)
    }
}

/// Join a pet id onto `prefix` as one escaped path segment.
///
/// URL parsing collapses `.` and `..` segments, escaped as `%2e` or not, and
/// an empty id leaves a trailing slash. Any of those would address a
/// different route, so they are refused before anything is sent.
fn pet_path(prefix: &str, pet_id: &str) -> Result<String, TransportError> {
    if matches!(pet_id, "" | "." | "..") {
        return Err(TransportError::InvalidRequest(format!(
            "pet id {pet_id:?} cannot be used as a path segment"
        )));
    }
    Ok(format!("{prefix}/{}", urlencoding::encode(pet_id)))
}

fn photo_part(path: &Path) -> FilePart {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    FilePart {
        field_name: PHOTO_FIELD.to_string(),
        file_name,
        path: path.to_path_buf(),
        media_type: PHOTO_MEDIA_TYPE.to_string(),
    }
}
