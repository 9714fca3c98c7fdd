use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post, put},
    Form, Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const DEFAULT_EMAIL: &str = "tester@petfriends.local";
pub const DEFAULT_PASSWORD: &str = "petfriends";

const JPEG_MAGIC: [u8; 3] = [0xff, 0xd8, 0xff];

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pet {
    pub id: String,
    pub name: String,
    pub animal_type: String,
    pub age: String,
    pub pet_photo: String,
    pub user_id: String,
}

#[derive(Clone, Debug)]
pub struct Account {
    pub email: String,
    pub password: String,
    pub key: String,
    pub user_id: String,
}

impl Account {
    pub fn new(email: &str, password: &str) -> Self {
        Self {
            email: email.to_string(),
            password: password.to_string(),
            key: Uuid::new_v4().simple().to_string(),
            user_id: Uuid::new_v4().simple().to_string(),
        }
    }
}

#[derive(Debug, Default)]
pub struct Store {
    pub accounts: Vec<Account>,
    /// Oldest first; listings are returned newest first.
    pub pets: Vec<Pet>,
}

impl Store {
    fn caller(&self, headers: &HeaderMap) -> Option<String> {
        let key = header(headers, "auth_key")?;
        self.accounts
            .iter()
            .find(|account| account.key == key)
            .map(|account| account.user_id.clone())
    }

    fn pet_mut(&mut self, id: &str) -> Option<&mut Pet> {
        self.pets.iter_mut().find(|pet| pet.id == id)
    }
}

pub type Db = Arc<RwLock<Store>>;

#[derive(Deserialize)]
pub struct PetForm {
    pub name: String,
    pub animal_type: String,
    pub age: String,
}

#[derive(Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub filter: String,
}

/// Router with a single account using the default credentials.
pub fn app() -> Router {
    app_with_accounts(&[(DEFAULT_EMAIL, DEFAULT_PASSWORD)])
}

pub fn app_with_accounts(accounts: &[(&str, &str)]) -> Router {
    let store = Store {
        accounts: accounts
            .iter()
            .map(|(email, password)| Account::new(email, password))
            .collect(),
        pets: Vec::new(),
    };
    let db: Db = Arc::new(RwLock::new(store));
    Router::new()
        .route("/api/key", get(get_api_key))
        .route("/api/pets", get(list_pets).post(create_pet))
        .route("/api/pets/{id}", put(update_pet).delete(delete_pet))
        .route("/api/create_pet_simple", post(create_pet_simple))
        .route("/api/pets/set_photo/{id}", post(set_photo))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    serve(listener, app()).await
}

pub async fn serve(listener: TcpListener, app: Router) -> Result<(), std::io::Error> {
    axum::serve(listener, app).await
}

fn forbidden() -> Response {
    (
        StatusCode::FORBIDDEN,
        Html("<!doctype html>\n<title>403 Forbidden</title>\n<h1>Forbidden</h1>\n<p>Please provide a valid 'auth_key' header.</p>\n"),
    )
        .into_response()
}

fn bad_request(message: &str) -> Response {
    (StatusCode::BAD_REQUEST, message.to_string()).into_response()
}

fn pet_not_found() -> Response {
    bad_request("Pet with this id wasn't found!")
}

fn foreign_pet() -> Response {
    (StatusCode::FORBIDDEN, "This pet belongs to another user").into_response()
}

/// Reject non-numeric or negative ages. A negative age is echoed back as
/// JSON so clients can see what was submitted.
fn check_fields(form: &PetForm) -> Result<(), Response> {
    let age: i64 = form
        .age
        .trim()
        .parse()
        .map_err(|_| bad_request("Age must be a whole number"))?;
    if age < 0 {
        let body = json!({
            "name": form.name,
            "animal_type": form.animal_type,
            "age": form.age,
            "error": "age must not be negative",
        });
        return Err((StatusCode::BAD_REQUEST, Json(body)).into_response());
    }
    Ok(())
}

fn photo_data_url(bytes: &[u8]) -> String {
    format!("data:image/jpeg;base64,{}", STANDARD.encode(bytes))
}

#[derive(Default)]
struct Upload {
    name: Option<String>,
    animal_type: Option<String>,
    age: Option<String>,
    photo: Option<Vec<u8>>,
}

impl Upload {
    fn fields(&mut self) -> Option<PetForm> {
        Some(PetForm {
            name: self.name.take()?,
            animal_type: self.animal_type.take()?,
            age: self.age.take()?,
        })
    }
}

async fn read_upload(mut multipart: Multipart) -> Result<Upload, Response> {
    let mut upload = Upload::default();
    while let Some(field) = multipart.next_field().await.map_err(IntoResponse::into_response)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "pet_photo" => {
                let bytes = field.bytes().await.map_err(IntoResponse::into_response)?;
                upload.photo = Some(bytes.to_vec());
            }
            "name" | "animal_type" | "age" => {
                let value = field.text().await.map_err(IntoResponse::into_response)?;
                match name.as_str() {
                    "name" => upload.name = Some(value),
                    "animal_type" => upload.animal_type = Some(value),
                    _ => upload.age = Some(value),
                }
            }
            _ => {}
        }
    }
    Ok(upload)
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

async fn get_api_key(State(db): State<Db>, headers: HeaderMap) -> Response {
    let (Some(email), Some(password)) = (header(&headers, "email"), header(&headers, "password")) else {
        return forbidden();
    };
    let store = db.read().await;
    match store
        .accounts
        .iter()
        .find(|account| account.email == email && account.password == password)
    {
        Some(account) => Json(json!({ "key": account.key })).into_response(),
        None => (
            StatusCode::FORBIDDEN,
            Html("<!doctype html>\n<title>403 Forbidden</title>\n<p>This user wasn't found in database</p>\n"),
        )
            .into_response(),
    }
}

async fn list_pets(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(params): Query<ListParams>,
) -> Response {
    let store = db.read().await;
    let Some(user_id) = store.caller(&headers) else {
        return forbidden();
    };
    let pets: Vec<Pet> = match params.filter.as_str() {
        "" => store.pets.iter().rev().cloned().collect(),
        "my_pets" => store
            .pets
            .iter()
            .rev()
            .filter(|pet| pet.user_id == user_id)
            .cloned()
            .collect(),
        _ => return bad_request("Filter value is incorrect"),
    };
    Json(json!({ "pets": pets })).into_response()
}

async fn create_pet(State(db): State<Db>, headers: HeaderMap, multipart: Multipart) -> Response {
    let Some(user_id) = db.read().await.caller(&headers) else {
        return forbidden();
    };
    let mut upload = match read_upload(multipart).await {
        Ok(upload) => upload,
        Err(response) => return response,
    };
    let Some(form) = upload.fields() else {
        return bad_request("Fields name, animal_type and age are required");
    };
    if let Err(response) = check_fields(&form) {
        return response;
    }
    let photo = match upload.photo {
        Some(bytes) if bytes.starts_with(&JPEG_MAGIC) => photo_data_url(&bytes),
        Some(_) => return bad_request("Photo must be a JPEG image"),
        None => return bad_request("Field pet_photo is required"),
    };
    let pet = Pet {
        id: Uuid::new_v4().to_string(),
        name: form.name,
        animal_type: form.animal_type,
        age: form.age,
        pet_photo: photo,
        user_id,
    };
    db.write().await.pets.push(pet.clone());
    Json(pet).into_response()
}

async fn create_pet_simple(
    State(db): State<Db>,
    headers: HeaderMap,
    Form(form): Form<PetForm>,
) -> Response {
    let mut store = db.write().await;
    let Some(user_id) = store.caller(&headers) else {
        return forbidden();
    };
    if let Err(response) = check_fields(&form) {
        return response;
    }
    let pet = Pet {
        id: Uuid::new_v4().to_string(),
        name: form.name,
        animal_type: form.animal_type,
        age: form.age,
        pet_photo: String::new(),
        user_id,
    };
    store.pets.push(pet.clone());
    Json(pet).into_response()
}

async fn update_pet(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Form(form): Form<PetForm>,
) -> Response {
    let mut store = db.write().await;
    let Some(user_id) = store.caller(&headers) else {
        return forbidden();
    };
    let Some(pet) = store.pet_mut(&id) else {
        return pet_not_found();
    };
    if pet.user_id != user_id {
        return foreign_pet();
    }
    if let Err(response) = check_fields(&form) {
        return response;
    }
    pet.name = form.name;
    pet.animal_type = form.animal_type;
    pet.age = form.age;
    Json(pet.clone()).into_response()
}

async fn delete_pet(State(db): State<Db>, headers: HeaderMap, Path(id): Path<String>) -> Response {
    let mut store = db.write().await;
    let Some(user_id) = store.caller(&headers) else {
        return forbidden();
    };
    let Some(index) = store.pets.iter().position(|pet| pet.id == id) else {
        return pet_not_found();
    };
    if store.pets[index].user_id != user_id {
        return foreign_pet();
    }
    store.pets.remove(index);
    StatusCode::OK.into_response()
}

async fn set_photo(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Response {
    let Some(user_id) = db.read().await.caller(&headers) else {
        return forbidden();
    };
    let upload = match read_upload(multipart).await {
        Ok(upload) => upload,
        Err(response) => return response,
    };
    let Some(bytes) = upload.photo else {
        return bad_request("Field pet_photo is required");
    };
    let mut store = db.write().await;
    let Some(pet) = store.pet_mut(&id) else {
        return pet_not_found();
    };
    if pet.user_id != user_id {
        return foreign_pet();
    }
    // Unsupported images leave the stored photo untouched.
    if !bytes.starts_with(&JPEG_MAGIC) {
        return (StatusCode::BAD_REQUEST, Json(pet.clone())).into_response();
    }
    pet.pet_photo = photo_data_url(&bytes);
    Json(pet.clone()).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(age: &str) -> PetForm {
        PetForm {
            name: "Rex".to_string(),
            animal_type: "dog".to_string(),
            age: age.to_string(),
        }
    }

    #[test]
    fn pet_serializes_age_as_string() {
        let pet = Pet {
            id: "1".to_string(),
            name: "Rex".to_string(),
            animal_type: "dog".to_string(),
            age: "3".to_string(),
            pet_photo: String::new(),
            user_id: "u".to_string(),
        };
        let json = serde_json::to_value(&pet).unwrap();
        assert_eq!(json["age"], "3");
        assert_eq!(json["pet_photo"], "");
    }

    #[test]
    fn check_fields_accepts_zero_age() {
        assert!(check_fields(&form("0")).is_ok());
    }

    #[test]
    fn check_fields_rejects_negative_age() {
        let response = check_fields(&form("-5")).unwrap_err();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn check_fields_rejects_non_numeric_age() {
        let response = check_fields(&form("three")).unwrap_err();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn photo_is_stored_as_data_url() {
        assert_eq!(photo_data_url(&JPEG_MAGIC), "data:image/jpeg;base64,/9j/");
    }

    #[test]
    fn list_params_default_to_empty_filter() {
        let params: ListParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params.filter, "");
    }

    #[test]
    fn accounts_get_distinct_keys() {
        let a = Account::new("a@x", "pw");
        let b = Account::new("b@x", "pw");
        assert_ne!(a.key, b.key);
        assert_ne!(a.user_id, b.user_id);
    }
}
