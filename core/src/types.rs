//! Argument and payload types for the pet service.
//!
//! # Design
//! These types shape what the client sends; they never validate it. A negative
//! age or an unknown filter goes out as-is and the service decides. `PetRecord`
//! mirrors what the service returns but is only used for convenience
//! extraction from a structured payload.

use std::fmt;

use serde::{Deserialize, Deserializer};

/// Which pets `GET /api/pets` should return.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PetFilter {
    /// Pets of every account.
    #[default]
    All,
    /// Only pets owned by the authenticated account.
    MyPets,
    /// Any other value, sent verbatim.
    Other(String),
}

impl PetFilter {
    pub fn as_str(&self) -> &str {
        match self {
            PetFilter::All => "",
            PetFilter::MyPets => "my_pets",
            PetFilter::Other(value) => value,
        }
    }
}

impl From<&str> for PetFilter {
    fn from(value: &str) -> Self {
        match value {
            "" => PetFilter::All,
            "my_pets" => PetFilter::MyPets,
            other => PetFilter::Other(other.to_string()),
        }
    }
}

impl fmt::Display for PetFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Form fields for creating or updating a pet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PetFields {
    pub name: String,
    pub animal_type: String,
    pub age: i64,
}

impl PetFields {
    pub fn new(name: impl Into<String>, animal_type: impl Into<String>, age: i64) -> Self {
        Self {
            name: name.into(),
            animal_type: animal_type.into(),
            age,
        }
    }

    pub fn to_form(&self) -> Vec<(String, String)> {
        vec![
            ("name".to_string(), self.name.clone()),
            ("animal_type".to_string(), self.animal_type.clone()),
            ("age".to_string(), self.age.to_string()),
        ]
    }
}

/// A pet as returned by the service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PetRecord {
    pub id: String,
    pub name: String,
    pub animal_type: String,
    /// The service echoes age as a string; numbers are accepted too.
    #[serde(deserialize_with = "string_or_number")]
    pub age: String,
    #[serde(default)]
    pub pet_photo: String,
    #[serde(default)]
    pub user_id: Option<String>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Str(s) => s,
        Raw::Int(n) => n.to_string(),
        Raw::Float(n) => n.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_wire_values() {
        assert_eq!(PetFilter::All.as_str(), "");
        assert_eq!(PetFilter::MyPets.as_str(), "my_pets");
        assert_eq!(PetFilter::Other("whatever".into()).as_str(), "whatever");
    }

    #[test]
    fn filter_from_str_maps_known_values() {
        assert_eq!(PetFilter::from(""), PetFilter::All);
        assert_eq!(PetFilter::from("my_pets"), PetFilter::MyPets);
        assert_eq!(
            PetFilter::from("My_Pets"),
            PetFilter::Other("My_Pets".to_string())
        );
    }

    #[test]
    fn negative_age_is_sent_unchanged() {
        let form = PetFields::new("Абра", "Кадабра", -5).to_form();
        assert_eq!(form[0], ("name".to_string(), "Абра".to_string()));
        assert_eq!(form[1], ("animal_type".to_string(), "Кадабра".to_string()));
        assert_eq!(form[2], ("age".to_string(), "-5".to_string()));
    }

    #[test]
    fn record_without_photo_defaults_to_empty() {
        let pet: PetRecord =
            serde_json::from_str(r#"{"id":"1","name":"Rex","animal_type":"dog","age":"2"}"#)
                .unwrap();
        assert_eq!(pet.pet_photo, "");
        assert_eq!(pet.user_id, None);
    }

    #[test]
    fn record_rejects_missing_id() {
        let result: Result<PetRecord, _> =
            serde_json::from_str(r#"{"name":"Rex","animal_type":"dog","age":"2"}"#);
        assert!(result.is_err());
    }
}
