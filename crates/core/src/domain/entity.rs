use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Built-in entity types recognised by the pattern table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    #[serde(rename = "person")]
    Person,
    #[serde(rename = "date-time")]
    DateTime,
    #[serde(rename = "number")]
    Number,
    #[serde(rename = "email")]
    Email,
    #[serde(rename = "phone")]
    Phone,
}

impl EntityType {
    pub const ALL: [EntityType; 5] =
        [Self::Person, Self::DateTime, Self::Number, Self::Email, Self::Phone];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Person => "person",
            Self::DateTime => "date-time",
            Self::Number => "number",
            Self::Email => "email",
            Self::Phone => "phone",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "person" => Ok(Self::Person),
            "date-time" | "datetime" | "date_time" => Ok(Self::DateTime),
            "number" => Ok(Self::Number),
            "email" => Ok(Self::Email),
            "phone" | "phone-number" => Ok(Self::Phone),
            other => {
                Err(DomainError::UnknownValue { kind: "entity type", value: other.to_string() })
            }
        }
    }
}

/// Tag carried by an annotated span: a built-in type or a user-defined lookup entity.
///
/// On the wire built-ins keep their plain name and custom entities are written as
/// `custom:<name>`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum EntityTag {
    Builtin(EntityType),
    Custom(String),
}

const CUSTOM_PREFIX: &str = "custom:";

impl fmt::Display for EntityTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Builtin(entity_type) => f.write_str(entity_type.as_str()),
            Self::Custom(name) => write!(f, "{CUSTOM_PREFIX}{name}"),
        }
    }
}

impl From<EntityTag> for String {
    fn from(value: EntityTag) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for EntityTag {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.strip_prefix(CUSTOM_PREFIX) {
            Some(name) if !name.trim().is_empty() => Ok(Self::Custom(name.to_string())),
            Some(_) => Err(DomainError::MissingField { field: "entity name" }),
            None => value.parse().map(Self::Builtin),
        }
    }
}

impl From<EntityType> for EntityTag {
    fn from(value: EntityType) -> Self {
        Self::Builtin(value)
    }
}

/// A typed span inside a phrase. Offsets are character offsets, end exclusive.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitySpan {
    pub entity_type: EntityTag,
    pub value: String,
    pub start: usize,
    pub end: usize,
    /// Canonical entry a synonym resolved to; only set for custom entities.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityValue {
    pub value: String,
    #[serde(default)]
    pub synonyms: Vec<String>,
}

/// A user-defined lookup entity, e.g. `size` with values `small`/`large`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomEntity {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub values: Vec<EntityValue>,
}

impl CustomEntity {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::MissingField { field: "entity name" });
        }
        if self.values.iter().any(|value| value.value.trim().is_empty()) {
            return Err(DomainError::MissingField { field: "entity value" });
        }
        Ok(())
    }
}
