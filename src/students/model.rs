//! Student record types.
//!
//! Field names on the wire follow the `alunos` table: `nome`, `idade`,
//! `email`, `curso`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted student row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRecord {
    /// Store-assigned identifier.
    pub id: String,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "idade")]
    pub age: i32,
    pub email: String,
    #[serde(rename = "curso")]
    pub course: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StudentRecord {
    /// The user-settable part of this record.
    pub fn input(&self) -> StudentInput {
        StudentInput {
            name: self.name.clone(),
            age: self.age,
            email: self.email.clone(),
            course: self.course.clone(),
        }
    }
}

/// Validated, normalized user-settable fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentInput {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "idade")]
    pub age: i32,
    pub email: String,
    #[serde(rename = "curso")]
    pub course: String,
}

/// Fields to overwrite on update. `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentPatch {
    #[serde(rename = "nome", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "idade", skip_serializing_if = "Option::is_none")]
    pub age: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(rename = "curso", skip_serializing_if = "Option::is_none")]
    pub course: Option<String>,
}

impl From<StudentInput> for StudentPatch {
    fn from(input: StudentInput) -> Self {
        Self {
            name: Some(input.name),
            age: Some(input.age),
            email: Some(input.email),
            course: Some(input.course),
        }
    }
}

/// A single validation failure tied to one input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}
