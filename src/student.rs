//! Student records and the request shapes that operate on them.

use crate::error::{RegistryError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A student record. `national_id` is the primary key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    #[serde(rename = "nombre", alias = "firstName")]
    pub first_name: String,
    #[serde(rename = "apellido", alias = "lastName")]
    pub last_name: String,
    #[serde(rename = "dni", alias = "nationalId")]
    pub national_id: i64,
    #[serde(rename = "edad", alias = "age")]
    pub age: i64,
}

impl Student {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        national_id: i64,
        age: i64,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            national_id,
            age,
        }
    }

    /// Copies every field present in `patch` onto this record.
    ///
    /// The patch's `national_id` only selects the record and is never written.
    pub fn apply(&mut self, patch: StudentPatch) {
        if let Some(first_name) = patch.first_name {
            self.first_name = first_name;
        }
        if let Some(last_name) = patch.last_name {
            self.last_name = last_name;
        }
        if let Some(age) = patch.age {
            self.age = age;
        }
    }
}

/// Partial update payload. Only `dni` is required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StudentPatch {
    #[serde(rename = "nombre", alias = "firstName", default)]
    pub first_name: Option<String>,
    #[serde(rename = "apellido", alias = "lastName", default)]
    pub last_name: Option<String>,
    #[serde(rename = "dni", alias = "nationalId")]
    pub national_id: i64,
    #[serde(rename = "edad", alias = "age", default)]
    pub age: Option<i64>,
}

impl StudentPatch {
    pub fn new(national_id: i64) -> Self {
        Self {
            national_id,
            ..Default::default()
        }
    }

    pub fn with_age(mut self, age: i64) -> Self {
        self.age = Some(age);
        self
    }
}

/// Body of a delete request; any field other than `dni` is ignored.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct StudentKey {
    #[serde(rename = "dni", alias = "nationalId")]
    pub national_id: i64,
}

/// Age filter parsed from the `edad/{rango}` path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeFilter {
    /// `"max"`: ages `<= max`; an empty match is not an error.
    UpTo(i64),
    /// `"min,max"`: ages strictly between the bounds; an empty match is `NotFound`.
    Between(i64, i64),
}

impl AgeFilter {
    pub fn matches(&self, age: i64) -> bool {
        match *self {
            Self::UpTo(max) => age <= max,
            Self::Between(min, max) => min < age && age < max,
        }
    }
}

fn parse_bound(raw: &str, input: &str) -> Result<i64> {
    raw.trim()
        .parse()
        .map_err(|_| RegistryError::BadRequest(format!("invalid age range '{}'", input)))
}

impl FromStr for AgeFilter {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(',').collect();
        match parts.as_slice() {
            [max] => Ok(Self::UpTo(parse_bound(max, s)?)),
            [min, max] => Ok(Self::Between(parse_bound(min, s)?, parse_bound(max, s)?)),
            _ => Err(RegistryError::BadRequest(format!(
                "invalid age range '{}'",
                s
            ))),
        }
    }
}

/// Records every freshly started seeded registry holds.
pub fn sample_students() -> Vec<Student> {
    vec![
        Student::new("Fede", "Criscuolo", 30664318, 25),
        Student::new("Juan", "Algo", 93416947, 50),
        Student::new("Roberto", "Carlos", 29024701, 30),
    ]
}
