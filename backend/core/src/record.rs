//! Incident record and its fields.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;

/// The five inputs describing one incident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Title,
    DateTime,
    Location,
    Persons,
    Description,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::Title,
        Field::DateTime,
        Field::Location,
        Field::Persons,
        Field::Description,
    ];

    /// JSON key used on the wire.
    pub fn key(self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::DateTime => "dateTime",
            Field::Location => "location",
            Field::Persons => "persons",
            Field::Description => "description",
        }
    }

    /// Human label shown next to the input.
    pub fn label(self) -> &'static str {
        match self {
            Field::Title => "Incident Title",
            Field::DateTime => "Date & Time",
            Field::Location => "Location",
            Field::Persons => "Persons Involved",
            Field::Description => "Brief Description",
        }
    }

    /// Input length limit in characters, if the field has one.
    pub fn max_len(self) -> Option<usize> {
        match self {
            Field::Title | Field::Location => Some(100),
            Field::Persons => Some(200),
            Field::Description => Some(500),
            Field::DateTime => None,
        }
    }

    /// Whether presence is checked after trimming whitespace.
    ///
    /// The datetime input is only checked for existence.
    pub fn trims(self) -> bool {
        !matches!(self, Field::DateTime)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A validated incident report request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentRecord {
    pub title: String,
    pub date_time: String,
    pub location: String,
    pub persons: String,
    pub description: String,
}

impl IncidentRecord {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Title => &self.title,
            Field::DateTime => &self.date_time,
            Field::Location => &self.location,
            Field::Persons => &self.persons,
            Field::Description => &self.description,
        }
    }

    pub fn get_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Title => &mut self.title,
            Field::DateTime => &mut self.date_time,
            Field::Location => &mut self.location,
            Field::Persons => &mut self.persons,
            Field::Description => &mut self.description,
        }
    }
}

/// Raw request body as received by the relay. Every key may be absent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentSubmission {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub date_time: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub persons: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl IncidentSubmission {
    /// Checks that every field is present and non-empty, in field order.
    pub fn into_record(self) -> Result<IncidentRecord, CoreError> {
        fn require(value: Option<String>, field: Field) -> Result<String, CoreError> {
            match value {
                Some(v) if !v.is_empty() => Ok(v),
                _ => Err(CoreError::MissingField(field)),
            }
        }

        Ok(IncidentRecord {
            title: require(self.title, Field::Title)?,
            date_time: require(self.date_time, Field::DateTime)?,
            location: require(self.location, Field::Location)?,
            persons: require(self.persons, Field::Persons)?,
            description: require(self.description, Field::Description)?,
        })
    }
}

impl From<IncidentRecord> for IncidentSubmission {
    fn from(record: IncidentRecord) -> Self {
        Self {
            title: Some(record.title),
            date_time: Some(record.date_time),
            location: Some(record.location),
            persons: Some(record.persons),
            description: Some(record.description),
        }
    }
}
