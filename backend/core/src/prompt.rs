//! Prompt composition for the incident summary.

use crate::record::IncidentRecord;

/// Request to a completion provider: a single user-role message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub user_prompt: String,
}

impl CompletionRequest {
    pub fn for_incident(record: &IncidentRecord) -> Self {
        Self {
            user_prompt: build_prompt(record),
        }
    }
}

/// Builds the summary prompt. Field values are embedded verbatim.
pub fn build_prompt(record: &IncidentRecord) -> String {
    format!(
        "Generate a concise, professional 2-4 line incident report summarizing the following details:\n\
         - Title: {title}\n\
         - Date & Time: {date_time}\n\
         - Location: {location}\n\
         - Persons Involved: {persons}\n\
         - Description: {description}\n\
         \n\
         Keep it factual, objective, and structured like a standard incident log entry.",
        title = record.title,
        date_time = record.date_time,
        location = record.location,
        persons = record.persons,
        description = record.description,
    )
}
