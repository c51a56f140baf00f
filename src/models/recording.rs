//! Recording model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidateEmail, ValidationError};

use super::{derive_id, key_timestamp, DerivedId, Meta};

/// Recording entity, identified by `(org_id, url, created_at)`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recording {
    pub id: String,
    pub org_id: Option<String>,
    pub deal_id: Option<String>,
    pub url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub participants: Option<Vec<String>>,
    pub video_path: Option<String>,
    /// Length in seconds
    pub duration: Option<f64>,
    pub meta: Meta,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of recording creation and partial updates.
///
/// `created_at` is part of the natural key. When the client omits it the key
/// is derived with the timestamp absent and the server stamps the row.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
pub struct RecordingRequest {
    #[serde(default)]
    pub org_id: Option<String>,
    #[serde(default)]
    pub deal_id: Option<String>,
    #[validate(length(min = 1, message = "Recording url cannot be empty"))]
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "validate_participants"))]
    pub participants: Option<Vec<String>>,
    #[serde(default)]
    pub video_path: Option<String>,
    #[serde(default)]
    #[validate(range(min = 0.0, message = "Duration cannot be negative"))]
    pub duration: Option<f64>,
    #[serde(default)]
    pub meta: Option<Meta>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl DerivedId for RecordingRequest {
    fn derived_id(&self) -> String {
        let created_at = self.created_at.as_ref().map(key_timestamp);
        derive_id(&[
            self.org_id.as_deref(),
            Some(self.url.as_str()),
            created_at.as_deref(),
        ])
    }
}

#[allow(clippy::ptr_arg)]
fn validate_participants(participants: &Vec<String>) -> Result<(), ValidationError> {
    if participants.iter().all(|p| p.validate_email()) {
        Ok(())
    } else {
        Err(ValidationError::new("participants")
            .with_message("Participants must be valid email addresses".into()))
    }
}
