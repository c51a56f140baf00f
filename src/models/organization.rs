//! Organization (tenant) model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{DerivedId, Meta, Status};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Organization {
    pub id: String,
    pub name: String,
    pub status: Status,
    pub domains: Vec<String>,
    pub meta: Meta,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of organization upserts and partial updates.
///
/// Absent optional fields keep their stored value on update and take the
/// default on insert.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
pub struct OrganizationRequest {
    #[validate(length(min = 1, message = "Organization name cannot be empty"))]
    pub name: String,
    #[serde(default)]
    pub status: Option<Status>,
    #[serde(default)]
    pub domains: Option<Vec<String>>,
    #[serde(default)]
    pub meta: Option<Meta>,
}

impl DerivedId for OrganizationRequest {
    fn derived_id(&self) -> String {
        self.name.clone()
    }
}
