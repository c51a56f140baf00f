//! Deal model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{DerivedId, Meta, Status};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Deal {
    pub id: String,
    pub org_id: Option<String>,
    pub name: String,
    pub status: Status,
    pub domain: Option<String>,
    pub meta: Meta,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
pub struct DealRequest {
    #[serde(default)]
    pub org_id: Option<String>,
    #[validate(length(min = 1, message = "Deal name cannot be empty"))]
    pub name: String,
    #[serde(default)]
    pub status: Option<Status>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub meta: Option<Meta>,
}

impl DerivedId for DealRequest {
    fn derived_id(&self) -> String {
        self.name.clone()
    }
}
