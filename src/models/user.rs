//! User model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{derive_id, DerivedId, Meta};

/// User entity, identified by `(org_id, email)`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: String,
    pub org_id: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub role: Option<String>,
    pub meta: Meta,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of user creation and partial updates
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default, PartialEq)]
pub struct UserRequest {
    #[serde(default)]
    pub org_id: Option<String>,
    #[serde(default)]
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub meta: Option<Meta>,
}

impl UserRequest {
    /// Fill the natural key from the caller where the body left it out
    pub fn with_caller_key(mut self, org_id: Option<&str>, email: Option<&str>) -> Self {
        if self.org_id.is_none() {
            self.org_id = org_id.map(str::to_string);
        }
        if self.email.is_none() {
            self.email = email.map(str::to_string);
        }
        self
    }

    /// [`with_caller_key`](Self::with_caller_key), then default the name to
    /// the email local part
    pub fn with_key_defaults(self, org_id: Option<&str>, email: Option<&str>) -> Self {
        let mut req = self.with_caller_key(org_id, email);
        if req.name.is_none() {
            req.name = req.email.as_deref().map(email_local_part);
        }
        req
    }
}

impl DerivedId for UserRequest {
    fn derived_id(&self) -> String {
        derive_id(&[self.org_id.as_deref(), self.email.as_deref()])
    }
}

/// Local part of an email address (`jane` for `jane@example.com`)
pub fn email_local_part(email: &str) -> String {
    email.split('@').next().unwrap_or_default().to_string()
}
