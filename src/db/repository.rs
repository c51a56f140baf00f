//! Column conversions shared by the entity repositories
//!
//! SQLite has no JSON or timestamp types: JSON values are stored as text and
//! timestamps as RFC 3339 strings.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use tracing::warn;

use crate::models::Meta;

pub(crate) fn parse_db_timestamp(ts: &str) -> DateTime<Utc> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(ts) {
        return dt.with_timezone(&Utc);
    }
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S") {
        return DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc);
    }
    warn!(value = %ts, "Unparseable timestamp column, using the Unix epoch");
    DateTime::<Utc>::UNIX_EPOCH
}

pub(crate) fn to_db_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339()
}

pub(crate) fn to_json_text<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).context("Failed to serialize JSON column")
}

/// Decode a JSON text column, falling back to the type's default on bad data
pub(crate) fn from_json_text<T: DeserializeOwned + Default>(text: Option<&str>) -> T {
    text.and_then(|t| serde_json::from_str(t).ok())
        .unwrap_or_default()
}

pub(crate) fn meta_from_text(text: &str) -> Meta {
    from_json_text(Some(text))
}
