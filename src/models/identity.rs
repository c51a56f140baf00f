//! Deterministic identifiers derived from natural keys
//!
//! Every entity identifier is computed from the entity's natural key, never
//! taken from the client. User and recording keys are hashed into a
//! version-5 UUID; organization and deal keys are their name.

use chrono::{DateTime, Timelike, Utc};
use uuid::Uuid;

/// Namespace under which natural keys are hashed (RFC 4122 DNS namespace)
pub const IDENTITY_NAMESPACE: Uuid = Uuid::NAMESPACE_DNS;

/// Rendering of an absent key part.
///
/// Absent parts still participate in the hash, so two records missing the
/// same part collide whenever the remaining parts match.
pub const ABSENT_PART: &str = "None";

const KEY_SEPARATOR: &str = ":";

/// Derive a stable identifier from an ordered natural-key tuple.
///
/// The parts are joined with `:` (absent parts render as `None`) and hashed
/// under [`IDENTITY_NAMESPACE`].
pub fn derive_id(parts: &[Option<&str>]) -> String {
    let name = parts
        .iter()
        .map(|part| part.unwrap_or(ABSENT_PART))
        .collect::<Vec<_>>()
        .join(KEY_SEPARATOR);

    Uuid::new_v5(&IDENTITY_NAMESPACE, name.as_bytes()).to_string()
}

/// Render a timestamp the way it participates in a natural key:
/// `YYYY-MM-DD HH:MM:SS[.ffffff]+HH:MM`, fractional part only when non-zero.
pub fn key_timestamp(ts: &DateTime<Utc>) -> String {
    let micros = ts.nanosecond() / 1_000;
    if micros == 0 {
        ts.format("%Y-%m-%d %H:%M:%S+00:00").to_string()
    } else {
        format!("{}.{:06}+00:00", ts.format("%Y-%m-%d %H:%M:%S"), micros)
    }
}

/// Types whose identifier is derived from their own natural-key fields
pub trait DerivedId {
    fn derived_id(&self) -> String;
}
