//! Data models

mod deal;
mod identity;
mod organization;
mod recording;
mod status;
mod user;

pub use deal::*;
pub use identity::*;
pub use organization::*;
pub use recording::*;
pub use status::*;
pub use user::*;

/// Free-form metadata attached to every entity
pub type Meta = serde_json::Map<String, serde_json::Value>;
