//! Business logic services

pub mod jwks;
pub mod token;

pub use jwks::{JwksClient, JwksError};
pub use token::{decode_unverified, Claims, TokenError, TokenValidator, ValidationMode};
