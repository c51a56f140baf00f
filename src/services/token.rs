//! Bearer token validation
//!
//! Tokens are issued by an external identity provider and verified against
//! its published signing keys. A dummy mode decodes claims without any
//! verification and is only selected for the local environment.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use jsonwebtoken::{decode, decode_header, errors::ErrorKind, DecodingKey, Validation};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::jwks::JwksClient;
use crate::config::{AuthConfig, Environment};

/// Decoded token payload
pub type Claims = serde_json::Map<String, Value>;

/// Reserved claim under which the raw token is returned
pub const ACCESS_TOKEN_CLAIM: &str = "access_token";

/// Reasons a bearer credential is rejected
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum TokenError {
    /// Signature, issuer, audience or structure mismatch
    #[error("Bad credentials")]
    BadCredentials,

    /// Token is past its validity window
    #[error("Token expired")]
    Expired,

    /// Signing keys could not be obtained
    #[error("Unable to verify credentials")]
    CredentialsUnverifiable,

    /// Token is valid but carries no organization
    #[error("Unable to verify organization")]
    OrganizationRequired,
}

/// How a token is checked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    /// Verify signature, expiry, issuer and audience
    Standard,
    /// Decode claims only
    Dummy,
}

impl ValidationMode {
    pub fn for_environment(environment: Environment) -> Self {
        if environment.is_local() {
            ValidationMode::Dummy
        } else {
            ValidationMode::Standard
        }
    }
}

/// Validates bearer tokens against the identity provider's key set
pub struct TokenValidator {
    jwks: JwksClient,
    validation: Validation,
}

impl TokenValidator {
    pub fn new(config: &AuthConfig) -> anyhow::Result<Self> {
        let algorithms = config.signing_algorithms()?;
        let Some(first) = algorithms.first().copied() else {
            anyhow::bail!("At least one signing algorithm must be configured");
        };

        let mut validation = Validation::new(first);
        validation.algorithms = algorithms;
        validation.validate_exp = true;
        if !config.issuer.is_empty() {
            validation.set_issuer(&[config.issuer.as_str()]);
        }
        if !config.audience.is_empty() {
            validation.set_audience(&[config.audience.as_str()]);
        }

        Ok(Self {
            jwks: JwksClient::new(config)?,
            validation,
        })
    }

    /// Validate `token` in the given mode and return its claims.
    ///
    /// Standard mode adds the raw token under [`ACCESS_TOKEN_CLAIM`]; dummy
    /// mode returns the payload untouched.
    pub async fn validate(&self, token: &str, mode: ValidationMode) -> Result<Claims, TokenError> {
        match mode {
            ValidationMode::Standard => self.verify(token).await,
            ValidationMode::Dummy => {
                info!("Dummy authentication, token signature is not verified");
                decode_unverified(token)
            }
        }
    }

    async fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let header = decode_header(token).map_err(|e| {
            warn!(error = %e, "Malformed token header");
            TokenError::BadCredentials
        })?;

        let kid = header.kid.ok_or_else(|| {
            warn!("Token header carries no key id");
            TokenError::BadCredentials
        })?;

        let jwk = self
            .jwks
            .key_for(&kid)
            .await
            .map_err(|e| {
                error!(error = %e, url = %self.jwks.url(), "Unable to fetch signing keys");
                TokenError::CredentialsUnverifiable
            })?
            .ok_or_else(|| {
                warn!(kid = %kid, "No signing key matches the token key id");
                TokenError::BadCredentials
            })?;

        let key = DecodingKey::from_jwk(&jwk).map_err(|e| {
            error!(error = %e, kid = %kid, "Signing key cannot be used for verification");
            TokenError::CredentialsUnverifiable
        })?;

        let data = decode::<Claims>(token, &key, &self.validation).map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => {
                warn!("Token expired");
                TokenError::Expired
            }
            _ => {
                warn!(error = %e, "Bad credentials");
                TokenError::BadCredentials
            }
        })?;

        debug!(kid = %kid, "Token validated");

        let mut claims = data.claims;
        claims.insert(
            ACCESS_TOKEN_CLAIM.to_string(),
            Value::String(token.to_string()),
        );
        Ok(claims)
    }
}

/// Decode a token's claims without verifying anything but its shape:
/// three dot-separated segments whose first two are base64url JSON objects.
pub fn decode_unverified(token: &str) -> Result<Claims, TokenError> {
    let segments: Vec<&str> = token.split('.').collect();
    let [header, payload, _signature] = segments.as_slice() else {
        return Err(TokenError::BadCredentials);
    };

    decode_segment(header)?;
    decode_segment(payload)
}

fn decode_segment(segment: &str) -> Result<Claims, TokenError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment.trim_end_matches('='))
        .map_err(|_| TokenError::BadCredentials)?;
    serde_json::from_slice(&bytes).map_err(|_| TokenError::BadCredentials)
}
