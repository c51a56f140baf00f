//! Identity provider signing key set client
//!
//! Fetches the JSON Web Key Set published by the identity provider and looks
//! keys up by `kid`. Without a cache lifetime every lookup re-fetches the set.

use std::time::{Duration, Instant};

use jsonwebtoken::jwk::{Jwk, JwkSet};
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

use crate::config::AuthConfig;

/// Failure to obtain the key set
#[derive(Debug, Error)]
pub enum JwksError {
    #[error("Failed to reach key set endpoint: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Key set endpoint returned status: {0}")]
    Status(StatusCode),

    #[error("Key set response is not a valid JWKS: {0}")]
    Malformed(#[from] serde_json::Error),
}

struct CachedKeySet {
    keys: JwkSet,
    fetched_at: Instant,
}

/// Client for the identity provider's JWKS endpoint
pub struct JwksClient {
    http: Client,
    url: String,
    cache_ttl: Option<Duration>,
    cached: RwLock<Option<CachedKeySet>>,
}

impl JwksClient {
    pub fn new(config: &AuthConfig) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.jwks_timeout_secs))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;

        let cache_ttl =
            (config.jwks_cache_ttl_secs > 0).then(|| Duration::from_secs(config.jwks_cache_ttl_secs));

        Ok(Self {
            http,
            url: config.jwks_endpoint(),
            cache_ttl,
            cached: RwLock::new(None),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch the key set from the endpoint
    pub async fn fetch(&self) -> Result<JwkSet, JwksError> {
        debug!(url = %self.url, "Fetching signing key set");

        let response = self.http.get(&self.url).send().await?;
        if !response.status().is_success() {
            return Err(JwksError::Status(response.status()));
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Find the key with the given `kid`.
    ///
    /// With caching enabled, a stale set or an unknown `kid` forces one
    /// refresh before giving up, so rotated keys are picked up.
    pub async fn key_for(&self, kid: &str) -> Result<Option<Jwk>, JwksError> {
        let Some(ttl) = self.cache_ttl else {
            let keys = self.fetch().await?;
            return Ok(keys.find(kid).cloned());
        };

        if let Some(cached) = self.cached.read().await.as_ref() {
            if cached.fetched_at.elapsed() < ttl {
                if let Some(jwk) = cached.keys.find(kid) {
                    return Ok(Some(jwk.clone()));
                }
            }
        }

        let keys = self.fetch().await?;
        let found = keys.find(kid).cloned();
        *self.cached.write().await = Some(CachedKeySet {
            keys,
            fetched_at: Instant::now(),
        });

        Ok(found)
    }
}
