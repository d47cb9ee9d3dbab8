// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWKS (JSON Web Key Set) fetching and caching.
//!
//! Keys are fetched from the configured endpoint with a bounded timeout and
//! cached with a TTL. A key is only ever returned for an exact `kid` match;
//! a token whose `kid` is absent from the set fails key resolution rather
//! than falling back to another key.

use std::sync::Arc;
use std::time::{Duration, Instant};

use jsonwebtoken::jwk::{AlgorithmParameters, Jwk, JwkSet};
use jsonwebtoken::DecodingKey;
use tokio::sync::RwLock;

use super::error::AuthError;

/// Default JWKS cache TTL (5 minutes).
const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Bounded timeout for the remote fetch.
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// JWKS cache entry.
struct CacheEntry {
    jwks: JwkSet,
    fetched_at: Instant,
}

/// JWKS manager with caching.
#[derive(Clone)]
pub struct JwksManager {
    /// Remote key-set endpoint.
    jwks_url: String,
    /// Cache TTL.
    cache_ttl: Duration,
    /// Cached key set.
    cache: Arc<RwLock<Option<CacheEntry>>>,
    /// HTTP client.
    client: reqwest::Client,
}

impl JwksManager {
    /// Create a new JWKS manager for the given endpoint URL.
    pub fn new(jwks_url: impl Into<String>) -> Self {
        Self {
            jwks_url: jwks_url.into(),
            cache_ttl: DEFAULT_CACHE_TTL,
            cache: Arc::new(RwLock::new(None)),
            client: reqwest::Client::builder()
                .timeout(FETCH_TIMEOUT)
                .build()
                .expect("Failed to create HTTP client"),
        }
    }

    /// Create with custom cache TTL.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Get the JWKS URL.
    pub fn jwks_url(&self) -> &str {
        &self.jwks_url
    }

    /// Get the decoding key for the given key ID.
    pub async fn decoding_key(&self, kid: &str) -> Result<DecodingKey, AuthError> {
        let jwks = self.get_jwks().await?;
        find_key(&jwks, kid)
    }

    /// Fetch the key set, serving from cache while fresh.
    async fn get_jwks(&self) -> Result<JwkSet, AuthError> {
        {
            let cache = self.cache.read().await;
            if let Some(entry) = &*cache {
                if entry.fetched_at.elapsed() < self.cache_ttl {
                    return Ok(entry.jwks.clone());
                }
            }
        }

        let jwks = self.fetch_jwks().await?;

        {
            let mut cache = self.cache.write().await;
            *cache = Some(CacheEntry {
                jwks: jwks.clone(),
                fetched_at: Instant::now(),
            });
        }

        Ok(jwks)
    }

    /// Fetch the key set from the endpoint.
    async fn fetch_jwks(&self) -> Result<JwkSet, AuthError> {
        let response = self
            .client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| AuthError::KeyResolution(format!("jwks fetch failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AuthError::KeyResolution(format!(
                "jwks fetch failed: HTTP {} from JWKS endpoint",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AuthError::KeyResolution(format!("jwks fetch failed: {e}")))
    }
}

/// Find the key with the given `kid` in a key set and convert it.
fn find_key(jwks: &JwkSet, kid: &str) -> Result<DecodingKey, AuthError> {
    let jwk = jwks
        .keys
        .iter()
        .find(|k| k.common.key_id.as_deref() == Some(kid))
        .ok_or_else(|| AuthError::KeyResolution(format!("kid '{kid}' not found in JWKS")))?;

    jwk_to_decoding_key(jwk)
}

/// Convert a JWK's key parameters into a usable decoding key.
fn jwk_to_decoding_key(jwk: &Jwk) -> Result<DecodingKey, AuthError> {
    match &jwk.algorithm {
        AlgorithmParameters::RSA(rsa) => DecodingKey::from_rsa_components(&rsa.n, &rsa.e)
            .map_err(|e| AuthError::KeyResolution(format!("invalid RSA key in JWKS: {e}"))),
        AlgorithmParameters::EllipticCurve(ec) => DecodingKey::from_ec_components(&ec.x, &ec.y)
            .map_err(|e| AuthError::KeyResolution(format!("invalid EC key in JWKS: {e}"))),
        _ => Err(AuthError::KeyResolution(
            "unsupported key type in JWKS".to_string(),
        )),
    }
}
