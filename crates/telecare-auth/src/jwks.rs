//! JWKS and discovery-document fetching with a URL-keyed TTL cache.
//!
//! Every document (OpenID discovery, key set) is cached by its URL for
//! five minutes and refetched lazily after expiry. Entries are immutable
//! JSON blobs, so concurrent refreshes are last-writer-wins and need no
//! coordination beyond the map lock.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use jsonwebtoken::DecodingKey;
use parking_lot::RwLock;
use serde_json::Value;

use crate::error::{AuthError, Result};

/// Timeout for a single upstream document fetch.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// How long a fetched document stays fresh.
pub const CACHE_TTL: Duration = Duration::from_secs(300);

struct CachedDocument {
    document: Value,
    fetched_at: Instant,
}

/// URL-keyed cache of remote JSON documents with first-key JWK parsing.
pub struct JwksCache {
    client: reqwest::Client,
    ttl: Duration,
    entries: RwLock<HashMap<String, CachedDocument>>,
}

impl Default for JwksCache {
    fn default() -> Self {
        Self::new()
    }
}

impl JwksCache {
    /// Create a cache with the standard TTL.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be created (should never happen
    /// with default TLS).
    #[must_use]
    pub fn new() -> Self {
        Self::with_ttl(CACHE_TTL)
    }

    /// Create a cache with a custom TTL. Test use mostly.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be created (should never happen
    /// with default TLS).
    #[must_use]
    pub fn with_ttl(ttl: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .expect("failed to create HTTP client");

        Self {
            client,
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Fetch a JSON document, serving from cache while fresh.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::JwksFetch` on network failure, a non-success
    /// status, or a non-JSON body.
    pub async fn fetch_document(&self, url: &str) -> Result<Value> {
        {
            let entries = self.entries.read();
            if let Some(entry) = entries.get(url) {
                if entry.fetched_at.elapsed() < self.ttl {
                    return Ok(entry.document.clone());
                }
            }
        }

        tracing::debug!(url = %url, "Fetching key document");
        let document: Value = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AuthError::JwksFetch(e.to_string()))?
            .error_for_status()
            .map_err(|e| AuthError::JwksFetch(e.to_string()))?
            .json()
            .await
            .map_err(|e| AuthError::JwksFetch(e.to_string()))?;

        self.entries.write().insert(
            url.to_string(),
            CachedDocument {
                document: document.clone(),
                fetched_at: Instant::now(),
            },
        );

        Ok(document)
    }

    /// Fetch a key set and return its first key as an RS256 decoding key.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::JwksFetch` on fetch failure and
    /// `AuthError::MalformedKeySet` when the document holds no usable key.
    pub async fn get_public_key(&self, jwks_url: &str) -> Result<DecodingKey> {
        let document = self.fetch_document(jwks_url).await?;
        Self::parse_first_key(&document)
    }

    fn parse_first_key(document: &Value) -> Result<DecodingKey> {
        let key = document
            .get("keys")
            .and_then(Value::as_array)
            .and_then(|keys| keys.first())
            .ok_or_else(|| AuthError::MalformedKeySet("key set contains no keys".into()))?;

        match key.get("kty").and_then(Value::as_str) {
            Some("RSA") => {
                let n = key
                    .get("n")
                    .and_then(Value::as_str)
                    .ok_or_else(|| AuthError::MalformedKeySet("RSA key missing n".into()))?;
                let e = key
                    .get("e")
                    .and_then(Value::as_str)
                    .ok_or_else(|| AuthError::MalformedKeySet("RSA key missing e".into()))?;
                DecodingKey::from_rsa_components(n, e)
                    .map_err(|err| AuthError::MalformedKeySet(err.to_string()))
            }
            Some(other) => Err(AuthError::MalformedKeySet(format!(
                "unsupported key type: {other}"
            ))),
            None => Err(AuthError::MalformedKeySet("key missing kty".into())),
        }
    }
}
