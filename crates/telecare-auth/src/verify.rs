//! Inbound gateway/middleware token verification.
//!
//! Requests arriving from field hardware present
//! `Authorization: <SchemeToken> <jwt>` plus an `X-Gateway-Id` header
//! naming the gateway device they belong to. The verifier resolves the
//! gateway's OpenID discovery document, pulls its JWKS through the cache,
//! and verifies the bearer token with RS256.
//!
//! Two variants exist and share the whole verification path; they differ
//! only in the scheme token, the principal they materialize, and which
//! metadata flag picks http vs https for the identity endpoint.

use serde_json::Value;

use telecare_emr::Device;

use crate::error::{AuthError, Result};
use crate::jwks::JwksCache;

/// Header carrying the calling gateway's external id.
pub const GATEWAY_ID_HEADER: &str = "X-Gateway-Id";

/// Which inbound authentication contract a request uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthVariant {
    /// Calls made by the gateway device itself.
    Gateway,
    /// Calls made by middleware running behind a gateway.
    Middleware,
}

impl AuthVariant {
    /// The `Authorization` scheme token for this variant.
    #[must_use]
    pub const fn header_scheme(&self) -> &'static str {
        match self {
            Self::Gateway => "Gateway_Bearer",
            Self::Middleware => "Middleware_Bearer",
        }
    }

    /// The synthetic local principal materialized on success.
    #[must_use]
    pub const fn principal_name(&self) -> &'static str {
        match self {
            Self::Gateway => "telecare-gateway",
            Self::Middleware => "telecare-middleware",
        }
    }

    /// URL scheme for reaching the gateway's identity endpoint.
    ///
    /// The gateway variant reads the `insecure` flag (https unless set);
    /// the middleware variant reads `use_https` (https unless cleared).
    #[must_use]
    pub fn url_scheme(&self, gateway: &Device) -> &'static str {
        match self {
            Self::Gateway => {
                if gateway.metadata_bool("insecure", false) {
                    "http"
                } else {
                    "https"
                }
            }
            Self::Middleware => {
                if gateway.metadata_bool("use_https", true) {
                    "https"
                } else {
                    "http"
                }
            }
        }
    }

    /// Extract the raw token from an `Authorization` header value.
    ///
    /// Returns `Ok(None)` when the header belongs to a different scheme
    /// (so other authenticators may run), and fails when the header uses
    /// this scheme but is malformed.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` when the header does not contain
    /// exactly two space-delimited values.
    pub fn raw_token<'a>(&self, header: &'a str) -> Result<Option<&'a str>> {
        let mut parts = header.split_whitespace();
        match parts.next() {
            None => Ok(None),
            Some(scheme) if scheme != self.header_scheme() => Ok(None),
            Some(_) => {
                let token = parts.next().ok_or(AuthError::InvalidToken)?;
                if parts.next().is_some() {
                    return Err(AuthError::InvalidToken);
                }
                Ok(Some(token))
            }
        }
    }
}

/// The identity materialized for a verified inbound call.
#[derive(Debug, Clone)]
pub struct Principal {
    /// Synthetic local username for the caller.
    pub username: &'static str,
    /// Which contract authenticated the caller.
    pub variant: AuthVariant,
    /// The gateway device the caller authenticated through.
    pub gateway: Device,
    /// Decoded token claims.
    pub claims: Value,
}

/// Verifies inbound tokens against a gateway's own key material.
pub struct GatewayTokenVerifier {
    jwks: JwksCache,
}

impl Default for GatewayTokenVerifier {
    fn default() -> Self {
        Self::new()
    }
}

impl GatewayTokenVerifier {
    /// Create a verifier with a standard cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            jwks: JwksCache::new(),
        }
    }

    /// Create a verifier around an existing cache.
    #[must_use]
    pub const fn with_cache(jwks: JwksCache) -> Self {
        Self { jwks }
    }

    /// Verify `token` against the key material of `gateway`.
    ///
    /// Every verification failure — network, parse, signature, expiry —
    /// is logged with its cause and reported uniformly as
    /// [`AuthError::InvalidToken`]; callers learn nothing about which
    /// check failed.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::GatewayNotConfigured` when the gateway has no
    /// endpoint address, `AuthError::InvalidToken` otherwise.
    pub async fn authenticate(
        &self,
        variant: AuthVariant,
        gateway: &Device,
        token: &str,
    ) -> Result<Principal> {
        let host = gateway
            .metadata_str("endpoint_address")
            .ok_or(AuthError::GatewayNotConfigured)?;
        let scheme = variant.url_scheme(gateway);
        let discovery_url = format!("{scheme}://{host}/.well-known/openid-configuration/");

        match self.verify(&discovery_url, token).await {
            Ok(claims) => Ok(Principal {
                username: variant.principal_name(),
                variant,
                gateway: gateway.clone(),
                claims,
            }),
            Err(err) => {
                tracing::info!(
                    gateway = %gateway.id,
                    error = %err,
                    "Inbound token verification failed"
                );
                Err(AuthError::InvalidToken)
            }
        }
    }

    async fn verify(&self, discovery_url: &str, token: &str) -> Result<Value> {
        let discovery = self.jwks.fetch_document(discovery_url).await?;
        let jwks_uri = discovery
            .get("jwks_uri")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                AuthError::MalformedKeySet("discovery document has no jwks_uri".into())
            })?;

        let key = self.jwks.get_public_key(jwks_uri).await?;

        let mut validation = jsonwebtoken::Validation::new(jsonwebtoken::Algorithm::RS256);
        validation.validate_aud = false;

        let data = jsonwebtoken::decode::<Value>(token, &key, &validation)
            .map_err(|e| AuthError::Rejected(e.to_string()))?;
        Ok(data.claims)
    }
}
