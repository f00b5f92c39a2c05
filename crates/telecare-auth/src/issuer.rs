//! Outbound token issuance.
//!
//! The relay client authenticates to gateways with a platform-signed JWT.
//! Tokens are minted fresh for every call — a token that leaks in a
//! gateway's request log is only useful for the configured lifetime.

use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AuthError, Result};

/// Configuration for the platform token issuer.
#[derive(Debug, Clone)]
pub struct IssuerConfig {
    /// RS256 private key, PEM encoded (PKCS#1 or PKCS#8).
    pub private_key_pem: String,
    /// Key id stamped into token headers and matching the published JWKS.
    pub key_id: Option<String>,
    /// Issuer identity (`iss` claim).
    pub issuer: String,
    /// Token lifetime in seconds.
    pub token_lifetime_secs: u64,
    /// The platform's public key set, served at `/.well-known/jwks.json`.
    pub public_jwks: Value,
}

impl IssuerConfig {
    /// Default token lifetime: five minutes.
    pub const DEFAULT_LIFETIME_SECS: u64 = 300;
}

/// Claims carried by an outbound relay token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayClaims {
    /// Issuer identity.
    pub iss: String,
    /// Issued-at timestamp.
    pub iat: i64,
    /// Expiry timestamp.
    pub exp: i64,
    /// Unique token id; no two issued tokens share one.
    pub jti: String,
}

/// Signs short-lived platform identity tokens.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    header: Header,
    issuer: String,
    lifetime_secs: i64,
    public_jwks: Value,
}

impl TokenIssuer {
    /// Create an issuer from configuration.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidKey` if the PEM private key cannot be
    /// parsed.
    pub fn new(config: IssuerConfig) -> Result<Self> {
        let encoding_key = EncodingKey::from_rsa_pem(config.private_key_pem.as_bytes())
            .map_err(|e| AuthError::InvalidKey(e.to_string()))?;

        let mut header = Header::new(Algorithm::RS256);
        header.kid = config.key_id;

        Ok(Self {
            encoding_key,
            header,
            issuer: config.issuer,
            lifetime_secs: i64::try_from(config.token_lifetime_secs).unwrap_or(i64::MAX),
            public_jwks: config.public_jwks,
        })
    }

    /// Mint a fresh token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Signing` if encoding fails.
    pub fn sign(&self) -> Result<String> {
        let now = Utc::now().timestamp();
        let claims = RelayClaims {
            iss: self.issuer.clone(),
            iat: now,
            exp: now + self.lifetime_secs,
            jti: uuid::Uuid::new_v4().to_string(),
        };

        encode(&self.header, &claims, &self.encoding_key)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }

    /// The platform's published key set.
    #[must_use]
    pub const fn public_jwks(&self) -> &Value {
        &self.public_jwks
    }

    /// The configured issuer identity.
    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.issuer
    }
}
