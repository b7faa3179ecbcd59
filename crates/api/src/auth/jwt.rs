//! Session token issuance and verification
//!
//! Stateless HS256 bearer tokens: subject id, email as a convenience claim,
//! issuance and expiry timestamps. Validity is signature + expiry only;
//! there is no revocation list, a token simply stops being accepted once
//! its expiry passes.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use time::OffsetDateTime;
use uuid::Uuid;

/// Claims carried by a session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Account id the token was issued for
    pub sub: Uuid,
    /// Carried for convenience; not trust-authoritative
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and verifies session tokens against a process-wide secret.
///
/// The secret is owned here, handed in once at startup; all clones share the
/// same key material and no locking is needed since nothing mutates.
#[derive(Clone)]
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    lifetime: Duration,
    validation: Validation,
}

impl JwtManager {
    pub fn new(secret: &str, lifetime: Duration) -> Self {
        // Zero leeway: the expiry boundary is exact and consistent rather
        // than fuzzed by the default 60s grace window.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            lifetime,
            validation,
        }
    }

    /// Issue a token for the given account, expiring `lifetime` from now.
    pub fn issue(&self, subject: Uuid, email: &str) -> Result<String, jsonwebtoken::errors::Error> {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        self.issue_at(subject, email, now)
    }

    fn issue_at(
        &self,
        subject: Uuid,
        email: &str,
        issued_at: i64,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = Claims {
            sub: subject,
            email: email.to_string(),
            iat: issued_at,
            exp: issued_at + self.lifetime.as_secs() as i64,
        };

        encode(&Header::default(), &claims, &self.encoding_key)
    }

    /// Issue a token with a back- or forward-dated issuance instant.
    /// Exists so expiry behavior can be pinned down in tests.
    #[cfg(test)]
    pub(crate) fn issue_backdated(
        &self,
        subject: Uuid,
        email: &str,
        issued_at: i64,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        self.issue_at(subject, email, issued_at)
    }

    /// Verify signature and expiry, in that order.
    ///
    /// Malformed structure, signature mismatch, and elapsed expiry all come
    /// back as the same error type; callers collapse them into one generic
    /// invalid-token response.
    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }
}

/// Parse a `Bearer <token>` authorization header value.
///
/// Missing value, wrong scheme, and empty token all yield `None`.
pub fn extract_bearer(header_value: &str) -> Option<&str> {
    header_value
        .strip_prefix("Bearer ")
        .filter(|token| !token.is_empty())
}
