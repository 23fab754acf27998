use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tracing::debug;

use shared::types::jwt::JwtClaims;

use super::{AuthError, UserIdentity};

pub const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(24 * 60 * 60);

/// Signs and verifies bearer tokens (HS256 JWTs).
///
/// The secret and lifetime are fixed at construction; there is no global
/// key.  `issue_at` / `decode_at` take the current Unix time explicitly so
/// expiry can be tested without sleeping; `issue` / `decode` read the
/// system clock.
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    lifetime: Duration,
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    pub fn new(secret: &[u8], lifetime: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked in `decode_at` against the caller-supplied clock.
        validation.validate_exp = false;
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            lifetime,
        }
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    pub fn issue(&self, identity: &UserIdentity) -> Result<String, AuthError> {
        self.issue_at(identity, now_unix())
    }

    /// Sign `{username, is_admin}` with `iat = now` and
    /// `exp = now + lifetime`.
    pub fn issue_at(&self, identity: &UserIdentity, now: u64) -> Result<String, AuthError> {
        let claims = JwtClaims {
            username: identity.username.clone(),
            is_admin: identity.is_admin,
            iat: now,
            exp: now.saturating_add(self.lifetime.as_secs()),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }

    pub fn decode(&self, token: &str) -> Result<UserIdentity, AuthError> {
        self.decode_at(token, now_unix())
    }

    pub fn decode_at(&self, token: &str, now: u64) -> Result<UserIdentity, AuthError> {
        let claims = self.decode_claims_at(token, now)?;
        Ok(UserIdentity {
            username: claims.username,
            is_admin: claims.is_admin,
        })
    }

    /// Verify signature and expiry, returning the full wire claims.
    pub fn decode_claims_at(&self, token: &str, now: u64) -> Result<JwtClaims, AuthError> {
        let data = jsonwebtoken::decode::<JwtClaims>(token, &self.decoding, &self.validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        let claims = data.claims;

        if now >= claims.exp {
            debug!("Token for {} expired at {}", claims.username, claims.exp);
            return Err(AuthError::InvalidToken("token expired".to_string()));
        }

        if claims.username.is_empty() {
            return Err(AuthError::InvalidToken("empty username".to_string()));
        }

        Ok(claims)
    }
}

/// Get current Unix timestamp in seconds
pub fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
