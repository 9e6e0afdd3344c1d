//! HS256 JSON Web Tokens carrying the user id as subject.

use std::sync::Arc;

use chrono::Duration;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::domain::UserId;
use crate::domain::ports::{IssuedToken, TokenError, TokenService};

/// Signing secret and token lifetime.
pub struct JwtSettings {
    pub secret: Zeroizing<String>,
    pub lifetime: Duration,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
}

/// Token service signing with a shared HMAC secret.
pub struct JwtTokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    lifetime: Duration,
    clock: Arc<dyn Clock>,
}

impl JwtTokenService {
    /// Build the service; the secret is copied into the key material.
    pub fn new(settings: JwtSettings, clock: Arc<dyn Clock>) -> Self {
        let secret = settings.secret.as_bytes();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            lifetime: settings.lifetime,
            clock,
        }
    }
}

impl TokenService for JwtTokenService {
    fn issue(&self, user: &UserId) -> Result<IssuedToken, TokenError> {
        let issued_at = self.clock.utc();
        let expires_at = issued_at
            .checked_add_signed(self.lifetime)
            .ok_or_else(|| TokenError::signing("token expiry is out of range"))?;
        let claims = Claims {
            sub: user.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|err| TokenError::signing(err.to_string()))?;
        Ok(IssuedToken { token, expires_at })
    }

    fn verify(&self, token: &str) -> Result<UserId, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|err| TokenError::invalid(err.to_string()))?;
        UserId::new(&data.claims.sub).map_err(|_| TokenError::invalid("subject is not a user id"))
    }
}
