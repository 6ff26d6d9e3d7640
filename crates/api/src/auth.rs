//! Bearer-token authentication.
//!
//! Requests carry an HS256 JWT in the `Authorization` header. A missing
//! token is a 401, an invalid or expired one a 403; either way the request
//! is rejected before any store access.

use axum::extract::{FromRef, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use common::UserId;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

/// Claims carried by the booking token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// The authenticated user.
    pub sub: Uuid,
    /// Expiry as a Unix timestamp.
    pub exp: i64,
}

/// Signing and verification keys derived from the shared secret.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl JwtKeys {
    /// Creates keys from the shared HMAC secret.
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Issues a token for a user, valid for `ttl`.
    pub fn issue(
        &self,
        user_id: UserId,
        ttl: Duration,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = Claims {
            sub: user_id.as_uuid(),
            exp: (Utc::now() + ttl).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
    }

    /// Verifies a token and returns its claims.
    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        decode::<Claims>(token, &self.decoding, &Validation::default()).map(|data| data.claims)
    }
}

/// Extractor for the authenticated caller.
///
/// Fails closed: handlers taking an `AuthUser` never run without a verified
/// credential.
#[derive(Debug)]
pub struct AuthUser(pub UserId);

impl<St> FromRequestParts<St> for AuthUser
where
    JwtKeys: FromRef<St>,
    St: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &St) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|header| header.strip_prefix("Bearer "))
            .ok_or_else(|| ApiError::Unauthorized("missing bearer token".to_string()))?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys
            .verify(token)
            .map_err(|_| ApiError::Forbidden("invalid or expired token".to_string()))?;

        Ok(AuthUser(UserId::from_uuid(claims.sub)))
    }
}
