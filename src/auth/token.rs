//! HS256 access tokens issued by the gateway.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

use super::error::{AuthError, AuthResult};

/// Scopes granted to every issued token.
pub const DEFAULT_SCOPES: [&str; 2] = ["read", "write"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub scopes: Vec<String>,
    pub iat: i64,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_method: Option<String>,
}

/// Response body of the token endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AccessToken {
    pub access_token: String,
    #[schema(example = "bearer")]
    pub token_type: String,
    /// Lifetime in seconds
    #[schema(example = 1800)]
    pub expires_in: i64,
}

/// Optional profile data carried in a token.
#[derive(Debug, Clone, Default)]
pub struct Profile {
    pub email: Option<String>,
    pub name: Option<String>,
    pub auth_method: Option<String>,
}

pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str, ttl_minutes: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
            ttl: Duration::minutes(ttl_minutes),
        }
    }

    pub fn ttl_seconds(&self) -> i64 {
        self.ttl.num_seconds()
    }

    pub fn issue(&self, subject: &str, profile: Profile) -> AuthResult<AccessToken> {
        let now = Utc::now();
        let claims = Claims {
            sub: subject.to_string(),
            scopes: DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
            email: profile.email,
            name: profile.name,
            auth_method: profile.auth_method,
        };

        let access_token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::Token {
                message: e.to_string(),
            })?;
        debug!(sub = %subject, "Issued access token");

        Ok(AccessToken {
            access_token,
            token_type: "bearer".to_string(),
            expires_in: self.ttl_seconds(),
        })
    }

    /// Check signature and expiry.
    pub fn verify(&self, token: &str) -> AuthResult<Claims> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| AuthError::Unauthenticated {
                reason: format!("invalid token: {}", e),
            })
    }
}
