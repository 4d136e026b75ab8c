use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::errors::{AppError, Result};
use crate::models::auth::Claims;

pub const TOKEN_TTL_HOURS: i64 = 24;

#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str) -> Self {
        Self::with_ttl(secret, Duration::hours(TOKEN_TTL_HOURS))
    }

    pub fn with_ttl(secret: &str, ttl: Duration) -> Self {
        TokenService {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn issue(&self, username: &str) -> Result<String> {
        let claims = Claims {
            username: username.to_string(),
            exp: (Utc::now() + self.ttl).timestamp().max(0) as usize,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::configuration(format!("Failed to sign token: {}", e)))
    }

    pub fn verify(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AppError::unauthorized("Token expired"),
                _ => AppError::unauthorized("Invalid token"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_verifies_with_username() {
        let tokens = TokenService::new("test-secret");
        let token = tokens.issue("admin").unwrap();

        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.username, "admin");

        let expected_exp = (Utc::now() + Duration::hours(24)).timestamp() as usize;
        assert!(claims.exp.abs_diff(expected_exp) <= 5);
    }

    #[test]
    fn expired_token_is_rejected() {
        let tokens = TokenService::with_ttl("test-secret", Duration::hours(-1));
        let token = tokens.issue("admin").unwrap();

        let err = tokens.verify(&token).unwrap_err();
        assert_eq!(err.to_string(), "Token expired");
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = TokenService::new("other-secret").issue("admin").unwrap();

        let err = TokenService::new("test-secret").verify(&token).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
        assert_eq!(err.to_string(), "Invalid token");
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let tokens = TokenService::new("test-secret");
        let token = tokens.issue("admin").unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();
        parts[1] = "eyJ1c2VybmFtZSI6ImV2ZSIsImV4cCI6OTk5OTk5OTk5OX0";
        let tampered = parts.join(".");

        assert!(tokens.verify(&tampered).is_err());
        assert!(tokens.verify("not-a-jwt").is_err());
    }
}
