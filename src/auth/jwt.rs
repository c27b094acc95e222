use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::JwtConfig;

pub const ACCESS_TOKEN_TTL_SECS: i64 = 60 * 60;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: Uuid,
    pub name: String,
    pub roles: Vec<String>,
    pub iss: String,
    pub aud: String,
    pub exp: i64,
    pub iat: i64,
    /// Id of the `user_tokens` row this token was issued with.
    pub jti: Uuid,
}

impl Claims {
    pub fn new(
        user_id: Uuid,
        username: String,
        roles: Vec<String>,
        token_id: Uuid,
        issued_at: DateTime<Utc>,
        config: &JwtConfig,
    ) -> Self {
        Self {
            sub: user_id,
            name: username,
            roles,
            iss: config.issuer.clone(),
            aud: config.audience.clone(),
            exp: (issued_at + Duration::seconds(ACCESS_TOKEN_TTL_SECS)).timestamp(),
            iat: issued_at.timestamp(),
            jti: token_id,
        }
    }
}

pub fn encode_token(claims: &Claims, config: &JwtConfig) -> Result<String, String> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(|e| format!("JWT encode failed: {e}"))
}

pub fn decode_token(token: &str, config: &JwtConfig) -> Result<Claims, String> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[&config.issuer]);
    validation.set_audience(&[&config.audience]);

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| format!("JWT decode failed: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-that-is-at-least-32-chars-long".to_string(),
            issuer: "workforce".to_string(),
            audience: "workforce-clients".to_string(),
        }
    }

    #[test]
    fn token_carries_roles_and_token_id() {
        let config = config();
        let token_id = Uuid::now_v7();
        let claims = Claims::new(
            Uuid::now_v7(),
            "alice".to_string(),
            vec!["Admin".to_string()],
            token_id,
            Utc::now(),
            &config,
        );

        let token = encode_token(&claims, &config).unwrap();
        let decoded = decode_token(&token, &config).unwrap();

        assert_eq!(decoded.sub, claims.sub);
        assert_eq!(decoded.roles, vec!["Admin".to_string()]);
        assert_eq!(decoded.jti, token_id);
        assert_eq!(decoded.exp - decoded.iat, 3600);
    }

    #[test]
    fn wrong_audience_is_rejected() {
        let config = config();
        let claims = Claims::new(Uuid::now_v7(), "bob".to_string(), vec![], Uuid::now_v7(), Utc::now(), &config);
        let token = encode_token(&claims, &config).unwrap();

        let other = JwtConfig {
            audience: "someone-else".to_string(),
            ..config
        };
        assert!(decode_token(&token, &other).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let config = config();
        let issued = Utc::now() - Duration::hours(3);
        let claims = Claims::new(Uuid::now_v7(), "carol".to_string(), vec![], Uuid::now_v7(), issued, &config);
        let token = encode_token(&claims, &config).unwrap();

        assert!(decode_token(&token, &config).is_err());
    }
}
