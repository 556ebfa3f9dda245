use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::Member;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Token expired")]
    Expired,
    #[error("Invalid token")]
    Invalid,
    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

/// Produces the opaque authentication token handed out on login.
#[async_trait]
pub trait TokenIssuer: Send + Sync + 'static {
    async fn issue_token(&self, member: &Member) -> Result<String, TokenError>;
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    pub sub: String, // member id
    pub name: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub secret: String,
    pub issuer: String,
    pub expiry_seconds: i64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            secret: "dev-secret-change-me".to_string(),
            issuer: "lumo".to_string(),
            expiry_seconds: 24 * 60 * 60,
        }
    }
}

#[derive(Clone)]
pub struct JwtTokenIssuer {
    config: TokenConfig,
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl JwtTokenIssuer {
    pub fn new(config: TokenConfig) -> Self {
        let encoding = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding = DecodingKey::from_secret(config.secret.as_bytes());
        Self {
            config,
            encoding,
            decoding,
        }
    }

    /// Checks signature, expiry and issuer, returning the embedded claims.
    pub fn verify_token(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.config.issuer.as_str()]);

        let token_data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            let kind = e.kind();
            if matches!(kind, ErrorKind::ExpiredSignature) {
                TokenError::Expired
            } else if matches!(
                kind,
                ErrorKind::InvalidToken
                    | ErrorKind::InvalidSignature
                    | ErrorKind::InvalidIssuer
                    | ErrorKind::Base64(_)
                    | ErrorKind::Json(_)
                    | ErrorKind::Utf8(_)
            ) {
                TokenError::Invalid
            } else {
                TokenError::JwtError(e)
            }
        })?;

        Ok(token_data.claims)
    }
}

#[async_trait]
impl TokenIssuer for JwtTokenIssuer {
    async fn issue_token(&self, member: &Member) -> Result<String, TokenError> {
        let now = Utc::now();
        let exp = (now + ChronoDuration::seconds(self.config.expiry_seconds)).timestamp();

        let claims = Claims {
            sub: member.id.to_string(),
            name: member.first_name.clone(),
            iss: self.config.issuer.clone(),
            iat: now.timestamp(),
            exp,
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding).map_err(TokenError::JwtError)
    }
}
