//! Signed bearer tokens for shoppers and the admin panel.
//!
//! Registration hands out a 24h user token carrying username and email.
//! A successful admin login issues a separate short-lived token that every
//! admin-mutating route re-checks; the shared password alone never grants
//! access to a mutation.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const USER_TOKEN_TTL_HOURS: i64 = 24;
const ADMIN_TOKEN_TTL_HOURS: i64 = 1;
const ADMIN_ROLE: &str = "admin";

#[derive(Error, Debug)]
pub enum TokenError {
    #[error("invalid token: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("token does not grant admin access")]
    NotAdmin,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserClaims {
    pub username: String,
    pub email: String,
    pub exp: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AdminClaims {
    pub role: String,
    pub exp: i64,
}

#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenService {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn issue_user(&self, username: &str, email: &str) -> Result<String, TokenError> {
        let claims = UserClaims {
            username: username.to_string(),
            email: email.to_string(),
            exp: (Utc::now() + Duration::hours(USER_TOKEN_TTL_HOURS)).timestamp(),
        };
        Ok(encode(&Header::default(), &claims, &self.encoding)?)
    }

    pub fn verify_user(&self, token: &str) -> Result<UserClaims, TokenError> {
        let data = decode::<UserClaims>(token, &self.decoding, &Validation::default())?;
        Ok(data.claims)
    }

    pub fn issue_admin(&self) -> Result<String, TokenError> {
        let claims = AdminClaims {
            role: ADMIN_ROLE.to_string(),
            exp: (Utc::now() + Duration::hours(ADMIN_TOKEN_TTL_HOURS)).timestamp(),
        };
        Ok(encode(&Header::default(), &claims, &self.encoding)?)
    }

    pub fn verify_admin(&self, token: &str) -> Result<AdminClaims, TokenError> {
        let data = decode::<AdminClaims>(token, &self.decoding, &Validation::default())?;
        if data.claims.role != ADMIN_ROLE {
            return Err(TokenError::NotAdmin);
        }
        Ok(data.claims)
    }
}
