use actix_web::cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AppConfig;

pub const TOKEN_COOKIE: &str = "token";
pub const TOKEN_VALIDITY_DAYS: i64 = 365;

// JWT Claims
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    pub email: String,
    pub iat: usize, // issued at
    pub exp: usize, // expiration
    pub jti: String,
}

/// Outcome of checking a session token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenVerdict {
    Verified(Claims),
    Rejected(String),
}

/// Issues and checks the signed identity cookie. No server-side session
/// state exists; everything lives in the token.
#[derive(Clone)]
pub struct SessionService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    secure_cookies: bool,
}

impl SessionService {
    pub fn new(secret: &str, secure_cookies: bool) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            secure_cookies,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(&config.token_secret, config.production)
    }

    pub fn issue_token(&self, email: &str) -> Result<String, String> {
        let now = Utc::now();
        let claims = Claims {
            email: email.to_string(),
            iat: now.timestamp() as usize,
            exp: (now + Duration::days(TOKEN_VALIDITY_DAYS)).timestamp() as usize,
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| format!("Failed to generate token: {}", e))
    }

    pub fn verify_token(&self, token: &str) -> TokenVerdict {
        let validation = Validation::new(Algorithm::HS256);

        match decode::<Claims>(token, &self.decoding_key, &validation) {
            Ok(data) => TokenVerdict::Verified(data.claims),
            Err(e) => TokenVerdict::Rejected(format!("Invalid token: {}", e)),
        }
    }

    /// Identity cookie; cross-site and `secure` only in production.
    pub fn session_cookie(&self, token: String) -> Cookie<'static> {
        let (secure, same_site) = if self.secure_cookies {
            (true, SameSite::None)
        } else {
            (false, SameSite::Strict)
        };

        Cookie::build(TOKEN_COOKIE, token)
            .path("/")
            .http_only(true)
            .secure(secure)
            .same_site(same_site)
            .max_age(CookieDuration::days(TOKEN_VALIDITY_DAYS))
            .finish()
    }

    /// Same attributes as the session cookie, already expired.
    pub fn cleared_cookie(&self) -> Cookie<'static> {
        let mut cookie = self.session_cookie(String::new());
        cookie.make_removal();
        cookie
    }
}
