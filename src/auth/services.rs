use crate::auth::dto::Claims;
use crate::config::JwtConfig;
use anyhow::Context;
use argon2::{password_hash::SaltString, Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use lazy_static::lazy_static;
use rand::rngs::OsRng;
use regex::Regex;
use thiserror::Error;
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::{debug, error, warn};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

/// A stored hash that cannot be parsed counts as a mismatch.
pub fn verify_password(plain: &str, hash: &str) -> bool {
    let parsed = match PasswordHash::new(hash) {
        Ok(p) => p,
        Err(e) => {
            warn!(error = %e, "stored password hash is malformed");
            return false;
        }
    };
    Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok()
}

/// Every decode failure (bad signature, garbage, expired) collapses into this.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Invalid token")]
    Invalid,
}

/// Holds JWT signing and verification keys with config data.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    algorithm: Algorithm,
    ttl_minutes: i64,
}

impl JwtKeys {
    pub fn from_config(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            algorithm: cfg.algorithm,
            ttl_minutes: cfg.ttl_minutes,
        }
    }

    /// Signs a token for `subject` with the configured lifetime.
    pub fn issue(&self, subject: &str) -> anyhow::Result<String> {
        self.issue_with_ttl(subject, None)
    }

    /// Signs a token for `subject` living `ttl_minutes`; `None` means the configured lifetime.
    /// A negative lifetime yields an already expired token.
    pub fn issue_with_ttl(&self, subject: &str, ttl_minutes: Option<i64>) -> anyhow::Result<String> {
        let ttl = ttl_minutes.unwrap_or(self.ttl_minutes);
        let exp = ttl
            .checked_mul(60)
            .map(TimeDuration::seconds)
            .and_then(|d| OffsetDateTime::now_utc().checked_add(d))
            .with_context(|| format!("token lifetime of {ttl} minutes is out of range"))?;
        let claims = Claims {
            sub: Some(subject.to_string()),
            exp: exp.unix_timestamp().max(0) as u64,
        };
        let token = encode(&Header::new(self.algorithm), &claims, &self.encoding)?;
        debug!(subject, ttl_minutes = ttl, "jwt signed");
        Ok(token)
    }

    pub fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;
        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            debug!(error = %e, "jwt rejected");
            TokenError::Invalid
        })?;
        Ok(data.claims)
    }
}


#[cfg(test)]
mod jwt_tests {
    use super::*;
    use serde_json::json;

    fn make_keys(secret: &str) -> JwtKeys {
        JwtKeys::from_config(&JwtConfig {
            secret: secret.into(),
            algorithm: Algorithm::HS256,
            ttl_minutes: 5,
        })
    }

    #[test]
    fn issue_and_decode() {
        let keys = make_keys("dev-secret");
        let token = keys.issue("a@x.com").expect("sign");
        let claims = keys.decode(&token).expect("verify");
        assert_eq!(claims.sub.as_deref(), Some("a@x.com"));

        let now = OffsetDateTime::now_utc().unix_timestamp() as u64;
        assert!(claims.exp > now && claims.exp <= now + 5 * 60);
    }

    #[test]
    fn lifetime_override_is_honored() {
        let keys = make_keys("dev-secret");
        let token = keys.issue_with_ttl("a@x.com", Some(60 * 24)).unwrap();
        let claims = keys.decode(&token).unwrap();
        let now = OffsetDateTime::now_utc().unix_timestamp() as u64;
        assert!(claims.exp > now + 60 * 60);
    }

    #[test]
    fn oversized_lifetime_is_an_error() {
        let keys = make_keys("dev-secret");
        assert!(keys.issue_with_ttl("a@x.com", Some(i64::MAX)).is_err());
        assert!(keys.issue_with_ttl("a@x.com", Some(i64::MIN)).is_err());
    }

    #[test]
    fn expired_token_is_invalid() {
        let keys = make_keys("dev-secret");
        let token = keys.issue_with_ttl("a@x.com", Some(-1)).unwrap();
        assert_eq!(keys.decode(&token).unwrap_err(), TokenError::Invalid);
    }

    #[test]
    fn token_from_other_secret_is_invalid() {
        let token = make_keys("one").issue("a@x.com").unwrap();
        assert_eq!(make_keys("two").decode(&token).unwrap_err(), TokenError::Invalid);
    }

    #[test]
    fn garbage_is_invalid() {
        let keys = make_keys("dev-secret");
        assert_eq!(keys.decode("not.a.jwt").unwrap_err(), TokenError::Invalid);
        assert_eq!(keys.decode("").unwrap_err(), TokenError::Invalid);
    }

    #[test]
    fn token_without_subject_still_decodes() {
        let exp = OffsetDateTime::now_utc().unix_timestamp() + 300;
        let token = encode(
            &Header::new(Algorithm::HS256),
            &json!({ "exp": exp }),
            &EncodingKey::from_secret(b"dev-secret"),
        )
        .unwrap();
        let claims = make_keys("dev-secret").decode(&token).unwrap();
        assert!(claims.sub.is_none());
    }
}
