//! Access tokens and password hashing
//!
//! Tokens are HS256 JWTs signed with the shared secret from settings. The
//! payload is the public user record plus an `exp` claim.

use argon2::password_hash::{
    rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::Argon2;
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use log::{debug, warn};

use crate::core::error::{AppError, Result};
use crate::core::models::{User, UserClaims};
use crate::core::settings::Settings;

/// Signing algorithm for every issued token
pub const ALGORITHM: Algorithm = Algorithm::HS256;

/// Issues and validates access tokens
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    /// Token lifetime in seconds
    expiration_seconds: u64,
}

impl TokenService {
    /// Create a token service from a secret and lifetime
    pub fn new(secret: &str, expiration_seconds: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiration_seconds,
        }
    }

    /// Create a token service from the loaded settings
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(&settings.jwt_secret_key, settings.jwt_expiration().as_secs())
    }

    /// Issue a signed token for the user
    pub fn create_access_token(&self, user: &User) -> Result<String> {
        let now = Utc::now().timestamp().max(0) as u64;
        let claims = UserClaims::for_user(user, now + self.expiration_seconds);

        let token = encode(&Header::new(ALGORITHM), &claims, &self.encoding_key)?;
        debug!("Issued access token for {}", user.username);

        Ok(token)
    }

    /// Decode a token, returning `None` when it is expired, forged or malformed
    pub fn validate_access_token(&self, token: &str) -> Option<UserClaims> {
        let mut validation = Validation::new(ALGORITHM);
        validation.leeway = 0;

        match decode::<UserClaims>(token, &self.decoding_key, &validation) {
            Ok(data) => Some(data.claims),
            Err(e) => {
                debug!("Rejected access token: {}", e);
                None
            }
        }
    }
}

/// Hash a plaintext password into an Argon2 PHC string
pub fn hash_password(plain: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::PasswordHash(e.to_string()))
}

/// Check a plaintext password against a stored hash
pub fn verify_password(plain: &str, password_hash: &str) -> bool {
    let parsed = match PasswordHash::new(password_hash) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("Stored password hash is unreadable: {}", e);
            return false;
        }
    };

    Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: "u-1".to_string(),
            name: "Ana".to_string(),
            username: "ana".to_string(),
            cover: "cover.png".to_string(),
        }
    }

    #[test]
    fn test_issued_token_validates() {
        let service = TokenService::new("secret", 60);
        let token = service.create_access_token(&sample_user()).unwrap();

        let claims = service.validate_access_token(&token).unwrap();
        assert_eq!(claims.user(), sample_user());
        assert!(claims.exp > Utc::now().timestamp() as u64);
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let issuer = TokenService::new("secret", 60);
        let other = TokenService::new("another-secret", 60);
        let token = issuer.create_access_token(&sample_user()).unwrap();

        assert!(other.validate_access_token(&token).is_none());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let service = TokenService::new("secret", 60);
        let past = Utc::now().timestamp() as u64 - 10;
        let claims = UserClaims::for_user(&sample_user(), past);
        let token = encode(
            &Header::new(ALGORITHM),
            &claims,
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();

        assert!(service.validate_access_token(&token).is_none());
    }

    #[test]
    fn test_other_algorithm_is_rejected() {
        let service = TokenService::new("secret", 60);
        let future = Utc::now().timestamp() as u64 + 60;
        let claims = UserClaims::for_user(&sample_user(), future);
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();

        assert!(service.validate_access_token(&token).is_none());
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        let service = TokenService::new("secret", 60);
        assert!(service.validate_access_token("not-a-token").is_none());
        assert!(service.validate_access_token("").is_none());
    }

    #[test]
    fn test_password_hash_round_trip() {
        let hash = hash_password("hunter2").unwrap();
        assert_ne!(hash, "hunter2");
        assert!(verify_password("hunter2", &hash));
        assert!(!verify_password("hunter3", &hash));
    }

    #[test]
    fn test_unreadable_hash_never_verifies() {
        assert!(!verify_password("hunter2", "plaintext-from-old-store"));
    }
}
