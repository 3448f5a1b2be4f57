use crate::domain::user::{AuthenticatedUser, User};
use argon2::Argon2;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

// Argon2 parameters for 50-150ms target latency
const ARGON2_M_COST: u32 = 19456; // 19 MB
const ARGON2_T_COST: u32 = 2; // 2 iterations
const ARGON2_P_COST: u32 = 1; // 1 parallelism

// Session lifetime; tokens are stateless, expiry is the only revocation.
const TOKEN_TTL_SECS: usize = 2 * 60 * 60;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String, // user_id
    email: String,
    username: String,
    exp: usize,
    iat: usize,
}

fn argon2_instance() -> Result<Argon2<'static>, argon2::password_hash::Error> {
    Ok(Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        argon2::Params::new(ARGON2_M_COST, ARGON2_T_COST, ARGON2_P_COST, None)
            .map_err(argon2::password_hash::Error::from)?,
    ))
}

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = argon2_instance()?.hash_password(password.as_bytes(), &salt)?;
    Ok(password_hash.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed_hash = PasswordHash::new(hash)?;
    match argon2_instance()?.verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(_) => Ok(false),
    }
}

pub fn sign_token(user: &User, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as usize;

    let claims = Claims {
        sub: user.id.clone(),
        email: user.email.clone(),
        username: user.username.clone(),
        exp: now + TOKEN_TTL_SECS,
        iat: now,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
}

pub fn verify_token(
    token: &str,
    secret: &str,
) -> Result<AuthenticatedUser, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 60; // 60 seconds leeway

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &validation,
    )?;

    Ok(AuthenticatedUser {
        user_id: token_data.claims.sub,
        email: token_data.claims.email,
        username: token_data.claims.username,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: "user-123".to_string(),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: String::new(),
            saved_books: vec![],
        }
    }

    #[test]
    fn test_hash_password_generates_argon2id_hash() {
        let hash = hash_password("test_password_123").unwrap();

        assert!(!hash.is_empty());
        assert_ne!(hash, "test_password_123");
        assert!(hash.starts_with("$argon2id$"));
    }

    #[test]
    fn test_hash_password_same_password_produces_different_hashes() {
        let hash1 = hash_password("same_password").unwrap();
        let hash2 = hash_password("same_password").unwrap();

        // Random salt
        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_verify_password_correct_password_returns_true() {
        let hash = hash_password("correct_password").unwrap();
        assert!(verify_password("correct_password", &hash).unwrap());
    }

    #[test]
    fn test_verify_password_incorrect_password_returns_false() {
        let hash = hash_password("correct_password").unwrap();
        assert!(!verify_password("wrong_password", &hash).unwrap());
    }

    #[test]
    fn test_verify_password_invalid_hash_format() {
        let result = verify_password("test_password", "not_a_valid_hash");
        assert!(result.is_err());
    }

    #[test]
    fn test_sign_token_creates_three_part_jwt() {
        let token = sign_token(&sample_user(), "test_secret_key").unwrap();

        assert!(!token.is_empty());
        let parts: Vec<&str> = token.split('.').collect();
        assert_eq!(parts.len(), 3);
    }

    #[test]
    fn test_token_round_trips_identity_claims() {
        let user = sample_user();
        let token = sign_token(&user, "round_trip_secret").unwrap();
        let identity = verify_token(&token, "round_trip_secret").unwrap();

        assert_eq!(identity.user_id, user.id);
        assert_eq!(identity.email, user.email);
        assert_eq!(identity.username, user.username);
    }

    #[test]
    fn test_verify_token_rejects_malformed_token() {
        let result = verify_token("invalid.token.here", "secret_key");
        assert!(result.is_err());
    }

    #[test]
    fn test_verify_token_rejects_token_with_wrong_secret() {
        let token = sign_token(&sample_user(), "correct_secret").unwrap();
        let result = verify_token(&token, "wrong_secret");
        assert!(result.is_err());
    }

    #[test]
    fn test_verify_token_rejects_expired_token() {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs() as usize;

        // Expired well beyond the 60s leeway
        let claims = Claims {
            sub: "user-123".to_string(),
            email: "alice@example.com".to_string(),
            username: "alice".to_string(),
            exp: now - 3600,
            iat: now - 3600 - TOKEN_TTL_SECS,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret("secret".as_ref()),
        )
        .unwrap();

        let result = verify_token(&token, "secret");
        assert!(result.is_err());
    }

    #[test]
    fn test_sign_token_different_users_produce_different_tokens() {
        let mut user2 = sample_user();
        user2.id = "user-456".to_string();

        let token1 = sign_token(&sample_user(), "test_secret").unwrap();
        let token2 = sign_token(&user2, "test_secret").unwrap();

        assert_ne!(token1, token2);
    }
}
