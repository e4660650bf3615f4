// src/crypto.rs
use crate::config::Argon2Params;
use crate::error::{CryptoError, CryptoResult};
use log;

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use rand::RngCore;

const SALT_LEN: usize = 16;

/// Hashes an admin password with Argon2id and a fresh random salt.
/// Returns the PHC string, which carries salt and params for verification.
pub fn hash_password(password: &str, argon2_config: &Argon2Params) -> CryptoResult<String> {
    let mut salt_bytes = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt_bytes);

    let salt = SaltString::b64_encode(&salt_bytes).map_err(|e| {
        let msg = format!("Salt encoding failed: {}", e);
        log::error!("hash_password: {}", msg);
        CryptoError::Argon2(msg)
    })?;

    let params = argon2::Params::new(
        argon2_config.m_cost,
        argon2_config.t_cost,
        argon2_config.p_cost,
        None,
    )
    .map_err(|e| {
        let msg = format!("Argon2 params error: {}", e);
        log::error!("hash_password: {}", msg);
        CryptoError::Argon2(msg)
    })?;
    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| {
            let msg = format!("Hashing failed: {}", e);
            log::error!("hash_password: {}", msg);
            CryptoError::Argon2(msg)
        })?
        .to_string();

    Ok(password_hash)
}

/// Checks `password` against a PHC string produced by [`hash_password`].
/// A mismatch is `Ok(false)`; only a broken hash or hasher is an error.
pub fn verify_password(hashed_password: &str, password: &str) -> CryptoResult<bool> {
    let parsed_hash = PasswordHash::new(hashed_password).map_err(|e| {
        let msg = format!("Parsing hash failed: {}", e);
        log::error!("verify_password: {}", msg);
        CryptoError::MalformedHash(msg)
    })?;

    // Params come from the parsed hash.
    let argon2 = Argon2::default();

    match argon2.verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => {
            let msg = format!("Verification failed: {}", e);
            log::error!("verify_password: {}", msg);
            Err(CryptoError::Argon2(msg))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap_params() -> Argon2Params {
        Argon2Params { m_cost: 1024, t_cost: 1, p_cost: 1 }
    }

    #[test]
    fn test_hash_and_verify_password() {
        let hashed = hash_password("admin123", &cheap_params()).expect("Hashing failed");
        assert!(hashed.starts_with("$argon2id$"));
        assert!(verify_password(&hashed, "admin123").expect("Verification failed"));
        assert!(!verify_password(&hashed, "admin124").expect("Mismatch should not be an error"));
    }

    #[test]
    fn test_hashes_are_salted() {
        let first = hash_password("samepass", &cheap_params()).unwrap();
        let second = hash_password("samepass", &cheap_params()).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        match verify_password("not-a-phc-string", "whatever") {
            Err(CryptoError::MalformedHash(_)) => {}
            other => panic!("Expected MalformedHash, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_params_are_reported() {
        let params = Argon2Params { m_cost: 1, t_cost: 0, p_cost: 0 };
        assert!(matches!(hash_password("pw", &params), Err(CryptoError::Argon2(_))));
    }

    #[test]
    fn test_default_params_are_valid() {
        let defaults = Argon2Params::default();
        let params = argon2::Params::new(defaults.m_cost, defaults.t_cost, defaults.p_cost, None);
        assert!(params.is_ok());
    }
}
