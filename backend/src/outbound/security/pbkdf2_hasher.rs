//! PBKDF2-SHA256 password hashing encoded as PHC strings.

use pbkdf2::password_hash::{
    Error as PhcError, PasswordHash as PhcString, PasswordHasher as _, PasswordVerifier as _,
    SaltString,
};
use pbkdf2::{Params, Pbkdf2};
use rand::RngCore;

use crate::domain::PasswordHash;
use crate::domain::ports::{PasswordHasher, PasswordHasherError};

const SALT_LEN: usize = 16;

/// PBKDF2 hasher with a configurable round count.
#[derive(Debug, Clone, Default)]
pub struct Pbkdf2PasswordHasher {
    params: Params,
}

impl Pbkdf2PasswordHasher {
    /// Hasher using `rounds` iterations.
    pub fn with_rounds(rounds: u32) -> Self {
        Self {
            params: Params {
                rounds,
                ..Params::default()
            },
        }
    }
}

impl PasswordHasher for Pbkdf2PasswordHasher {
    fn hash(&self, password: &str) -> Result<PasswordHash, PasswordHasherError> {
        let mut salt_bytes = [0_u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt_bytes);
        let salt = SaltString::encode_b64(&salt_bytes)
            .map_err(|err| PasswordHasherError::hash(err.to_string()))?;
        let encoded = Pbkdf2
            .hash_password_customized(password.as_bytes(), None, None, self.params, &salt)
            .map_err(|err| PasswordHasherError::hash(err.to_string()))?;
        Ok(PasswordHash::new(encoded.to_string()))
    }

    fn verify(&self, password: &str, hash: &PasswordHash) -> Result<bool, PasswordHasherError> {
        let parsed = PhcString::new(hash.as_str())
            .map_err(|err| PasswordHasherError::malformed(err.to_string()))?;
        match Pbkdf2.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(PhcError::Password) => Ok(false),
            Err(err) => Err(PasswordHasherError::hash(err.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn hasher() -> Pbkdf2PasswordHasher {
        Pbkdf2PasswordHasher::with_rounds(1_000)
    }

    #[rstest]
    fn hashes_verify_only_their_password(hasher: Pbkdf2PasswordHasher) {
        let hash = hasher.hash("123456").expect("hashed");
        assert!(hash.as_str().starts_with("$pbkdf2-sha256$"));
        assert!(hasher.verify("123456", &hash).expect("verified"));
        assert!(!hasher.verify("654321", &hash).expect("verified"));
    }

    #[rstest]
    fn salts_differ_between_hashes(hasher: Pbkdf2PasswordHasher) {
        let first = hasher.hash("123456").expect("hashed");
        let second = hasher.hash("123456").expect("hashed");
        assert_ne!(first.as_str(), second.as_str());
    }

    #[rstest]
    fn stored_round_count_wins_over_configured(hasher: Pbkdf2PasswordHasher) {
        let hash = hasher.hash("123456").expect("hashed");
        let other = Pbkdf2PasswordHasher::with_rounds(2_000);
        assert!(other.verify("123456", &hash).expect("verified"));
    }

    #[rstest]
    fn malformed_hashes_are_reported(hasher: Pbkdf2PasswordHasher) {
        let err = hasher
            .verify("123456", &PasswordHash::new("not-a-phc-string"))
            .expect_err("malformed");
        assert!(matches!(err, PasswordHasherError::Malformed { .. }));
    }
}
