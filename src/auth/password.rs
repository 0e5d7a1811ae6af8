//! Password strength checking and hashing.
//!
//! Passwords enter the application as raw strings, get checked for strength as
//! a [ValidatedPassword] and are only ever stored as a salted [PasswordHash].

use std::fmt::Display;

use bcrypt::{BcryptError, hash, verify};
use serde::{Deserialize, Serialize};
use zxcvbn::{Score, zxcvbn};

use crate::Error;

/// A password that passed the strength check but has not been hashed yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatedPassword(String);

impl ValidatedPassword {
    /// Check the strength of `raw_password` and wrap it if it is strong
    /// enough.
    ///
    /// # Errors
    ///
    /// Returns [Error::TooWeak] for passwords that are too easy to guess. The
    /// error carries the strength checker's feedback so it can be shown to
    /// the user.
    pub fn new(raw_password: &str) -> Result<Self, Error> {
        let analysis = zxcvbn(raw_password, &[]);

        if analysis.score() < Score::Three {
            let feedback = analysis
                .feedback()
                .map(ToString::to_string)
                .unwrap_or_default();

            return Err(Error::TooWeak(feedback));
        }

        Ok(Self(raw_password.to_string()))
    }

    /// Wrap `raw_password` without checking its strength.
    ///
    /// This function has `_unchecked` in the name but is not `unsafe`, because
    /// accepting a weak password weakens the account but does not affect
    /// memory safety.
    pub fn new_unchecked(raw_password: &str) -> Self {
        Self(raw_password.to_string())
    }
}

// The password must not end up in logs or error messages.
impl Display for ValidatedPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "********")
    }
}

/// A salted and hashed password as stored in the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// The recommended hashing cost.
    pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

    /// Hash a validated password with the given bcrypt `cost`.
    ///
    /// Higher costs slow down both hashing and verification. Use
    /// [PasswordHash::DEFAULT_COST] outside of tests.
    ///
    /// # Errors
    ///
    /// Returns [Error::HashingError] if the hashing library fails.
    pub fn new(password: ValidatedPassword, cost: u32) -> Result<Self, Error> {
        hash(&password.0, cost)
            .map(Self)
            .map_err(|error| Error::HashingError(error.to_string()))
    }

    /// Wrap `raw_password_hash` without checking that it is a bcrypt hash.
    ///
    /// This function has `_unchecked` in the name but is not `unsafe`, because
    /// a malformed hash makes verification fail but does not affect memory
    /// safety.
    pub fn new_unchecked(raw_password_hash: &str) -> Self {
        Self(raw_password_hash.to_string())
    }

    /// Check the strength of `raw_password` and hash it in one step.
    ///
    /// This is named differently from `From<String>` or `FromStr` on purpose:
    /// the input is a plain text password, not an existing hash to parse.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [ValidatedPassword::new] and
    /// [PasswordHash::new].
    pub fn from_raw_password(raw_password: &str, cost: u32) -> Result<Self, Error> {
        let validated_password = ValidatedPassword::new(raw_password)?;

        PasswordHash::new(validated_password, cost)
    }

    /// Check whether `raw_password` matches this hash.
    pub fn verify(&self, raw_password: &str) -> Result<bool, BcryptError> {
        verify(raw_password, &self.0)
    }
}

impl Display for PasswordHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}


#[cfg(test)]
mod password_hash_tests {
    use crate::auth::{PasswordHash, ValidatedPassword};

    // A bcrypt hash of the password "okon".
    const KNOWN_HASH: &str = "$2b$12$Gwf0uvxH3L7JLfo0CC/NCOoijK2vQ/wbgP.LeNup8vj6gg31IiFkm";

    #[test]
    fn verify_accepts_the_hashed_password() {
        let hash = PasswordHash::new_unchecked(KNOWN_HASH);

        assert!(hash.verify("okon").unwrap());
    }

    #[test]
    fn verify_rejects_other_passwords() {
        let hash = PasswordHash::new_unchecked(KNOWN_HASH);

        assert!(!hash.verify("okoff").unwrap());
    }

    #[test]
    fn hashing_produces_a_verifiable_hash() {
        let password = "roostersgocockledoodledoo";

        let hash = PasswordHash::from_raw_password(password, 4).unwrap();

        assert!(hash.verify(password).unwrap());
        assert!(!hash.verify("the_wrong_password").unwrap());
    }

    #[test]
    fn hashing_the_same_password_twice_gives_different_hashes() {
        let password = ValidatedPassword::new("turkeysgogobblegobble").unwrap();

        let first_hash = PasswordHash::new(password.clone(), 4).unwrap();
        let second_hash = PasswordHash::new(password, 4).unwrap();

        assert_ne!(first_hash, second_hash);
    }

    #[test]
    fn from_raw_password_checks_strength_first() {
        let result = PasswordHash::from_raw_password("password1234", 4);

        assert!(result.is_err());
    }
}
