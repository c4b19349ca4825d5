//! Secret material for account authentication
//!
//! Passwords are never stored. Each account keeps the Argon2id hash of its
//! secret as a PHC string (algorithm, parameters, salt and digest in one
//! value); login parses it back and verifies against it.

use crate::types::LedgerError;
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use std::fmt;

/// Argon2id hash of an account secret
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    phc: String,
}

impl Credential {
    /// Hash a plaintext secret with a fresh random salt
    ///
    /// # Errors
    ///
    /// `CredentialError` if the hasher rejects the input.
    pub fn derive(secret: &str) -> Result<Self, LedgerError> {
        Self::with_salt(&SaltString::generate(&mut OsRng), secret)
    }

    fn with_salt(salt: &SaltString, secret: &str) -> Result<Self, LedgerError> {
        let phc = Argon2::default()
            .hash_password(secret.as_bytes(), salt)
            .map_err(|e| LedgerError::CredentialError {
                message: e.to_string(),
            })?
            .to_string();

        Ok(Credential { phc })
    }

    /// Check a plaintext secret against this credential
    pub fn verify(&self, secret: &str) -> bool {
        PasswordHash::new(&self.phc)
            .and_then(|hash| Argon2::default().verify_password(secret.as_bytes(), &hash))
            .is_ok()
    }
}

// Keeps hashes and salts out of logs and panic messages.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_accepts_matching_secret() {
        let credential = Credential::derive("hunter2").unwrap();
        assert!(credential.verify("hunter2"));
    }

    #[test]
    fn test_verify_rejects_other_secrets() {
        let credential = Credential::derive("hunter2").unwrap();
        assert!(!credential.verify("hunter3"));
        assert!(!credential.verify("Hunter2"));
        assert!(!credential.verify(""));
    }

    #[test]
    fn test_same_secret_gets_distinct_salts() {
        let first = Credential::derive("secret").unwrap();
        let second = Credential::derive("secret").unwrap();

        assert_ne!(first, second);
        assert!(first.verify("secret"));
        assert!(second.verify("secret"));
    }

    #[test]
    fn test_stored_form_is_argon2id_phc_string() {
        let salt = SaltString::from_b64("c29tZXNhbHRzb21lc2FsdA").unwrap();
        let credential = Credential::with_salt(&salt, "secret").unwrap();

        assert!(credential.phc.starts_with("$argon2id$"));
        assert!(credential.phc.contains("c29tZXNhbHRzb21lc2FsdA"));
        assert!(!credential.phc.contains("secret"));
        assert_eq!(credential, Credential::with_salt(&salt, "secret").unwrap());
    }

    #[test]
    fn test_corrupt_hash_never_verifies() {
        let credential = Credential {
            phc: "not a phc string".to_string(),
        };
        assert!(!credential.verify("anything"));
    }

    #[test]
    fn test_debug_is_redacted() {
        let credential = Credential::derive("hunter2").unwrap();
        let rendered = format!("{:?}", credential);

        assert_eq!(rendered, "Credential(<redacted>)");
        assert!(!rendered.contains("hunter2"));
        assert!(!rendered.contains("argon2"));
    }
}
