//! Credential primitives used by the auth gate.
//!
//! Stored accounts keep bcrypt hashes. Static role credentials come from
//! configuration in plain form and are compared through SHA-256 digests with
//! a constant-time equality check.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use thiserror::Error;

use crate::config::StaticCredential;

/// Role a successful credential check proves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Surveyor,
    Developer,
}

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("Password hashing task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Hash a password for storage. bcrypt is CPU-bound, so it runs on the
/// blocking pool.
pub async fn hash_password(password: &str, cost: u32) -> Result<String, CredentialError> {
    let password = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await??;
    Ok(hashed)
}

/// Check a password against a stored bcrypt hash. A malformed stored hash
/// counts as a mismatch.
pub async fn verify_password(password: &str, hash: &str) -> Result<bool, CredentialError> {
    let password = password.to_owned();
    let hash = hash.to_owned();
    let result = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await?;
    match result {
        Ok(matched) => Ok(matched),
        Err(e) => {
            tracing::warn!("Stored password hash could not be verified: {}", e);
            Ok(false)
        }
    }
}

fn digest(value: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    hasher.finalize().into()
}

fn digest_eq(a: &str, b: &str) -> bool {
    digest(a).ct_eq(&digest(b)).into()
}

/// True when both email and password equal the static credential.
pub fn static_credential_matches(credential: &StaticCredential, email: &str, password: &str) -> bool {
    // Evaluate both halves so timing does not reveal which one failed.
    let email_ok = digest_eq(&credential.email, email);
    let password_ok = digest_eq(&credential.password, password);
    email_ok & password_ok
}
