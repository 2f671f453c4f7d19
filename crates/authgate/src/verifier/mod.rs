//! Token verification.
//!
//! The verifier is the only trust boundary of the gate. Failures come in two
//! families: the token itself is bad, or the verifier could not decide.

mod firebase;

use async_trait::async_trait;
use thiserror::Error;

pub use firebase::{DEFAULT_JWKS_URL, FirebaseVerifier};

/// Identity claims of a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedCredential {
    /// Stable external identity key (`sub` claim).
    pub subject_id: String,
    pub email: Option<String>,
    pub phone_number: Option<String>,
}

/// Verification failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
    /// Malformed, expired, or wrongly signed token.
    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// Key fetch, network or other infrastructure failure.
    #[error("verifier unavailable: {0}")]
    Unavailable(String),
}

pub type VerifyResult<T> = Result<T, VerifyError>;

/// Bearer token verifier.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> VerifyResult<VerifiedCredential>;
}
