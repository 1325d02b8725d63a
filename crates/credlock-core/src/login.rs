//! Login-facing wrapper around [`CredentialHasher::verify`].
//!
//! Account services must not reveal *why* a login failed. [`authenticate`]
//! folds a mismatch, an unknown account, a corrupt or unsupported stored
//! credential and unacceptable input into one [`LoginError::InvalidCredentials`].
//! Only failures of the hasher itself stay distinguishable.

use thiserror::Error;

use crate::error::CredentialError;
use crate::hasher::CredentialHasher;

/// Outcome of a failed login.
#[derive(Debug, Error)]
pub enum LoginError {
    /// Secret and account do not match. Deliberately uninformative.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The hasher could not run (entropy or derivation failure).
    #[error("credential check failed")]
    Internal(#[source] CredentialError),
}

/// Check `secret` against the stored credential of an account.
///
/// Pass `None` when the account does not exist: a decoy credential is
/// verified instead so both paths cost the same.
///
/// # Errors
///
/// `LoginError::InvalidCredentials` for every rejection,
/// `LoginError::Internal` for `HashingFailed` / `InvalidConfig`.
pub fn authenticate(
    hasher: &CredentialHasher,
    secret: &[u8],
    stored: Option<&str>,
) -> Result<(), LoginError> {
    let outcome = match stored {
        Some(credential) => hasher.verify(secret, credential),
        None => hasher.verify_decoy(secret).map(|_| false),
    };

    match outcome {
        Ok(true) => Ok(()),
        Ok(false) => Err(LoginError::InvalidCredentials),
        Err(e) if e.is_rejection() => {
            tracing::debug!(error = %e, "login rejected");
            Err(LoginError::InvalidCredentials)
        }
        Err(e) => {
            tracing::error!(error = %e, "credential check failed");
            Err(LoginError::Internal(e))
        }
    }
}
