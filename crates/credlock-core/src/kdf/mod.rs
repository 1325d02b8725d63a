//! Adaptive key-derivation primitives.
//!
//! This module provides:
//! - [`KdfPrimitive`]: the capability the hasher dispatches to
//! - [`Algorithm`]: algorithm tag carried by every credential
//! - [`Cost`]: algorithm-specific work factor
//! - [`Bcrypt`] and [`Argon2id`]: the two implemented primitives

use std::fmt;
use std::str::FromStr;

use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::CredentialError;
use crate::memory::SecretBuffer;

pub mod argon2id;
pub mod bcrypt;

pub use self::argon2id::{Argon2id, Argon2idParams};
pub use self::bcrypt::Bcrypt;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Password-hashing algorithm family.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// Blowfish-based bcrypt (`$2b$`).
    #[default]
    Bcrypt,
    /// Memory-hard Argon2id, version 0x13 (`$argon2id$`).
    Argon2id,
}

impl Algorithm {
    /// Lowercase name, as used in configuration files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bcrypt => "bcrypt",
            Self::Argon2id => "argon2id",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = CredentialError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bcrypt" => Ok(Self::Bcrypt),
            "argon2id" => Ok(Self::Argon2id),
            other => Err(CredentialError::UnsupportedAlgorithm(other.to_owned())),
        }
    }
}

/// Work factor of one derivation. The variant fixes the algorithm.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cost {
    /// bcrypt log2 rounds (4..=31).
    Bcrypt(u32),
    /// Argon2id memory / iterations / lanes.
    Argon2id(Argon2idParams),
}

impl Cost {
    /// The algorithm this cost applies to.
    #[must_use]
    pub const fn algorithm(&self) -> Algorithm {
        match self {
            Self::Bcrypt(_) => Algorithm::Bcrypt,
            Self::Argon2id(_) => Algorithm::Argon2id,
        }
    }
}

impl fmt::Display for Cost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bcrypt(rounds) => write!(f, "{rounds}"),
            Self::Argon2id(p) => write!(f, "m={},t={},p={}", p.m_cost, p.t_cost, p.p_cost),
        }
    }
}

// ---------------------------------------------------------------------------
// Capability
// ---------------------------------------------------------------------------

/// An adaptive, intentionally slow password-hashing primitive.
///
/// Implementations are stateless apart from constants, so one instance can
/// be shared across threads.
pub trait KdfPrimitive: Send + Sync {
    /// Algorithm implemented by this primitive.
    fn algorithm(&self) -> Algorithm;

    /// Salt length generated for new credentials, in bytes.
    fn salt_len(&self) -> usize;

    /// Longest secret accepted, in bytes.
    fn max_secret_len(&self) -> usize;

    /// Reject a cost this primitive cannot run.
    ///
    /// # Errors
    ///
    /// Returns `CredentialError::InvalidConfig` for out-of-range parameters
    /// or a cost belonging to another algorithm.
    fn validate_cost(&self, cost: &Cost) -> Result<(), CredentialError>;

    /// Derive the digest of `secret` under `salt` and `cost`.
    ///
    /// # Errors
    ///
    /// Returns `CredentialError::HashingFailed` if the computation cannot
    /// complete, or `CredentialError::InputTooLong` past
    /// [`max_secret_len`](Self::max_secret_len).
    fn derive(
        &self,
        secret: &[u8],
        salt: &[u8],
        cost: &Cost,
    ) -> Result<SecretBuffer, CredentialError>;

    /// Produce `len` bytes from a cryptographically secure source.
    ///
    /// # Errors
    ///
    /// Returns `CredentialError::HashingFailed` if the source is unavailable.
    fn secure_random(&self, len: usize) -> Result<Vec<u8>, CredentialError> {
        os_random(len)
    }
}

/// Fill `len` bytes from the operating system CSPRNG.
///
/// # Errors
///
/// Returns `CredentialError::HashingFailed` if the OS source fails.
pub fn os_random(len: usize) -> Result<Vec<u8>, CredentialError> {
    let mut bytes = vec![0u8; len];
    OsRng.try_fill_bytes(&mut bytes).map_err(|e| {
        tracing::warn!(error = %e, "entropy source unavailable");
        CredentialError::HashingFailed(format!("CSPRNG fill failed: {e}"))
    })?;
    Ok(bytes)
}

/// Shared length check applied before any derivation.
pub(crate) fn check_secret_len(
    primitive: &dyn KdfPrimitive,
    secret: &[u8],
) -> Result<(), CredentialError> {
    let max = primitive.max_secret_len();
    if secret.len() > max {
        return Err(CredentialError::InputTooLong {
            algorithm: primitive.algorithm(),
            len: secret.len(),
            max,
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
