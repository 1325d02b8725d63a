//! Error types for `credlock-core`.

use thiserror::Error;

use crate::kdf::Algorithm;

/// Errors produced by credential hashing and verification.
///
/// A verification *mismatch* is not an error: it is `Ok(false)`.
/// No variant ever carries secret material.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// The secret to hash was empty.
    #[error("secret must not be empty")]
    EmptySecret,

    /// The secret exceeds what the algorithm can consume without truncation.
    #[error("secret is {len} bytes, {algorithm} accepts at most {max}")]
    InputTooLong {
        /// Algorithm whose limit was exceeded.
        algorithm: Algorithm,
        /// Length of the presented secret in bytes.
        len: usize,
        /// Maximum accepted length in bytes.
        max: usize,
    },

    /// The entropy source or the digest computation could not complete.
    #[error("hashing failed: {0}")]
    HashingFailed(String),

    /// The stored credential could not be parsed (corrupted or truncated).
    #[error("malformed credential: {0}")]
    MalformedCredential(String),

    /// The credential names a scheme this build does not implement.
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Cost or algorithm parameters are out of range, or the config
    /// source could not be read.
    #[error("invalid hasher configuration: {0}")]
    InvalidConfig(String),
}

impl CredentialError {
    /// Returns `true` for failures a login flow must report exactly like a
    /// mismatch (bad input or bad stored data), and `false` for internal
    /// failures of the hasher itself.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::EmptySecret
                | Self::InputTooLong { .. }
                | Self::MalformedCredential(_)
                | Self::UnsupportedAlgorithm(_)
        )
    }
}
