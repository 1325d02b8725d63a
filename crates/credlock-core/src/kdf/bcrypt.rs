//! bcrypt primitive (Blowfish key schedule, `2^cost` rounds).

use zeroize::Zeroize;

use super::{check_secret_len, Algorithm, Cost, KdfPrimitive};
use crate::error::CredentialError;
use crate::memory::SecretBuffer;

/// Lowest accepted log2 rounds.
pub const MIN_COST: u32 = 4;

/// Highest accepted log2 rounds.
pub const MAX_COST: u32 = 31;

/// Cost used when nothing else is configured.
pub const DEFAULT_COST: u32 = 10;

/// Salt length in bytes.
pub const SALT_LEN: usize = 16;

/// Stored digest length: the 24-byte output minus its final byte.
pub const DIGEST_LEN: usize = 23;

/// The key schedule consumes at most 72 bytes, NUL terminator included.
pub const MAX_SECRET_LEN: usize = 72;

/// bcrypt primitive.
#[derive(Clone, Copy, Debug, Default)]
pub struct Bcrypt;

/// Reject rounds outside `MIN_COST..=MAX_COST`.
///
/// # Errors
///
/// Returns `CredentialError::InvalidConfig` when out of range.
pub fn validate_rounds(rounds: u32) -> Result<(), CredentialError> {
    if (MIN_COST..=MAX_COST).contains(&rounds) {
        Ok(())
    } else {
        Err(CredentialError::InvalidConfig(format!(
            "bcrypt cost {rounds} outside {MIN_COST}..={MAX_COST}"
        )))
    }
}

impl KdfPrimitive for Bcrypt {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Bcrypt
    }

    fn salt_len(&self) -> usize {
        SALT_LEN
    }

    fn max_secret_len(&self) -> usize {
        MAX_SECRET_LEN
    }

    fn validate_cost(&self, cost: &Cost) -> Result<(), CredentialError> {
        match cost {
            Cost::Bcrypt(rounds) => validate_rounds(*rounds),
            other => Err(CredentialError::InvalidConfig(format!(
                "bcrypt cannot run {} parameters",
                other.algorithm()
            ))),
        }
    }

    fn derive(
        &self,
        secret: &[u8],
        salt: &[u8],
        cost: &Cost,
    ) -> Result<SecretBuffer, CredentialError> {
        let Cost::Bcrypt(rounds) = *cost else {
            return Err(CredentialError::HashingFailed(format!(
                "bcrypt cannot run {} parameters",
                cost.algorithm()
            )));
        };
        validate_rounds(rounds).map_err(|e| CredentialError::HashingFailed(e.to_string()))?;
        check_secret_len(self, secret)?;

        let salt: [u8; SALT_LEN] = salt.try_into().map_err(|_| {
            CredentialError::HashingFailed(format!(
                "bcrypt salt must be {SALT_LEN} bytes, got {}",
                salt.len()
            ))
        })?;

        // NUL-terminated key, cut at the 72 bytes the key schedule reads.
        let mut key = Vec::with_capacity(secret.len().saturating_add(1));
        key.extend_from_slice(secret);
        key.push(0);
        key.truncate(MAX_SECRET_LEN);

        let mut output = ::bcrypt::bcrypt(rounds, salt, &key);
        key.zeroize();

        let digest = SecretBuffer::new(&output[..DIGEST_LEN]);
        output.zeroize();
        Ok(digest)
    }
}
