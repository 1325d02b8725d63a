//! Argon2id primitive (RFC 9106, version 0x13).

use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use super::{check_secret_len, Algorithm, Cost, KdfPrimitive};
use crate::error::CredentialError;
use crate::memory::SecretBuffer;

/// Argon2 version encoded in credentials (`v=19`).
pub const VERSION: u32 = 0x13;

/// Salt length generated for new credentials.
pub const SALT_LEN: usize = 16;

/// Shortest salt accepted when verifying (argon2 minimum).
pub const MIN_SALT_LEN: usize = 8;

/// Longest salt accepted when verifying (PHC recommendation).
pub const MAX_SALT_LEN: usize = 64;

/// Digest length in bytes (256 bits).
pub const DIGEST_LEN: usize = 32;

/// Per-request ceiling on secret length. The primitive itself accepts up
/// to `u32::MAX` bytes; this bounds work done for hostile inputs.
pub const MAX_SECRET_LEN: usize = 1024;

/// Highest accepted memory cost: 1 GiB in KiB.
///
/// Stored credentials carry their own parameters, so these ceilings bound
/// what a corrupted or hostile token can make `verify` allocate or compute.
pub const MAX_M_COST: u32 = 1_048_576;

/// Highest accepted iteration count.
pub const MAX_T_COST: u32 = 64;

/// Highest accepted lane count.
pub const MAX_P_COST: u32 = 16;

/// 19 MiB in KiB.
const MEMORY_19MIB: u32 = 19_456;

/// Argon2id parameter set.
///
/// Fields use the `argon2` crate convention:
/// - `m_cost`: memory in KiB (NOT bytes, NOT MB)
/// - `t_cost`: number of iterations
/// - `p_cost`: degree of parallelism
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Argon2idParams {
    /// Memory cost in kibibytes (1 KiB = 1024 bytes).
    pub m_cost: u32,
    /// Number of iterations (time cost).
    pub t_cost: u32,
    /// Degree of parallelism (number of lanes).
    pub p_cost: u32,
}

impl Default for Argon2idParams {
    /// 19 MiB, 2 iterations, 1 lane.
    fn default() -> Self {
        Self {
            m_cost: MEMORY_19MIB,
            t_cost: 2,
            p_cost: 1,
        }
    }
}

impl Argon2idParams {
    /// Check the parameters against [`MAX_M_COST`], [`MAX_T_COST`],
    /// [`MAX_P_COST`] and the `argon2` crate's own limits.
    ///
    /// # Errors
    ///
    /// Returns `CredentialError::InvalidConfig` naming the violated limit.
    pub fn validate(&self) -> Result<(), CredentialError> {
        for (name, value, max) in [
            ("m_cost", self.m_cost, MAX_M_COST),
            ("t_cost", self.t_cost, MAX_T_COST),
            ("p_cost", self.p_cost, MAX_P_COST),
        ] {
            if value > max {
                return Err(CredentialError::InvalidConfig(format!(
                    "argon2id {name} {value} exceeds {max}"
                )));
            }
        }
        self.to_argon2()
            .map(|_| ())
            .map_err(|e| CredentialError::InvalidConfig(format!("invalid argon2id params: {e}")))
    }

    fn to_argon2(self) -> Result<argon2::Params, argon2::Error> {
        argon2::Params::new(self.m_cost, self.t_cost, self.p_cost, Some(DIGEST_LEN))
    }
}

/// Argon2id primitive.
#[derive(Clone, Copy, Debug, Default)]
pub struct Argon2id;

impl KdfPrimitive for Argon2id {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Argon2id
    }

    fn salt_len(&self) -> usize {
        SALT_LEN
    }

    fn max_secret_len(&self) -> usize {
        MAX_SECRET_LEN
    }

    fn validate_cost(&self, cost: &Cost) -> Result<(), CredentialError> {
        match cost {
            Cost::Argon2id(params) => params.validate(),
            other => Err(CredentialError::InvalidConfig(format!(
                "argon2id cannot run {} parameters",
                other.algorithm()
            ))),
        }
    }

    /// Accepts any secret up to [`MAX_SECRET_LEN`], including empty;
    /// emptiness is policed by the hasher.
    fn derive(
        &self,
        secret: &[u8],
        salt: &[u8],
        cost: &Cost,
    ) -> Result<SecretBuffer, CredentialError> {
        let Cost::Argon2id(params) = *cost else {
            return Err(CredentialError::HashingFailed(format!(
                "argon2id cannot run {} parameters",
                cost.algorithm()
            )));
        };
        check_secret_len(self, secret)?;
        if !(MIN_SALT_LEN..=MAX_SALT_LEN).contains(&salt.len()) {
            return Err(CredentialError::HashingFailed(format!(
                "argon2id salt must be {MIN_SALT_LEN}..={MAX_SALT_LEN} bytes, got {}",
                salt.len()
            )));
        }

        params
            .validate()
            .map_err(|e| CredentialError::HashingFailed(e.to_string()))?;
        let argon2_params = params
            .to_argon2()
            .map_err(|e| CredentialError::HashingFailed(format!("invalid argon2id params: {e}")))?;
        let argon2 = argon2::Argon2::new(
            argon2::Algorithm::Argon2id,
            argon2::Version::V0x13,
            argon2_params,
        );

        let mut output = [0u8; DIGEST_LEN];
        argon2
            .hash_password_into(secret, salt, &mut output)
            .map_err(|e| {
                CredentialError::HashingFailed(format!("argon2id derivation failed: {e}"))
            })?;

        let digest = SecretBuffer::new(&output);
        output.zeroize();
        Ok(digest)
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
