//! Hasher configuration: plain JSON, every field optional.
//!
//! ```json
//! { "algorithm": "bcrypt", "bcryptCost": 10,
//!   "argon2id": { "mCost": 19456, "tCost": 2, "pCost": 1 } }
//! ```
//!
//! The configuration is handed to [`CredentialHasher::new`](crate::CredentialHasher::new)
//! explicitly; nothing here reads process-wide state.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CredentialError;
use crate::kdf::{bcrypt, Algorithm, Argon2idParams, Cost};

/// Algorithm and work factors used for *new* credentials.
///
/// Verification always uses the parameters embedded in the stored
/// credential, so raising these never invalidates existing data.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HasherConfig {
    /// Algorithm for new credentials.
    #[serde(default)]
    pub algorithm: Algorithm,

    /// bcrypt log2 rounds (4..=31).
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,

    /// Argon2id parameters.
    #[serde(default)]
    pub argon2id: Argon2idParams,
}

impl Default for HasherConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::default(),
            bcrypt_cost: default_bcrypt_cost(),
            argon2id: Argon2idParams::default(),
        }
    }
}

const fn default_bcrypt_cost() -> u32 {
    bcrypt::DEFAULT_COST
}

impl HasherConfig {
    /// bcrypt at the given cost, other fields default.
    #[must_use]
    pub fn bcrypt(cost: u32) -> Self {
        Self {
            algorithm: Algorithm::Bcrypt,
            bcrypt_cost: cost,
            ..Self::default()
        }
    }

    /// Argon2id with the given parameters, other fields default.
    #[must_use]
    pub fn argon2id(params: Argon2idParams) -> Self {
        Self {
            algorithm: Algorithm::Argon2id,
            argon2id: params,
            ..Self::default()
        }
    }

    /// The cost new credentials are produced with.
    #[must_use]
    pub const fn cost(&self) -> Cost {
        match self.algorithm {
            Algorithm::Bcrypt => Cost::Bcrypt(self.bcrypt_cost),
            Algorithm::Argon2id => Cost::Argon2id(self.argon2id),
        }
    }

    /// Replace the cost of `cost.algorithm()` and switch to that algorithm.
    #[must_use]
    pub fn with_cost(mut self, cost: Cost) -> Self {
        match cost {
            Cost::Bcrypt(rounds) => {
                self.algorithm = Algorithm::Bcrypt;
                self.bcrypt_cost = rounds;
            }
            Cost::Argon2id(params) => {
                self.algorithm = Algorithm::Argon2id;
                self.argon2id = params;
            }
        }
        self
    }

    /// Check every parameter, including those of the inactive algorithm.
    ///
    /// # Errors
    ///
    /// Returns `CredentialError::InvalidConfig` naming the bad field.
    pub fn validate(&self) -> Result<(), CredentialError> {
        bcrypt::validate_rounds(self.bcrypt_cost)?;
        self.argon2id.validate()
    }

    /// Parse and validate a JSON document.
    ///
    /// # Errors
    ///
    /// Returns `CredentialError::InvalidConfig` on bad JSON or bad values.
    pub fn from_json(json: &str) -> Result<Self, CredentialError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| CredentialError::InvalidConfig(format!("bad config JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file.
    ///
    /// A missing or corrupt file is an error, never a fallback to defaults.
    ///
    /// # Errors
    ///
    /// Returns `CredentialError::InvalidConfig` if the file cannot be read
    /// or does not validate.
    pub fn from_file(path: &Path) -> Result<Self, CredentialError> {
        let contents = fs::read_to_string(path).map_err(|e| {
            CredentialError::InvalidConfig(format!("cannot read {}: {e}", path.display()))
        })?;
        let config = Self::from_json(&contents)?;
        tracing::debug!(
            path = %path.display(),
            algorithm = %config.algorithm,
            cost = %config.cost(),
            "hasher config loaded"
        );
        Ok(config)
    }

    /// Persist as pretty JSON.
    ///
    /// Writes to a sibling `.tmp` file, then renames over `path`.
    ///
    /// # Errors
    ///
    /// Returns an `io::Error` if the write or rename fails.
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }
}
