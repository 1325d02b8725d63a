//! The credential hasher: `hash` and `verify` over injected primitives.
//!
//! New credentials always use the configured algorithm and cost.
//! Verification dispatches on the algorithm tag parsed from the stored
//! credential and reruns the derivation with the credential's own cost, so
//! credentials written under an older, cheaper configuration keep working.

use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::config::HasherConfig;
use crate::credential::{Credential, Scheme};
use crate::error::CredentialError;
use crate::kdf::{check_secret_len, Algorithm, Argon2id, Bcrypt, KdfPrimitive};
use crate::memory::SecretBuffer;

/// Length of the random secret behind the decoy credential.
const DECOY_SECRET_LEN: usize = 32;

/// Stateless apart from configuration; share it behind `&` or `Arc`.
pub struct CredentialHasher {
    config: HasherConfig,
    primitives: Vec<Arc<dyn KdfPrimitive>>,
    decoy: OnceLock<Credential>,
}

impl fmt::Debug for CredentialHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let algorithms: Vec<Algorithm> = self.primitives.iter().map(|p| p.algorithm()).collect();
        f.debug_struct("CredentialHasher")
            .field("config", &self.config)
            .field("primitives", &algorithms)
            .finish_non_exhaustive()
    }
}

impl CredentialHasher {
    /// Hasher with the built-in bcrypt and Argon2id primitives.
    ///
    /// # Errors
    ///
    /// Returns `CredentialError::InvalidConfig` if `config` does not validate.
    pub fn new(config: HasherConfig) -> Result<Self, CredentialError> {
        Self::with_primitives(config, vec![Arc::new(Bcrypt), Arc::new(Argon2id)])
    }

    /// Hasher over an explicit set of primitives.
    ///
    /// Credentials whose algorithm has no primitive here are reported as
    /// `UnsupportedAlgorithm`. When two primitives claim the same algorithm
    /// the first one wins.
    ///
    /// # Errors
    ///
    /// Returns `CredentialError::InvalidConfig` if `config` does not validate
    /// or no primitive implements the configured algorithm.
    pub fn with_primitives(
        config: HasherConfig,
        primitives: Vec<Arc<dyn KdfPrimitive>>,
    ) -> Result<Self, CredentialError> {
        config.validate()?;
        let hasher = Self {
            config,
            primitives,
            decoy: OnceLock::new(),
        };
        let cost = config.cost();
        let primitive = hasher.primitive(cost.algorithm()).ok_or_else(|| {
            CredentialError::InvalidConfig(format!(
                "no primitive registered for configured algorithm {}",
                cost.algorithm()
            ))
        })?;
        primitive.validate_cost(&cost)?;
        Ok(hasher)
    }

    /// Configuration used for new credentials.
    #[must_use]
    pub const fn config(&self) -> &HasherConfig {
        &self.config
    }

    fn primitive(&self, algorithm: Algorithm) -> Option<&dyn KdfPrimitive> {
        self.primitives
            .iter()
            .find(|p| p.algorithm() == algorithm)
            .map(|p| &**p)
    }

    fn configured_primitive(&self) -> Result<&dyn KdfPrimitive, CredentialError> {
        let algorithm = self.config.algorithm;
        self.primitive(algorithm).ok_or_else(|| {
            CredentialError::HashingFailed(format!("no primitive for {algorithm}"))
        })
    }

    fn primitive_for(&self, credential: &Credential) -> Result<&dyn KdfPrimitive, CredentialError> {
        self.primitive(credential.algorithm()).ok_or_else(|| {
            CredentialError::UnsupportedAlgorithm(format!(
                "{} is not enabled in this hasher",
                credential.algorithm()
            ))
        })
    }

    // -----------------------------------------------------------------------
    // Hash
    // -----------------------------------------------------------------------

    /// Hash `secret` into a storable credential token.
    ///
    /// # Errors
    ///
    /// - `EmptySecret` for an empty secret
    /// - `InputTooLong` past the configured algorithm's limit
    /// - `HashingFailed` if the salt or digest cannot be produced
    pub fn hash(&self, secret: &[u8]) -> Result<String, CredentialError> {
        Ok(self.hash_credential(secret)?.to_string())
    }

    /// Like [`hash`](Self::hash), returning the parsed form.
    ///
    /// # Errors
    ///
    /// Same as [`hash`](Self::hash).
    pub fn hash_credential(&self, secret: &[u8]) -> Result<Credential, CredentialError> {
        if secret.is_empty() {
            return Err(CredentialError::EmptySecret);
        }
        let cost = self.config.cost();
        let primitive = self.configured_primitive()?;
        check_secret_len(primitive, secret)?;

        let salt = primitive.secure_random(primitive.salt_len())?;
        if salt.len() != primitive.salt_len() {
            return Err(CredentialError::HashingFailed(format!(
                "entropy source returned {} of {} salt bytes",
                salt.len(),
                primitive.salt_len()
            )));
        }
        let digest = primitive.derive(secret, &salt, &cost)?;

        tracing::debug!(algorithm = %cost.algorithm(), cost = %cost, "credential hashed");
        Ok(Credential::new(
            Scheme::current(cost.algorithm()),
            cost,
            salt,
            digest.expose().to_vec(),
        ))
    }

    // -----------------------------------------------------------------------
    // Verify
    // -----------------------------------------------------------------------

    /// Check `secret` against a stored credential token.
    ///
    /// Returns `Ok(false)` on mismatch. The digest comparison runs in
    /// constant time.
    ///
    /// # Errors
    ///
    /// - `MalformedCredential` if the token does not parse
    /// - `UnsupportedAlgorithm` if it names a scheme this hasher lacks
    /// - `InputTooLong` if `secret` exceeds that scheme's limit
    /// - `HashingFailed` if the derivation cannot complete
    pub fn verify(&self, secret: &[u8], credential: &str) -> Result<bool, CredentialError> {
        let credential = Credential::parse(credential).inspect_err(|e| {
            tracing::warn!(error = %e, "stored credential rejected");
        })?;
        self.verify_credential(secret, &credential)
    }

    /// Like [`verify`](Self::verify), over an already parsed credential.
    ///
    /// # Errors
    ///
    /// Same as [`verify`](Self::verify), minus parsing.
    pub fn verify_credential(
        &self,
        secret: &[u8],
        credential: &Credential,
    ) -> Result<bool, CredentialError> {
        let primitive = self.primitive_for(credential).inspect_err(|e| {
            tracing::warn!(error = %e, "stored credential rejected");
        })?;
        check_secret_len(primitive, secret)?;

        let digest = primitive.derive(secret, credential.salt(), credential.cost())?;
        let matched = digest.ct_eq(credential.digest());

        tracing::debug!(
            algorithm = %credential.algorithm(),
            cost = %credential.cost(),
            matched,
            "credential verified"
        );
        Ok(matched)
    }

    // -----------------------------------------------------------------------
    // Migration
    // -----------------------------------------------------------------------

    /// Whether a stored credential should be replaced by a fresh hash: its
    /// algorithm or cost differs from the current configuration.
    ///
    /// # Errors
    ///
    /// `MalformedCredential` or `UnsupportedAlgorithm` if the token does not
    /// parse.
    pub fn needs_rehash(&self, credential: &str) -> Result<bool, CredentialError> {
        let credential = Credential::parse(credential)?;
        Ok(*credential.cost() != self.config.cost())
    }

    // -----------------------------------------------------------------------
    // Decoy
    // -----------------------------------------------------------------------

    /// Run a full verification against a credential nobody knows the secret
    /// of. Used when an account does not exist, so the caller spends the same
    /// time as for a real mismatch. Always `Ok(false)` unless it errors.
    ///
    /// The first call builds the decoy instead of verifying against it. Either
    /// way the call runs exactly one derivation at the configured cost.
    pub(crate) fn verify_decoy(&self, secret: &[u8]) -> Result<bool, CredentialError> {
        if let Some(decoy) = self.decoy.get() {
            return self.verify_credential(secret, decoy);
        }
        let primitive = self.configured_primitive()?;
        check_secret_len(primitive, secret)?;

        let decoy_secret = SecretBuffer::from_vec(primitive.secure_random(DECOY_SECRET_LEN)?);
        let decoy = self.hash_credential(decoy_secret.expose())?;
        // Concurrent first calls race here; any of their decoys will do.
        let _ = self.decoy.set(decoy);
        Ok(false)
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
