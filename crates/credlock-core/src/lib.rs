//! `credlock-core`: one-way credential hashing and verification.
//!
//! Turns a plaintext secret into a self-describing credential token
//! (`$2b$...` or `$argon2id$...`) and checks a presented secret against a
//! stored token in constant time. No I/O beyond the OS CSPRNG, no async,
//! no global state: configuration is passed in explicitly.
//!
//! ```no_run
//! use credlock_core::{CredentialHasher, HasherConfig};
//!
//! let hasher = CredentialHasher::new(HasherConfig::default())?;
//! let stored = hasher.hash(b"Secret123!")?;
//! assert!(hasher.verify(b"Secret123!", &stored)?);
//! assert!(!hasher.verify(b"wrongpass", &stored)?);
//! # Ok::<(), credlock_core::CredentialError>(())
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::arithmetic_side_effects))]

pub mod error;
pub mod memory;

pub mod kdf;

pub mod credential;

pub mod config;

pub mod hasher;

pub mod calibrate;

pub mod login;

pub use calibrate::{calibrate, Calibration};
pub use config::HasherConfig;
pub use credential::{BcryptVersion, Credential, Scheme};
pub use error::CredentialError;
pub use hasher::CredentialHasher;
pub use kdf::{Algorithm, Argon2id, Argon2idParams, Bcrypt, Cost, KdfPrimitive};
pub use login::{authenticate, LoginError};
pub use memory::{constant_time_eq, SecretBuffer};
