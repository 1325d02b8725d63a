//! CLI command implementations.
//!
//! Every command takes its input and output streams as arguments so the
//! tests can drive them with in-memory buffers.

use std::io::{BufRead, Write};
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use credlock_core::{
    authenticate, calibrate as run_calibration, Algorithm, Credential, CredentialHasher,
    HasherConfig, LoginError, SecretBuffer,
};
use zeroize::Zeroizing;

/// How a command finished when it did not error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// The secret did not match (or the credential was unusable).
    Rejected,
}

/// Resolve the hasher configuration: file (or defaults), then flag overrides.
pub fn load_config(
    path: Option<&Path>,
    algorithm: Option<Algorithm>,
    bcrypt_cost: Option<u32>,
) -> Result<HasherConfig> {
    let mut config = match path {
        Some(path) => HasherConfig::from_file(path)
            .with_context(|| format!("cannot load config {}", path.display()))?,
        None => HasherConfig::default(),
    };
    if let Some(algorithm) = algorithm {
        config.algorithm = algorithm;
    }
    if let Some(cost) = bcrypt_cost {
        config.bcrypt_cost = cost;
    }
    config.validate().context("invalid configuration")?;
    tracing::debug!(algorithm = %config.algorithm, cost = %config.cost(), "configuration resolved");
    Ok(config)
}

/// Read one line from `input`, without its line terminator.
pub fn read_secret(input: &mut impl BufRead) -> Result<SecretBuffer> {
    let mut line = Zeroizing::new(Vec::new());
    input
        .read_until(b'\n', &mut line)
        .context("cannot read secret from stdin")?;
    let secret = line.strip_suffix(b"\n").unwrap_or(&line[..]);
    let secret = secret.strip_suffix(b"\r").unwrap_or(secret);
    Ok(SecretBuffer::new(secret))
}

/// Hash the secret on `input`, print the credential.
pub fn hash(
    hasher: &CredentialHasher,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> Result<Outcome> {
    let secret = read_secret(input)?;
    let credential = hasher.hash(secret.expose()).context("cannot hash secret")?;
    writeln!(output, "{credential}")?;
    Ok(Outcome::Success)
}

/// Check the secret on `input` against `credential`.
pub fn verify(
    hasher: &CredentialHasher,
    credential: &str,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> Result<Outcome> {
    let secret = read_secret(input)?;
    match authenticate(hasher, secret.expose(), Some(credential)) {
        Ok(()) => {
            writeln!(output, "ok")?;
            if hasher.needs_rehash(credential).unwrap_or(false) {
                writeln!(output, "rehash recommended: cost differs from configuration")?;
            }
            Ok(Outcome::Success)
        }
        Err(LoginError::InvalidCredentials) => {
            writeln!(output, "invalid credentials")?;
            Ok(Outcome::Rejected)
        }
        Err(e) => Err(e.into()),
    }
}

/// Describe a credential without revealing its salt or digest.
pub fn inspect(
    hasher: &CredentialHasher,
    credential: &str,
    output: &mut impl Write,
) -> Result<Outcome> {
    let parsed = Credential::parse(credential).context("cannot parse credential")?;
    let needs_rehash = hasher.needs_rehash(credential)?;

    writeln!(output, "algorithm:    {}", parsed.algorithm())?;
    writeln!(output, "identifier:   ${}$", parsed.scheme().ident())?;
    writeln!(output, "cost:         {}", parsed.cost())?;
    writeln!(output, "needs rehash: {}", if needs_rehash { "yes" } else { "no" })?;
    Ok(Outcome::Success)
}

/// Benchmark the configured algorithm and optionally save the result.
pub fn calibrate(
    config: &HasherConfig,
    target_ms: u64,
    write_config: Option<&Path>,
    output: &mut impl Write,
) -> Result<Outcome> {
    let calibration = run_calibration(config, Duration::from_millis(target_ms))
        .context("calibration failed")?;

    writeln!(
        output,
        "{} cost {} takes {} ms",
        calibration.cost.algorithm(),
        calibration.cost,
        calibration.elapsed.as_millis()
    )?;
    if !calibration.reached_target {
        writeln!(
            output,
            "warning: target of {target_ms} ms not reached at the highest cost tried"
        )?;
    }

    if let Some(path) = write_config {
        calibration
            .apply(*config)
            .save(path)
            .with_context(|| format!("cannot write config {}", path.display()))?;
        writeln!(output, "configuration written to {}", path.display())?;
    }
    Ok(Outcome::Success)
}
