//! Hardware calibration of the work factor.
//!
//! Starting from the cheapest cost, runs real derivations and raises the
//! cost until one derivation takes at least the target duration:
//! - bcrypt raises the log2 rounds (each step doubles the work)
//! - Argon2id raises `t_cost` at the configured memory and lanes

use std::time::{Duration, Instant};

use crate::config::HasherConfig;
use crate::error::CredentialError;
use crate::kdf::{bcrypt, Argon2id, Argon2idParams, Bcrypt, Cost, KdfPrimitive};

/// Highest bcrypt cost calibration will try (~minutes per hash beyond).
pub const BCRYPT_CEILING: u32 = 20;

/// Highest Argon2id `t_cost` calibration will try.
pub const ARGON2ID_T_CEILING: u32 = 16;

const PROBE_SECRET: &[u8] = b"calibration_probe";
const PROBE_SALT: &[u8; 16] = b"calibration_salt";

/// Outcome of [`calibrate`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use]
pub struct Calibration {
    /// Cheapest cost meeting the target, or the ceiling.
    pub cost: Cost,
    /// Duration of one derivation at `cost`.
    pub elapsed: Duration,
    /// `false` when the ceiling was hit before reaching the target.
    pub reached_target: bool,
}

impl Calibration {
    /// `config` with the calibrated cost applied.
    #[must_use]
    pub fn apply(&self, config: HasherConfig) -> HasherConfig {
        config.with_cost(self.cost)
    }
}

/// Benchmark the configured algorithm on this machine.
///
/// # Errors
///
/// Returns `CredentialError::InvalidConfig` if `config` does not validate,
/// or `CredentialError::HashingFailed` if a probe derivation fails.
pub fn calibrate(config: &HasherConfig, target: Duration) -> Result<Calibration, CredentialError> {
    config.validate()?;
    let calibration = match config.cost() {
        Cost::Bcrypt(_) => search(&Bcrypt, bcrypt::MIN_COST, BCRYPT_CEILING, target, Cost::Bcrypt)?,
        Cost::Argon2id(base) => search(&Argon2id, 1, ARGON2ID_T_CEILING, target, |t_cost| {
            Cost::Argon2id(Argon2idParams { t_cost, ..base })
        })?,
    };
    tracing::info!(
        algorithm = %calibration.cost.algorithm(),
        cost = %calibration.cost,
        elapsed_ms = calibration.elapsed.as_millis(),
        reached_target = calibration.reached_target,
        "calibration finished"
    );
    Ok(calibration)
}

/// Walk `start..=ceiling`, returning the first step at or above `target`.
fn search(
    primitive: &dyn KdfPrimitive,
    start: u32,
    ceiling: u32,
    target: Duration,
    cost_at: impl Fn(u32) -> Cost,
) -> Result<Calibration, CredentialError> {
    let mut step = start;
    loop {
        let cost = cost_at(step);
        let elapsed = time_derivation(primitive, &cost)?;
        tracing::debug!(cost = %cost, elapsed_ms = elapsed.as_millis(), "calibration probe");

        let reached_target = elapsed >= target;
        if reached_target || step >= ceiling {
            return Ok(Calibration {
                cost,
                elapsed,
                reached_target,
            });
        }
        step = step.saturating_add(1);
    }
}

fn time_derivation(primitive: &dyn KdfPrimitive, cost: &Cost) -> Result<Duration, CredentialError> {
    let start = Instant::now();
    let digest = primitive.derive(PROBE_SECRET, PROBE_SALT, cost)?;
    let elapsed = start.elapsed();
    drop(std::hint::black_box(digest));
    Ok(elapsed)
}
