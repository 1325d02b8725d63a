//! Timing side-channel validation for the digest comparison.
//!
//! Uses Welch's t-test to check that comparing two digests takes the same
//! time whether they first differ at byte 0 or at the last byte. Timing
//! distributions for both classes are collected interleaved, alternating
//! which class goes first, and |t| must stay below 4.5.
//!
//! A |t| > 4.5 would suggest timing leakage at >99.999% confidence.
//!
//! **Caveat:** This is a statistical test. Scheduling noise can in rare
//! cases produce a false positive.

use std::time::Instant;

use credlock_core::constant_time_eq;

/// Number of timing samples per class.
const SAMPLES: usize = 20_000;

/// Welch's t-test threshold.
const T_THRESHOLD: f64 = 4.5;

/// Comparisons per sample, so one sample is well above timer resolution.
const INNER_ITERATIONS: usize = 64;

#[inline(never)]
fn timed_compare(a: &[u8], b: &[u8]) -> u128 {
    let start = Instant::now();
    for _ in 0..INNER_ITERATIONS {
        std::hint::black_box(constant_time_eq(std::hint::black_box(a), std::hint::black_box(b)));
    }
    start.elapsed().as_nanos()
}

/// Welch's t-statistic for two independent samples.
#[allow(clippy::cast_precision_loss)]
fn welch_t_statistic(a: &[f64], b: &[f64]) -> f64 {
    if a.len() < 2 || b.len() < 2 {
        return f64::NAN;
    }

    let n_a = a.len() as f64;
    let n_b = b.len() as f64;

    let mean_a: f64 = a.iter().sum::<f64>() / n_a;
    let mean_b: f64 = b.iter().sum::<f64>() / n_b;

    let var_a: f64 = a.iter().map(|x| (x - mean_a).powi(2)).sum::<f64>() / (n_a - 1.0);
    let var_b: f64 = b.iter().map(|x| (x - mean_b).powi(2)).sum::<f64>() / (n_b - 1.0);

    let denominator = (var_a / n_a + var_b / n_b).sqrt();
    if denominator == 0.0 {
        return 0.0;
    }

    (mean_a - mean_b) / denominator
}

/// Early mismatch (byte 0) vs late mismatch (byte 31) over 32-byte digests.
#[test]
fn digest_comparison_time_independent_of_mismatch_position() {
    let stored = [0x5Au8; 32];
    let mut early = stored;
    early[0] ^= 0xFF;
    let mut late = stored;
    late[31] ^= 0xFF;

    for _ in 0..1_000 {
        timed_compare(&stored, &early);
        timed_compare(&stored, &late);
    }

    let mut times_early = Vec::with_capacity(SAMPLES);
    let mut times_late = Vec::with_capacity(SAMPLES);

    for i in 0..SAMPLES {
        let (e, l) = if i % 2 == 0 {
            let e = timed_compare(&stored, &early);
            (e, timed_compare(&stored, &late))
        } else {
            let l = timed_compare(&stored, &late);
            (timed_compare(&stored, &early), l)
        };
        #[allow(clippy::cast_precision_loss)]
        {
            times_early.push(e as f64);
            times_late.push(l as f64);
        }
    }

    let abs_t = welch_t_statistic(&times_early, &times_late).abs();
    eprintln!(
        "digest comparison: |t| = {abs_t:.2} (threshold {T_THRESHOLD}), {SAMPLES} samples per class"
    );
    assert!(
        abs_t < T_THRESHOLD,
        "timing side-channel: |t| = {abs_t:.2} exceeds {T_THRESHOLD}"
    );
}

#[test]
fn welch_t_test_identical_distributions() {
    let a = vec![1.0; 100];
    let b = vec![1.0; 100];
    assert!(welch_t_statistic(&a, &b).abs() < 0.001);
}

#[test]
fn welch_t_test_different_distributions() {
    let a: Vec<f64> = (0..1000).map(|i| 100.0 + f64::from(i % 3)).collect();
    let b: Vec<f64> = (0..1000).map(|i| 200.0 + f64::from(i % 3)).collect();
    assert!(welch_t_statistic(&a, &b).abs() > 100.0);
}
