//! Bank elevation smoothing along one reach (Yamazaki et al., 2012, J. Hydrol).
//!
//! Scans a downstream-ordered profile once. Every upward step is repaired by
//! flattening the cheapest constant window around it, where cost is the total
//! absolute deviation from the current profile. Repairs are visible to the rest
//! of the scan; there is no restart.

use crate::error::{Error, Result};

/// Adjust a downstream-ordered bank profile so it no longer rises downstream.
///
/// Index 0 is the most upstream point. The returned profile has the same length.
/// Fails with [`Error::Value`] on empty input or on any non-finite elevation.
pub fn bank4flood(profile: &[f64]) -> Result<Vec<f64>> {
    validate_profile(profile)?;

    let mut adjusted = profile.to_vec();
    let n = adjusted.len();

    for i in 0..n - 1 {
        // First pair is lifted before every step; only ever touches index 0.
        if adjusted[1] > adjusted[0] {
            adjusted[0] = adjusted[1];
        }

        if adjusted[i + 1] > adjusted[i] {
            let (back, last, level) = cheapest_window(&adjusted, i);
            adjusted[back..last].fill(level);
        }
    }

    Ok(adjusted)
}

fn validate_profile(profile: &[f64]) -> Result<()> {
    if profile.is_empty() {
        return Err(Error::value("empty elevation profile"));
    }
    if profile.iter().all(|v| v.is_nan()) {
        return Err(Error::value("elevation profile is all NaN"));
    }
    if let Some(idx) = profile.iter().position(|v| !v.is_finite()) {
        return Err(Error::value(format!(
            "non-finite elevation {} at profile index {}",
            profile[idx], idx
        )));
    }
    Ok(())
}

/// Exclusive end of the forward window starting at `mid`: grows while the next
/// point stays above `profile[mid]`, never past the last index.
fn forward_end(profile: &[f64], mid: usize) -> usize {
    let floor = profile[mid];
    let span = profile.len() - mid;
    let mut ii = 0;
    while profile[mid + ii + 1] > floor {
        ii += 1;
        if ii == span - 1 {
            break;
        }
    }
    mid + ii + 1
}

/// Start of the backward window for `level`: grows upstream from `mid` while the
/// preceding point is at or below `level`, never before index 0.
fn backward_start(profile: &[f64], mid: usize, level: f64) -> usize {
    if mid == 0 {
        return 0;
    }
    let mut jj = 1;
    while profile[mid - jj] <= level {
        jj += 1;
        if jj > mid {
            break;
        }
    }
    mid + 1 - jj
}

fn window_cost(window: &[f64], level: f64) -> f64 {
    window.iter().map(|z| (z - level).abs()).sum()
}

/// Minimum-cost `(back, last, level)` repair for the rise at `mid`.
///
/// Candidate levels are the forward window's values in ascending order; equal
/// costs keep the first candidate.
fn cheapest_window(profile: &[f64], mid: usize) -> (usize, usize, f64) {
    let last = forward_end(profile, mid);

    let mut candidates = profile[mid..last].to_vec();
    candidates.sort_by(f64::total_cmp);

    let mut best: Option<(f64, usize, f64)> = None;
    for &level in &candidates {
        let back = backward_start(profile, mid, level);
        let cost = window_cost(&profile[back..last], level);
        match best {
            Some((best_cost, _, _)) if cost >= best_cost => {}
            _ => best = Some((cost, back, level)),
        }
    }

    // `candidates` always holds at least profile[mid]
    let (_, back, level) = best.unwrap_or((0.0, mid, profile[mid]));
    (back, last, level)
}
