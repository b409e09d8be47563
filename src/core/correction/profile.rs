//! Bank profile extraction: nearest-neighbour elevation lookup and grouping of
//! reach rows into downstream-ordered reaches.
//!
//! Lookup is brute force over the whole elevation source, O(N·M) for N reach
//! points and M elevation points. No spatial index is built.

use std::collections::BTreeMap;

use rayon::prelude::*;
use tracing::debug;

use crate::error::{Error, Result};
use crate::types::{ElevationPoint, Reach, ReachPoint};

/// Elevation of the point nearest to `(lon, lat)` by planar Euclidean distance.
///
/// Ties resolve to the first point in `points` order.
pub fn nearest_elevation(points: &[ElevationPoint], lon: f64, lat: f64) -> Result<f64> {
    nearest_index(points, lon, lat).map(|idx| points[idx].elevation)
}

/// Index of the nearest point, same rules as [`nearest_elevation`].
pub fn nearest_index(points: &[ElevationPoint], lon: f64, lat: f64) -> Result<usize> {
    if points.is_empty() {
        return Err(Error::Lookup(format!(
            "no elevation points to match ({}, {}) against",
            lon, lat
        )));
    }

    let mut best = 0;
    let mut best_dsq = f64::INFINITY;
    for (idx, pt) in points.iter().enumerate() {
        let dsq = pt.dist_sq(lon, lat);
        if dsq < best_dsq {
            best_dsq = dsq;
            best = idx;
        }
    }
    if !best_dsq.is_finite() {
        return Err(Error::Lookup(format!(
            "no elevation point at a finite distance from ({}, {})",
            lon, lat
        )));
    }
    Ok(best)
}

/// Nearest source elevation for every reach row, in row order.
pub fn extract_bank_elevations(
    points: &[ElevationPoint],
    reach_points: &[ReachPoint],
) -> Result<Vec<f64>> {
    if points.is_empty() {
        return Err(Error::Lookup("elevation source is empty".into()));
    }
    debug!(
        "Matching {} reach points against {} elevation points",
        reach_points.len(),
        points.len()
    );

    reach_points
        .par_iter()
        .map(|rp| nearest_elevation(points, rp.lon, rp.lat))
        .collect()
}

/// Fill `bnk` on every row from the elevation source.
pub fn assign_bank_elevations(
    points: &[ElevationPoint],
    reach_points: &mut [ReachPoint],
) -> Result<()> {
    let bnk = extract_bank_elevations(points, reach_points)?;
    for (rp, z) in reach_points.iter_mut().zip(bnk) {
        rp.bnk = Some(z);
    }
    Ok(())
}

/// Partition rows by reach id. Reaches come out in ascending id order and each
/// keeps its rows in table order.
pub fn group_reaches(reach_points: &[ReachPoint]) -> Vec<Reach> {
    let mut groups: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
    for (row, rp) in reach_points.iter().enumerate() {
        groups.entry(rp.reach).or_default().push(row);
    }
    groups
        .into_iter()
        .map(|(id, rows)| Reach { id, rows })
        .collect()
}

/// Bank profile of one reach, upstream first.
pub fn reach_profile(reach: &Reach, reach_points: &[ReachPoint]) -> Result<Vec<f64>> {
    reach
        .rows
        .iter()
        .map(|&row| {
            reach_points[row].bnk.ok_or_else(|| {
                Error::value(format!(
                    "row {} (reach {}) has no bank elevation",
                    row, reach.id
                ))
            })
        })
        .collect()
}
