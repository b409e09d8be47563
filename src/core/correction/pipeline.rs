//! Whole-table correction: group rows by reach, correct reaches in parallel, reassemble.
use rayon::prelude::*;
use tracing::{debug, info};

use crate::core::correction::assemble::assemble;
use crate::core::correction::profile::{group_reaches, reach_profile};
use crate::error::{Error, Result};
use crate::types::{CorrectedPoint, CorrectionMethod, ReachPoint};

/// Group rows into reaches, correct every reach independently, and merge the
/// results back into row order. Every row must already carry `bnk`.
pub fn correct_reaches(
    reach_points: &[ReachPoint],
    method: CorrectionMethod,
) -> Result<Vec<CorrectedPoint>> {
    let reaches = group_reaches(reach_points);
    info!(
        "Correcting {} reaches ({} points) with method {}",
        reaches.len(),
        reach_points.len(),
        method
    );

    let adjusted = reaches
        .par_iter()
        .map(|reach| {
            let profile = reach_profile(reach, reach_points)?;
            let corrected = method.correct(&profile).map_err(|e| match e {
                Error::Value(msg) => Error::Value(format!("reach {}: {}", reach.id, msg)),
                other => other,
            })?;
            debug!("Reach {}: {} points corrected", reach.id, corrected.len());
            Ok(corrected)
        })
        .collect::<Result<Vec<Vec<f64>>>>()?;

    assemble(reach_points, &reaches, &adjusted)
}
