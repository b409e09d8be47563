//! High-level library API: run the whole bank correction batch from validated
//! parameters, or correct an in-memory reach table. Prefer these entry points
//! over the lower-level `core` and `io` modules when integrating fixelevs.
use std::path::PathBuf;

use tracing::{info, warn};

use crate::core::correction::confluence::resolve_confluences;
use crate::core::correction::pipeline::correct_reaches;
use crate::core::correction::profile::{assign_bank_elevations, group_reaches};
use crate::core::params::{FixElevsParams, GridSource};
use crate::error::{Error, Result};
use crate::io::grid::GridGeometry;
use crate::io::points::{read_elevation_points, read_reach_table};
use crate::io::rasterize::{GdalRasterize, NativeRasterizer, RasterJob, Rasterizer};
use crate::io::writers::points::write_points_csv;
use crate::io::writers::worldfile::write_prj_file;
use crate::types::{CorrectedPoint, CorrectionMethod, ElevationPoint, RasterBackend, ReachPoint};

/// Summary of one batch run
#[derive(Debug, Clone, PartialEq)]
pub struct FixReport {
    pub rows: usize,
    pub reaches: usize,
    /// Rows whose corrected elevation differs from the bank elevation
    pub changed: usize,
    /// Rows lowered by confluence resolution
    pub confluences_lowered: usize,
    pub points_path: PathBuf,
    pub prj_path: Option<PathBuf>,
    pub raster_path: Option<PathBuf>,
}

/// Correct an in-memory reach table. With a `source`, every row's `bnk` is
/// replaced by its nearest-neighbour elevation first; without one every row
/// must already carry `bnk`.
pub fn correct_table(
    reach_points: &mut [ReachPoint],
    source: Option<&[ElevationPoint]>,
    method: CorrectionMethod,
) -> Result<Vec<CorrectedPoint>> {
    match source {
        Some(points) => assign_bank_elevations(points, reach_points)?,
        None => {
            if let Some(row) = reach_points.iter().position(|rp| rp.bnk.is_none()) {
                return Err(Error::config(format!(
                    "row {} has no `bnk` and no elevation `source` is configured",
                    row
                )));
            }
        }
    }
    correct_reaches(reach_points, method)
}

fn load_grid(source: &GridSource) -> Result<GridGeometry> {
    match source {
        GridSource::Explicit(geometry) => Ok(*geometry),
        #[cfg(feature = "gdal")]
        GridSource::Reference(path) => crate::io::gdal::read_reference_grid(path),
        #[cfg(not(feature = "gdal"))]
        GridSource::Reference(path) => crate::io::grid::read_reference_grid(path),
    }
}

/// Run the full batch: read, extract bank profiles, correct every reach,
/// write the corrected points and `.prj`, then rasterize.
pub fn fix_elevations(params: &FixElevsParams) -> Result<FixReport> {
    info!("Running fixelevs ({})", params.method);

    // Resolve the grid before any heavy work so a bad reference fails early
    let grid = match (&params.rasterizer, &params.grid) {
        (RasterBackend::None, _) => None,
        (_, Some(source)) => Some(load_grid(source)?),
        (_, None) => return Err(Error::config("rasterization requires `grid` or `netf`")),
    };

    let mut reach_points = read_reach_table(&params.recf)?;
    if reach_points.is_empty() {
        return Err(Error::value(format!(
            "{}: reach table has no rows",
            params.recf.display()
        )));
    }

    let source = match &params.source {
        Some(path) => Some(read_elevation_points(path)?),
        None => None,
    };
    let mut corrected = correct_table(&mut reach_points, source.as_deref(), params.method)?;

    let changed = reach_points
        .iter()
        .zip(&corrected)
        .filter(|(rp, cp)| rp.bnk != Some(cp.elevadj))
        .count();

    let confluences_lowered = if params.resolve_confluences {
        resolve_confluences(&mut corrected)
    } else {
        0
    };

    let points_path = params.output_with("csv");
    write_points_csv(&points_path, &corrected)?;
    let prj_path = match &params.proj {
        Some(proj) => Some(write_prj_file(&points_path, proj)?),
        None => None,
    };

    let raster_path = match (params.rasterizer, grid) {
        (RasterBackend::None, _) | (_, None) => None,
        (backend, Some(grid)) => {
            let proj = params.proj.as_deref().ok_or_else(|| Error::missing_key("proj"))?;
            let job = RasterJob {
                points: &corrected,
                points_csv: &points_path,
                proj,
                grid,
                nodata: params.nodata,
                output: params.output_with("tif"),
            };
            let path = match backend {
                RasterBackend::Gdal => GdalRasterize::default().rasterize(&job)?,
                _ => NativeRasterizer.rasterize(&job)?,
            };
            Some(path)
        }
    };

    let reaches = group_reaches(&reach_points).len();
    if changed == 0 {
        warn!("No bank elevations needed correction");
    }
    info!(
        "Corrected {} of {} points across {} reaches",
        changed,
        reach_points.len(),
        reaches
    );

    Ok(FixReport {
        rows: reach_points.len(),
        reaches,
        changed,
        confluences_lowered,
        points_path,
        prj_path,
        raster_path,
    })
}
