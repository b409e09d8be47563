//! Rasterization of the corrected point collection onto a target grid.
//!
//! Both backends follow `gdal_rasterize` burn semantics: the grid starts as
//! no-data and every point writes the cell containing it, in row order, so the
//! last point in a cell wins.

use std::path::{Path, PathBuf};
use std::process::Command;

use ndarray::Array2;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::io::grid::GridGeometry;
use crate::io::writers::tiff::write_geotiff_f64;
use crate::io::writers::worldfile::{write_prj_file, write_world_file};
use crate::types::CorrectedPoint;

/// Everything a backend needs to produce one raster
#[derive(Debug, Clone)]
pub struct RasterJob<'a> {
    pub points: &'a [CorrectedPoint],
    /// Points already written as CSV (`x,y,elevadj`)
    pub points_csv: &'a Path,
    pub proj: &'a str,
    pub grid: GridGeometry,
    pub nodata: f64,
    pub output: PathBuf,
}

pub trait Rasterizer {
    /// Produce the raster for `job`, returning the path written.
    fn rasterize(&self, job: &RasterJob<'_>) -> Result<PathBuf>;
}

/// Burn points into a `(rows, cols)` array initialised to `nodata`.
/// Returns the array and the number of points falling outside the grid.
pub fn burn_points(
    points: &[CorrectedPoint],
    grid: &GridGeometry,
    nodata: f64,
) -> (Array2<f64>, usize) {
    let mut data = Array2::from_elem((grid.rows(), grid.cols()), nodata);
    let mut outside = 0;
    for p in points {
        match grid.cell_of(p.x, p.y) {
            Some((row, col)) => data[[row, col]] = p.elevadj,
            None => outside += 1,
        }
    }
    (data, outside)
}

/// In-process rasterizer writing a native GeoTIFF plus `.tfw` and `.prj`
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeRasterizer;

impl Rasterizer for NativeRasterizer {
    fn rasterize(&self, job: &RasterJob<'_>) -> Result<PathBuf> {
        let (data, outside) = burn_points(job.points, &job.grid, job.nodata);
        if outside > 0 {
            warn!("{} points fall outside the target grid and were skipped", outside);
        }
        info!(
            "Rasterizing {} points onto {}x{} grid -> {}",
            job.points.len() - outside,
            job.grid.cols(),
            job.grid.rows(),
            job.output.display()
        );

        write_geotiff_f64(&job.output, &job.grid, &data, job.nodata)?;
        write_world_file(&job.output, job.grid.geotransform())?;
        write_prj_file(&job.output, job.proj)?;
        Ok(job.output.clone())
    }
}

/// Rasterizer delegating to the external `gdal_rasterize` tool
#[derive(Debug, Clone)]
pub struct GdalRasterize {
    pub program: PathBuf,
}

impl Default for GdalRasterize {
    fn default() -> Self {
        Self {
            program: PathBuf::from("gdal_rasterize"),
        }
    }
}

impl GdalRasterize {
    /// Argument list for one invocation; `layer` is passed as `-l` when set.
    pub fn command_args(job: &RasterJob<'_>, input: &Path, layer: Option<&str>) -> Vec<String> {
        let g = &job.grid;
        let mut args: Vec<String> = vec![
            "-a_nodata".into(),
            job.nodata.to_string(),
            "-of".into(),
            "GTiff".into(),
            "-tr".into(),
            g.xres.to_string(),
            g.yres.to_string(),
            "-a".into(),
            "elevadj".into(),
            "-a_srs".into(),
            job.proj.to_string(),
            "-te".into(),
            g.xmin.to_string(),
            g.ymin.to_string(),
            g.xmax.to_string(),
            g.ymax.to_string(),
        ];
        if let Some(layer) = layer {
            args.push("-l".into());
            args.push(layer.to_string());
        }
        args.push(input.display().to_string());
        args.push(job.output.display().to_string());
        args
    }

    #[cfg(feature = "gdal")]
    fn prepare_input(job: &RasterJob<'_>) -> Result<(PathBuf, Option<String>)> {
        let shp = job.output.with_extension("shp");
        crate::io::writers::shapefile::write_points_shapefile(&shp, job.points)?;
        write_prj_file(&shp, job.proj)?;
        Ok((shp, None))
    }

    #[cfg(not(feature = "gdal"))]
    fn prepare_input(job: &RasterJob<'_>) -> Result<(PathBuf, Option<String>)> {
        let layer = job
            .points_csv
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("points")
            .to_string();
        let vrt = crate::io::writers::vrt::write_points_vrt(job.points_csv, &layer)?;
        Ok((vrt, Some(layer)))
    }
}

impl Rasterizer for GdalRasterize {
    fn rasterize(&self, job: &RasterJob<'_>) -> Result<PathBuf> {
        let (input, layer) = Self::prepare_input(job)?;
        let args = Self::command_args(job, &input, layer.as_deref());
        debug!("Running {} {}", self.program.display(), args.join(" "));

        let out = Command::new(&self.program).args(&args).output().map_err(|e| {
            Error::Rasterize(format!("cannot run {}: {}", self.program.display(), e))
        })?;
        if !out.status.success() {
            return Err(Error::Rasterize(format!(
                "{} exited with {}: {}",
                self.program.display(),
                out.status,
                String::from_utf8_lossy(&out.stderr).trim()
            )));
        }
        info!("gdal_rasterize wrote {}", job.output.display());
        Ok(job.output.clone())
    }
}
