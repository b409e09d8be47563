//! Target grid geometry for rasterization.
//!
//! The extent and resolution follow the `gdal_rasterize -te/-tr` convention:
//! `xmin ymin xmax ymax` and a positive pixel size per axis, north-up.

use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tiff::decoder::Decoder;
use tiff::tags::Tag;
use tracing::debug;

use crate::error::{Error, Result};

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridGeometry {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
    pub xres: f64,
    pub yres: f64,
}

impl GridGeometry {
    /// From a GDAL-style geotransform and raster size (columns, rows).
    pub fn from_geotransform(gt: [f64; 6], cols: usize, rows: usize) -> Result<Self> {
        if gt[2] != 0.0 || gt[4] != 0.0 {
            return Err(Error::config("rotated reference grids are not supported"));
        }
        let xres = gt[1].abs();
        let yres = gt[5].abs();
        let x0 = gt[0];
        let x1 = gt[0] + gt[1] * cols as f64;
        let y0 = gt[3];
        let y1 = gt[3] + gt[5] * rows as f64;
        let geometry = Self {
            xmin: x0.min(x1),
            ymin: y0.min(y1),
            xmax: x0.max(x1),
            ymax: y0.max(y1),
            xres,
            yres,
        };
        geometry.validate()?;
        Ok(geometry)
    }

    pub fn validate(&self) -> Result<()> {
        let values = [
            self.xmin, self.ymin, self.xmax, self.ymax, self.xres, self.yres,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(Error::config(format!("non-finite grid geometry: {:?}", self)));
        }
        if self.xres <= 0.0 || self.yres <= 0.0 {
            return Err(Error::config(format!(
                "grid resolution must be positive, got {} x {}",
                self.xres, self.yres
            )));
        }
        if self.cols() == 0 || self.rows() == 0 {
            return Err(Error::config(format!("empty grid extent: {:?}", self)));
        }
        Ok(())
    }

    pub fn cols(&self) -> usize {
        ((self.xmax - self.xmin) / self.xres).round().max(0.0) as usize
    }

    pub fn rows(&self) -> usize {
        ((self.ymax - self.ymin) / self.yres).round().max(0.0) as usize
    }

    /// North-up geotransform of the grid
    pub fn geotransform(&self) -> [f64; 6] {
        [self.xmin, self.xres, 0.0, self.ymax, 0.0, -self.yres]
    }

    /// `(row, col)` of the cell containing `(x, y)`, or `None` outside the extent.
    pub fn cell_of(&self, x: f64, y: f64) -> Option<(usize, usize)> {
        if !x.is_finite() || !y.is_finite() {
            return None;
        }
        let col = ((x - self.xmin) / self.xres).floor();
        let row = ((self.ymax - y) / self.yres).floor();
        if col < 0.0 || row < 0.0 {
            return None;
        }
        let (row, col) = (row as usize, col as usize);
        if row >= self.rows() || col >= self.cols() {
            return None;
        }
        Some((row, col))
    }
}

/// Read grid geometry from a GeoTIFF's ModelPixelScale (33550) and
/// ModelTiepoint (33922) tags.
pub fn read_reference_grid<P: AsRef<Path>>(path: P) -> Result<GridGeometry> {
    let file = File::open(path.as_ref())?;
    let mut decoder = Decoder::new(file)?;
    let (width, height) = decoder.dimensions()?;

    let scale = decoder.get_tag_f64_vec(Tag::Unknown(33550)).map_err(|_| {
        Error::config(format!(
            "{}: no ModelPixelScale tag, cannot derive grid",
            path.as_ref().display()
        ))
    })?;
    let tiepoint = decoder.get_tag_f64_vec(Tag::Unknown(33922)).map_err(|_| {
        Error::config(format!(
            "{}: no ModelTiepoint tag, cannot derive grid",
            path.as_ref().display()
        ))
    })?;
    if scale.len() < 2 || tiepoint.len() < 6 {
        return Err(Error::config(format!(
            "{}: malformed georeferencing tags",
            path.as_ref().display()
        )));
    }

    // tiepoint: [I, J, K, X, Y, Z], scale: [ScaleX, ScaleY, ScaleZ]
    let origin_x = tiepoint[3] - tiepoint[0] * scale[0];
    let origin_y = tiepoint[4] + tiepoint[1] * scale[1];
    let gt = [origin_x, scale[0], 0.0, origin_y, 0.0, -scale[1]];
    debug!(
        "Reference grid {}: {}x{} gt={:?}",
        path.as_ref().display(),
        width,
        height,
        gt
    );
    GridGeometry::from_geotransform(gt, width as usize, height as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> GridGeometry {
        GridGeometry {
            xmin: 0.0,
            ymin: 0.0,
            xmax: 10.0,
            ymax: 5.0,
            xres: 1.0,
            yres: 0.5,
        }
    }

    #[test]
    fn test_dimensions() {
        let g = grid();
        assert_eq!(g.cols(), 10);
        assert_eq!(g.rows(), 10);
        assert_eq!(g.geotransform(), [0.0, 1.0, 0.0, 5.0, 0.0, -0.5]);
    }

    #[test]
    fn test_cell_of() {
        let g = grid();
        assert_eq!(g.cell_of(0.0, 5.0), Some((0, 0)));
        assert_eq!(g.cell_of(9.99, 0.01), Some((9, 9)));
        assert_eq!(g.cell_of(3.5, 2.6), Some((4, 3)));
        assert_eq!(g.cell_of(10.0, 2.0), None);
        assert_eq!(g.cell_of(-0.1, 2.0), None);
        assert_eq!(g.cell_of(1.0, 5.1), None);
        assert_eq!(g.cell_of(f64::NAN, 1.0), None);
    }

    #[test]
    fn test_from_geotransform_roundtrip() {
        let g = GridGeometry::from_geotransform([100.0, 0.25, 0.0, 50.0, 0.0, -0.25], 8, 4)
            .unwrap();
        assert_eq!(
            g,
            GridGeometry {
                xmin: 100.0,
                ymin: 49.0,
                xmax: 102.0,
                ymax: 50.0,
                xres: 0.25,
                yres: 0.25,
            }
        );
    }

    #[test]
    fn test_degenerate_grid_rejected() {
        let mut g = grid();
        g.xres = 0.0;
        assert!(matches!(g.validate(), Err(Error::Configuration(_))));
        let mut g = grid();
        g.xmax = g.xmin;
        assert!(matches!(g.validate(), Err(Error::Configuration(_))));
    }
}
