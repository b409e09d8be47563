//! Shared types used across fixelevs.
//! Includes the point records (`ElevationPoint`, `ReachPoint`, `CorrectedPoint`),
//! the `Reach` grouping, and the `CorrectionMethod` / `RasterBackend` selectors.
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Source elevation sample. Read once, never mutated.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ElevationPoint {
    pub lon: f64,
    pub lat: f64,
    pub elevation: f64,
}

impl ElevationPoint {
    pub fn new(lon: f64, lat: f64, elevation: f64) -> Self {
        Self {
            lon,
            lat,
            elevation,
        }
    }

    #[inline]
    pub fn dist_sq(&self, lon: f64, lat: f64) -> f64 {
        let dx = self.lon - lon;
        let dy = self.lat - lat;
        dx * dx + dy * dy
    }
}

/// One row of the reach table. Row order within a reach is the downstream order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReachPoint {
    pub lon: f64,
    pub lat: f64,
    pub reach: i64,
    /// Bank elevation, either read from the table or filled by nearest-neighbour lookup
    #[serde(default)]
    pub bnk: Option<f64>,
}

impl ReachPoint {
    pub fn new(lon: f64, lat: f64, reach: i64, bnk: Option<f64>) -> Self {
        Self {
            lon,
            lat,
            reach,
            bnk,
        }
    }
}

/// A reach: the global row indices of its points, in downstream order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reach {
    pub id: i64,
    pub rows: Vec<usize>,
}

impl Reach {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Output record, written with the `x, y, elevadj` attribute names.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CorrectedPoint {
    pub x: f64,
    pub y: f64,
    pub elevadj: f64,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrectionMethod {
    /// Yamazaki et al. (2012) windowed bank smoothing
    Yamazaki,
}

impl std::fmt::Display for CorrectionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CorrectionMethod::Yamazaki => write!(f, "yamazaki"),
        }
    }
}

impl FromStr for CorrectionMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "yamazaki" => Ok(CorrectionMethod::Yamazaki),
            other => Err(Error::Configuration(format!(
                "unknown correction method `{}` (expected: yamazaki)",
                other
            ))),
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RasterBackend {
    /// Burn points in-process and write a GeoTIFF with the `tiff` crate
    Native,
    /// Shell out to `gdal_rasterize`
    Gdal,
    /// Points output only
    None,
}

impl std::fmt::Display for RasterBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RasterBackend::Native => write!(f, "native"),
            RasterBackend::Gdal => write!(f, "gdal"),
            RasterBackend::None => write!(f, "none"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_parse() {
        assert_eq!(
            "yamazaki".parse::<CorrectionMethod>().unwrap(),
            CorrectionMethod::Yamazaki
        );
    }

    #[test]
    fn test_unknown_method_is_configuration_error() {
        let err = "lowess".parse::<CorrectionMethod>().unwrap_err();
        assert!(matches!(err, Error::Configuration(_)), "got {:?}", err);
    }
}
