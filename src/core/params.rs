use std::ffi::OsString;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::io::grid::GridGeometry;
use crate::types::{CorrectionMethod, RasterBackend};

pub const DEFAULT_NODATA: f64 = -9999.0;

/// Raw configuration as written in a JSON config file or given on the command
/// line. Every key is optional here; [`ConfigFile::validate`] checks them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Elevation point source used to fill `bnk` by nearest neighbour
    pub source: Option<PathBuf>,
    /// Reach table (`lon, lat, reach[, bnk]`)
    pub recf: Option<PathBuf>,
    /// Output path stem; `.csv`, `.prj` and `.tif` are appended
    pub output: Option<PathBuf>,
    /// Reference raster providing the target grid
    pub netf: Option<PathBuf>,
    /// Explicit target grid, takes precedence over `netf`
    pub grid: Option<GridGeometry>,
    /// Spatial reference of the output (PROJ string, WKT or EPSG:XXXX)
    pub proj: Option<String>,
    pub method: Option<String>,
    pub nodata: Option<f64>,
    pub rasterizer: Option<String>,
    pub resolve_confluences: Option<bool>,
}

impl ConfigFile {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Keys set in `overrides` replace the ones in `self`.
    pub fn merge(self, overrides: ConfigFile) -> ConfigFile {
        ConfigFile {
            source: overrides.source.or(self.source),
            recf: overrides.recf.or(self.recf),
            output: overrides.output.or(self.output),
            netf: overrides.netf.or(self.netf),
            grid: overrides.grid.or(self.grid),
            proj: overrides.proj.or(self.proj),
            method: overrides.method.or(self.method),
            nodata: overrides.nodata.or(self.nodata),
            rasterizer: overrides.rasterizer.or(self.rasterizer),
            resolve_confluences: overrides.resolve_confluences.or(self.resolve_confluences),
        }
    }

    pub fn validate(self) -> Result<FixElevsParams> {
        let recf = self.recf.ok_or_else(|| Error::missing_key("recf"))?;
        let output = self.output.ok_or_else(|| Error::missing_key("output"))?;
        let method: CorrectionMethod = self
            .method
            .ok_or_else(|| Error::missing_key("method"))?
            .parse()?;

        let rasterizer = match self.rasterizer.as_deref() {
            None => RasterBackend::Native,
            Some(s) => RasterBackend::from_str(s, true).map_err(|_| {
                Error::config(format!(
                    "unknown rasterizer `{}` (expected: native, gdal, none)",
                    s
                ))
            })?,
        };

        let nodata = self.nodata.unwrap_or(DEFAULT_NODATA);
        if !nodata.is_finite() {
            return Err(Error::config(format!("nodata must be finite, got {}", nodata)));
        }

        let grid = match (self.grid, self.netf) {
            (Some(geometry), _) => {
                geometry.validate()?;
                Some(GridSource::Explicit(geometry))
            }
            (None, Some(path)) => Some(GridSource::Reference(path)),
            (None, None) => None,
        };

        if rasterizer != RasterBackend::None {
            if grid.is_none() {
                return Err(Error::config(format!(
                    "rasterizer `{}` needs a target grid: set `grid` or `netf`",
                    rasterizer
                )));
            }
            if self.proj.is_none() {
                return Err(Error::missing_key("proj"));
            }
        }

        Ok(FixElevsParams {
            source: self.source,
            recf,
            output,
            grid,
            proj: self.proj,
            method,
            nodata,
            rasterizer,
            resolve_confluences: self.resolve_confluences.unwrap_or(false),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GridSource {
    Explicit(GridGeometry),
    Reference(PathBuf),
}

/// Validated run parameters, immutable once built
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixElevsParams {
    pub source: Option<PathBuf>,
    pub recf: PathBuf,
    pub output: PathBuf,
    pub grid: Option<GridSource>,
    pub proj: Option<String>,
    pub method: CorrectionMethod,
    pub nodata: f64,
    pub rasterizer: RasterBackend,
    pub resolve_confluences: bool,
}

impl FixElevsParams {
    /// `<output>.<ext>`, appended rather than replacing any dot in the stem
    pub fn output_with(&self, ext: &str) -> PathBuf {
        let mut s: OsString = self.output.clone().into_os_string();
        s.push(".");
        s.push(ext);
        PathBuf::from(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"{
        "source": "bnk.csv",
        "recf": "rec.csv",
        "output": "out/fixed",
        "netf": "net.tif",
        "proj": "+proj=longlat +datum=WGS84 +no_defs",
        "method": "yamazaki"
    }"#;

    #[test]
    fn test_full_config_validates() {
        let params = ConfigFile::from_json_str(FULL).unwrap().validate().unwrap();
        assert_eq!(params.method, CorrectionMethod::Yamazaki);
        assert_eq!(params.nodata, DEFAULT_NODATA);
        assert_eq!(params.rasterizer, RasterBackend::Native);
        assert_eq!(params.grid, Some(GridSource::Reference("net.tif".into())));
        assert!(!params.resolve_confluences);
        assert_eq!(params.output_with("tif"), PathBuf::from("out/fixed.tif"));
    }

    #[test]
    fn test_unknown_method() {
        let cfg = ConfigFile::from_json_str(FULL)
            .unwrap()
            .merge(ConfigFile {
                method: Some("kriging".into()),
                ..Default::default()
            });
        assert!(matches!(cfg.validate(), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_missing_method() {
        let cfg = ConfigFile {
            recf: Some("rec.csv".into()),
            output: Some("out".into()),
            rasterizer: Some("none".into()),
            ..Default::default()
        };
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("method"), "{}", err);
    }

    #[test]
    fn test_raster_needs_grid_and_proj() {
        let mut cfg = ConfigFile::from_json_str(FULL).unwrap();
        cfg.netf = None;
        assert!(matches!(cfg.clone().validate(), Err(Error::Configuration(_))));

        cfg.rasterizer = Some("none".into());
        cfg.proj = None;
        let params = cfg.validate().unwrap();
        assert_eq!(params.rasterizer, RasterBackend::None);
    }

    #[test]
    fn test_unknown_rasterizer() {
        let cfg = ConfigFile::from_json_str(FULL).unwrap().merge(ConfigFile {
            rasterizer: Some("opencv".into()),
            ..Default::default()
        });
        assert!(matches!(cfg.validate(), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_override_wins() {
        let merged = ConfigFile::from_json_str(FULL).unwrap().merge(ConfigFile {
            output: Some("other".into()),
            nodata: Some(-1.0),
            ..Default::default()
        });
        let params = merged.validate().unwrap();
        assert_eq!(params.output, PathBuf::from("other"));
        assert_eq!(params.nodata, -1.0);
        assert_eq!(params.recf, PathBuf::from("rec.csv"));
    }
}
