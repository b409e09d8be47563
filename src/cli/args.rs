use clap::Parser;
use std::path::PathBuf;

use fixelevs::{ConfigFile, RasterBackend};

#[derive(Parser, Debug)]
#[command(
    name = "fixelevs",
    version,
    about = "Adjust river bank elevations (bank4flood) and rasterize them"
)]
pub struct CliArgs {
    /// JSON config file; flags below override its keys
    #[arg(short = 'i', long = "config")]
    pub config: Option<PathBuf>,

    /// Elevation point source used to fill bank elevations (CSV: x, y, elev)
    #[arg(long)]
    pub source: Option<PathBuf>,

    /// Reach table CSV with columns lon, lat, reach[, bnk]
    #[arg(long)]
    pub recf: Option<PathBuf>,

    /// Output path stem (.csv, .prj and .tif are appended)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Reference raster defining the target grid
    #[arg(long)]
    pub netf: Option<PathBuf>,

    /// Output spatial reference (PROJ string, WKT or EPSG:XXXX)
    #[arg(long)]
    pub proj: Option<String>,

    /// Correction method (yamazaki)
    #[arg(long)]
    pub method: Option<String>,

    /// No-data value of the output raster
    #[arg(long, allow_hyphen_values = true)]
    pub nodata: Option<f64>,

    /// Rasterization backend
    #[arg(long, value_enum)]
    pub rasterizer: Option<RasterBackend>,

    /// Skip raster output (same as --rasterizer none)
    #[arg(long, default_value_t = false)]
    pub no_raster: bool,

    /// Give repeated confluence coordinates their minimum corrected elevation
    #[arg(long, default_value_t = false)]
    pub resolve_confluences: bool,

    /// Enable logging (RUST_LOG overrides the default debug level)
    #[arg(long, default_value_t = false)]
    pub log: bool,
}

impl CliArgs {
    /// Command-line keys as a config layer to merge over the config file
    pub fn overrides(&self) -> ConfigFile {
        let rasterizer = if self.no_raster {
            Some(RasterBackend::None)
        } else {
            self.rasterizer
        };
        ConfigFile {
            source: self.source.clone(),
            recf: self.recf.clone(),
            output: self.output.clone(),
            netf: self.netf.clone(),
            grid: None,
            proj: self.proj.clone(),
            method: self.method.clone(),
            nodata: self.nodata,
            rasterizer: rasterizer.map(|r| r.to_string()),
            resolve_confluences: self.resolve_confluences.then_some(true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_become_overrides() {
        let args = CliArgs::parse_from([
            "fixelevs",
            "-i",
            "run.json",
            "--method",
            "yamazaki",
            "--nodata",
            "-1",
            "--no-raster",
        ]);
        let cfg = args.overrides();
        assert_eq!(args.config, Some(PathBuf::from("run.json")));
        assert_eq!(cfg.method.as_deref(), Some("yamazaki"));
        assert_eq!(cfg.nodata, Some(-1.0));
        assert_eq!(cfg.rasterizer.as_deref(), Some("none"));
        assert_eq!(cfg.resolve_confluences, None);
    }
}
