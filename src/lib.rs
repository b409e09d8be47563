#![doc = r#"
fixelevs — bank elevation correction along river networks for flood modelling.

Adjusts DEM-derived bank elevations along each river reach so they no longer rise
downstream (the `bank4flood` smoothing of Yamazaki et al., 2012), then writes the
corrected points and rasterizes them onto a reference grid for use in a
flood-inundation model such as LISFLOOD-FP.

Quick start: full batch run from a config file
----------------------------------------------
```rust,no_run
use fixelevs::{ConfigFile, fix_elevations};

fn main() -> fixelevs::Result<()> {
    let params = ConfigFile::from_path("fixelevs.json")?.validate()?;
    let report = fix_elevations(&params)?;
    println!("corrected {} of {} points", report.changed, report.rows);
    Ok(())
}
```

Correct one profile
-------------------
```rust
use fixelevs::bank4flood;

let adjusted = bank4flood(&[10.0, 6.0, 8.0, 9.0, 5.0]).unwrap();
assert_eq!(adjusted, vec![10.0, 8.0, 8.0, 8.0, 5.0]);
```

Error handling
--------------
All public functions return `fixelevs::Result<T>`. Configuration, value, lookup and
integrity failures have their own `fixelevs::Error` variants and abort the run.

Feature flags
-------------
- `gdal`: OGR point sources, shapefile output, WKT `.prj` files and reference grids
  in any GDAL raster format.

Useful modules
--------------
- [`api`] — batch entry points.
- [`core`] — run parameters and the per-reach correction.
- [`io`] — readers, writers, rasterization, ASCII grids and LISFLOOD-FP result parsers.
- [`types`] — point records and method/backend selectors.
- [`error`] — crate-level `Error` and `Result`.
"#]

pub mod api;
pub mod core;
pub mod error;
pub mod io;
pub mod types;

// Types
pub use core::params::{ConfigFile, FixElevsParams, GridSource};
pub use error::{Error, Result};
pub use io::grid::GridGeometry;
pub use types::{
    CorrectedPoint, CorrectionMethod, ElevationPoint, RasterBackend, Reach, ReachPoint,
};

// Algorithms
pub use core::correction::assemble::assemble;
pub use core::correction::bank4flood::bank4flood;
pub use core::correction::confluence::resolve_confluences;
pub use core::correction::pipeline::correct_reaches;
pub use core::correction::profile::{extract_bank_elevations, group_reaches, nearest_elevation};

// High-level API
pub use api::{FixReport, correct_table, fix_elevations};
