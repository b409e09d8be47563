//! Output writers: corrected points (CSV, VRT, shapefile with `gdal`),
//! native GeoTIFF, and `.prj`/world-file sidecars.
pub mod points;
pub mod tiff;
pub mod vrt;
pub mod worldfile;

#[cfg(feature = "gdal")]
pub mod shapefile;
