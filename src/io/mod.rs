//! I/O layer: CSV point readers, reference grid geometry, output writers,
//! rasterization backends, ESRI ASCII grids and LISFLOOD-FP result readers.
//! GDAL adapters are available behind the `gdal` feature.
pub mod ascii;
pub mod grid;
pub use grid::GridGeometry;

pub mod lisflood;
pub mod points;
pub mod rasterize;
pub use rasterize::{GdalRasterize, NativeRasterizer, RasterJob, Rasterizer};

pub mod writers;

#[cfg(feature = "gdal")]
pub mod gdal;
