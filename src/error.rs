//! Crate-level error type and `Result` alias.
//! Every variant is fatal for the run that raises it: there is no retry and no
//! partial-success mode. Semantic variants name the failing key, reach or row.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Unknown correction method or a missing/invalid configuration key
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Empty, degenerate or malformed numeric data
    #[error("Value error: {0}")]
    Value(String),

    /// Nearest-neighbour match against an empty candidate set
    #[error("Lookup error: {0}")]
    Lookup(String),

    /// A point left without an adjusted elevation after all reaches ran
    #[error("Integrity error: row {row} (reach {reach}) has no adjusted elevation")]
    Integrity { row: usize, reach: i64 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Config parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TIFF error: {0}")]
    Tiff(#[from] tiff::TiffError),

    #[error("Zip archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Rasterization failed: {0}")]
    Rasterize(String),

    #[cfg(feature = "gdal")]
    #[error("GDAL error: {0}")]
    Gdal(#[from] gdal::errors::GdalError),
}

impl Error {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Configuration(msg.into())
    }

    pub fn value<S: Into<String>>(msg: S) -> Self {
        Error::Value(msg.into())
    }

    pub fn missing_key(key: &str) -> Self {
        Error::Configuration(format!("missing required key `{}`", key))
    }
}
