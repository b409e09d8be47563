use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Write a world file next to the raster using the provided geotransform.
/// The world file stores the transform in pixel-center convention.
pub fn write_world_file(output_image: &Path, geotransform: [f64; 6]) -> Result<PathBuf> {
    let ext = output_image
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let world_ext = match ext.as_str() {
        "tif" | "tiff" => "tfw",
        "asc" => "aaw",
        _ => "wld",
    };
    let world_path = output_image.with_extension(world_ext);

    // A: pixel size in X, D: rotation about Y, B: rotation about X, E: pixel size Y
    // C, F: center of upper-left pixel
    let a = geotransform[1];
    let d = geotransform[4];
    let b = geotransform[2];
    let e = geotransform[5];
    let c = geotransform[0] + 0.5 * a + 0.5 * b;
    let f = geotransform[3] + 0.5 * d + 0.5 * e;

    let mut file = File::create(&world_path)?;
    for v in [a, d, b, e, c, f] {
        writeln!(file, "{:.12}", v)?;
    }

    Ok(world_path)
}

/// Write the spatial-reference descriptor `<output>.prj`.
///
/// With the `gdal` feature the projection is normalised to WKT first (PROJ
/// strings included); otherwise it is written as given.
pub fn write_prj_file(output: &Path, projection: &str) -> Result<PathBuf> {
    let prj_path = output.with_extension("prj");

    #[cfg(feature = "gdal")]
    let text = crate::io::gdal::projection_to_wkt(projection)?;
    #[cfg(not(feature = "gdal"))]
    let text = projection.trim().to_string();

    std::fs::write(&prj_path, text.as_bytes())?;
    Ok(prj_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_world_file_uses_pixel_centres() {
        let dir = tempfile::tempdir().unwrap();
        let tif = dir.path().join("bank.tif");
        let tfw = write_world_file(&tif, [100.0, 2.0, 0.0, 50.0, 0.0, -2.0]).unwrap();
        assert_eq!(tfw, dir.path().join("bank.tfw"));
        let lines: Vec<f64> = std::fs::read_to_string(tfw)
            .unwrap()
            .lines()
            .map(|l| l.parse().unwrap())
            .collect();
        assert_eq!(lines, vec![2.0, 0.0, 0.0, -2.0, 101.0, 49.0]);
    }

    #[cfg(not(feature = "gdal"))]
    #[test]
    fn test_prj_written_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let prj = write_prj_file(&dir.path().join("bank.csv"), "EPSG:4326\n").unwrap();
        assert_eq!(std::fs::read_to_string(prj).unwrap(), "EPSG:4326");
    }
}
