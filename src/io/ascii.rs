//! ESRI ASCII grids as written by LISFLOOD-FP (`.wd`, `.elev`, `.max`, ...),
//! plain or gzip-compressed.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use flate2::read::GzDecoder;
use ndarray::Array2;
use tracing::debug;

use crate::error::{Error, Result};
use crate::io::grid::GridGeometry;

/// Header of an ASCII grid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AsciiHeader {
    pub geometry: GridGeometry,
    pub nodata: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AsciiGrid {
    pub header: AsciiHeader,
    /// `(nrows, ncols)`, first row is the northern edge
    pub data: Array2<f64>,
}

fn is_gzip(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("gz"))
        .unwrap_or(false)
}

fn read_text(path: &Path) -> Result<String> {
    let mut text = String::new();
    let mut file = File::open(path)?;
    if is_gzip(path) {
        GzDecoder::new(file).read_to_string(&mut text)?;
    } else {
        file.read_to_string(&mut text)?;
    }
    Ok(text)
}

fn header_value(key: &str, raw: &str, name: &str) -> Result<f64> {
    raw.parse::<f64>()
        .map_err(|_| Error::value(format!("{}: header `{}` value `{}` is not a number", name, key, raw)))
}

/// Parse an ASCII grid held in memory; `name` labels error messages.
pub fn parse_ascii_grid(text: &str, name: &str) -> Result<AsciiGrid> {
    let mut ncols = None;
    let mut nrows = None;
    let mut xll = None;
    let mut yll = None;
    let mut centered = false;
    let mut cellsize = None;
    let mut nodata = None;

    let mut lines = text.lines().peekable();
    while let Some(&line) = lines.peek() {
        let mut tokens = line.split_whitespace();
        let key = match tokens.next() {
            None => {
                lines.next();
                continue;
            }
            Some(k) if k.parse::<f64>().is_ok() => break,
            Some(k) => k.to_ascii_lowercase(),
        };
        let raw = tokens
            .next()
            .ok_or_else(|| Error::value(format!("{}: header `{}` has no value", name, key)))?;
        let value = header_value(&key, raw, name)?;
        match key.as_str() {
            "ncols" => ncols = Some(value),
            "nrows" => nrows = Some(value),
            "xllcorner" => xll = Some(value),
            "xllcenter" => {
                xll = Some(value);
                centered = true;
            }
            "yllcorner" => yll = Some(value),
            "yllcenter" => {
                yll = Some(value);
                centered = true;
            }
            "cellsize" => cellsize = Some(value),
            "nodata_value" => nodata = Some(value),
            other => debug!("{}: ignoring header key `{}`", name, other),
        }
        lines.next();
    }

    let missing = |key: &str| Error::value(format!("{}: header has no `{}`", name, key));
    let ncols = ncols.ok_or_else(|| missing("ncols"))?;
    let nrows = nrows.ok_or_else(|| missing("nrows"))?;
    let cellsize = cellsize.ok_or_else(|| missing("cellsize"))?;
    let mut xmin = xll.ok_or_else(|| missing("xllcorner"))?;
    let mut ymin = yll.ok_or_else(|| missing("yllcorner"))?;
    if ncols < 1.0 || nrows < 1.0 || ncols.fract() != 0.0 || nrows.fract() != 0.0 {
        return Err(Error::value(format!(
            "{}: bad grid size {} x {}",
            name, ncols, nrows
        )));
    }
    if centered {
        xmin -= cellsize / 2.0;
        ymin -= cellsize / 2.0;
    }
    let (ncols, nrows) = (ncols as usize, nrows as usize);

    let geometry = GridGeometry {
        xmin,
        ymin,
        xmax: xmin + ncols as f64 * cellsize,
        ymax: ymin + nrows as f64 * cellsize,
        xres: cellsize,
        yres: cellsize,
    };
    geometry.validate()?;

    let values = lines
        .flat_map(str::split_whitespace)
        .map(|t| {
            t.parse::<f64>()
                .map_err(|_| Error::value(format!("{}: `{}` is not a number", name, t)))
        })
        .collect::<Result<Vec<f64>>>()?;
    if values.len() != ncols * nrows {
        return Err(Error::value(format!(
            "{}: {} values for a {} x {} grid",
            name,
            values.len(),
            ncols,
            nrows
        )));
    }
    let data = Array2::from_shape_vec((nrows, ncols), values)
        .map_err(|e| Error::value(format!("{}: {}", name, e)))?;

    Ok(AsciiGrid {
        header: AsciiHeader { geometry, nodata },
        data,
    })
}

/// Read an ASCII grid file; `.gz` files are decompressed on the fly.
pub fn read_ascii_grid<P: AsRef<Path>>(path: P) -> Result<AsciiGrid> {
    let path = path.as_ref();
    let text = read_text(path)?;
    let grid = parse_ascii_grid(&text, &path.display().to_string())?;
    debug!(
        "{}: {}x{} ASCII grid",
        path.display(),
        grid.data.ncols(),
        grid.data.nrows()
    );
    Ok(grid)
}

/// Georeferencing of an ASCII grid file.
pub fn read_ascii_geo<P: AsRef<Path>>(path: P) -> Result<AsciiHeader> {
    read_ascii_grid(path).map(|g| g.header)
}

/// Cell values of an ASCII grid file.
pub fn read_ascii_data<P: AsRef<Path>>(path: P) -> Result<Array2<f64>> {
    read_ascii_grid(path).map(|g| g.data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;

    const WD: &str = "ncols 3\n\
                      nrows 2\n\
                      xllcorner 10.0\n\
                      yllcorner 40.0\n\
                      cellsize 0.5\n\
                      NODATA_value -9999\n\
                      0.0 1.5 -9999\n\
                      2.25 0.0 0.0\n";

    #[test]
    fn test_parse_header_and_data() {
        let grid = parse_ascii_grid(WD, "res.wd").unwrap();
        assert_eq!(
            grid.header.geometry,
            GridGeometry {
                xmin: 10.0,
                ymin: 40.0,
                xmax: 11.5,
                ymax: 41.0,
                xres: 0.5,
                yres: 0.5,
            }
        );
        assert_eq!(grid.header.nodata, Some(-9999.0));
        assert_eq!(grid.data.dim(), (2, 3));
        assert_eq!(grid.data[[0, 2]], -9999.0);
        assert_eq!(grid.data[[1, 0]], 2.25);
    }

    #[test]
    fn test_cell_centre_origin() {
        let text = "ncols 1\nnrows 1\nxllcenter 1.0\nyllcenter 2.0\ncellsize 2.0\n7\n";
        let grid = parse_ascii_grid(text, "c.asc").unwrap();
        assert_eq!(grid.header.geometry.xmin, 0.0);
        assert_eq!(grid.header.geometry.ymax, 3.0);
        assert_eq!(grid.header.nodata, None);
    }

    #[test]
    fn test_value_count_mismatch() {
        let text = "ncols 2\nnrows 2\nxllcorner 0\nyllcorner 0\ncellsize 1\n1 2 3\n";
        assert!(matches!(parse_ascii_grid(text, "bad"), Err(Error::Value(_))));
    }

    #[test]
    fn test_missing_header_key() {
        let text = "ncols 1\nnrows 1\nxllcorner 0\nyllcorner 0\n1\n";
        let err = parse_ascii_grid(text, "bad").unwrap_err();
        assert!(err.to_string().contains("cellsize"), "{}", err);
    }

    #[test]
    fn test_read_gzip_matches_plain() {
        let dir = tempfile::tempdir().unwrap();
        let plain = dir.path().join("res-0001.wd");
        std::fs::write(&plain, WD).unwrap();
        let gz = dir.path().join("res-0001.wd.gz");
        let mut enc = GzEncoder::new(File::create(&gz).unwrap(), Compression::default());
        enc.write_all(WD.as_bytes()).unwrap();
        enc.finish().unwrap();

        assert_eq!(read_ascii_data(&gz).unwrap(), read_ascii_data(&plain).unwrap());
        assert_eq!(read_ascii_geo(&gz).unwrap(), read_ascii_geo(&plain).unwrap());
    }
}
