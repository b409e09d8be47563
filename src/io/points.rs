//! CSV readers for the reach table and the elevation point source.
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use tracing::info;

use crate::error::{Error, Result};
use crate::types::{ElevationPoint, ReachPoint};

fn record_error(path: &Path, e: csv::Error) -> Error {
    if e.is_io_error() {
        Error::Csv(e)
    } else {
        Error::value(format!("{}: {}", path.display(), e))
    }
}

/// Read the reach table: header with at least `lon, lat, reach`, optionally `bnk`.
/// Row order is kept; within a reach it is the downstream order.
pub fn read_reach_table<P: AsRef<Path>>(path: P) -> Result<Vec<ReachPoint>> {
    let path = path.as_ref();
    let mut reader = ReaderBuilder::new().trim(csv::Trim::All).from_path(path)?;

    let mut rows = Vec::new();
    for (idx, record) in reader.deserialize::<ReachPoint>().enumerate() {
        let rp = record.map_err(|e| record_error(path, e))?;
        if !rp.lon.is_finite() || !rp.lat.is_finite() {
            return Err(Error::value(format!(
                "{}: record {} has non-finite coordinates ({}, {})",
                path.display(),
                idx + 1,
                rp.lon,
                rp.lat
            )));
        }
        rows.push(rp);
    }
    info!("Read {} reach points from {}", rows.len(), path.display());
    Ok(rows)
}

fn parse_field(record: &StringRecord, col: usize, path: &Path, line: usize) -> Result<f64> {
    let raw = record.get(col).ok_or_else(|| {
        Error::value(format!(
            "{}: record {} has {} columns, need at least 3",
            path.display(),
            line,
            record.len()
        ))
    })?;
    raw.trim().parse::<f64>().map_err(|_| {
        Error::value(format!(
            "{}: record {} column {}: `{}` is not a number",
            path.display(),
            line,
            col + 1,
            raw
        ))
    })
}

/// Rejects a source point with a NaN or infinite coordinate or elevation.
pub(crate) fn check_finite(point: &ElevationPoint, path: &Path, record: usize) -> Result<()> {
    if point.lon.is_finite() && point.lat.is_finite() && point.elevation.is_finite() {
        return Ok(());
    }
    Err(Error::value(format!(
        "{}: record {} has non-finite values ({}, {}, {})",
        path.display(),
        record,
        point.lon,
        point.lat,
        point.elevation
    )))
}

/// Read elevation points from a CSV with header. The first three columns are
/// x/longitude, y/latitude and elevation, whatever their names.
pub fn read_elevation_csv<P: AsRef<Path>>(path: P) -> Result<Vec<ElevationPoint>> {
    let path = path.as_ref();
    let mut reader = ReaderBuilder::new().flexible(true).from_path(path)?;

    let mut points = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record.map_err(|e| record_error(path, e))?;
        let line = idx + 1;
        let point = ElevationPoint::new(
            parse_field(&record, 0, path, line)?,
            parse_field(&record, 1, path, line)?,
            parse_field(&record, 2, path, line)?,
        );
        check_finite(&point, path, line)?;
        points.push(point);
    }
    info!("Read {} elevation points from {}", points.len(), path.display());
    Ok(points)
}

/// Read the elevation source. CSV is read natively; with the `gdal` feature any
/// other extension is opened as an OGR point dataset.
pub fn read_elevation_points<P: AsRef<Path>>(path: P) -> Result<Vec<ElevationPoint>> {
    let path = path.as_ref();
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("csv") || e.eq_ignore_ascii_case("txt"))
        .unwrap_or(false);

    if is_csv {
        return read_elevation_csv(path);
    }

    #[cfg(feature = "gdal")]
    {
        crate::io::gdal::read_vector_points(path)
    }
    #[cfg(not(feature = "gdal"))]
    {
        Err(Error::config(format!(
            "{}: only CSV elevation sources are supported without the `gdal` feature",
            path.display()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_tmp(contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f
    }

    #[test]
    fn test_reach_table_with_extra_columns() {
        let f = write_tmp("id,lon,lat,reach,order\n1,10.5,45.0,3,1\n2,10.6,44.9,3,1\n");
        let rows = read_reach_table(f.path()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], ReachPoint::new(10.6, 44.9, 3, None));
    }

    #[test]
    fn test_reach_table_with_bank() {
        let f = write_tmp("lon,lat,reach,bnk\n1.0,2.0,1,105.5\n");
        let rows = read_reach_table(f.path()).unwrap();
        assert_eq!(rows[0].bnk, Some(105.5));
    }

    #[test]
    fn test_reach_table_bad_number() {
        let f = write_tmp("lon,lat,reach\n1.0,abc,1\n");
        assert!(matches!(read_reach_table(f.path()), Err(Error::Value(_))));
    }

    #[test]
    fn test_elevation_positional_columns() {
        let f = write_tmp("x,y,elev,src\n0.0,0.0,12.5,lidar\n1.0,0.0,13.0,lidar\n");
        let pts = read_elevation_points(f.path()).unwrap();
        assert_eq!(
            pts,
            vec![
                ElevationPoint::new(0.0, 0.0, 12.5),
                ElevationPoint::new(1.0, 0.0, 13.0),
            ]
        );
    }

    #[test]
    fn test_elevation_non_finite_rejected() {
        for body in ["nan,0.0,1.0", "0.0,inf,1.0", "0.0,0.0,NaN"] {
            let f = write_tmp(&format!("x,y,elev\n{}\n5.0,5.0,2.0\n", body));
            let err = read_elevation_csv(f.path()).unwrap_err();
            assert!(matches!(err, Error::Value(_)), "{}: {:?}", body, err);
            assert!(err.to_string().contains("record 1"), "{}", err);
        }
    }

    #[test]
    fn test_elevation_short_record() {
        let f = write_tmp("x,y,elev\n0.0,1.0\n");
        assert!(matches!(read_elevation_csv(f.path()), Err(Error::Value(_))));
    }
}
