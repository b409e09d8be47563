//! GDAL-backed adapters, only built with the `gdal` feature: OGR point
//! sources, reference-grid geometry for any raster format, and PROJ→WKT.
use std::path::Path;

use gdal::Dataset;
use gdal::spatial_ref::SpatialRef;
use gdal::vector::{FieldValue, LayerAccess};
use tracing::info;

use crate::error::{Error, Result};
use crate::io::grid::GridGeometry;
use crate::io::points::check_finite;
use crate::types::ElevationPoint;

fn as_f64(value: &FieldValue) -> Option<f64> {
    match value {
        FieldValue::RealValue(v) => Some(*v),
        FieldValue::IntegerValue(v) => Some(*v as f64),
        FieldValue::Integer64Value(v) => Some(*v as f64),
        _ => None,
    }
}

/// Read elevation points from the first layer of an OGR dataset. The first
/// three numeric attribute fields are x, y and elevation.
pub fn read_vector_points(path: &Path) -> Result<Vec<ElevationPoint>> {
    let ds = Dataset::open(path)?;
    let mut layer = ds.layer(0)?;

    let mut points = Vec::new();
    for (idx, feature) in layer.features().enumerate() {
        let numeric: Vec<f64> = feature
            .fields()
            .filter_map(|(_, value)| value.as_ref().and_then(as_f64))
            .take(3)
            .collect();
        if numeric.len() < 3 {
            return Err(Error::value(format!(
                "{}: feature {} has fewer than 3 numeric fields",
                path.display(),
                idx
            )));
        }
        let point = ElevationPoint::new(numeric[0], numeric[1], numeric[2]);
        check_finite(&point, path, idx + 1)?;
        points.push(point);
    }
    info!("Read {} elevation points from {}", points.len(), path.display());
    Ok(points)
}

/// Grid geometry of any GDAL-readable raster.
pub fn read_reference_grid(path: &Path) -> Result<GridGeometry> {
    let ds = Dataset::open(path)?;
    let (cols, rows) = ds.raster_size();
    let gt = ds.geo_transform()?;
    GridGeometry::from_geotransform(gt, cols, rows)
}

/// Normalise a PROJ string, EPSG code or WKT to WKT.
pub fn projection_to_wkt(projection: &str) -> Result<String> {
    let projection = projection.trim();
    let srs = if projection.starts_with('+') {
        SpatialRef::from_proj4(projection)?
    } else if let Some(code) = projection
        .strip_prefix("EPSG:")
        .and_then(|c| c.parse::<u32>().ok())
    {
        SpatialRef::from_epsg(code)?
    } else {
        SpatialRef::from_definition(projection)?
    };
    Ok(srs.to_wkt()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::writers::shapefile::write_points_shapefile;
    use crate::types::CorrectedPoint;

    #[test]
    fn test_vector_points_take_first_three_numeric_fields() {
        let dir = tempfile::tempdir().unwrap();
        let shp = dir.path().join("bank.shp");
        let points = [
            CorrectedPoint { x: 0.5, y: 1.5, elevadj: 10.0 },
            CorrectedPoint { x: 2.0, y: -1.0, elevadj: 7.25 },
        ];
        write_points_shapefile(&shp, &points).unwrap();

        let read = read_vector_points(&shp).unwrap();
        assert_eq!(
            read,
            vec![
                ElevationPoint::new(0.5, 1.5, 10.0),
                ElevationPoint::new(2.0, -1.0, 7.25),
            ]
        );
    }
}
