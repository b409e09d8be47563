use std::path::Path;

use gdal::DriverManager;
use gdal::vector::{FieldValue, Geometry, LayerAccess, LayerOptions, OGRFieldType, OGRwkbGeometryType};
use tracing::info;

use crate::error::Result;
use crate::types::CorrectedPoint;

const FIELDS: [&str; 3] = ["x", "y", "elevadj"];

/// Write corrected points as an ESRI shapefile with fields `x, y, elevadj`.
pub fn write_points_shapefile(output: &Path, points: &[CorrectedPoint]) -> Result<()> {
    let driver = DriverManager::get_driver_by_name("ESRI Shapefile")?;
    let mut ds = driver.create_vector_only(output)?;
    let name = output
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("points");
    let mut layer = ds.create_layer(LayerOptions {
        name,
        ty: OGRwkbGeometryType::wkbPoint,
        ..Default::default()
    })?;
    layer.create_defn_fields(&[
        (FIELDS[0], OGRFieldType::OFTReal),
        (FIELDS[1], OGRFieldType::OFTReal),
        (FIELDS[2], OGRFieldType::OFTReal),
    ])?;

    for p in points {
        let geom = Geometry::from_wkt(&format!("POINT ({} {})", p.x, p.y))?;
        layer.create_feature_fields(
            geom,
            &FIELDS,
            &[
                FieldValue::RealValue(p.x),
                FieldValue::RealValue(p.y),
                FieldValue::RealValue(p.elevadj),
            ],
        )?;
    }
    info!("Wrote {} points to {}", points.len(), output.display());
    Ok(())
}
