use std::path::Path;

use csv::Writer;
use tracing::info;

use crate::error::Result;
use crate::types::CorrectedPoint;

/// Write the corrected point collection as CSV with header `x,y,elevadj`.
pub fn write_points_csv(path: &Path, points: &[CorrectedPoint]) -> Result<()> {
    let mut writer = Writer::from_path(path)?;
    for p in points {
        writer.serialize(p)?;
    }
    writer.flush()?;
    info!("Wrote {} corrected points to {}", points.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points_csv_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        write_points_csv(
            &path,
            &[
                CorrectedPoint { x: 1.5, y: -2.0, elevadj: 10.0 },
                CorrectedPoint { x: 2.5, y: -2.0, elevadj: 9.25 },
            ],
        )
        .unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "x,y,elevadj\n1.5,-2.0,10.0\n2.5,-2.0,9.25\n");
    }
}
