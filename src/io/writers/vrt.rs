//! OGR VRT wrapper so GDAL command-line tools can read the points CSV.
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Write `<csv>.vrt` describing `csv` as a point layer named `layer`, with
/// geometry taken from its `x` and `y` columns. Returns the VRT path.
pub fn write_points_vrt(csv: &Path, layer: &str) -> Result<PathBuf> {
    let file_name = csv
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| Error::value(format!("invalid points path {}", csv.display())))?;
    let vrt_path = csv.with_extension("vrt");

    let xml = format!(
        r#"<OGRVRTDataSource>
  <OGRVRTLayer name="{layer}">
    <SrcDataSource relativeToVRT="1">{src}</SrcDataSource>
    <SrcLayer>{src_layer}</SrcLayer>
    <GeometryType>wkbPoint</GeometryType>
    <GeometryField encoding="PointFromColumns" x="x" y="y"/>
    <Field name="elevadj" type="Real"/>
  </OGRVRTLayer>
</OGRVRTDataSource>
"#,
        layer = escape(layer),
        src = escape(file_name),
        src_layer = escape(file_name.trim_end_matches(".csv")),
    );
    std::fs::write(&vrt_path, xml)?;
    Ok(vrt_path)
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vrt_points_at_csv() {
        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("bank_adj.csv");
        let vrt = write_points_vrt(&csv, "bank_adj").unwrap();
        assert_eq!(vrt, dir.path().join("bank_adj.vrt"));
        let xml = std::fs::read_to_string(vrt).unwrap();
        assert!(xml.contains(r#"<OGRVRTLayer name="bank_adj">"#));
        assert!(xml.contains(">bank_adj.csv</SrcDataSource>"));
        assert!(xml.contains(r#"x="x" y="y""#));
    }
}
