//! Confluence points appear once per reach that passes through them and each
//! copy may be corrected differently. Every copy takes the minimum.

use std::collections::HashMap;

use tracing::debug;

use crate::types::CorrectedPoint;

/// Give each group of rows with identical `(x, y)` the group's minimum `elevadj`.
/// Returns the number of rows whose value was lowered.
pub fn resolve_confluences(points: &mut [CorrectedPoint]) -> usize {
    let mut minima: HashMap<(u64, u64), f64> = HashMap::new();
    for p in points.iter() {
        minima
            .entry(coord_key(p))
            .and_modify(|z| *z = z.min(p.elevadj))
            .or_insert(p.elevadj);
    }

    let mut lowered = 0;
    for p in points.iter_mut() {
        if let Some(&z) = minima.get(&coord_key(p)) {
            if z < p.elevadj {
                p.elevadj = z;
                lowered += 1;
            }
        }
    }
    debug!("Confluence resolution lowered {} rows", lowered);
    lowered
}

// Exact coordinate equality; -0.0 and 0.0 collapse together.
fn coord_key(p: &CorrectedPoint) -> (u64, u64) {
    ((p.x + 0.0).to_bits(), (p.y + 0.0).to_bits())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(x: f64, y: f64, elevadj: f64) -> CorrectedPoint {
        CorrectedPoint { x, y, elevadj }
    }

    #[test]
    fn test_shared_coordinate_takes_minimum() {
        let mut points = vec![
            pt(1.0, 1.0, 12.0),
            pt(2.0, 2.0, 9.0),
            pt(1.0, 1.0, 10.5),
            pt(1.0, 1.0, 11.0),
        ];
        assert_eq!(resolve_confluences(&mut points), 2);
        let z: Vec<f64> = points.iter().map(|p| p.elevadj).collect();
        assert_eq!(z, vec![10.5, 9.0, 10.5, 10.5]);
    }

    #[test]
    fn test_distinct_coordinates_untouched() {
        let mut points = vec![pt(0.0, 0.0, 1.0), pt(0.0, 0.5, 2.0)];
        assert_eq!(resolve_confluences(&mut points), 0);
        assert_eq!(points[1].elevadj, 2.0);
    }
}
