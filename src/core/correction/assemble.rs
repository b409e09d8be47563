//! Merge per-reach corrected profiles back into the global row order.

use crate::error::{Error, Result};
use crate::types::{CorrectedPoint, Reach, ReachPoint};

/// Scatter each reach's adjusted profile onto its rows and emit one
/// `CorrectedPoint` per input row, in input order.
///
/// `adjusted[k]` belongs to `reaches[k]`. Any row left unassigned is an
/// [`Error::Integrity`].
pub fn assemble(
    reach_points: &[ReachPoint],
    reaches: &[Reach],
    adjusted: &[Vec<f64>],
) -> Result<Vec<CorrectedPoint>> {
    if reaches.len() != adjusted.len() {
        return Err(Error::value(format!(
            "{} reaches but {} adjusted profiles",
            reaches.len(),
            adjusted.len()
        )));
    }

    let mut elevadj: Vec<Option<f64>> = vec![None; reach_points.len()];
    for (reach, profile) in reaches.iter().zip(adjusted) {
        if reach.len() != profile.len() {
            return Err(Error::value(format!(
                "reach {}: {} points but {} adjusted values",
                reach.id,
                reach.len(),
                profile.len()
            )));
        }
        for (&row, &z) in reach.rows.iter().zip(profile) {
            let slot = elevadj.get_mut(row).ok_or_else(|| {
                Error::value(format!("reach {} refers to missing row {}", reach.id, row))
            })?;
            *slot = Some(z);
        }
    }

    reach_points
        .iter()
        .zip(elevadj)
        .enumerate()
        .map(|(row, (rp, z))| match z {
            Some(elevadj) => Ok(CorrectedPoint {
                x: rp.lon,
                y: rp.lat,
                elevadj,
            }),
            None => Err(Error::Integrity {
                row,
                reach: rp.reach,
            }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::correction::profile::group_reaches;

    fn rows() -> Vec<ReachPoint> {
        vec![
            ReachPoint::new(0.0, 0.0, 2, Some(5.0)),
            ReachPoint::new(1.0, 0.0, 1, Some(6.0)),
            ReachPoint::new(2.0, 0.0, 2, Some(4.0)),
        ]
    }

    #[test]
    fn test_assemble_restores_row_order() {
        let rows = rows();
        let reaches = group_reaches(&rows);
        // reach 1 -> row 1, reach 2 -> rows 0, 2
        let adjusted = vec![vec![60.0], vec![50.0, 40.0]];
        let out = assemble(&rows, &reaches, &adjusted).unwrap();
        let z: Vec<f64> = out.iter().map(|p| p.elevadj).collect();
        assert_eq!(z, vec![50.0, 60.0, 40.0]);
        assert_eq!((out[2].x, out[2].y), (2.0, 0.0));
    }

    #[test]
    fn test_unassigned_row_is_integrity_error() {
        let rows = rows();
        let reaches = vec![Reach {
            id: 2,
            rows: vec![0, 2],
        }];
        let err = assemble(&rows, &reaches, &[vec![5.0, 4.0]]).unwrap_err();
        match err {
            Error::Integrity { row, reach } => {
                assert_eq!(row, 1);
                assert_eq!(reach, 1);
            }
            other => panic!("expected integrity error, got {:?}", other),
        }
    }

    #[test]
    fn test_length_mismatch_fails() {
        let rows = rows();
        let reaches = group_reaches(&rows);
        let adjusted = vec![vec![60.0], vec![50.0]];
        assert!(matches!(
            assemble(&rows, &reaches, &adjusted),
            Err(Error::Value(_))
        ));
    }
}
