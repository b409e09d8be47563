pub mod assemble;
pub mod bank4flood;
pub mod confluence;
pub mod pipeline;
pub mod profile;

use crate::error::Result;
use crate::types::CorrectionMethod;

impl CorrectionMethod {
    /// Correct one downstream-ordered reach profile.
    pub fn correct(&self, profile: &[f64]) -> Result<Vec<f64>> {
        match self {
            CorrectionMethod::Yamazaki => bank4flood::bank4flood(profile),
        }
    }
}
