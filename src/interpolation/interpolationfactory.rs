use super::interpolation::Interpolation;
use super::interpolationerror::InterpolationError;

/// 由樣本資料建構候選實作。框架本身從不直接建構候選實作。
pub trait InterpolationFactory {
    type Candidate: Interpolation;

    fn build(&self, points: &[f64], values: &[f64]) -> Result<Self::Candidate, InterpolationError>;
}

impl<F, C> InterpolationFactory for F where
    F: Fn(&[f64], &[f64]) -> Result<C, InterpolationError>,
    C: Interpolation {
    type Candidate = C;

    fn build(&self, points: &[f64], values: &[f64]) -> Result<C, InterpolationError> {
        self(points, values)
    }
}
