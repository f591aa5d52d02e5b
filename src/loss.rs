use thiserror::Error;

/// A loss function over an actual/predicted pair of equal-length, non-empty
/// sequences. Implementations must not depend on record order: permuting both
/// sequences by the same index permutation must not change the result.
pub trait LossFunction {
    fn compute(&self, actual: &[f64], predicted: &[f64]) -> Result<f64, LossError>;
}

impl<L: LossFunction + ?Sized> LossFunction for &L {
    fn compute(&self, actual: &[f64], predicted: &[f64]) -> Result<f64, LossError> {
        (**self).compute(actual, predicted)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MeanAbsoluteError;

impl LossFunction for MeanAbsoluteError {
    fn compute(&self, actual: &[f64], predicted: &[f64]) -> Result<f64, LossError> {
        check_pair(actual, predicted)?;
        let total = actual
            .iter()
            .zip(predicted)
            .map(|(a, p)| (a - p).abs())
            .sum::<f64>();
        Ok(total / actual.len() as f64)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MeanSquaredError;

impl LossFunction for MeanSquaredError {
    fn compute(&self, actual: &[f64], predicted: &[f64]) -> Result<f64, LossError> {
        check_pair(actual, predicted)?;
        let total = actual
            .iter()
            .zip(predicted)
            .map(|(a, p)| (a - p).powi(2))
            .sum::<f64>();
        Ok(total / actual.len() as f64)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RootMeanSquaredError;

impl LossFunction for RootMeanSquaredError {
    fn compute(&self, actual: &[f64], predicted: &[f64]) -> Result<f64, LossError> {
        MeanSquaredError.compute(actual, predicted).map(f64::sqrt)
    }
}

fn check_pair(actual: &[f64], predicted: &[f64]) -> Result<(), LossError> {
    if actual.len() != predicted.len() {
        return Err(LossError::LengthMismatch {
            actual: actual.len(),
            predicted: predicted.len(),
        });
    }
    if actual.is_empty() {
        return Err(LossError::Empty);
    }
    Ok(())
}

#[derive(Debug, Error, Clone)]
pub enum LossError {
    #[error("actual has {actual} values but predicted has {predicted}")]
    LengthMismatch { actual: usize, predicted: usize },

    #[error("actual and predicted must have one or more values")]
    Empty,
}
