use crate::table::Features;

/// A fitted model, opaque to the estimator. Implementations must return one
/// prediction per row of `features`, in row order.
pub trait Predictor {
    fn predict(&self, features: &Features<'_>) -> Vec<f64>;
}

impl<P: Predictor + ?Sized> Predictor for &P {
    fn predict(&self, features: &Features<'_>) -> Vec<f64> {
        (**self).predict(features)
    }
}
