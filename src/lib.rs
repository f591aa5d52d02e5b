pub use explainer::Explainer;
pub use importance::{
    variable_importance, CancellationToken, ImportanceError, ImportanceMode, ImportanceOptions,
    Report, ReportEntry, BASELINE_LABEL, FULL_MODEL_LABEL,
};
pub use loss::{
    LossError, LossFunction, MeanAbsoluteError, MeanSquaredError, RootMeanSquaredError,
};
pub use predictor::Predictor;
pub use table::{Features, Table, TableError};

mod explainer;
mod functions;
mod importance;
mod loss;
mod predictor;
mod table;
