use crate::importance::{variable_importance, ImportanceError, ImportanceOptions, Report};
use crate::loss::LossFunction;
use crate::predictor::Predictor;
use crate::table::Table;

/// A fitted predictor bundled with its validation table, the unit downstream
/// analysis functions operate on.
#[derive(Debug)]
pub struct Explainer<'a, P> {
    predictor: P,
    table: Table<'a>,
}

impl<'a, P: Predictor + Sync> Explainer<'a, P> {
    pub fn new(predictor: P, table: Table<'a>) -> Self {
        Self { predictor, table }
    }

    pub fn predictor(&self) -> &P {
        &self.predictor
    }

    pub fn table(&self) -> &Table<'a> {
        &self.table
    }

    /// Scores every predictor column with default options.
    pub fn variable_importance<L>(&self, loss: &L) -> Result<Report, ImportanceError>
    where
        L: LossFunction + Sync,
    {
        variable_importance(&self.predictor, &self.table, loss)
    }

    pub fn variable_importance_with<L>(
        &self,
        loss: &L,
        options: ImportanceOptions,
        variables: &[&str],
    ) -> Result<Report, ImportanceError>
    where
        L: LossFunction + Sync,
    {
        options.compute(&self.predictor, &self.table, loss, variables)
    }
}
