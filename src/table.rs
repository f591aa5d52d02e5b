use itertools::Itertools as _;
use rand::seq::SliceRandom as _;
use rand::Rng;
use std::borrow::Cow;
use thiserror::Error;

/// A validation dataset: named columns of equal length, one of which is the
/// designated response. Columns are borrowed; the table never mutates them.
#[derive(Debug, Clone)]
pub struct Table<'a> {
    names: Vec<&'a str>,
    columns: Vec<&'a [f64]>,
    response: usize,
}

impl<'a> Table<'a> {
    pub fn new(columns: Vec<(&'a str, &'a [f64])>, response: &str) -> Result<Self, TableError> {
        if columns.is_empty() || columns[0].1.is_empty() {
            return Err(TableError::EmptyTable);
        }

        let rows_len = columns[0].1.len();
        if columns.iter().skip(1).any(|(_, c)| c.len() != rows_len) {
            return Err(TableError::RowSizeMismatch);
        }

        if let Some(&(name, _)) = columns.iter().duplicates_by(|(name, _)| *name).next() {
            return Err(TableError::DuplicateColumn {
                name: name.to_owned(),
            });
        }

        let response_index = columns
            .iter()
            .position(|&(name, _)| name == response)
            .ok_or_else(|| TableError::UnknownColumn {
                name: response.to_owned(),
            })?;

        if columns.len() < 2 {
            return Err(TableError::NoPredictors);
        }

        if columns[response_index].1.iter().any(|v| !v.is_finite()) {
            return Err(TableError::NonFiniteResponse);
        }

        let (names, columns) = columns.into_iter().unzip();
        Ok(Self {
            names,
            columns,
            response: response_index,
        })
    }

    pub fn response(&self) -> &'a [f64] {
        self.columns[self.response]
    }

    pub fn response_name(&self) -> &'a str {
        self.names[self.response]
    }

    pub fn rows_len(&self) -> usize {
        self.columns[0].len()
    }

    pub fn predictors_len(&self) -> usize {
        self.columns.len() - 1
    }

    /// Predictor column names in natural column order.
    pub fn predictor_names(&self) -> impl '_ + Iterator<Item = &'a str> {
        let response = self.response;
        self.names
            .iter()
            .enumerate()
            .filter(move |&(i, _)| i != response)
            .map(|(_, &name)| name)
    }

    pub fn features(&self) -> Features<'a> {
        let response = self.response;
        let (names, columns) = self
            .names
            .iter()
            .zip(self.columns.iter())
            .enumerate()
            .filter(|&(i, _)| i != response)
            .map(|(_, (&name, &column))| (name, Cow::Borrowed(column)))
            .unzip();
        Features { names, columns }
    }

    /// Resolves `name` to an index into the `Features` view.
    pub(crate) fn predictor_index(&self, name: &str) -> Result<usize, TableError> {
        if name == self.response_name() {
            return Err(TableError::ResponseColumn {
                name: name.to_owned(),
            });
        }
        self.predictor_names()
            .position(|n| n == name)
            .ok_or_else(|| TableError::UnknownColumn {
                name: name.to_owned(),
            })
    }
}

/// The predictor-column subset of a [`Table`], as handed to a
/// [`Predictor`](crate::Predictor). A permuted working copy owns only the
/// shuffled column and borrows the rest.
#[derive(Debug, Clone)]
pub struct Features<'a> {
    names: Vec<&'a str>,
    columns: Vec<Cow<'a, [f64]>>,
}

impl<'a> Features<'a> {
    pub fn names(&self) -> &[&'a str] {
        &self.names
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.names
            .iter()
            .position(|&n| n == name)
            .map(|i| &*self.columns[i])
    }

    pub fn column_at(&self, index: usize) -> &[f64] {
        &self.columns[index]
    }

    pub fn columns_len(&self) -> usize {
        self.columns.len()
    }

    pub fn rows_len(&self) -> usize {
        self.columns[0].len()
    }

    /// One record's predictor values, in column order.
    pub fn row(&self, row: usize) -> impl '_ + Iterator<Item = f64> {
        self.columns.iter().map(move |c| c[row])
    }

    /// A copy of `self` with the values of one column uniformly shuffled.
    /// Every other column is shared with `self`, untouched.
    pub fn with_permuted<R: Rng + ?Sized>(&self, column: usize, rng: &mut R) -> Self {
        let mut copy = self.clone();
        let mut values = copy.columns[column].to_vec();
        values.shuffle(rng);
        copy.columns[column] = Cow::Owned(values);
        copy
    }
}

#[derive(Debug, Error, Clone)]
pub enum TableError {
    #[error("table must have at least one column and one row")]
    EmptyTable,

    #[error("some columns have a different row count from others")]
    RowSizeMismatch,

    #[error("column {name:?} appears more than once")]
    DuplicateColumn { name: String },

    #[error("column {name:?} is not present in the table")]
    UnknownColumn { name: String },

    #[error("column {name:?} is the response and cannot be scored")]
    ResponseColumn { name: String },

    #[error("table must have at least one predictor column")]
    NoPredictors,

    #[error("response column contains non finite numbers")]
    NonFiniteResponse,
}

#[cfg(test)]
mod tests {
    use super::*;
    use ordered_float::OrderedFloat;
    use rand::rngs::StdRng;
    use rand::SeedableRng as _;

    #[test]
    fn construction_validates_shape() {
        assert!(matches!(
            Table::new(vec![], "y"),
            Err(TableError::EmptyTable)
        ));
        assert!(matches!(
            Table::new(vec![("y", &[][..])], "y"),
            Err(TableError::EmptyTable)
        ));
        assert!(matches!(
            Table::new(vec![("x", &[1.0][..]), ("y", &[1.0, 2.0][..])], "y"),
            Err(TableError::RowSizeMismatch)
        ));
        assert!(matches!(
            Table::new(vec![("x", &[1.0][..]), ("x", &[2.0][..])], "x"),
            Err(TableError::DuplicateColumn { .. })
        ));
        assert!(matches!(
            Table::new(vec![("x", &[1.0][..]), ("y", &[2.0][..])], "z"),
            Err(TableError::UnknownColumn { .. })
        ));
        assert!(matches!(
            Table::new(vec![("y", &[1.0][..])], "y"),
            Err(TableError::NoPredictors)
        ));
        assert!(matches!(
            Table::new(
                vec![("x", &[1.0][..]), ("y", &[f64::NAN][..])],
                "y"
            ),
            Err(TableError::NonFiniteResponse)
        ));
    }

    #[test]
    fn response_may_be_any_column() -> Result<(), anyhow::Error> {
        let y = [1.0, 2.0];
        let x1 = [3.0, 4.0];
        let x2 = [5.0, 6.0];
        let table = Table::new(vec![("x1", &x1[..]), ("y", &y[..]), ("x2", &x2[..])], "y")?;

        assert_eq!(table.response(), &y[..]);
        assert_eq!(table.response_name(), "y");
        assert_eq!(table.predictors_len(), 2);
        assert_eq!(table.predictor_names().collect::<Vec<_>>(), ["x1", "x2"]);

        let features = table.features();
        assert_eq!(features.names(), ["x1", "x2"]);
        assert_eq!(features.column("x2"), Some(&x2[..]));
        assert_eq!(features.column("y"), None);
        assert_eq!(features.row(1).collect::<Vec<_>>(), [4.0, 6.0]);
        Ok(())
    }

    #[test]
    fn permutation_touches_exactly_one_column() -> Result<(), anyhow::Error> {
        let x1 = [1.0, 2.0, 3.0, 4.0, 5.0];
        let x2 = [9.0, 8.0, 7.0, 6.0, 5.0];
        let y = [0.0, 0.0, 0.0, 0.0, 0.0];
        let table = Table::new(vec![("x1", &x1[..]), ("x2", &x2[..]), ("y", &y[..])], "y")?;

        let features = table.features();
        let mut rng = StdRng::seed_from_u64(0);
        let permuted = features.with_permuted(0, &mut rng);

        assert_eq!(permuted.rows_len(), features.rows_len());
        assert_eq!(permuted.column_at(1), features.column_at(1));

        let mut original = features.column_at(0).to_vec();
        let mut shuffled = permuted.column_at(0).to_vec();
        original.sort_by_key(|&v| OrderedFloat(v));
        shuffled.sort_by_key(|&v| OrderedFloat(v));
        assert_eq!(original, shuffled);
        Ok(())
    }
}
