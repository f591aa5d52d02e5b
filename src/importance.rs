use crate::functions;
use crate::loss::{LossError, LossFunction};
use crate::predictor::Predictor;
use crate::table::{Table, TableError};
use itertools::Itertools as _;
use ordered_float::OrderedFloat;
use rand::rngs::StdRng;
use rand::seq::SliceRandom as _;
use rand::{Rng, SeedableRng as _};
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use serde::Serialize;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// Report label for the unpermuted full-model loss.
pub const FULL_MODEL_LABEL: &str = "_full_model_";

/// Report label for the shuffled-response reference loss.
pub const BASELINE_LABEL: &str = "_baseline_";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ImportanceMode {
    /// Report each permuted loss as measured.
    Raw,
    /// Subtract the full-model loss from every entry.
    Difference,
}

#[derive(Debug, Clone)]
pub struct ImportanceOptions {
    mode: ImportanceMode,
    repeats: NonZeroUsize,
    seed: Option<u64>,
    parallel: bool,
    cancel: Option<CancellationToken>,
}

impl ImportanceOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(mut self, mode: ImportanceMode) -> Self {
        self.mode = mode;
        self
    }

    /// Number of independent permutation draws per scored variable (and for
    /// the baseline). Entries report the mean and the population standard
    /// deviation across draws.
    pub fn repeats(mut self, repeats: NonZeroUsize) -> Self {
        self.repeats = repeats;
        self
    }

    /// Makes every permutation draw reproducible. Without a seed, draws come
    /// from the thread-local generator and are not reproducible.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn parallel(mut self, enabled: bool) -> Self {
        self.parallel = enabled;
        self
    }

    pub fn cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Scores `variables` (all predictor columns when empty) by permuting one
    /// column at a time and recomputing `loss` against `predictor`'s output.
    pub fn compute<P, L>(
        self,
        predictor: &P,
        table: &Table<'_>,
        loss: &L,
        variables: &[&str],
    ) -> Result<Report, ImportanceError>
    where
        P: Predictor + Sync,
        L: LossFunction + Sync,
    {
        let columns = resolve_variables(table, variables)?;

        let features = table.features();
        let actual = table.response();
        let predicted = predictor.predict(&features);
        let full_loss = loss.compute(actual, &predicted)?;

        let repeats = self.repeats.get();
        let tasks = std::iter::once(Task::Baseline)
            .chain(columns.iter().map(|&column| Task::Variable { column }))
            .flat_map(|task| std::iter::repeat(task).take(repeats))
            .zip(self.rngs(repeats * (1 + columns.len())))
            .collect::<Vec<_>>();

        let cancel = self.cancel.clone();
        let run = |(task, mut rng): (Task, StdRng)| -> Result<f64, ImportanceError> {
            if cancel.as_ref().map_or(false, |t| t.is_cancelled()) {
                return Err(ImportanceError::Cancelled);
            }
            match task {
                Task::Baseline => {
                    let mut shuffled = actual.to_vec();
                    shuffled.shuffle(&mut rng);
                    Ok(loss.compute(&shuffled, &predicted)?)
                }
                Task::Variable { column } => {
                    let permuted = features.with_permuted(column, &mut rng);
                    let prediction = predictor.predict(&permuted);
                    Ok(loss.compute(actual, &prediction)?)
                }
            }
        };

        let losses = if self.parallel {
            tasks.into_par_iter().map(run).collect::<Result<Vec<_>, _>>()
        } else {
            tasks.into_iter().map(run).collect::<Result<Vec<_>, _>>()
        }?;

        let shift = match self.mode {
            ImportanceMode::Raw => 0.0,
            ImportanceMode::Difference => full_loss,
        };

        let mut entries = Vec::with_capacity(2 + columns.len());
        entries.push(ReportEntry {
            label: FULL_MODEL_LABEL.to_owned(),
            loss: full_loss - shift,
            stddev: 0.0,
        });

        let mut chunks = losses.chunks_exact(repeats);
        let (baseline, baseline_stddev) =
            functions::mean_and_stddev(chunks.next().expect("never fails").iter().copied());
        entries.push(ReportEntry {
            label: BASELINE_LABEL.to_owned(),
            loss: baseline - shift,
            stddev: baseline_stddev,
        });

        let names = table.predictor_names().collect::<Vec<_>>();
        for (&column, chunk) in columns.iter().zip(chunks) {
            let (mean, stddev) = functions::mean_and_stddev(chunk.iter().copied());
            entries.push(ReportEntry {
                label: names[column].to_owned(),
                loss: mean - shift,
                stddev,
            });
        }

        Ok(Report { entries })
    }

    fn rngs(&self, n: usize) -> Vec<StdRng> {
        let seed_u64 = self.seed.unwrap_or_else(|| rand::thread_rng().gen());
        let mut seed = [0u8; 32];
        (&mut seed[0..8]).copy_from_slice(&seed_u64.to_be_bytes()[..]);
        let mut rng = StdRng::from_seed(seed);
        (0..n)
            .map(|_| {
                let mut seed = [0u8; 32];
                rng.fill(&mut seed[..]);
                StdRng::from_seed(seed)
            })
            .collect()
    }
}

impl Default for ImportanceOptions {
    fn default() -> Self {
        Self {
            mode: ImportanceMode::Raw,
            repeats: NonZeroUsize::new(1).expect("never fails"),
            seed: None,
            parallel: false,
            cancel: None,
        }
    }
}

/// Scores all predictor columns with default options.
pub fn variable_importance<P, L>(
    predictor: &P,
    table: &Table<'_>,
    loss: &L,
) -> Result<Report, ImportanceError>
where
    P: Predictor + Sync,
    L: LossFunction + Sync,
{
    ImportanceOptions::default().compute(predictor, table, loss, &[])
}

#[derive(Debug, Clone, Copy)]
enum Task {
    Baseline,
    Variable { column: usize },
}

fn resolve_variables(table: &Table<'_>, variables: &[&str]) -> Result<Vec<usize>, TableError> {
    if variables.is_empty() {
        return Ok((0..table.predictors_len()).collect());
    }
    if let Some(&name) = variables.iter().duplicates().next() {
        return Err(TableError::DuplicateColumn {
            name: name.to_owned(),
        });
    }
    variables
        .iter()
        .map(|&name| table.predictor_index(name))
        .collect()
}

/// Signals cooperative cancellation to an in-flight computation. Cloning
/// shares the underlying flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Ordered importance entries: `_full_model_`, `_baseline_`, then one entry
/// per scored variable in the order they were requested.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    entries: Vec<ReportEntry>,
}

impl Report {
    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    pub fn get(&self, label: &str) -> Option<&ReportEntry> {
        self.entries.iter().find(|e| e.label == label)
    }

    pub fn full_model(&self) -> &ReportEntry {
        &self.entries[0]
    }

    pub fn baseline(&self) -> &ReportEntry {
        &self.entries[1]
    }

    pub fn variables(&self) -> &[ReportEntry] {
        &self.entries[2..]
    }

    /// Variable entries, most important (highest loss) first.
    pub fn sorted_variables(&self) -> Vec<&ReportEntry> {
        self.variables()
            .iter()
            .sorted_by_key(|e| std::cmp::Reverse(OrderedFloat(e.loss)))
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportEntry {
    pub label: String,
    pub loss: f64,
    pub stddev: f64,
}

#[non_exhaustive]
#[derive(Debug, Error, Clone)]
pub enum ImportanceError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] TableError),

    #[error("loss function cannot be evaluated: {0}")]
    IncompatibleLoss(#[from] LossError),

    #[error("importance computation was cancelled")]
    Cancelled,
}
