use thiserror::Error;

use crate::train::metrics::MetricHistory;

/// Top-level error type for a training run.
///
/// `TrialPruned` is not a failure: it is the controlled early-termination
/// signal from the hyperparameter-search collaborator and carries the metric
/// history accumulated up to the pruned epoch. Callers that sweep trials
/// match on it; everything else is fatal and propagates unchanged.
#[derive(Debug, Error)]
pub enum TrainError {
    #[error("invalid split: {0}")]
    InvalidSplit(String),

    #[error("cannot finalize metrics for a phase with zero batches")]
    EmptyPartition,

    #[error("trial pruned after {} completed epochs", history.len())]
    TrialPruned { history: MetricHistory },

    #[error("training diverged at epoch {epoch}: batch loss = {loss}")]
    TrainingDiverged { epoch: usize, loss: f64 },

    #[error("dataset error: {0}")]
    Dataset(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
