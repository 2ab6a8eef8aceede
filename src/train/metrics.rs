use serde::{Serialize, Deserialize};

use crate::error::TrainError;

/// Running-sum bookkeeping for one phase (train or validation) of one epoch.
///
/// Reset by constructing a fresh accumulator at the start of each phase.
/// `finalize` turns the sums into the per-epoch scalars; it refuses to
/// divide by zero and reports `EmptyPartition` instead of producing NaN.
#[derive(Debug, Default, Clone, Copy)]
pub struct PhaseAccumulator {
    loss_sum: f64,
    correct: usize,
    samples: usize,
    batches: usize,
}

/// Finalized scalars for one phase of one epoch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseMetrics {
    /// Mean of the per-batch mean losses.
    pub loss: f64,
    /// Correct predictions over all samples seen, in [0, 1].
    pub accuracy: f64,
}

impl PhaseAccumulator {
    /// Records one completed batch: its mean loss, the number of correct
    /// predictions in it, and its sample count.
    pub fn record_batch(&mut self, mean_loss: f64, correct: usize, samples: usize) {
        self.loss_sum += mean_loss;
        self.correct += correct;
        self.samples += samples;
        self.batches += 1;
    }

    pub fn finalize(&self) -> Result<PhaseMetrics, TrainError> {
        if self.batches == 0 || self.samples == 0 {
            return Err(TrainError::EmptyPartition);
        }
        Ok(PhaseMetrics {
            loss: self.loss_sum / self.batches as f64,
            accuracy: self.correct as f64 / self.samples as f64,
        })
    }
}

/// Metrics for one completed epoch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpochRecord {
    pub train_loss: f64,
    pub train_accuracy: f64,
    pub val_loss: f64,
    pub val_accuracy: f64,
}

/// Ordered, append-only record of every completed epoch.
///
/// Owned exclusively by the training loop while it runs and handed
/// immutably to the artifact persister at the end.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricHistory {
    epochs: Vec<EpochRecord>,
}

impl MetricHistory {
    pub fn new() -> MetricHistory {
        MetricHistory::default()
    }

    pub fn push(&mut self, record: EpochRecord) {
        self.epochs.push(record);
    }

    pub fn len(&self) -> usize {
        self.epochs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.epochs.is_empty()
    }

    pub fn records(&self) -> &[EpochRecord] {
        &self.epochs
    }

    pub fn train_losses(&self) -> Vec<f64> {
        self.epochs.iter().map(|e| e.train_loss).collect()
    }

    pub fn train_accuracies(&self) -> Vec<f64> {
        self.epochs.iter().map(|e| e.train_accuracy).collect()
    }

    pub fn val_losses(&self) -> Vec<f64> {
        self.epochs.iter().map(|e| e.val_loss).collect()
    }

    pub fn val_accuracies(&self) -> Vec<f64> {
        self.epochs.iter().map(|e| e.val_accuracy).collect()
    }

    /// Serializes the full history to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> std::io::Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
    }

    /// Deserializes a history from a JSON file written by `save_json`.
    pub fn load_json(path: &str) -> std::io::Result<MetricHistory> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        serde_json::from_reader(reader)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
    }
}
