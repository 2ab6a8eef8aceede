use std::path::Path;

use tracing::info;

use crate::config::Hyperparameters;
use crate::data::batch::BatchIterator;
use crate::data::dataset::Dataset;
use crate::data::split::{split_dataset, Split};
use crate::error::TrainError;
use crate::loss::NllLoss;
use crate::model::classifier::Classifier;
use crate::model::{Mode, Model, Optimizer};
use crate::optim::Adam;
use crate::persist::artifacts::{save_results, OutputPaths};
use crate::persist::sink::OutputSink;
use crate::remote::RunLogger;
use crate::search::Trial;
use crate::train::metrics::{EpochRecord, MetricHistory, PhaseAccumulator};

/// Loads the preprocessed dataset from an IDX image/label pair, then runs
/// [`train_model`] on it.
pub fn train_from_files(
    image_path: &Path,
    label_path: &Path,
    hp: &Hyperparameters,
    paths: &OutputPaths,
    sink: &dyn OutputSink,
    trial: Option<&mut dyn Trial>,
    run: Option<&mut dyn RunLogger>,
) -> Result<MetricHistory, TrainError> {
    let dataset = Dataset::load_idx_pair(image_path, label_path, hp.num_classes)?;
    train_model(&dataset, hp, paths, sink, trial, run)
}

/// Trains a fresh classifier on `dataset` and returns the metric history.
///
/// Splits the data with the configured seed and fraction, runs
/// [`run_training`], then persists the artifact bundle through `sink`
/// (unless persistence is disabled or no epoch completed). When a remote
/// run is active its parameters are logged up front, the persister forwards
/// the metric series and plots to it, and the run is completed afterwards —
/// except under a search trial, where the orchestrator owns the run.
///
/// A pruned trial surfaces as `Err(TrainError::TrialPruned)` carrying the
/// partial history; nothing is persisted in that case.
pub fn train_model(
    dataset: &Dataset,
    hp: &Hyperparameters,
    paths: &OutputPaths,
    sink: &dyn OutputSink,
    trial: Option<&mut dyn Trial>,
    mut run: Option<&mut dyn RunLogger>,
) -> Result<MetricHistory, TrainError> {
    if dataset.sample_size() != hp.input_size() {
        return Err(TrainError::Dataset(format!(
            "dataset samples have {} values but the configured architecture expects {}",
            dataset.sample_size(),
            hp.input_size()
        )));
    }

    if let Some(run) = run.as_deref_mut() {
        run.log_scalar("Learning rate", hp.learning_rate);
        run.log_scalar("Epochs", hp.epochs as f64);
        run.log_scalar("Dropout", hp.dropout_p);
    }

    let split = split_dataset(dataset.len(), hp.train_fraction, hp.seed)?;
    info!(
        "Length of Train Data : {} / Length of Validation Data : {}",
        split.training.len(),
        split.validation.len()
    );

    let mut model = Classifier::new(hp);
    let mut optimizer = Adam::new(hp.learning_rate);

    let in_trial = trial.is_some();
    let history = run_training(&mut model, &mut optimizer, dataset, &split, hp, trial)?;

    if hp.save_training_results && !history.is_empty() {
        save_results(sink, &model, &history, paths, run.as_deref_mut())?;
    }

    if !in_trial {
        if let Some(run) = run.as_deref_mut() {
            run.complete();
            info!("completed the training experiment run");
        }
    }

    Ok(history)
}

/// The epoch loop, generic over the model/optimizer capability seams.
///
/// Each epoch: one shuffled pass over the training partition with
/// forward/backward and an optimizer step per batch, one forward-only pass
/// over the validation partition, metric finalization, one summary log
/// line, and — if a trial handle is present — a report of the validation
/// accuracy followed by the prune check. Pruning is the only mid-run abort
/// path and is checked once per epoch boundary, never mid-batch.
pub fn run_training<M, O>(
    model: &mut M,
    optimizer: &mut O,
    dataset: &Dataset,
    split: &Split,
    hp: &Hyperparameters,
    mut trial: Option<&mut dyn Trial>,
) -> Result<MetricHistory, TrainError>
where
    M: Model,
    O: Optimizer<M>,
{
    let mut history = MetricHistory::new();
    if hp.epochs == 0 {
        return Ok(history);
    }

    // Separate shuffle streams per phase, both derived from the run seed.
    let mut train_batches =
        BatchIterator::new(&split.training, hp.batch_size, hp.seed.wrapping_add(1));
    let mut val_batches =
        BatchIterator::new(&split.validation, hp.batch_size, hp.seed.wrapping_add(2));

    for epoch in 0..hp.epochs {
        model.set_mode(Mode::Training);
        let mut train_phase = PhaseAccumulator::default();
        for batch in train_batches.next_pass() {
            optimizer.zero_gradients(model);
            let scale = 1.0 / batch.len() as f64;
            let mut loss_sum = 0.0;
            let mut correct = 0;
            for &sample in batch {
                let input = dataset.image(sample);
                let target = dataset.label(sample);

                let log_probs = model.forward(input);
                loss_sum += NllLoss::loss(&log_probs, target);
                if argmax(&log_probs) == target {
                    correct += 1;
                }

                // Scaling each sample's delta by 1/batch gives the gradient
                // of the batch-mean loss once the contributions accumulate.
                let mut delta = NllLoss::delta(&log_probs, target);
                for d in delta.iter_mut() {
                    *d *= scale;
                }
                model.backward(input, &delta);
            }
            let mean_loss = loss_sum * scale;
            if !mean_loss.is_finite() {
                return Err(TrainError::TrainingDiverged { epoch, loss: mean_loss });
            }
            optimizer.step(model);
            train_phase.record_batch(mean_loss, correct, batch.len());
        }

        model.set_mode(Mode::Evaluation);
        let mut val_phase = PhaseAccumulator::default();
        for batch in val_batches.next_pass() {
            let mut loss_sum = 0.0;
            let mut correct = 0;
            for &sample in batch {
                let log_probs = model.forward(dataset.image(sample));
                loss_sum += NllLoss::loss(&log_probs, dataset.label(sample));
                if argmax(&log_probs) == dataset.label(sample) {
                    correct += 1;
                }
            }
            let mean_loss = loss_sum / batch.len() as f64;
            if !mean_loss.is_finite() {
                return Err(TrainError::TrainingDiverged { epoch, loss: mean_loss });
            }
            val_phase.record_batch(mean_loss, correct, batch.len());
        }

        let train = train_phase.finalize()?;
        let val = val_phase.finalize()?;
        history.push(EpochRecord {
            train_loss: train.loss,
            train_accuracy: train.accuracy,
            val_loss: val.loss,
            val_accuracy: val.accuracy,
        });

        info!(
            "Epoch: {}/{}.. Training Loss: {:.3}.. Training Accuracy: {:.3}.. \
             Validation Loss: {:.3}.. Validation Accuracy: {:.3}",
            epoch + 1,
            hp.epochs,
            train.loss,
            train.accuracy,
            val.loss,
            val.accuracy
        );

        if let Some(trial) = trial.as_deref_mut() {
            trial.report(epoch, val.accuracy);
            if trial.should_prune() {
                info!("search trial pruned after epoch {}", epoch + 1);
                return Err(TrainError::TrialPruned { history });
            }
        }
    }

    Ok(history)
}

/// Index of the maximum element in a slice.
fn argmax(v: &[f64]) -> usize {
    v.iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, _)| i)
        .unwrap_or(0)
}
