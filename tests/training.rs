//! End-to-end training scenarios over a small synthetic dataset.

use std::path::Path;

use finnet::{
    run_training, train_model, Adam, Classifier, Dataset, Hyperparameters, LocalSink,
    MetricHistory, Mode, Model, Optimizer, OutputPaths, RecordedRun, Split, TrainError, Trial,
};

/// Two well-separated classes over 4 "pixels": class 0 lights up the first
/// two, class 1 the last two, with a small deterministic wobble.
fn synthetic_dataset(n: usize) -> Dataset {
    let mut images = Vec::with_capacity(n);
    let mut labels = Vec::with_capacity(n);
    for i in 0..n {
        let wobble = (i % 5) as f64 * 0.02;
        if i % 2 == 0 {
            images.push(vec![0.9 - wobble, 0.8 + wobble, 0.1, 0.05]);
            labels.push(0);
        } else {
            images.push(vec![0.1, 0.05, 0.9 - wobble, 0.8 + wobble]);
            labels.push(1);
        }
    }
    Dataset::from_parts(images, labels, 2).unwrap()
}

fn tiny_hyperparameters() -> Hyperparameters {
    Hyperparameters {
        epochs: 3,
        learning_rate: 0.01,
        dropout_p: 0.0,
        batch_size: 8,
        seed: 3,
        train_fraction: 0.8,
        image_height: 2,
        image_width: 2,
        channels: 1,
        fc1: 8,
        fc2: 6,
        num_classes: 2,
        ..Hyperparameters::default()
    }
}

struct PruneAtEpoch {
    prune_from: usize,
    last_reported: Option<usize>,
}

impl Trial for PruneAtEpoch {
    fn report(&mut self, epoch: usize, _value: f64) {
        self.last_reported = Some(epoch);
    }

    fn should_prune(&self) -> bool {
        self.last_reported.is_some_and(|epoch| epoch >= self.prune_from)
    }
}

fn no_artifacts_written(root: &Path) -> bool {
    !root.join("models").exists()
        && !root.join("metrics").exists()
        && !root.join("figures").exists()
}

#[test]
fn history_has_one_record_per_epoch() {
    let dataset = synthetic_dataset(60);
    let dir = tempfile::tempdir().unwrap();
    let sink = LocalSink::new(dir.path());
    let hp = tiny_hyperparameters();

    let history =
        train_model(&dataset, &hp, &OutputPaths::default(), &sink, None, None).unwrap();
    assert_eq!(history.len(), 3);
}

#[test]
fn metrics_stay_in_their_natural_ranges() {
    let dataset = synthetic_dataset(60);
    let dir = tempfile::tempdir().unwrap();
    let sink = LocalSink::new(dir.path());
    let hp = tiny_hyperparameters();

    let history =
        train_model(&dataset, &hp, &OutputPaths::default(), &sink, None, None).unwrap();
    for record in history.records() {
        assert!(record.train_loss >= 0.0);
        assert!(record.val_loss >= 0.0);
        assert!((0.0..=1.0).contains(&record.train_accuracy));
        assert!((0.0..=1.0).contains(&record.val_accuracy));
    }
}

#[test]
fn training_learns_the_synthetic_task() {
    let dataset = synthetic_dataset(64);
    let dir = tempfile::tempdir().unwrap();
    let sink = LocalSink::new(dir.path());
    let mut hp = tiny_hyperparameters();
    hp.epochs = 30;

    let history =
        train_model(&dataset, &hp, &OutputPaths::default(), &sink, None, None).unwrap();
    let first = &history.records()[0];
    let last = history.records().last().unwrap();
    assert!(last.train_loss < first.train_loss);
    assert!(last.train_accuracy > 0.7, "accuracy stuck at {}", last.train_accuracy);
}

#[test]
fn identical_configurations_reproduce_identical_histories() {
    let dataset = synthetic_dataset(60);
    let hp = tiny_hyperparameters();

    let dir_a = tempfile::tempdir().unwrap();
    let a = train_model(
        &dataset,
        &hp,
        &OutputPaths::default(),
        &LocalSink::new(dir_a.path()),
        None,
        None,
    )
    .unwrap();

    let dir_b = tempfile::tempdir().unwrap();
    let b = train_model(
        &dataset,
        &hp,
        &OutputPaths::default(),
        &LocalSink::new(dir_b.path()),
        None,
        None,
    )
    .unwrap();

    assert_eq!(a, b);
}

#[test]
fn pruned_trial_keeps_partial_history_and_persists_nothing() {
    let dataset = synthetic_dataset(60);
    let dir = tempfile::tempdir().unwrap();
    let sink = LocalSink::new(dir.path());
    let hp = tiny_hyperparameters();

    // should_prune is false after epochs 0 and 1, true after epoch 2.
    let mut trial = PruneAtEpoch { prune_from: 2, last_reported: None };
    let result = train_model(
        &dataset,
        &hp,
        &OutputPaths::default(),
        &sink,
        Some(&mut trial),
        None,
    );

    match result {
        Err(TrainError::TrialPruned { history }) => assert_eq!(history.len(), 3),
        other => panic!("expected TrialPruned, got {other:?}"),
    }
    assert!(no_artifacts_written(dir.path()));
}

#[test]
fn zero_epochs_returns_an_empty_history_and_writes_nothing() {
    let dataset = synthetic_dataset(60);
    let dir = tempfile::tempdir().unwrap();
    let sink = LocalSink::new(dir.path());
    let mut hp = tiny_hyperparameters();
    hp.epochs = 0;

    let history =
        train_model(&dataset, &hp, &OutputPaths::default(), &sink, None, None).unwrap();
    assert!(history.is_empty());
    assert!(no_artifacts_written(dir.path()));
}

#[test]
fn disabling_save_skips_artifacts_but_returns_the_history() {
    let dataset = synthetic_dataset(60);
    let dir = tempfile::tempdir().unwrap();
    let sink = LocalSink::new(dir.path());
    let mut hp = tiny_hyperparameters();
    hp.save_training_results = false;

    let history =
        train_model(&dataset, &hp, &OutputPaths::default(), &sink, None, None).unwrap();
    assert_eq!(history.len(), 3);
    assert!(no_artifacts_written(dir.path()));
}

#[test]
fn completed_run_writes_artifacts_and_reloads_them() {
    let dataset = synthetic_dataset(60);
    let dir = tempfile::tempdir().unwrap();
    let sink = LocalSink::new(dir.path());
    let hp = tiny_hyperparameters();
    let paths = OutputPaths::default();

    let history = train_model(&dataset, &hp, &paths, &sink, None, None).unwrap();

    let model_path = dir.path().join("models/classifier.json");
    let history_path = dir.path().join("metrics/train_val_history.json");
    assert!(model_path.is_file());
    assert!(history_path.is_file());
    assert!(dir.path().join("figures/training_loss.svg").is_file());
    assert!(dir.path().join("figures/training_accuracy.svg").is_file());

    let reloaded = MetricHistory::load_json(history_path.to_str().unwrap()).unwrap();
    assert_eq!(history, reloaded);

    let mut model = Classifier::load_json(model_path.to_str().unwrap()).unwrap();
    assert_eq!(model.input_size(), hp.input_size());
    let logp = model.forward(&[0.9, 0.8, 0.1, 0.05]);
    assert_eq!(logp.len(), 2);
}

#[test]
fn remote_run_receives_parameters_series_plots_and_completion() {
    let dataset = synthetic_dataset(60);
    let dir = tempfile::tempdir().unwrap();
    let sink = LocalSink::new(dir.path());
    let hp = tiny_hyperparameters();
    let mut run = RecordedRun::new();

    train_model(&dataset, &hp, &OutputPaths::default(), &sink, None, Some(&mut run)).unwrap();

    let scalar_names: Vec<&str> = run.scalars.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(scalar_names, vec!["Learning rate", "Epochs", "Dropout"]);
    assert_eq!(run.series.len(), 4);
    assert_eq!(run.images.len(), 2);
    assert!(run.completed);
}

#[test]
fn a_trial_leaves_the_remote_run_open_for_its_orchestrator() {
    let dataset = synthetic_dataset(60);
    let dir = tempfile::tempdir().unwrap();
    let sink = LocalSink::new(dir.path());
    let hp = tiny_hyperparameters();
    let mut run = RecordedRun::new();
    let mut trial = PruneAtEpoch { prune_from: usize::MAX, last_reported: None };

    train_model(
        &dataset,
        &hp,
        &OutputPaths::default(),
        &sink,
        Some(&mut trial),
        Some(&mut run),
    )
    .unwrap();

    assert_eq!(trial.last_reported, Some(2));
    assert!(!run.completed);
}

#[test]
fn mismatched_architecture_is_rejected_before_training() {
    let dataset = synthetic_dataset(60);
    let dir = tempfile::tempdir().unwrap();
    let sink = LocalSink::new(dir.path());
    let mut hp = tiny_hyperparameters();
    hp.image_width = 5;

    let err = train_model(&dataset, &hp, &OutputPaths::default(), &sink, None, None);
    assert!(matches!(err, Err(TrainError::Dataset(_))));
    assert!(no_artifacts_written(dir.path()));
}

// A model whose forward pass immediately produces NaN, for exercising the
// divergence path through the generic loop.
struct DivergentModel;

impl Model for DivergentModel {
    fn set_mode(&mut self, _mode: Mode) {}

    fn forward(&mut self, _input: &[f64]) -> Vec<f64> {
        vec![f64::NAN, f64::NAN]
    }

    fn backward(&mut self, _input: &[f64], _delta: &[f64]) {}
}

struct NoopOptimizer;

impl Optimizer<DivergentModel> for NoopOptimizer {
    fn zero_gradients(&mut self, _model: &mut DivergentModel) {}

    fn step(&mut self, _model: &mut DivergentModel) {}
}

#[test]
fn non_finite_loss_aborts_the_run_immediately() {
    let dataset = synthetic_dataset(10);
    let split = Split { training: vec![0, 1, 2, 3, 4, 5, 6, 7], validation: vec![8, 9] };
    let hp = tiny_hyperparameters();

    let result = run_training(
        &mut DivergentModel,
        &mut NoopOptimizer,
        &dataset,
        &split,
        &hp,
        None,
    );
    assert!(matches!(
        result,
        Err(TrainError::TrainingDiverged { epoch: 0, .. })
    ));
}
