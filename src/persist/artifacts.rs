use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::TrainError;
use crate::persist::plot::{line_chart, Series};
use crate::persist::sink::OutputSink;
use crate::remote::RunLogger;
use crate::train::metrics::MetricHistory;

/// Relative artifact paths, resolved against the active sink's root.
#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub model: PathBuf,
    pub history: PathBuf,
    pub loss_plot: PathBuf,
    pub accuracy_plot: PathBuf,
}

impl Default for OutputPaths {
    fn default() -> Self {
        OutputPaths {
            model: PathBuf::from("models/classifier.json"),
            history: PathBuf::from("metrics/train_val_history.json"),
            loss_plot: PathBuf::from("figures/training_loss.svg"),
            accuracy_plot: PathBuf::from("figures/training_accuracy.svg"),
        }
    }
}

/// Persists the artifact bundle of a completed run: the model weights, the
/// metric history, and the loss/accuracy curve plots.
///
/// Each artifact is written through a scoped buffered writer, so a failed
/// write drops the handle rather than leaving it open; directory creation
/// happens in `OutputSink::resolve` and is idempotent. When a remote run is
/// active, the metric series and both rendered plots are forwarded to it as
/// well; the run's lifecycle is otherwise untouched.
pub fn save_results<M: Serialize>(
    sink: &dyn OutputSink,
    model: &M,
    history: &MetricHistory,
    paths: &OutputPaths,
    mut run: Option<&mut (dyn RunLogger + '_)>,
) -> Result<(), TrainError> {
    let model_path = sink.resolve(&paths.model)?;
    write_json(&model_path, model)?;

    let history_path = sink.resolve(&paths.history)?;
    write_json(&history_path, history)?;

    let loss_svg = line_chart(
        "Training loss",
        "Loss",
        &[
            Series { label: "Training loss", values: &history.train_losses() },
            Series { label: "Validation loss", values: &history.val_losses() },
        ],
    );
    let loss_path = sink.resolve(&paths.loss_plot)?;
    std::fs::write(&loss_path, &loss_svg)?;

    let accuracy_svg = line_chart(
        "Training accuracy",
        "Accuracy",
        &[
            Series { label: "Training accuracy", values: &history.train_accuracies() },
            Series { label: "Validation accuracy", values: &history.val_accuracies() },
        ],
    );
    let accuracy_path = sink.resolve(&paths.accuracy_plot)?;
    std::fs::write(&accuracy_path, &accuracy_svg)?;

    if let Some(run) = run.as_deref_mut() {
        run.log_series("Train loss", &history.train_losses());
        run.log_series("Train accuracy", &history.train_accuracies());
        run.log_series("Validation loss", &history.val_losses());
        run.log_series("Validation accuracy", &history.val_accuracies());
        run.log_image("Training loss curve", &loss_path);
        run.log_image("Training accuracy curve", &accuracy_path);
    }

    Ok(())
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), TrainError> {
    let file = std::fs::File::create(path)?;
    let mut writer = std::io::BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}
