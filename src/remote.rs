use std::path::{Path, PathBuf};

/// Remote experiment-run collaborator.
///
/// Mirrors the surface of a cloud experiment-tracking run: scalars and
/// series land in the experiment dashboard, images attach rendered plots,
/// and `complete` closes the run. The trainer calls these opportunistically
/// when a run is active and skips them entirely otherwise; it never manages
/// the run's lifecycle beyond the final `complete`.
pub trait RunLogger {
    fn log_scalar(&mut self, name: &str, value: f64);
    fn log_series(&mut self, name: &str, values: &[f64]);
    /// Attaches an already-rendered image file to the run.
    fn log_image(&mut self, name: &str, path: &Path);
    fn complete(&mut self);
}

/// In-memory `RunLogger` that records every call.
///
/// Used by tests and by callers that want to inspect or batch-forward what
/// a run would have received.
#[derive(Debug, Default)]
pub struct RecordedRun {
    pub scalars: Vec<(String, f64)>,
    pub series: Vec<(String, Vec<f64>)>,
    pub images: Vec<(String, PathBuf)>,
    pub completed: bool,
}

impl RecordedRun {
    pub fn new() -> RecordedRun {
        RecordedRun::default()
    }
}

impl RunLogger for RecordedRun {
    fn log_scalar(&mut self, name: &str, value: f64) {
        self.scalars.push((name.to_owned(), value));
    }

    fn log_series(&mut self, name: &str, values: &[f64]) {
        self.series.push((name.to_owned(), values.to_vec()));
    }

    fn log_image(&mut self, name: &str, path: &Path) {
        self.images.push((name.to_owned(), path.to_path_buf()));
    }

    fn complete(&mut self) {
        self.completed = true;
    }
}
