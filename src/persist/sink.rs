use std::path::{Path, PathBuf};

use crate::error::TrainError;

/// Destination root for the artifact bundle.
///
/// Exactly one sink is selected before training starts: a caller-chosen
/// local directory, or the output root a remote execution service collects
/// after the job finishes. `resolve` joins a relative artifact path onto
/// the root and creates the parent directories; re-creating an existing
/// directory is not an error.
pub trait OutputSink {
    fn resolve(&self, relative: &Path) -> Result<PathBuf, TrainError>;
}

fn resolve_under(root: &Path, relative: &Path) -> Result<PathBuf, TrainError> {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(path)
}

/// Writes artifacts under a caller-supplied local directory.
pub struct LocalSink {
    root: PathBuf,
}

impl LocalSink {
    pub fn new(root: impl Into<PathBuf>) -> LocalSink {
        LocalSink { root: root.into() }
    }
}

impl OutputSink for LocalSink {
    fn resolve(&self, relative: &Path) -> Result<PathBuf, TrainError> {
        resolve_under(&self.root, relative)
    }
}

/// Writes artifacts under the `outputs/` root that a remote run's execution
/// service uploads when the job completes.
pub struct RemoteRunSink {
    root: PathBuf,
}

impl RemoteRunSink {
    pub fn new() -> RemoteRunSink {
        RemoteRunSink { root: PathBuf::from("outputs") }
    }

    /// Overrides the service-managed root; used by tests.
    pub fn rooted_at(root: impl Into<PathBuf>) -> RemoteRunSink {
        RemoteRunSink { root: root.into() }
    }
}

impl Default for RemoteRunSink {
    fn default() -> Self {
        RemoteRunSink::new()
    }
}

impl OutputSink for RemoteRunSink {
    fn resolve(&self, relative: &Path) -> Result<PathBuf, TrainError> {
        resolve_under(&self.root, relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let sink = LocalSink::new(dir.path());
        let path = sink.resolve(Path::new("figures/loss.svg")).unwrap();
        assert!(path.parent().unwrap().is_dir());
        assert!(path.ends_with("figures/loss.svg"));
    }

    #[test]
    fn resolve_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let sink = LocalSink::new(dir.path());
        let first = sink.resolve(Path::new("models/classifier.json")).unwrap();
        let second = sink.resolve(Path::new("models/classifier.json")).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn remote_sink_prefixes_its_root() {
        let dir = tempfile::tempdir().unwrap();
        let sink = RemoteRunSink::rooted_at(dir.path().join("outputs"));
        let path = sink.resolve(Path::new("a/b.json")).unwrap();
        assert!(path.starts_with(dir.path().join("outputs")));
    }
}
