use serde::{Serialize, Deserialize};

/// Hyperparameters for one training run.
///
/// Read once at run start and treated as immutable afterwards. The
/// architecture fields (image dimensions, hidden sizes, class count) are
/// opaque to the training loop; only the classifier constructor interprets
/// them.
///
/// # Fields
/// - `epochs`          — number of full passes over the training partition
/// - `learning_rate`   — Adam step size
/// - `dropout_p`       — dropout probability on hidden activations, in [0, 1)
/// - `batch_size`      — samples per mini-batch; the last batch may be short
/// - `seed`            — single seed for the split, the shuffles, the weight
///                       init, and the dropout masks
/// - `train_fraction`  — fraction of the dataset assigned to training
/// - `save_training_results` — persist weights, history, and plots at the end
/// - `use_remote_run`  — route artifacts to the remote-run output root
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Hyperparameters {
    pub epochs: usize,
    pub learning_rate: f64,
    pub dropout_p: f64,
    pub batch_size: usize,
    pub seed: u64,
    pub train_fraction: f64,
    pub save_training_results: bool,
    pub use_remote_run: bool,

    // Architecture parameters (opaque to the loop).
    pub image_height: usize,
    pub image_width: usize,
    pub channels: usize,
    pub fc1: usize,
    pub fc2: usize,
    pub num_classes: usize,
}

impl Default for Hyperparameters {
    fn default() -> Self {
        Hyperparameters {
            epochs: 1,
            learning_rate: 0.001,
            dropout_p: 0.021,
            batch_size: 250,
            seed: 0,
            train_fraction: 0.85,
            save_training_results: true,
            use_remote_run: false,
            image_height: 32,
            image_width: 32,
            channels: 3,
            fc1: 128,
            fc2: 64,
            num_classes: 9,
        }
    }
}

impl Hyperparameters {
    /// Flattened input dimension fed to the classifier.
    pub fn input_size(&self) -> usize {
        self.image_height * self.image_width * self.channels
    }

    /// Serializes the hyperparameters to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> std::io::Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
    }

    /// Deserializes hyperparameters from a JSON file; missing fields take
    /// their defaults.
    pub fn load_json(path: &str) -> std::io::Result<Hyperparameters> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        serde_json::from_reader(reader)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_match_the_documented_surface() {
        let hp = Hyperparameters::default();
        assert_eq!(hp.epochs, 1);
        assert_eq!(hp.learning_rate, 0.001);
        assert_eq!(hp.dropout_p, 0.021);
        assert_eq!(hp.batch_size, 250);
        assert_eq!(hp.seed, 0);
        assert_eq!(hp.train_fraction, 0.85);
        assert!(hp.save_training_results);
        assert!(!hp.use_remote_run);
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let hp: Hyperparameters =
            serde_json::from_str(r#"{"epochs": 5, "batch_size": 16}"#).unwrap();
        assert_eq!(hp.epochs, 5);
        assert_eq!(hp.batch_size, 16);
        assert_eq!(hp.learning_rate, 0.001);
        assert_eq!(hp.num_classes, 9);
    }

    #[test]
    fn json_roundtrip_preserves_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hp.json");
        let mut hp = Hyperparameters::default();
        hp.epochs = 7;
        hp.seed = 42;
        hp.save_json(path.to_str().unwrap()).unwrap();
        let loaded = Hyperparameters::load_json(path.to_str().unwrap()).unwrap();
        assert_eq!(loaded.epochs, 7);
        assert_eq!(loaded.seed, 42);
    }
}
