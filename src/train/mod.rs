pub mod metrics;
pub mod trainer;

pub use metrics::{EpochRecord, MetricHistory, PhaseAccumulator, PhaseMetrics};
pub use trainer::{run_training, train_from_files, train_model};
