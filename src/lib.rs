pub mod config;
pub mod data;
pub mod error;
pub mod loss;
pub mod math;
pub mod model;
pub mod optim;
pub mod persist;
pub mod remote;
pub mod search;
pub mod train;

// Convenience re-exports
pub use config::Hyperparameters;
pub use data::batch::BatchIterator;
pub use data::dataset::Dataset;
pub use data::split::{split_dataset, Split};
pub use error::TrainError;
pub use math::matrix::Matrix;
pub use model::classifier::Classifier;
pub use model::{Mode, Model, Optimizer};
pub use optim::adam::Adam;
pub use persist::{save_results, LocalSink, OutputPaths, OutputSink, RemoteRunSink};
pub use remote::{RecordedRun, RunLogger};
pub use search::Trial;
pub use train::metrics::{EpochRecord, MetricHistory};
pub use train::trainer::{run_training, train_from_files, train_model};
