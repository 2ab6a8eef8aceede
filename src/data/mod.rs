pub mod batch;
pub mod dataset;
pub mod split;

pub use batch::BatchIterator;
pub use dataset::Dataset;
pub use split::{split_dataset, Split};
