pub mod artifacts;
pub mod plot;
pub mod sink;

pub use artifacts::{save_results, OutputPaths};
pub use sink::{LocalSink, OutputSink, RemoteRunSink};
