pub mod activation;
pub mod classifier;

pub use activation::Activation;
pub use classifier::Classifier;

/// Explicit two-state compute mode for a model.
///
/// The training loop sets the mode immediately before each phase; consumers
/// must not assume a mode carries over between calls. Dropout is applied
/// only in `Training`; `Evaluation` forward passes are deterministic and
/// accumulate no gradients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    Training,
    #[default]
    Evaluation,
}

/// Capability set the training loop requires of a model.
///
/// The loop never inspects layer structure: it switches modes, runs forward
/// passes that return class log-probabilities, and feeds back the loss
/// gradient. Gradient storage lives behind the implementation; one
/// `backward` call accumulates one sample's contribution.
pub trait Model {
    fn set_mode(&mut self, mode: Mode);

    /// Forward pass for one sample; returns per-class log-probabilities.
    fn forward(&mut self, input: &[f64]) -> Vec<f64>;

    /// Accumulates parameter gradients for one sample given the loss
    /// gradient w.r.t. the output logits. Precondition: called right after
    /// `forward` on the same input, in `Training` mode.
    fn backward(&mut self, input: &[f64], delta: &[f64]);
}

/// Capability set the training loop requires of an optimizer.
pub trait Optimizer<M: Model> {
    /// Clears the model's accumulated gradients before a new batch.
    fn zero_gradients(&mut self, model: &mut M);

    /// Applies one update step from the model's accumulated gradients.
    fn step(&mut self, model: &mut M);
}
