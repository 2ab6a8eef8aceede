/// Negative log-likelihood loss over class log-probabilities with an
/// integer target, for use with a log-softmax output layer.
pub struct NllLoss;

impl NllLoss {
    /// Scalar loss for one sample: `L = -log_probs[target]`.
    pub fn loss(log_probs: &[f64], target: usize) -> f64 {
        -log_probs[target]
    }

    /// Gradient of the combined LogSoftmax + NLL w.r.t. the pre-softmax
    /// logits:
    ///   ∂L/∂z_i = exp(log_probs[i]) - 1{i == target}
    ///
    /// This is the initial delta passed into the backward pass by the
    /// trainer. The LogSoftmax activation's own derivative step is identity
    /// (1.0) so the combined gradient is not double-applied.
    pub fn delta(log_probs: &[f64], target: usize) -> Vec<f64> {
        log_probs
            .iter()
            .enumerate()
            .map(|(i, &lp)| lp.exp() - if i == target { 1.0 } else { 0.0 })
            .collect()
    }
}
