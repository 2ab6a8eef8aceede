use serde::{Serialize, Deserialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    ReLU,
    Identity,
    /// LogSoftmax is a vector-valued activation; it is applied at the layer
    /// level (not element-wise) in `DenseLayer::forward()`. The element-wise
    /// `function()` path is therefore not used for this variant.
    LogSoftmax,
}

impl Activation {
    /// Element-wise activation. For `LogSoftmax`, the layer applies the
    /// full-vector form; this path must not be reached.
    pub fn function(&self, x: f64) -> f64 {
        match self {
            Activation::ReLU => {
                if x > 0.0 {
                    x
                } else {
                    0.0
                }
            }
            Activation::Identity => x,
            Activation::LogSoftmax => {
                panic!(
                    "Activation::LogSoftmax::function() must not be called directly; \
                     use DenseLayer::forward() which applies the full-vector form."
                )
            }
        }
    }

    /// Element-wise derivative of the activation.
    ///
    /// For `LogSoftmax`, the layer pairs it with NLL and the combined
    /// gradient is `exp(log_p) - onehot` (already computed by
    /// `NllLoss::delta()`). Returning `1.0` here lets the backward pass use
    /// that delta unchanged without double-applying the Jacobian.
    pub fn derivative(&self, x: f64) -> f64 {
        match self {
            Activation::ReLU => {
                if x > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Activation::Identity => 1.0,
            Activation::LogSoftmax => 1.0,
        }
    }
}

/// Numerically-stable full-vector log-softmax: shifts by the max before
/// exponentiating.
pub fn log_softmax(z: &[f64]) -> Vec<f64> {
    let max = z.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let log_sum: f64 = z.iter().map(|&v| (v - max).exp()).sum::<f64>().ln();
    z.iter().map(|&v| v - max - log_sum).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_softmax_normalizes() {
        let logp = log_softmax(&[1.0, 2.0, 3.0]);
        let total: f64 = logp.iter().map(|lp| lp.exp()).sum();
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn log_softmax_is_shift_invariant() {
        let a = log_softmax(&[1.0, 2.0, 3.0]);
        let b = log_softmax(&[1001.0, 1002.0, 1003.0]);
        for (x, y) in a.iter().zip(&b) {
            assert!((x - y).abs() < 1e-9);
        }
    }

    #[test]
    fn relu_clamps_negatives() {
        assert_eq!(Activation::ReLU.function(-2.0), 0.0);
        assert_eq!(Activation::ReLU.function(2.0), 2.0);
        assert_eq!(Activation::ReLU.derivative(-2.0), 0.0);
        assert_eq!(Activation::ReLU.derivative(2.0), 1.0);
    }
}
