use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Serialize, Deserialize};

use crate::config::Hyperparameters;
use crate::math::Matrix;
use crate::model::activation::{log_softmax, Activation};
use crate::model::{Mode, Model};

/// One fully-connected layer with cached forward state and gradient buffers.
///
/// Only the weights, biases, and activation are serialized; caches and
/// gradients are transient training state.
#[derive(Serialize, Deserialize)]
pub struct DenseLayer {
    pub size: usize,
    pub weights: Matrix,
    pub biases: Vec<f64>,
    pub activation: Activation,
    #[serde(skip)]
    pre_activation: Vec<f64>,
    #[serde(skip)]
    activation_out: Vec<f64>,
    #[serde(skip)]
    pub(crate) weight_grads: Matrix,
    #[serde(skip)]
    pub(crate) bias_grads: Vec<f64>,
}

impl DenseLayer {
    pub fn new(size: usize, fan_in: usize, activation: Activation, rng: &mut StdRng) -> DenseLayer {
        // He before ReLU, Xavier otherwise (incl. the LogSoftmax output).
        let weights = match activation {
            Activation::ReLU => Matrix::he(fan_in, size, rng),
            _ => Matrix::xavier(fan_in, size, rng),
        };
        DenseLayer {
            size,
            weights,
            biases: vec![0.0; size],
            activation,
            pre_activation: vec![],
            activation_out: vec![],
            weight_grads: Matrix::default(),
            bias_grads: vec![],
        }
    }

    /// Forward pass for one sample; caches z and the activation for backprop.
    fn forward(&mut self, input: &[f64]) -> Vec<f64> {
        let mut z = self.weights.vecmul(input);
        for (zj, b) in z.iter_mut().zip(&self.biases) {
            *zj += b;
        }
        let a = match self.activation {
            Activation::LogSoftmax => log_softmax(&z),
            _ => z.iter().map(|&v| self.activation.function(v)).collect(),
        };
        self.pre_activation = z;
        self.activation_out = a.clone();
        a
    }

    /// Accumulates this layer's gradients for one sample and returns the
    /// delta for the previous layer's activation space.
    ///
    /// `delta_out` is ∂L/∂a for this layer (dropout already unwound by the
    /// caller); `input` is the activation this layer consumed in `forward`.
    fn backward(&mut self, delta_out: &[f64], input: &[f64]) -> Vec<f64> {
        // δ = error ⊙ σ'(z); identity for LogSoftmax (combined NLL gradient).
        let local: Vec<f64> = delta_out
            .iter()
            .zip(&self.pre_activation)
            .map(|(&d, &z)| d * self.activation.derivative(z))
            .collect();
        self.weight_grads.outer_add(input, &local);
        for (g, &l) in self.bias_grads.iter_mut().zip(&local) {
            *g += l;
        }
        self.weights.vecmul_back(&local)
    }

    fn zero_gradients(&mut self) {
        if self.weight_grads.rows != self.weights.rows
            || self.weight_grads.cols != self.weights.cols
        {
            self.weight_grads = Matrix::zeros(self.weights.rows, self.weights.cols);
            self.bias_grads = vec![0.0; self.size];
        } else {
            self.weight_grads.fill(0.0);
            self.bias_grads.fill(0.0);
        }
    }

    fn store_dropped_activation(&mut self, dropped: &[f64]) {
        self.activation_out.copy_from_slice(dropped);
    }
}

/// The shipped fish-species classifier: a dense stack with ReLU hidden
/// layers, inverted dropout between them, and a LogSoftmax output, so the
/// forward pass returns class log-probabilities ready for NLL loss.
#[derive(Serialize, Deserialize)]
pub struct Classifier {
    pub layers: Vec<DenseLayer>,
    pub dropout_p: f64,
    #[serde(skip)]
    mode: Mode,
    #[serde(skip)]
    masks: Vec<Option<Vec<f64>>>,
    #[serde(skip, default = "dropout_rng")]
    rng: StdRng,
}

fn dropout_rng() -> StdRng {
    StdRng::seed_from_u64(0)
}

impl Classifier {
    /// Builds input → fc1 → fc2 → num_classes from the architecture
    /// hyperparameters. Weight init and the dropout mask stream both derive
    /// from the configured seed.
    pub fn new(hp: &Hyperparameters) -> Classifier {
        let mut rng = StdRng::seed_from_u64(hp.seed);
        let layers = vec![
            DenseLayer::new(hp.fc1, hp.input_size(), Activation::ReLU, &mut rng),
            DenseLayer::new(hp.fc2, hp.fc1, Activation::ReLU, &mut rng),
            DenseLayer::new(hp.num_classes, hp.fc2, Activation::LogSoftmax, &mut rng),
        ];
        let masks = vec![None; layers.len()];
        Classifier { layers, dropout_p: hp.dropout_p, mode: Mode::Evaluation, masks, rng }
    }

    pub fn input_size(&self) -> usize {
        self.layers.first().map_or(0, |layer| layer.weights.rows)
    }

    pub fn num_classes(&self) -> usize {
        self.layers.last().map_or(0, |layer| layer.size)
    }

    pub fn zero_gradients(&mut self) {
        for layer in &mut self.layers {
            layer.zero_gradients();
        }
    }

    pub(crate) fn layers_mut(&mut self) -> &mut [DenseLayer] {
        &mut self.layers
    }

    /// Serializes the weights to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> std::io::Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
    }

    /// Deserializes a classifier from a JSON file written by `save_json`.
    pub fn load_json(path: &str) -> std::io::Result<Classifier> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        serde_json::from_reader(reader)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
    }
}

impl Model for Classifier {
    fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    fn forward(&mut self, input: &[f64]) -> Vec<f64> {
        if self.masks.len() != self.layers.len() {
            self.masks = vec![None; self.layers.len()];
        }
        let last = self.layers.len() - 1;
        let mut current = input.to_vec();
        for i in 0..self.layers.len() {
            current = self.layers[i].forward(&current);
            if i < last {
                if self.mode == Mode::Training && self.dropout_p > 0.0 {
                    // Inverted dropout: surviving units scale by 1/(1-p) so
                    // evaluation needs no rescaling.
                    let keep = 1.0 - self.dropout_p;
                    let mut mask = vec![0.0; current.len()];
                    for m in mask.iter_mut() {
                        if self.rng.gen::<f64>() >= self.dropout_p {
                            *m = 1.0 / keep;
                        }
                    }
                    for (c, m) in current.iter_mut().zip(&mask) {
                        *c *= m;
                    }
                    self.layers[i].store_dropped_activation(&current);
                    self.masks[i] = Some(mask);
                } else {
                    self.masks[i] = None;
                }
            }
        }
        current
    }

    fn backward(&mut self, input: &[f64], delta: &[f64]) {
        let last = self.layers.len() - 1;
        let mut delta = delta.to_vec();
        for i in (0..=last).rev() {
            // Unwind dropout first: the consumer saw the masked activation.
            if i < last {
                if let Some(mask) = &self.masks[i] {
                    for (d, m) in delta.iter_mut().zip(mask) {
                        *d *= m;
                    }
                }
            }
            let layer_input: Vec<f64> = if i == 0 {
                input.to_vec()
            } else {
                self.layers[i - 1].activation_out.clone()
            };
            delta = self.layers[i].backward(&delta, &layer_input);
        }
    }
}
