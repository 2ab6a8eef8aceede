use crate::model::classifier::Classifier;
use crate::model::Optimizer;

/// Adam optimizer over the classifier's accumulated gradients.
///
/// Keeps per-parameter first and second moment estimates with the usual
/// bias correction. Moment buffers are allocated lazily on the first step
/// so the optimizer can be constructed before the model shapes are known.
pub struct Adam {
    pub learning_rate: f64,
    pub beta1: f64,
    pub beta2: f64,
    pub epsilon: f64,
    t: u32,
    moments: Vec<LayerMoments>,
}

struct LayerMoments {
    m_w: Vec<f64>,
    v_w: Vec<f64>,
    m_b: Vec<f64>,
    v_b: Vec<f64>,
}

impl Adam {
    pub fn new(learning_rate: f64) -> Adam {
        Adam {
            learning_rate,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
            t: 0,
            moments: Vec::new(),
        }
    }
}

impl Optimizer<Classifier> for Adam {
    fn zero_gradients(&mut self, model: &mut Classifier) {
        model.zero_gradients();
    }

    fn step(&mut self, model: &mut Classifier) {
        let layers = model.layers_mut();
        if self.moments.len() != layers.len() {
            self.moments = layers
                .iter()
                .map(|layer| LayerMoments {
                    m_w: vec![0.0; layer.weights.as_slice().len()],
                    v_w: vec![0.0; layer.weights.as_slice().len()],
                    m_b: vec![0.0; layer.biases.len()],
                    v_b: vec![0.0; layer.biases.len()],
                })
                .collect();
        }

        self.t += 1;
        let bias1 = 1.0 - self.beta1.powi(self.t as i32);
        let bias2 = 1.0 - self.beta2.powi(self.t as i32);

        for (layer, moments) in layers.iter_mut().zip(self.moments.iter_mut()) {
            update(
                layer.weights.as_mut_slice(),
                layer.weight_grads.as_slice(),
                &mut moments.m_w,
                &mut moments.v_w,
                self.learning_rate,
                self.beta1,
                self.beta2,
                self.epsilon,
                bias1,
                bias2,
            );
            update(
                &mut layer.biases,
                &layer.bias_grads,
                &mut moments.m_b,
                &mut moments.v_b,
                self.learning_rate,
                self.beta1,
                self.beta2,
                self.epsilon,
                bias1,
                bias2,
            );
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn update(
    params: &mut [f64],
    grads: &[f64],
    m: &mut [f64],
    v: &mut [f64],
    lr: f64,
    beta1: f64,
    beta2: f64,
    epsilon: f64,
    bias1: f64,
    bias2: f64,
) {
    assert_eq!(params.len(), grads.len(), "gradients not accumulated for this step");
    for i in 0..params.len() {
        let g = grads[i];
        m[i] = beta1 * m[i] + (1.0 - beta1) * g;
        v[i] = beta2 * v[i] + (1.0 - beta2) * g * g;
        let m_hat = m[i] / bias1;
        let v_hat = v[i] / bias2;
        params[i] -= lr * m_hat / (v_hat.sqrt() + epsilon);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Hyperparameters;
    use crate::loss::NllLoss;
    use crate::model::{Mode, Model};

    #[test]
    fn steps_reduce_loss_on_a_fixed_sample() {
        let hp = Hyperparameters {
            image_height: 2,
            image_width: 2,
            channels: 1,
            fc1: 8,
            fc2: 6,
            num_classes: 3,
            dropout_p: 0.0,
            seed: 1,
            ..Hyperparameters::default()
        };
        let mut model = Classifier::new(&hp);
        let mut adam = Adam::new(0.01);
        model.set_mode(Mode::Training);
        let input = [0.2, 0.7, 0.5, 0.1];
        let target = 1;

        let before = NllLoss::loss(&model.forward(&input), target);
        for _ in 0..30 {
            adam.zero_gradients(&mut model);
            let logp = model.forward(&input);
            let delta = NllLoss::delta(&logp, target);
            model.backward(&input, &delta);
            adam.step(&mut model);
        }
        model.set_mode(Mode::Evaluation);
        let after = NllLoss::loss(&model.forward(&input), target);
        assert!(after < before, "loss did not improve: {before} -> {after}");
    }

    #[test]
    fn first_step_moves_against_the_gradient() {
        let mut params = vec![1.0, -1.0];
        let grads = vec![0.5, -0.5];
        let mut m = vec![0.0; 2];
        let mut v = vec![0.0; 2];
        update(&mut params, &grads, &mut m, &mut v, 0.1, 0.9, 0.999, 1e-8, 0.1, 0.001);
        assert!(params[0] < 1.0);
        assert!(params[1] > -1.0);
    }
}
