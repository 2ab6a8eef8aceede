use rand::rngs::StdRng;
use rand::Rng;
use serde::{Serialize, Deserialize};
use std::f64::consts::PI;

/// Dense row-major matrix used for layer weights and gradient buffers.
///
/// Shape convention follows the layers: `rows` is the fan-in (input size)
/// and `cols` is the fan-out (layer size), so a forward pass is `x · W`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    pub rows: usize,
    pub cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix { rows, cols, data: vec![0.0; rows * cols] }
    }

    /// Samples a single value from N(0, 1) using the Box-Muller transform.
    /// Both u1 and u2 must be uniform on (0, 1].
    fn sample_standard_normal(rng: &mut StdRng) -> f64 {
        // Draw two independent uniform samples in (0, 1] to avoid log(0).
        let u1: f64 = 1.0 - rng.gen::<f64>();
        let u2: f64 = 1.0 - rng.gen::<f64>();
        (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
    }

    /// He initialization: samples from N(0, sqrt(2 / rows)).
    ///
    /// Recommended before ReLU layers; the variance 2/fan_in accounts for
    /// ReLU zeroing half of its inputs on average. The caller supplies the
    /// rng so that a fixed seed reproduces the exact same weights.
    pub fn he(rows: usize, cols: usize, rng: &mut StdRng) -> Matrix {
        let std_dev = (2.0 / rows as f64).sqrt();
        let mut res = Matrix::zeros(rows, cols);
        for v in res.data.iter_mut() {
            *v = Matrix::sample_standard_normal(rng) * std_dev;
        }
        res
    }

    /// Xavier (Glorot) initialization: samples from N(0, sqrt(1 / rows)).
    ///
    /// Recommended before Identity/Softmax-family outputs; keeps activation
    /// and gradient variance roughly equal across layers.
    pub fn xavier(rows: usize, cols: usize, rng: &mut StdRng) -> Matrix {
        let std_dev = (1.0 / rows as f64).sqrt();
        let mut res = Matrix::zeros(rows, cols);
        for v in res.data.iter_mut() {
            *v = Matrix::sample_standard_normal(rng) * std_dev;
        }
        res
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    /// Row-vector product: `y = x · W`, where `x` has length `rows` and the
    /// result has length `cols`.
    pub fn vecmul(&self, x: &[f64]) -> Vec<f64> {
        assert_eq!(x.len(), self.rows, "input length must match fan-in");
        let mut y = vec![0.0; self.cols];
        for (i, &xi) in x.iter().enumerate() {
            let row = &self.data[i * self.cols..(i + 1) * self.cols];
            for (yj, &wij) in y.iter_mut().zip(row) {
                *yj += xi * wij;
            }
        }
        y
    }

    /// Transposed product: `out = W · y`, where `y` has length `cols` and
    /// the result has length `rows`. Used to propagate a layer delta back
    /// into the previous layer's activation space.
    pub fn vecmul_back(&self, y: &[f64]) -> Vec<f64> {
        assert_eq!(y.len(), self.cols, "delta length must match fan-out");
        let mut out = vec![0.0; self.rows];
        for (i, oi) in out.iter_mut().enumerate() {
            let row = &self.data[i * self.cols..(i + 1) * self.cols];
            *oi = row.iter().zip(y).map(|(w, d)| w * d).sum();
        }
        out
    }

    /// Accumulates the outer product `x ⊗ y` in place: `W[i][j] += x[i] * y[j]`.
    /// This is the weight-gradient contribution of one sample.
    pub fn outer_add(&mut self, x: &[f64], y: &[f64]) {
        assert_eq!(x.len(), self.rows);
        assert_eq!(y.len(), self.cols);
        for (i, &xi) in x.iter().enumerate() {
            let row = &mut self.data[i * self.cols..(i + 1) * self.cols];
            for (wij, &yj) in row.iter_mut().zip(y) {
                *wij += xi * yj;
            }
        }
    }

    pub fn fill(&mut self, value: f64) {
        self.data.fill(value);
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Matrix { rows: 0, cols: 0, data: vec![] }
    }
}
