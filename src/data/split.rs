use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::TrainError;

/// Disjoint, exhaustive index partitions of a dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub training: Vec<usize>,
    pub validation: Vec<usize>,
}

/// Partitions `0..n` into training and validation index sets via a seeded
/// shuffle. Training takes `⌊fraction · n⌋` indices, validation the rest.
///
/// Deterministic: the same `(n, fraction, seed)` yields the identical
/// partition on every call, within and across processes.
pub fn split_dataset(n: usize, fraction: f64, seed: u64) -> Result<Split, TrainError> {
    if !(fraction > 0.0 && fraction < 1.0) {
        return Err(TrainError::InvalidSplit(format!(
            "train fraction must lie in (0, 1), got {fraction}"
        )));
    }
    if n < 2 {
        return Err(TrainError::InvalidSplit(format!(
            "dataset of {n} samples cannot be split"
        )));
    }

    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(&mut StdRng::seed_from_u64(seed));

    let train_n = (fraction * n as f64).floor() as usize;
    if train_n == 0 || train_n == n {
        return Err(TrainError::InvalidSplit(format!(
            "fraction {fraction} leaves an empty partition for {n} samples"
        )));
    }

    let validation = indices.split_off(train_n);
    Ok(Split { training: indices, validation })
}
