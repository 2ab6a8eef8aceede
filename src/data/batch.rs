use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Yields shuffled, fixed-size index batches over one partition.
///
/// Each call to [`next_pass`](BatchIterator::next_pass) reshuffles the
/// sample order independently and returns the batches for one full epoch.
/// The last batch of a pass may be shorter than `batch_size`; no sample is
/// ever dropped. The shuffle rng is owned by this iterator — two iterators
/// built over the same partition do not share state.
pub struct BatchIterator {
    indices: Vec<usize>,
    batch_size: usize,
    rng: StdRng,
}

impl BatchIterator {
    /// # Panics
    /// Panics if `batch_size == 0`.
    pub fn new(partition: &[usize], batch_size: usize, seed: u64) -> BatchIterator {
        assert!(batch_size > 0, "batch_size must be at least 1");
        BatchIterator {
            indices: partition.to_vec(),
            batch_size,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Reshuffles and returns the batch sequence for one full pass.
    pub fn next_pass(&mut self) -> Batches<'_> {
        self.indices.shuffle(&mut self.rng);
        Batches {
            indices: &self.indices,
            batch_size: self.batch_size,
        }
    }

}

/// Borrowed view over one pass; each item is a batch of dataset indices.
pub struct Batches<'a> {
    indices: &'a [usize],
    batch_size: usize,
}

impl<'a> Iterator for Batches<'a> {
    type Item = &'a [usize];

    fn next(&mut self) -> Option<&'a [usize]> {
        if self.indices.is_empty() {
            return None;
        }
        let take = self.batch_size.min(self.indices.len());
        let (batch, rest) = self.indices.split_at(take);
        self.indices = rest;
        Some(batch)
    }
}
