/// Hyperparameter-search trial handle.
///
/// Created and owned by an external search orchestrator; the training loop
/// only reports intermediate results and asks whether to stop. When no
/// handle is passed, no pruning checks are performed.
///
/// The loop reports once per completed epoch (never mid-batch), after the
/// epoch record has been appended to the history, so a pruned run still
/// exposes the epoch that triggered the prune.
pub trait Trial {
    /// Reports the intermediate objective value for one completed epoch.
    fn report(&mut self, epoch: usize, value: f64);

    /// Whether the orchestrator wants this trial aborted now.
    fn should_prune(&self) -> bool;
}

/// Prunes after a fixed number of reports; handy for sweeps with a hard
/// per-trial epoch cap and for exercising the pruning path in tests.
#[derive(Debug, Clone)]
pub struct PruneAfter {
    pub epochs: usize,
    reports: usize,
}

impl PruneAfter {
    pub fn new(epochs: usize) -> PruneAfter {
        PruneAfter { epochs, reports: 0 }
    }
}

impl Trial for PruneAfter {
    fn report(&mut self, _epoch: usize, _value: f64) {
        self.reports += 1;
    }

    fn should_prune(&self) -> bool {
        self.reports >= self.epochs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prune_after_fires_on_the_nth_report() {
        let mut trial = PruneAfter::new(2);
        assert!(!trial.should_prune());
        trial.report(0, 0.5);
        assert!(!trial.should_prune());
        trial.report(1, 0.6);
        assert!(trial.should_prune());
    }
}
