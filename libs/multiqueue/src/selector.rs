use rand::{Rng, SeedableRng, rngs::StdRng, rngs::ThreadRng};

/// Source of sub-queue indices.
///
/// Every caller owns its selector, so picking an index never contends with other threads.
pub trait Selector {
    /// Returns an index in `0..bound`. `bound` is never zero.
    fn pick(&mut self, bound: usize) -> usize;

    /// Returns two distinct indices in `0..bound`, resampling the second until it differs from
    /// the first. With a single sub-queue both indices are `0`.
    fn pick_pair(&mut self, bound: usize) -> (usize, usize) {
        let i = self.pick(bound);
        if bound == 1 {
            return (i, i);
        }
        loop {
            let j = self.pick(bound);
            if j != i {
                return (i, j);
            }
        }
    }
}

/// Uniform [`Selector`] backed by any [`rand::Rng`].
#[derive(Debug, Clone)]
pub struct RandomSelector<R: Rng> {
    rng: R,
}

impl RandomSelector<ThreadRng> {
    /// Selector drawing from the calling thread's generator.
    pub fn thread_local() -> Self {
        Self { rng: rand::rng() }
    }
}

impl RandomSelector<StdRng> {
    /// Deterministic selector, for reproducible tests and measurements.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl<R: Rng> RandomSelector<R> {
    pub fn from_rng(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> Selector for RandomSelector<R> {
    fn pick(&mut self, bound: usize) -> usize {
        self.rng.random_range(0..bound)
    }
}

#[cfg(test)]
mod tests {
    use super::{RandomSelector, Selector};

    #[test]
    fn pick_stays_in_bounds() {
        let mut selector = RandomSelector::seeded(7);
        for bound in 1..20 {
            for _ in 0..100 {
                assert!(selector.pick(bound) < bound);
            }
        }
    }

    #[test]
    fn pick_pair_is_distinct() {
        let mut selector = RandomSelector::thread_local();
        for _ in 0..1_000 {
            let (i, j) = selector.pick_pair(2);
            assert_ne!(i, j);
            assert!(i < 2 && j < 2);
        }
    }

    /// A single sub-queue can only yield the degenerate pair.
    #[test]
    fn pick_pair_single_queue() {
        let mut selector = RandomSelector::seeded(1);
        assert_eq!(selector.pick_pair(1), (0, 0));
    }

    #[test]
    fn seeded_selectors_repeat() {
        let mut a = RandomSelector::seeded(42);
        let mut b = RandomSelector::seeded(42);
        let xs: Vec<usize> = (0..50).map(|_| a.pick(1_000)).collect();
        let ys: Vec<usize> = (0..50).map(|_| b.pick(1_000)).collect();
        assert_eq!(xs, ys);
    }

    /// Every index is hit when sampling often enough.
    #[test]
    fn pick_covers_all_indices() {
        let mut selector = RandomSelector::seeded(3);
        let mut seen = [false; 8];
        for _ in 0..1_000 {
            seen[selector.pick(8)] = true;
        }
        assert!(seen.iter().all(|hit| *hit));
    }
}
