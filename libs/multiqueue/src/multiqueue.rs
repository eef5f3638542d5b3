use std::{
    cmp::Reverse,
    collections::BinaryHeap,
    num::NonZeroUsize,
    sync::atomic::{AtomicUsize, Ordering},
};

use crossbeam::utils::{Backoff, CachePadded};

use crate::{
    ConcurrentPriorityQueue, Error, Result,
    selector::{RandomSelector, Selector},
    sub_queue::{self, SubQueue},
};

/// Sub-queues per expected thread when nothing else is configured.
pub const DEFAULT_TUNING: usize = 2;

/// Construction parameters of a [`MultiQueue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cfg {
    /// Expected number of threads operating on the queue at the same time (`p`).
    pub parallelism: usize,
    /// Number of sub-queues per expected thread (`c`).
    /// # Note
    /// Values below 2 are accepted but weaken the quality of `delete_min`.
    pub tuning: usize,
}

impl Default for Cfg {
    fn default() -> Self {
        Self {
            parallelism: std::thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1),
            tuning: DEFAULT_TUNING,
        }
    }
}

/// Non-fatal remarks about a queue's configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advisory {
    /// With one sub-queue per thread the two-choice comparison no longer finds a good candidate
    /// with constant probability.
    LowTuningFactor,
}

/// Relaxed concurrent min-priority queue.
///
/// Items live in `parallelism * tuning` sub-queues, each a min-heap with its own lock. There is no
/// lock over the whole structure:
/// - [`MultiQueue::insert`] try-locks random sub-queues until one is free and pushes there.
/// - [`MultiQueue::delete_min`] locks two random sub-queues in ascending index order, compares
///   their tops while holding both locks and pops the smaller one.
///
/// The returned item is therefore the better of two random candidates, not necessarily the
/// global minimum.
#[derive(Debug)]
pub struct MultiQueue<T: Ord> {
    queues: Box<[CachePadded<SubQueue<T>>]>,
    /// Items held. Only changed while the lock of the affected sub-queue is held.
    len: AtomicUsize,
    parallelism: usize,
    tuning: usize,
}

impl<T: Ord> MultiQueue<T> {
    /// Creates a queue with `parallelism * tuning` empty sub-queues.
    /// # Error
    /// Returns [`Error::InvalidArgument`] if either parameter is zero or their product overflows.
    pub fn new(parallelism: usize, tuning: usize) -> Result<Self> {
        if parallelism == 0 {
            return Err(Error::InvalidArgument(
                "parallelism (number of parallel threads) must be > 0",
            ));
        }
        if tuning == 0 {
            return Err(Error::InvalidArgument("tuning factor must be >= 1"));
        }
        let num_queues = parallelism
            .checked_mul(tuning)
            .ok_or(Error::InvalidArgument("parallelism * tuning overflows"))?;

        if tuning == 1 {
            tracing::warn!(
                parallelism,
                "tuning factor should be >= 2 to guarantee a constant success probability of delete_min"
            );
        }

        let queues = (0..num_queues)
            .map(|_| CachePadded::new(SubQueue::new()))
            .collect();
        tracing::debug!(parallelism, tuning, num_queues, "created multiqueue");

        Ok(Self {
            queues,
            len: AtomicUsize::new(0),
            parallelism,
            tuning,
        })
    }

    /// Creates a queue with the default tuning factor of [`DEFAULT_TUNING`].
    pub fn with_parallelism(parallelism: usize) -> Result<Self> {
        Self::new(parallelism, DEFAULT_TUNING)
    }

    pub fn from_cfg(cfg: Cfg) -> Result<Self> {
        Self::new(cfg.parallelism, cfg.tuning)
    }

    pub fn parallelism(&self) -> usize {
        self.parallelism
    }

    pub fn tuning(&self) -> usize {
        self.tuning
    }

    pub fn num_queues(&self) -> usize {
        self.queues.len()
    }

    pub fn advisory(&self) -> Option<Advisory> {
        (self.tuning == 1).then_some(Advisory::LowTuningFactor)
    }

    /// Number of items held. Exact only while no operation is in flight.
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Relaxed)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Adds `value` to a random sub-queue, using the calling thread's random generator.
    pub fn insert(&self, value: T) {
        self.insert_with(value, &mut RandomSelector::thread_local());
    }

    /// Adds `value` to the first sub-queue picked by `selector` whose lock is free.
    ///
    /// Never waits on a lock: a busy sub-queue is skipped and a new one is picked.
    pub fn insert_with<S: Selector + ?Sized>(&self, value: T, selector: &mut S) {
        let backoff = Backoff::new();
        loop {
            let i = selector.pick(self.queues.len());
            if let Some(mut heap) = self.queues[i].try_lock() {
                heap.push(Reverse(value));
                self.len.fetch_add(1, Ordering::Relaxed);
                return;
            }
            backoff.snooze();
        }
    }

    /// Removes a near-minimal item, using the calling thread's random generator.
    /// # Error
    /// Returns [`Error::Empty`] if every sub-queue was found empty.
    pub fn delete_min(&self) -> Result<T> {
        self.delete_min_with(&mut RandomSelector::thread_local())
    }

    /// Removes the smaller top of two sub-queues picked by `selector`.
    ///
    /// Rounds in which both candidates are empty are retried. Once as many rounds as there are
    /// sub-queues came up empty, every sub-queue is visited in index order instead, and the first
    /// item found is returned.
    /// # Error
    /// Returns [`Error::Empty`] if the queue holds no items or the full pass found none.
    pub fn delete_min_with<S: Selector + ?Sized>(&self, selector: &mut S) -> Result<T> {
        let mut empty_rounds = 0;
        loop {
            if self.is_empty() {
                return Err(Error::Empty);
            }

            let (i, j) = selector.pick_pair(self.queues.len());
            if let Some(value) = self.pop_smaller(i, j) {
                return Ok(value);
            }

            empty_rounds += 1;
            if empty_rounds >= self.queues.len() {
                tracing::trace!(empty_rounds, "only empty candidates found, sweeping all sub-queues");
                return self.sweep().ok_or(Error::Empty);
            }
        }
    }

    /// Removes up to `n` items, stopping early once the queue is empty.
    pub fn drain(&self, n: usize) -> Vec<T>
    where
        T: Send + 'static,
    {
        <Self as ConcurrentPriorityQueue<T>>::drain(self, n)
    }

    /// Locks both candidates, lower index first, and pops the smaller top. An empty sub-queue
    /// loses against any non-empty one.
    fn pop_smaller(&self, i: usize, j: usize) -> Option<T> {
        let (lo, hi) = if i <= j { (i, j) } else { (j, i) };

        let mut first = self.queues[lo].lock();
        if lo == hi {
            return self.take(&mut first);
        }
        let mut second = self.queues[hi].lock();

        let second_is_smaller = match (sub_queue::top(&*first), sub_queue::top(&*second)) {
            (None, None) => return None,
            (Some(_), None) => false,
            (None, Some(_)) => true,
            (Some(a), Some(b)) => b < a,
        };
        let heap = if second_is_smaller {
            &mut second
        } else {
            &mut first
        };
        self.take(heap)
    }

    /// Pops from the first non-empty sub-queue, holding one lock at a time.
    fn sweep(&self) -> Option<T> {
        self.queues
            .iter()
            .find_map(|queue| self.take(&mut queue.lock()))
    }

    /// Pops the top of a locked heap and keeps the item count in step.
    fn take(&self, heap: &mut BinaryHeap<Reverse<T>>) -> Option<T> {
        let value = sub_queue::pop(heap)?;
        self.len.fetch_sub(1, Ordering::Relaxed);
        Some(value)
    }
}

impl<T: Ord + Send + 'static> ConcurrentPriorityQueue<T> for MultiQueue<T> {
    fn insert(&self, value: T) {
        MultiQueue::insert(self, value);
    }

    fn delete_min(&self) -> Result<T> {
        MultiQueue::delete_min(self)
    }

    fn len(&self) -> usize {
        MultiQueue::len(self)
    }
}
