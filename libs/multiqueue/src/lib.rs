//! A relaxed concurrent priority queue.
//!
//! [`MultiQueue`] spreads its items over `p * c` independently locked min-heaps. Inserts go to a
//! random heap, `delete_min` compares the tops of two random heaps and pops the smaller one. The
//! result is close to, but not always, the global minimum, in exchange for no structure-wide lock.

mod error;
mod locked;
mod multiqueue;
mod selector;
mod sub_queue;
#[cfg(test)]
mod test;

// region:    --- Exports
pub use error::{Error, Result};
pub use locked::LockedQueue;
pub use multiqueue::{Advisory, Cfg, DEFAULT_TUNING, MultiQueue};
pub use selector::{RandomSelector, Selector};
// endregion: --- Exports

/// Common surface of the priority queues in this crate, so harnesses and benchmarks can run
/// against any of them.
pub trait ConcurrentPriorityQueue<T>: Send + Sync + 'static {
    fn insert(&self, value: T);

    /// Removes a minimal (or near-minimal, depending on the implementation) item.
    /// # Error
    /// Returns [`Error::Empty`] if no item is held.
    fn delete_min(&self) -> Result<T>;

    /// Number of items currently held. Only exact while no operation is in flight.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes up to `n` items, stopping early once the queue reports [`Error::Empty`].
    fn drain(&self, n: usize) -> Vec<T> {
        let mut items = Vec::with_capacity(n.min(self.len()));
        for _ in 0..n {
            let Ok(value) = self.delete_min() else {
                break;
            };
            items.push(value);
        }
        items
    }
}
