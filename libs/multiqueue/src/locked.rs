use std::{
    cmp::Reverse,
    collections::BinaryHeap,
    fmt::Debug,
    sync::{Mutex, PoisonError},
};

use crate::{ConcurrentPriorityQueue, Error, Result};

/// Min-priority queue behind a single lock.
///
/// Always returns the exact minimum, but every operation serializes on the same mutex. Serves as
/// the baseline the [`crate::MultiQueue`] is measured against.
#[derive(Debug)]
pub struct LockedQueue<T: Debug + Ord> {
    storage: Mutex<BinaryHeap<Reverse<T>>>,
}

impl<T: Debug + Ord> LockedQueue<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            storage: Mutex::new(BinaryHeap::with_capacity(capacity)),
        }
    }

    fn storage(&self) -> std::sync::MutexGuard<'_, BinaryHeap<Reverse<T>>> {
        self.storage.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Debug + Ord> Default for LockedQueue<T> {
    fn default() -> Self {
        Self::new(0)
    }
}

impl<T: Debug + Ord + Send + 'static> ConcurrentPriorityQueue<T> for LockedQueue<T> {
    fn insert(&self, value: T) {
        self.storage().push(Reverse(value));
    }

    fn delete_min(&self) -> Result<T> {
        self.storage()
            .pop()
            .map(|Reverse(value)| value)
            .ok_or(Error::Empty)
    }

    fn len(&self) -> usize {
        self.storage().len()
    }

    /// Takes the lock once for the whole batch.
    fn drain(&self, n: usize) -> Vec<T> {
        let mut storage = self.storage();

        let mut items = Vec::with_capacity(n.min(storage.len()));
        for _ in 0..n {
            let Some(Reverse(value)) = storage.pop() else {
                break;
            };
            items.push(value);
        }

        items
    }
}
