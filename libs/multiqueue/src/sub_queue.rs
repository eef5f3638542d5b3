use std::{
    cmp::Reverse,
    collections::BinaryHeap,
    sync::{Mutex, MutexGuard, PoisonError, TryLockError},
};

/// One partition of a [`crate::MultiQueue`]: a min-heap behind its own lock.
///
/// The heap is only reachable through a [`Heap`] guard, so every peek and pop happens while the
/// lock is held.
#[derive(Debug)]
pub(crate) struct SubQueue<T: Ord> {
    heap: Mutex<BinaryHeap<Reverse<T>>>,
}

pub(crate) type Heap<'a, T> = MutexGuard<'a, BinaryHeap<Reverse<T>>>;

impl<T: Ord> SubQueue<T> {
    pub(crate) fn new() -> Self {
        Self {
            heap: Mutex::new(BinaryHeap::new()),
        }
    }

    /// Blocks until the lock is held.
    ///
    /// A poisoned lock is taken over: a panicking push or pop cannot leave the heap in a state
    /// that is unsafe to keep using.
    pub(crate) fn lock(&self) -> Heap<'_, T> {
        self.heap.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns `None` if another thread holds the lock.
    pub(crate) fn try_lock(&self) -> Option<Heap<'_, T>> {
        match self.heap.try_lock() {
            Ok(guard) => Some(guard),
            Err(TryLockError::Poisoned(e)) => Some(e.into_inner()),
            Err(TryLockError::WouldBlock) => None,
        }
    }
}

/// Smallest item of a locked heap.
pub(crate) fn top<T: Ord>(heap: &BinaryHeap<Reverse<T>>) -> Option<&T> {
    heap.peek().map(|Reverse(value)| value)
}

pub(crate) fn pop<T: Ord>(heap: &mut BinaryHeap<Reverse<T>>) -> Option<T> {
    heap.pop().map(|Reverse(value)| value)
}

#[cfg(test)]
mod tests {
    use super::{SubQueue, pop, top};

    #[test]
    fn pops_in_ascending_order() {
        let queue = SubQueue::new();
        {
            let mut heap = queue.lock();
            for value in [5, 1, 4, 2, 3] {
                heap.push(std::cmp::Reverse(value));
            }
        }

        let mut heap = queue.lock();
        assert_eq!(top(&*heap), Some(&1));
        let popped: Vec<i32> = std::iter::from_fn(|| pop(&mut *heap)).collect();
        assert_eq!(popped, vec![1, 2, 3, 4, 5]);
        assert_eq!(top(&*heap), None);
    }

    #[test]
    fn try_lock_fails_while_held() {
        let queue: SubQueue<u32> = SubQueue::new();
        let guard = queue.lock();
        assert!(queue.try_lock().is_none());
        drop(guard);
        assert!(queue.try_lock().is_some());
    }
}
