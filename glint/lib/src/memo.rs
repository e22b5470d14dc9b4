use std::sync::{OnceLock, PoisonError, RwLock};

/// A compute-once cell that can be emptied again.
///
/// Concurrent first callers block on the [`OnceLock`] until the single
/// initializer finishes, then all observe its value. `reset` swaps in an empty
/// cell under the write lock, so readers see either the old value or the new
/// one, never a half-built state.
///
/// The initializer must not touch the same `Memo` again.
#[derive(Debug)]
pub(crate) struct Memo<T> {
    cell: RwLock<OnceLock<T>>,
}

impl<T: Clone> Memo<T> {
    pub(crate) const fn new() -> Self {
        Self {
            cell: RwLock::new(OnceLock::new()),
        }
    }

    pub(crate) fn get_or_init(&self, init: impl FnOnce() -> T) -> T {
        let guard = self.cell.read().unwrap_or_else(PoisonError::into_inner);
        guard.get_or_init(init).clone()
    }

    pub(crate) fn get(&self) -> Option<T> {
        let guard = self.cell.read().unwrap_or_else(PoisonError::into_inner);
        guard.get().cloned()
    }

    pub(crate) fn reset(&self) {
        let mut guard = self.cell.write().unwrap_or_else(PoisonError::into_inner);
        guard.take();
    }
}

impl<T: Clone> Default for Memo<T> {
    fn default() -> Self {
        Self::new()
    }
}
