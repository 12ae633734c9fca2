//! Dependency-keyed memoization.

use std::sync::RwLock;

use log::debug;

/// A single-slot cache keyed by a dependency tuple.
///
/// [`get`](Memo::get) recomputes only when the supplied dependencies differ
/// (`PartialEq`) from the previously stored tuple; otherwise the cached
/// result is returned unchanged. Every pipeline stage and derived
/// column/header computation owns one of these, which is what makes
/// querying the table repeatedly (once per host render) cheap.
///
/// The result type is usually an `Arc`, so an unchanged stage hands back
/// the same allocation and consumers can rely on pointer equality for
/// change detection.
pub struct Memo<D, R> {
    label: &'static str,
    slot: RwLock<Option<(D, R)>>,
}

impl<D: PartialEq, R: Clone> Memo<D, R> {
    /// Creates an empty cache. The label only shows up in logs.
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            slot: RwLock::new(None),
        }
    }

    /// Returns the cached result if `deps` matches the stored tuple,
    /// otherwise runs `compute` and stores its result.
    ///
    /// `compute` must be side-effect-free. If it panics, the slot is left
    /// untouched (the panic propagates before anything is written), so the
    /// previous result remains valid.
    pub fn get(&self, deps: D, compute: impl FnOnce(&D) -> R) -> R {
        {
            let slot = self.slot.read().unwrap_or_else(|p| p.into_inner());
            if let Some((stored, result)) = slot.as_ref() {
                if *stored == deps {
                    return result.clone();
                }
            }
        }
        debug!("recomputing {}", self.label);
        let result = compute(&deps);
        let mut slot = self.slot.write().unwrap_or_else(|p| p.into_inner());
        *slot = Some((deps, result.clone()));
        result
    }

    /// Seeds the cache with a precomputed result.
    pub fn prime(&self, deps: D, result: R) {
        let mut slot = self.slot.write().unwrap_or_else(|p| p.into_inner());
        *slot = Some((deps, result));
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn test_result_is_cached_for_equal_deps() {
        let memo: Memo<(usize, String), Arc<Vec<u32>>> = Memo::new("test");
        let calls = AtomicUsize::new(0);
        let compute = |_: &(usize, String)| {
            calls.fetch_add(1, Ordering::SeqCst);
            Arc::new(vec![1, 2, 3])
        };

        let a = memo.get((1, "x".to_string()), compute);
        let b = memo.get((1, "x".to_string()), compute);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_recompute_on_dep_change() {
        let memo: Memo<usize, Arc<usize>> = Memo::new("test");
        let a = memo.get(1, |d| Arc::new(*d * 10));
        let b = memo.get(2, |d| Arc::new(*d * 10));
        assert_eq!(*a, 10);
        assert_eq!(*b, 20);
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_panicking_compute_leaves_cache_intact() {
        let memo: Memo<usize, usize> = Memo::new("test");
        assert_eq!(memo.get(1, |_| 7), 7);
        let panicked = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            memo.get(2, |_| panic!("host predicate failed"))
        }));
        assert!(panicked.is_err());
        // Previous result is still served for its deps.
        assert_eq!(memo.get(1, |_| unreachable!()), 7);
    }
}
