//! The staged row model pipeline.
//!
//! Raw records flow one way: core materialization, column filtering,
//! global filtering, grouping, sorting, expansion, pagination. Each stage
//! reads only its upstream model plus the state slices and options it
//! declares, and is memoized on exactly those dependencies, so an
//! unchanged stage hands back its previous `Arc` untouched.

mod core;
mod expanded;
mod filtered;
mod grouped;
mod paginated;
mod sorted;

use std::sync::Arc;

/// Address identity of a shared function, for dependency tuples.
pub(crate) fn fn_addr<F: ?Sized>(f: &Arc<F>) -> usize {
    Arc::as_ptr(f) as *const () as usize
}
