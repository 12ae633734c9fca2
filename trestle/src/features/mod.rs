//! Feature modules.
//!
//! Each feature is self-contained: it declares its state slice type(s),
//! its definition/option fields, and contributes its method set to
//! [`Table`](crate::table::Table) through an `impl` block in its own
//! module. The table type composes them all without any feature knowing
//! another's internals; cross-feature knowledge lives only in the pipeline
//! stage ordering and the derived leaf-column computation.

pub mod expanding;
pub mod filtering;
pub mod grouping;
pub mod ordering;
pub mod pagination;
pub mod pinning;
pub mod selection;
pub mod sizing;
pub mod sorting;
pub mod visibility;
