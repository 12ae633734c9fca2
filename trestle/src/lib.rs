//! A headless tabular-data engine.
//!
//! Feed it raw records and a declarative column description and it derives
//! exactly the rows, columns and header cells a UI should render, after
//! filtering, grouping, sorting, expansion and pagination. It renders
//! nothing itself: hosts read the derived models and draw them with
//! whatever they like, and may take ownership of any subset of the state
//! slices through the controlled/uncontrolled protocol.
//!
//! ```
//! use trestle::prelude::*;
//!
//! let data = vec![
//!     serde_json::json!({ "name": "Ada", "age": 24 }),
//!     serde_json::json!({ "name": "Grace", "age": 40 }),
//!     serde_json::json!({ "name": "Edsger", "age": 45 }),
//! ];
//! let table = Table::new(Options::new(
//!     data,
//!     vec![ColumnDef::accessor("name"), ColumnDef::accessor("age")],
//! ))
//! .unwrap();
//!
//! table.set_column_filter("age", Some(FilterValue::range(30.0, None)));
//! table.set_sorting(Updater::set(vec![ColumnSort::desc("age")]));
//!
//! let model = table.row_model();
//! assert_eq!(model.rows.len(), 2);
//! ```

pub mod column;
pub mod error;
pub mod features;
pub mod header;
pub mod memo;
pub mod model;
pub mod options;
mod pipeline;
pub mod state;
pub mod table;

pub mod prelude {
    //! The commonly used surface in one import.

    pub use crate::column::{Column, ColumnDef, ColumnModel};
    pub use crate::error::TableError;
    pub use crate::features::expanding::ExpandedState;
    pub use crate::features::filtering::{ColumnFilter, FilterFn, FilterValue};
    pub use crate::features::grouping::AggregationFn;
    pub use crate::features::pagination::PaginationState;
    pub use crate::features::pinning::{ColumnPinningState, Pinned};
    pub use crate::features::sorting::{ColumnSort, SortingFn};
    pub use crate::header::{Header, HeaderGroup, HeaderModel};
    pub use crate::model::{CellValue, Row, RowData, RowModel};
    pub use crate::options::Options;
    pub use crate::state::{PartialTableState, TableState, Updater};
    pub use crate::table::{Cell, Table};
}
