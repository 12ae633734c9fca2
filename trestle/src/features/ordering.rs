//! Explicit column ordering.

use std::sync::Arc;

use crate::column::Column;
use crate::model::RowData;
use crate::state::Updater;
use crate::table::Table;

/// Explicit display order as a list of column ids. Columns not listed keep
/// their definition order after the listed ones.
pub type ColumnOrderState = Vec<String>;

impl<T: RowData> Table<T> {
    /// Effective column-order slice.
    pub fn column_order_state(&self) -> ColumnOrderState {
        let options = self.options();
        if let Some(controlled) = &options.state.column_order {
            return controlled.clone();
        }
        self.internal_state().column_order
    }

    /// Proposes a new column order through the update protocol.
    pub fn set_column_order(&self, updater: Updater<ColumnOrderState>) {
        let options = self.options();
        let new = updater.resolve(self.column_order_state());
        if let Some(on_change) = &options.on_column_order_change {
            on_change(&new);
        }
        if options.state.column_order.is_none() {
            self.write_internal_state(|state| state.column_order = new);
        }
    }

    /// Clears any explicit order, restoring definition order.
    pub fn reset_column_order(&self) {
        self.set_column_order(Updater::set(Vec::new()));
    }
}

/// Applies an explicit order to a leaf list: listed ids first (in list
/// order, when present), then the rest in definition order.
pub(crate) fn order_columns<T: RowData>(
    leaves: Vec<Arc<Column<T>>>,
    order: &[String],
) -> Vec<Arc<Column<T>>> {
    if order.is_empty() {
        return leaves;
    }
    let mut remaining = leaves;
    let mut ordered = Vec::with_capacity(remaining.len());
    for id in order {
        if let Some(pos) = remaining.iter().position(|c| c.id() == id) {
            ordered.push(remaining.remove(pos));
        }
    }
    ordered.extend(remaining);
    ordered
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::column::{ColumnDef, ColumnModel};
    use crate::model::CellValue;

    type Record = HashMap<String, CellValue>;

    #[test]
    fn test_order_columns_partial_list() {
        let model = ColumnModel::<Record>::build(&[
            ColumnDef::accessor("a"),
            ColumnDef::accessor("b"),
            ColumnDef::accessor("c"),
        ])
        .unwrap();
        let ordered = order_columns(
            model.leaf_columns.clone(),
            &["c".to_string(), "missing".to_string()],
        );
        let ids: Vec<_> = ordered.iter().map(|c| c.id().to_string()).collect();
        assert_eq!(ids, ["c", "a", "b"]);
    }
}
