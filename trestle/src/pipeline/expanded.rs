//! Expansion stage: flatten the row tree into the visible sequence.

use std::sync::Arc;

use crate::features::expanding::ExpandedState;
use crate::model::{Row, RowData, RowModel};
use crate::table::Table;

impl<T: RowData> Table<T> {
    /// The model expansion starts from.
    pub fn pre_expanded_row_model(&self) -> Arc<RowModel<T>> {
        self.sorted_row_model()
    }

    /// The model after expansion: `rows` holds the visible sequence in
    /// depth-first order, including a row's children only when that row is
    /// expanded (or everything, under expand-all). `flat_rows` and
    /// `rows_by_id` pass through from upstream so collapsed rows stay
    /// addressable.
    pub fn expanded_row_model(&self) -> Arc<RowModel<T>> {
        let sorted = self.sorted_row_model();
        let options = self.options();
        let expanded = self.expanded_state();
        let deps = (
            Arc::as_ptr(&sorted) as usize,
            expanded.clone(),
            options.enable_expanding,
        );
        self.caches.expanded.get(deps, |_| {
            // Flat data has nothing to expand.
            if sorted.rows.iter().all(|row| row.sub_rows().is_empty()) {
                return sorted.clone();
            }
            let mut rows = Vec::new();
            for row in &sorted.rows {
                walk(row, &expanded, options.enable_expanding, &mut rows);
            }
            Arc::new(RowModel {
                rows,
                flat_rows: sorted.flat_rows.clone(),
                rows_by_id: sorted.rows_by_id.clone(),
            })
        })
    }
}

fn walk<T: RowData>(
    row: &Arc<Row<T>>,
    expanded: &ExpandedState,
    enabled: bool,
    out: &mut Vec<Arc<Row<T>>>,
) {
    out.push(row.clone());
    if enabled && expanded.is_expanded(row.id()) {
        for sub in row.sub_rows() {
            walk(sub, expanded, enabled, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::column::ColumnDef;
    use crate::features::expanding::ExpandedState;
    use crate::options::Options;
    use crate::state::Updater;
    use crate::table::Table;

    fn tree_table() -> Table<serde_json::Value> {
        let data = vec![
            json!({ "name": "a", "children": [
                { "name": "a1", "children": [ { "name": "a1x" } ] },
                { "name": "a2" },
            ]}),
            json!({ "name": "b" }),
        ];
        Table::new(
            Options::new(data, vec![ColumnDef::accessor("name")]).with_sub_rows(|record| {
                record
                    .get("children")
                    .and_then(|c| c.as_array())
                    .map(|c| c.to_vec())
                    .unwrap_or_default()
            }),
        )
        .unwrap()
    }

    fn visible_ids(table: &Table<serde_json::Value>) -> Vec<String> {
        table
            .expanded_row_model()
            .rows
            .iter()
            .map(|r| r.id().to_string())
            .collect()
    }

    #[test]
    fn test_collapsed_tree_shows_top_level_only() {
        let table = tree_table();
        assert_eq!(visible_ids(&table), ["0", "1"]);
    }

    #[test]
    fn test_expanding_one_row_reveals_its_children_only() {
        let table = tree_table();
        table.toggle_row_expanded("0", Some(true));
        assert_eq!(visible_ids(&table), ["0", "0.0", "0.1", "1"]);
        // The grandchild stays hidden until its own parent expands.
        table.toggle_row_expanded("0.0", Some(true));
        assert_eq!(visible_ids(&table), ["0", "0.0", "0.0.0", "0.1", "1"]);
        assert_eq!(
            table.expanded_row_model().rows[2].depth(),
            2,
            "depth drives indentation"
        );
    }

    #[test]
    fn test_expand_all() {
        let table = tree_table();
        table.set_expanded(Updater::set(ExpandedState::All));
        assert_eq!(visible_ids(&table), ["0", "0.0", "0.0.0", "0.1", "1"]);
        assert!(table.is_all_rows_expanded());

        table.toggle_all_rows_expanded();
        assert_eq!(visible_ids(&table), ["0", "1"]);
    }

    #[test]
    fn test_stale_expanded_ids_are_ignored() {
        let table = tree_table();
        table.toggle_row_expanded("0", Some(true));
        table.set_data(vec![json!({ "name": "only" })]);
        assert_eq!(visible_ids(&table), ["0"]);
    }

    #[test]
    fn test_expanded_depth() {
        let table = tree_table();
        assert_eq!(table.expanded_depth(), 0);
        table.toggle_row_expanded("0", Some(true));
        assert_eq!(table.expanded_depth(), 1);
        table.toggle_row_expanded("0.0", Some(true));
        assert_eq!(table.expanded_depth(), 2);
    }
}
