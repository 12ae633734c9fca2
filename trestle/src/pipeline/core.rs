//! Core stage: materialize rows from raw records.

use std::sync::Arc;

use crate::model::{Row, RowData, RowModel};
use crate::options::Options;
use crate::pipeline::fn_addr;
use crate::table::Table;

impl<T: RowData> Table<T> {
    /// The core model: one row per record, recursively through the
    /// configured sub-row accessor, with stable ids.
    pub fn core_row_model(&self) -> Arc<RowModel<T>> {
        let options = self.options();
        let deps = (
            Arc::as_ptr(&options.data) as usize,
            Arc::as_ptr(&options.columns) as usize,
            options.get_sub_rows.as_ref().map(fn_addr).unwrap_or(0),
            options.get_row_id.as_ref().map(fn_addr).unwrap_or(0),
        );
        self.caches.core.get(deps, |_| {
            let rows = build_rows(&options.data, 0, None, &options);
            Arc::new(RowModel::from_rows(rows))
        })
    }

    /// The model every filter stage starts from.
    pub fn pre_filtered_row_model(&self) -> Arc<RowModel<T>> {
        self.core_row_model()
    }
}

fn build_rows<T: RowData>(
    records: &[T],
    depth: usize,
    parent_id: Option<&str>,
    options: &Options<T>,
) -> Vec<Arc<Row<T>>> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let id = match &options.get_row_id {
                Some(f) => f(record, index, parent_id),
                None => match parent_id {
                    Some(parent) => format!("{parent}.{index}"),
                    None => index.to_string(),
                },
            };
            let sub_rows = match &options.get_sub_rows {
                Some(f) => {
                    let children = f(record);
                    build_rows(&children, depth + 1, Some(&id), options)
                }
                None => Vec::new(),
            };
            Arc::new(Row::new(id, index, depth, Arc::new(record.clone()), sub_rows))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::column::ColumnDef;
    use crate::options::Options;
    use crate::table::Table;

    #[test]
    fn test_index_path_ids_for_tree_data() {
        let data = vec![
            json!({ "name": "a", "children": [ { "name": "a1" }, { "name": "a2" } ] }),
            json!({ "name": "b" }),
        ];
        let table = Table::new(
            Options::new(data, vec![ColumnDef::accessor("name")]).with_sub_rows(|record| {
                record
                    .get("children")
                    .and_then(|c| c.as_array())
                    .map(|c| c.to_vec())
                    .unwrap_or_default()
            }),
        )
        .unwrap();

        let core = table.core_row_model();
        let ids: Vec<_> = core.flat_rows.iter().map(|r| r.id().to_string()).collect();
        assert_eq!(ids, ["0", "0.0", "0.1", "1"]);
        assert_eq!(core.rows.len(), 2);
        assert_eq!(core.flat_rows[1].depth(), 1);
    }

    #[test]
    fn test_custom_row_ids() {
        let data = vec![json!({ "id": "x" }), json!({ "id": "y" })];
        let table = Table::new(
            Options::new(data, vec![ColumnDef::accessor("id")]).with_row_id(|record, _, _| {
                record
                    .get("id")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string()
            }),
        )
        .unwrap();

        let core = table.core_row_model();
        assert!(core.row("x").is_some());
        assert!(core.row("y").is_some());
    }

    #[test]
    fn test_core_model_is_cached_until_data_changes() {
        let data = vec![json!({ "name": "a" })];
        let table = Table::new(Options::new(data, vec![ColumnDef::accessor("name")])).unwrap();
        let first = table.core_row_model();
        let second = table.core_row_model();
        assert!(std::sync::Arc::ptr_eq(&first, &second));

        table.set_data(vec![json!({ "name": "b" })]);
        let third = table.core_row_model();
        assert!(!std::sync::Arc::ptr_eq(&first, &third));
        assert_eq!(third.rows.len(), 1);
    }
}
