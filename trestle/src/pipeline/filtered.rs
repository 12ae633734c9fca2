//! Filter stages: per-column predicates, then the global filter.

use std::sync::Arc;

use crate::column::Column;
use crate::features::filtering::FilterValue;
use crate::model::{Row, RowData, RowModel};
use crate::table::Table;

impl<T: RowData> Table<T> {
    /// The model after the active per-column filters (AND across entries).
    ///
    /// Filtering is recursive: a row survives when it matches or when any
    /// descendant does, in which case it is kept as a pass-through parent
    /// with only its surviving children.
    pub fn column_filtered_row_model(&self) -> Arc<RowModel<T>> {
        let core = self.core_row_model();
        let options = self.options();
        let filters = self.column_filters_state();
        let deps = (
            Arc::as_ptr(&core) as usize,
            filters.clone(),
            options.enable_column_filters,
        );
        self.caches.column_filtered.get(deps, |_| {
            let columns = self.column_model();
            let active: Vec<(Arc<Column<T>>, FilterValue)> = filters
                .iter()
                .filter_map(|entry| {
                    let column = columns.column(&entry.id)?;
                    self.can_filter_column(column)
                        .then(|| (column.clone(), entry.value.clone()))
                })
                .collect();
            if active.is_empty() || !options.enable_column_filters {
                return core.clone();
            }
            let keep = |row: &Arc<Row<T>>| {
                active.iter().all(|(column, value)| {
                    column.def().filter_fn.evaluate(
                        &row.value(column.id(), &columns),
                        value,
                        &options.filter_fns,
                    )
                })
            };
            Arc::new(RowModel::from_rows(filter_rows(&core.rows, &keep)))
        })
    }

    /// The fully filtered model: column filters, then the global filter
    /// (OR across the globally filterable columns, AND with the column
    /// filter result).
    pub fn filtered_row_model(&self) -> Arc<RowModel<T>> {
        let upstream = self.column_filtered_row_model();
        let options = self.options();
        let global = self.global_filter_state();
        let deps = (
            Arc::as_ptr(&upstream) as usize,
            global.clone(),
            options.enable_global_filter,
        );
        self.caches.filtered.get(deps, |_| {
            let Some(filter_value) = global else {
                return upstream.clone();
            };
            if !options.enable_global_filter {
                return upstream.clone();
            }
            let columns = self.column_model();
            let searched: Vec<Arc<Column<T>>> = columns
                .leaf_columns
                .iter()
                .filter(|column| self.can_global_filter_column(column))
                .cloned()
                .collect();
            let keep = |row: &Arc<Row<T>>| {
                searched.iter().any(|column| {
                    options.global_filter_fn.evaluate(
                        &row.value(column.id(), &columns),
                        &filter_value,
                        &options.filter_fns,
                    )
                })
            };
            Arc::new(RowModel::from_rows(filter_rows(&upstream.rows, &keep)))
        })
    }
}

/// Recursive subset filter with pass-through parents.
fn filter_rows<T: RowData>(
    rows: &[Arc<Row<T>>],
    keep: &impl Fn(&Arc<Row<T>>) -> bool,
) -> Vec<Arc<Row<T>>> {
    rows.iter()
        .filter_map(|row| {
            let kept_children = filter_rows(row.sub_rows(), keep);
            let unchanged = kept_children.len() == row.sub_rows().len()
                && kept_children
                    .iter()
                    .zip(row.sub_rows())
                    .all(|(a, b)| Arc::ptr_eq(a, b));
            if keep(row) || !kept_children.is_empty() {
                if unchanged {
                    Some(row.clone())
                } else {
                    Some(Arc::new(row.with_sub_rows(kept_children)))
                }
            } else {
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::column::ColumnDef;
    use crate::features::filtering::ColumnFilter;
    use crate::options::Options;
    use crate::state::Updater;

    fn people() -> Vec<serde_json::Value> {
        vec![
            json!({ "name": "Ada", "age": 24 }),
            json!({ "name": "Grace", "age": 40 }),
            json!({ "name": "Edsger", "age": 45 }),
        ]
    }

    fn columns() -> Vec<ColumnDef<serde_json::Value>> {
        vec![ColumnDef::accessor("name"), ColumnDef::accessor("age")]
    }

    #[test]
    fn test_column_filter_is_a_subset_in_original_order() {
        let table = Table::new(Options::new(people(), columns())).unwrap();
        table.set_column_filter("age", Some(FilterValue::range(30.0, None)));

        let filtered = table.filtered_row_model();
        let ages: Vec<_> = filtered
            .flat_rows
            .iter()
            .map(|r| r.value("age", &table.column_model()))
            .collect();
        assert_eq!(
            ages,
            [crate::model::CellValue::Int(40), crate::model::CellValue::Int(45)]
        );

        let pre = table.pre_filtered_row_model();
        assert!(filtered
            .flat_rows
            .iter()
            .all(|row| pre.rows_by_id.contains_key(row.id())));
    }

    #[test]
    fn test_removing_the_filter_restores_the_model() {
        let table = Table::new(Options::new(people(), columns())).unwrap();
        let before = table.filtered_row_model();
        table.set_column_filter("age", Some(FilterValue::range(30.0, None)));
        assert_eq!(table.filtered_row_model().flat_rows.len(), 2);

        table.set_column_filter("age", None);
        let after = table.filtered_row_model();
        assert_eq!(after.flat_rows.len(), before.flat_rows.len());
        let ids = |model: &RowModel<serde_json::Value>| {
            model
                .flat_rows
                .iter()
                .map(|r| r.id().to_string())
                .collect::<Vec<_>>()
        };
        assert_eq!(ids(&after), ids(&before));
    }

    #[test]
    fn test_multiple_filters_combine_with_and() {
        let table = Table::new(Options::new(people(), columns())).unwrap();
        table.set_column_filters(Updater::set(vec![
            ColumnFilter {
                id: "age".into(),
                value: FilterValue::range(30.0, None),
            },
            ColumnFilter {
                id: "name".into(),
                value: FilterValue::from("gra"),
            },
        ]));
        let filtered = table.filtered_row_model();
        assert_eq!(filtered.flat_rows.len(), 1);
        assert_eq!(
            filtered.flat_rows[0].value("name", &table.column_model()),
            crate::model::CellValue::from("Grace")
        );
    }

    #[test]
    fn test_global_filter_ors_across_columns() {
        let table = Table::new(Options::new(people(), columns())).unwrap();
        table.set_global_filter(Updater::set(Some(FilterValue::from("4"))));
        // "4" matches ages 24, 40 and 45 as rendered text, no names.
        assert_eq!(table.filtered_row_model().flat_rows.len(), 3);

        table.set_global_filter(Updater::set(Some(FilterValue::from("ada"))));
        assert_eq!(table.filtered_row_model().flat_rows.len(), 1);
    }

    #[test]
    fn test_non_matching_parent_with_matching_child_passes_through() {
        let data = vec![json!({
            "name": "root",
            "age": 1,
            "children": [ { "name": "keeper", "age": 99 } ]
        })];
        let table = Table::new(
            Options::new(data, columns()).with_sub_rows(|record| {
                record
                    .get("children")
                    .and_then(|c| c.as_array())
                    .map(|c| c.to_vec())
                    .unwrap_or_default()
            }),
        )
        .unwrap();
        table.set_column_filter("age", Some(FilterValue::range(50.0, None)));

        let filtered = table.filtered_row_model();
        assert_eq!(filtered.rows.len(), 1);
        assert_eq!(filtered.rows[0].id(), "0");
        assert_eq!(filtered.rows[0].sub_rows().len(), 1);
        assert_eq!(filtered.flat_rows.len(), 2);
    }
}
