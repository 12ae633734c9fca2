//! Sorting stage: stable ordering by the configured comparator chain.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::column::Column;
use crate::model::{Row, RowData, RowModel};
use crate::table::Table;

impl<T: RowData> Table<T> {
    /// The model sorting starts from.
    pub fn pre_sorted_row_model(&self) -> Arc<RowModel<T>> {
        self.grouped_row_model()
    }

    /// The model after sorting.
    ///
    /// Rows compare by the first sort entry's comparator, falling through
    /// to later entries on ties and finally to the upstream order (the
    /// sort is stable). Sorting recurses into sub-rows, so grouped
    /// children order within their group and group rows order by their own
    /// aggregated values. Nulls and NaN always land at the end.
    pub fn sorted_row_model(&self) -> Arc<RowModel<T>> {
        let grouped = self.grouped_row_model();
        let options = self.options();
        let sorting = self.sorting_state();
        let deps = (
            Arc::as_ptr(&grouped) as usize,
            sorting.clone(),
            options.enable_sorting,
        );
        self.caches.sorted.get(deps, |_| {
            let columns = self.column_model();
            let chain: Vec<(Arc<Column<T>>, bool)> = sorting
                .iter()
                .filter_map(|entry| {
                    let column = columns.column(&entry.id)?;
                    self.can_sort_column(column)
                        .then(|| (column.clone(), entry.desc))
                })
                .collect();
            if chain.is_empty() || !options.enable_sorting {
                return grouped.clone();
            }

            let compare = |a: &Arc<Row<T>>, b: &Arc<Row<T>>| -> Ordering {
                for (column, desc) in &chain {
                    let va = a.value(column.id(), &columns);
                    let vb = b.value(column.id(), &columns);
                    // Unorderable values stay at the end in both directions.
                    let ord = match (va.is_unordered(), vb.is_unordered()) {
                        (true, true) => Ordering::Equal,
                        (true, false) => Ordering::Greater,
                        (false, true) => Ordering::Less,
                        (false, false) => {
                            let def = column.def();
                            let mut ord =
                                def.sorting_fn.compare(&va, &vb, &options.sorting_fns);
                            if def.invert_sorting {
                                ord = ord.reverse();
                            }
                            if *desc {
                                ord = ord.reverse();
                            }
                            ord
                        }
                    };
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                Ordering::Equal
            };

            Arc::new(RowModel::from_rows(sort_level(&grouped.rows, &compare)))
        })
    }
}

fn sort_level<T: RowData>(
    rows: &[Arc<Row<T>>],
    compare: &impl Fn(&Arc<Row<T>>, &Arc<Row<T>>) -> Ordering,
) -> Vec<Arc<Row<T>>> {
    let mut sorted: Vec<Arc<Row<T>>> = rows.to_vec();
    sorted.sort_by(|a, b| compare(a, b));
    sorted
        .into_iter()
        .map(|row| {
            if row.sub_rows().is_empty() {
                row
            } else {
                Arc::new(row.with_sub_rows(sort_level(row.sub_rows(), compare)))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::column::ColumnDef;
    use crate::features::grouping::AggregationFn;
    use crate::features::sorting::ColumnSort;
    use crate::model::CellValue;
    use crate::options::Options;
    use crate::state::Updater;
    use crate::table::Table;

    fn ages(table: &Table<serde_json::Value>) -> Vec<CellValue> {
        let columns = table.column_model();
        table
            .sorted_row_model()
            .rows
            .iter()
            .map(|r| r.value("age", &columns))
            .collect()
    }

    fn table(data: Vec<serde_json::Value>) -> Table<serde_json::Value> {
        Table::new(Options::new(
            data,
            vec![ColumnDef::accessor("name"), ColumnDef::accessor("age")],
        ))
        .unwrap()
    }

    #[test]
    fn test_sort_descending() {
        let table = table(vec![
            json!({ "name": "a", "age": 40 }),
            json!({ "name": "b", "age": 45 }),
            json!({ "name": "c", "age": 24 }),
        ]);
        table.set_sorting(Updater::set(vec![ColumnSort::desc("age")]));
        assert_eq!(
            ages(&table),
            [CellValue::Int(45), CellValue::Int(40), CellValue::Int(24)]
        );
    }

    #[test]
    fn test_sort_is_stable_on_ties() {
        let table = table(vec![
            json!({ "name": "first", "age": 40 }),
            json!({ "name": "second", "age": 40 }),
            json!({ "name": "third", "age": 24 }),
        ]);
        table.set_sorting(Updater::set(vec![ColumnSort::asc("age")]));
        let columns = table.column_model();
        let names: Vec<_> = table
            .sorted_row_model()
            .rows
            .iter()
            .map(|r| r.value("name", &columns).to_string())
            .collect();
        assert_eq!(names, ["third", "first", "second"]);
    }

    #[test]
    fn test_nulls_sort_to_the_end_in_both_directions() {
        let table = table(vec![
            json!({ "name": "a", "age": null }),
            json!({ "name": "b", "age": 45 }),
            json!({ "name": "c", "age": 24 }),
        ]);
        table.set_sorting(Updater::set(vec![ColumnSort::asc("age")]));
        assert_eq!(
            ages(&table),
            [CellValue::Int(24), CellValue::Int(45), CellValue::Null]
        );
        table.set_sorting(Updater::set(vec![ColumnSort::desc("age")]));
        assert_eq!(
            ages(&table),
            [CellValue::Int(45), CellValue::Int(24), CellValue::Null]
        );
    }

    #[test]
    fn test_tie_falls_through_to_second_entry() {
        let table = table(vec![
            json!({ "name": "zeta", "age": 40 }),
            json!({ "name": "alpha", "age": 40 }),
        ]);
        table.set_sorting(Updater::set(vec![
            ColumnSort::asc("age"),
            ColumnSort::asc("name"),
        ]));
        let columns = table.column_model();
        let names: Vec<_> = table
            .sorted_row_model()
            .rows
            .iter()
            .map(|r| r.value("name", &columns).to_string())
            .collect();
        assert_eq!(names, ["alpha", "zeta"]);
    }

    #[test]
    fn test_group_rows_sort_by_their_aggregates() {
        let data = vec![
            json!({ "status": "open", "amount": 1 }),
            json!({ "status": "closed", "amount": 10 }),
            json!({ "status": "open", "amount": 2 }),
        ];
        let table = Table::new(Options::new(
            data,
            vec![
                ColumnDef::accessor("status"),
                ColumnDef::accessor("amount").aggregation_fn(AggregationFn::Sum),
            ],
        ))
        .unwrap();
        table.set_grouping(Updater::set(vec!["status".to_string()]));
        table.set_sorting(Updater::set(vec![ColumnSort::desc("amount")]));

        let sorted = table.sorted_row_model();
        let columns = table.column_model();
        // closed (10) before open (3); children sorted within the group.
        assert_eq!(
            sorted.rows[0].grouping_value(),
            Some(&CellValue::from("closed"))
        );
        let open_children: Vec<_> = sorted.rows[1]
            .sub_rows()
            .iter()
            .map(|r| r.value("amount", &columns))
            .collect();
        assert_eq!(open_children, [CellValue::Int(2), CellValue::Int(1)]);
    }
}
