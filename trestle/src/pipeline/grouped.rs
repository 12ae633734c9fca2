//! Grouping stage: partition rows and synthesize aggregate parents.

use std::collections::HashMap;
use std::sync::Arc;

use crate::column::{Column, ColumnModel};
use crate::features::grouping::{AggregationFn, AggregatorFn};
use crate::model::{CellValue, Row, RowData, RowModel};
use crate::table::Table;

impl<T: RowData> Table<T> {
    /// The model grouping starts from.
    pub fn pre_grouped_row_model(&self) -> Arc<RowModel<T>> {
        self.filtered_row_model()
    }

    /// The model after grouping: filtered rows partitioned by the grouping
    /// columns in configured order, with synthetic parent rows carrying
    /// the grouped children and per-column aggregates.
    pub fn grouped_row_model(&self) -> Arc<RowModel<T>> {
        let filtered = self.filtered_row_model();
        let options = self.options();
        let grouping = self.grouping_state();
        let deps = (
            Arc::as_ptr(&filtered) as usize,
            grouping.clone(),
            options.enable_grouping,
        );
        self.caches.grouped.get(deps, |_| {
            let columns = self.column_model();
            let grouping_columns: Vec<Arc<Column<T>>> = grouping
                .iter()
                .filter_map(|id| columns.column(id))
                .filter(|column| self.can_group_column(column))
                .cloned()
                .collect();
            if grouping_columns.is_empty() || !options.enable_grouping {
                return filtered.clone();
            }
            let aggregated: Vec<(Arc<Column<T>>, AggregationFn)> = columns
                .leaf_columns
                .iter()
                .filter_map(|column| {
                    column
                        .def()
                        .aggregation_fn
                        .clone()
                        .map(|f| (column.clone(), f))
                })
                .collect();
            let ctx = GroupContext {
                columns: &columns,
                aggregated: &aggregated,
                registry: &options.aggregation_fns,
            };
            let rows = group_level(&filtered.rows, &grouping_columns, 0, None, &ctx);
            Arc::new(RowModel::from_rows(rows))
        })
    }
}

struct GroupContext<'a, T: RowData> {
    columns: &'a ColumnModel<T>,
    aggregated: &'a [(Arc<Column<T>>, AggregationFn)],
    registry: &'a HashMap<String, AggregatorFn>,
}

fn group_level<T: RowData>(
    rows: &[Arc<Row<T>>],
    grouping: &[Arc<Column<T>>],
    depth: usize,
    parent_id: Option<&str>,
    ctx: &GroupContext<'_, T>,
) -> Vec<Arc<Row<T>>> {
    let Some((column, rest)) = grouping.split_first() else {
        // Leaf level: re-parent the original rows under the group chain.
        return rows
            .iter()
            .map(|row| {
                if row.depth() == depth {
                    row.clone()
                } else {
                    Arc::new(row.with_depth(depth))
                }
            })
            .collect();
    };

    // Partition in first-seen order so grouping alone never reorders.
    let mut partitions: Vec<(String, CellValue, Vec<Arc<Row<T>>>)> = Vec::new();
    for row in rows {
        let value = row.value(column.id(), ctx.columns);
        let key = value.to_string();
        match partitions.iter().position(|(k, _, _)| *k == key) {
            Some(i) => partitions[i].2.push(row.clone()),
            None => partitions.push((key, value, vec![row.clone()])),
        }
    }

    partitions
        .into_iter()
        .enumerate()
        .map(|(index, (key, value, members))| {
            let id = match parent_id {
                Some(parent) => format!("{parent}>{}:{key}", column.id()),
                None => format!("{}:{key}", column.id()),
            };
            let sub_rows = group_level(&members, rest, depth + 1, Some(&id), ctx);

            let mut values = HashMap::new();
            values.insert(column.id().to_string(), value.clone());
            for (agg_column, agg_fn) in ctx.aggregated {
                if agg_column.id() == column.id() {
                    continue;
                }
                let leaf_values: Vec<CellValue> = members
                    .iter()
                    .map(|row| row.value(agg_column.id(), ctx.columns))
                    .collect();
                values.insert(
                    agg_column.id().to_string(),
                    agg_fn.aggregate(&leaf_values, ctx.registry),
                );
            }

            Arc::new(Row::new_group(
                id,
                index,
                depth,
                column.id().to_string(),
                value,
                values,
                sub_rows,
                members,
            ))
        })
        .collect()
}
