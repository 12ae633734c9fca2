//! Grouping state and aggregation functions.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;

use crate::column::Column;
use crate::model::CellValue;
use crate::model::RowData;
use crate::state::Updater;
use crate::table::Table;

/// Grouped column ids, outermost first.
pub type GroupingState = Vec<String>;

/// A custom aggregator over the leaf values of one group.
pub type AggregatorFn = Arc<dyn Fn(&[CellValue]) -> CellValue + Send + Sync>;

/// How a column summarizes the leaf rows of a group.
#[derive(Clone)]
pub enum AggregationFn {
    /// Numeric sum. Stays integral for integer inputs and exact for
    /// decimal inputs.
    Sum,
    /// Smallest value under [`CellValue::compare`].
    Min,
    /// Largest value under [`CellValue::compare`].
    Max,
    /// `[min, max]` as a JSON pair.
    Extent,
    /// Arithmetic mean of the numeric values.
    Mean,
    /// Median of the numeric values.
    Median,
    /// Distinct values, first-seen order, as a JSON array.
    Unique,
    /// Number of distinct values.
    UniqueCount,
    /// Number of leaf rows.
    Count,
    /// An aggregator registered by name in the options.
    Named(String),
    /// An inline aggregator.
    Custom(AggregatorFn),
}

impl AggregationFn {
    /// Aggregates the leaf values of one group into a single value.
    pub fn aggregate(
        &self,
        values: &[CellValue],
        registry: &HashMap<String, AggregatorFn>,
    ) -> CellValue {
        match self {
            AggregationFn::Sum => sum(values),
            AggregationFn::Min => min_max(values).map(|(min, _)| min).unwrap_or(CellValue::Null),
            AggregationFn::Max => min_max(values).map(|(_, max)| max).unwrap_or(CellValue::Null),
            AggregationFn::Extent => match min_max(values) {
                Some((min, max)) => CellValue::Json(serde_json::json!([min, max])),
                None => CellValue::Null,
            },
            AggregationFn::Mean => mean(values),
            AggregationFn::Median => median(values),
            AggregationFn::Unique => {
                let distinct = distinct(values);
                CellValue::Json(serde_json::Value::Array(
                    distinct
                        .iter()
                        .map(|v| serde_json::to_value(v).unwrap_or(serde_json::Value::Null))
                        .collect(),
                ))
            }
            AggregationFn::UniqueCount => CellValue::Int(distinct(values).len() as i64),
            AggregationFn::Count => CellValue::Int(values.len() as i64),
            // Registry membership is validated when options are applied.
            AggregationFn::Named(name) => registry
                .get(name)
                .map(|aggregator| aggregator(values))
                .unwrap_or(CellValue::Null),
            AggregationFn::Custom(aggregator) => aggregator(values),
        }
    }
}

fn sum(values: &[CellValue]) -> CellValue {
    let mut all_int = true;
    let mut exact = true;
    let mut any = false;
    for value in values {
        match value {
            CellValue::Int(_) => any = true,
            CellValue::Decimal(_) => {
                any = true;
                all_int = false;
            }
            CellValue::Float(_) | CellValue::Bool(_) => {
                any = true;
                all_int = false;
                exact = false;
            }
            _ => {}
        }
    }
    if !any {
        return CellValue::Null;
    }
    if all_int {
        let total: i64 = values
            .iter()
            .filter_map(|v| match v {
                CellValue::Int(i) => Some(*i),
                _ => None,
            })
            .sum();
        CellValue::Int(total)
    } else if exact {
        let mut total = Decimal::ZERO;
        for value in values {
            match value {
                CellValue::Int(i) => total += Decimal::from(*i),
                CellValue::Decimal(d) => total += *d,
                _ => {}
            }
        }
        CellValue::Decimal(total)
    } else {
        let total: f64 = values.iter().filter_map(CellValue::as_f64).sum();
        CellValue::Float(total)
    }
}

fn min_max(values: &[CellValue]) -> Option<(CellValue, CellValue)> {
    let mut extent: Option<(CellValue, CellValue)> = None;
    for value in values {
        if value.is_unordered() {
            continue;
        }
        extent = Some(match extent {
            None => (value.clone(), value.clone()),
            Some((min, max)) => {
                let min = if value.compare(&min) == Ordering::Less {
                    value.clone()
                } else {
                    min
                };
                let max = if value.compare(&max) == Ordering::Greater {
                    value.clone()
                } else {
                    max
                };
                (min, max)
            }
        });
    }
    extent
}

fn mean(values: &[CellValue]) -> CellValue {
    let numeric: Vec<f64> = values.iter().filter_map(CellValue::as_f64).collect();
    if numeric.is_empty() {
        return CellValue::Null;
    }
    CellValue::Float(numeric.iter().sum::<f64>() / numeric.len() as f64)
}

fn median(values: &[CellValue]) -> CellValue {
    let mut numeric: Vec<f64> = values
        .iter()
        .filter_map(CellValue::as_f64)
        .filter(|v| !v.is_nan())
        .collect();
    if numeric.is_empty() {
        return CellValue::Null;
    }
    numeric.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let mid = numeric.len() / 2;
    if numeric.len() % 2 == 1 {
        CellValue::Float(numeric[mid])
    } else {
        CellValue::Float((numeric[mid - 1] + numeric[mid]) / 2.0)
    }
}

fn distinct(values: &[CellValue]) -> Vec<CellValue> {
    let mut out: Vec<CellValue> = Vec::new();
    for value in values {
        if !out.iter().any(|seen| seen.compare(value) == Ordering::Equal) {
            out.push(value.clone());
        }
    }
    out
}

impl<T: RowData> Table<T> {
    /// Effective grouping slice.
    pub fn grouping_state(&self) -> GroupingState {
        let options = self.options();
        if let Some(controlled) = &options.state.grouping {
            return controlled.clone();
        }
        self.internal_state().grouping
    }

    /// Proposes a new grouping slice through the update protocol.
    pub fn set_grouping(&self, updater: Updater<GroupingState>) {
        let options = self.options();
        let new = updater.resolve(self.grouping_state());
        if let Some(on_change) = &options.on_grouping_change {
            on_change(&new);
        }
        if options.state.grouping.is_none() {
            self.write_internal_state(|state| state.grouping = new);
        }
    }

    /// Returns `true` when the column can be grouped by.
    pub fn can_group_column(&self, column: &Column<T>) -> bool {
        column.is_data() && column.def().enable_grouping && self.options().enable_grouping
    }

    /// Adds the column to the grouping chain, or removes it if present.
    pub fn toggle_column_grouping(&self, column_id: &str) {
        let columns = self.column_model();
        let Some(column) = columns.column(column_id) else {
            return;
        };
        if !self.can_group_column(column) {
            return;
        }
        let id = column_id.to_string();
        self.set_grouping(Updater::apply(move |mut grouping: GroupingState| {
            match grouping.iter().position(|g| *g == id) {
                Some(i) => {
                    grouping.remove(i);
                }
                None => grouping.push(id),
            }
            grouping
        }));
    }
}
