//! Derived rows and row models.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::OnceLock;

use crate::column::ColumnModel;
use crate::model::CellValue;
use crate::model::RowData;

/// One derived record.
///
/// Rows are immutable once published: pipeline stages that need a different
/// shape (filtered children, adjusted depth) build a new `Row` sharing the
/// original record via `Arc` instead of patching in place, so previously
/// returned models stay valid snapshots.
pub struct Row<T: RowData> {
    pub(crate) id: String,
    pub(crate) index: usize,
    pub(crate) depth: usize,
    pub(crate) original: Option<Arc<T>>,
    pub(crate) values: OnceLock<HashMap<String, CellValue>>,
    pub(crate) sub_rows: Vec<Arc<Row<T>>>,
    pub(crate) grouping_column_id: Option<String>,
    pub(crate) grouping_value: Option<CellValue>,
    pub(crate) leaf_rows: Vec<Arc<Row<T>>>,
}

impl<T: RowData> Row<T> {
    pub(crate) fn new(
        id: String,
        index: usize,
        depth: usize,
        original: Arc<T>,
        sub_rows: Vec<Arc<Row<T>>>,
    ) -> Self {
        Self {
            id,
            index,
            depth,
            original: Some(original),
            values: OnceLock::new(),
            sub_rows,
            grouping_column_id: None,
            grouping_value: None,
            leaf_rows: Vec::new(),
        }
    }

    pub(crate) fn new_group(
        id: String,
        index: usize,
        depth: usize,
        grouping_column_id: String,
        grouping_value: CellValue,
        values: HashMap<String, CellValue>,
        sub_rows: Vec<Arc<Row<T>>>,
        leaf_rows: Vec<Arc<Row<T>>>,
    ) -> Self {
        let seeded = OnceLock::new();
        let _ = seeded.set(values);
        Self {
            id,
            index,
            depth,
            original: None,
            values: seeded,
            sub_rows,
            grouping_column_id: Some(grouping_column_id),
            grouping_value: Some(grouping_value),
            leaf_rows,
        }
    }

    fn clone_values(&self) -> OnceLock<HashMap<String, CellValue>> {
        let lock = OnceLock::new();
        if let Some(values) = self.values.get() {
            let _ = lock.set(values.clone());
        }
        lock
    }

    /// Copy of this row with different sub-rows (filtered or sorted).
    pub(crate) fn with_sub_rows(&self, sub_rows: Vec<Arc<Row<T>>>) -> Row<T> {
        Row {
            id: self.id.clone(),
            index: self.index,
            depth: self.depth,
            original: self.original.clone(),
            values: self.clone_values(),
            sub_rows,
            grouping_column_id: self.grouping_column_id.clone(),
            grouping_value: self.grouping_value.clone(),
            leaf_rows: self.leaf_rows.clone(),
        }
    }

    /// Copy of this row re-parented at a different depth.
    pub(crate) fn with_depth(&self, depth: usize) -> Row<T> {
        Row {
            id: self.id.clone(),
            index: self.index,
            depth,
            original: self.original.clone(),
            values: self.clone_values(),
            sub_rows: self.sub_rows.clone(),
            grouping_column_id: self.grouping_column_id.clone(),
            grouping_value: self.grouping_value.clone(),
            leaf_rows: self.leaf_rows.clone(),
        }
    }

    /// The row's stable id: an index path by default, or whatever the
    /// configured row-id accessor produced.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Position of the record within its parent sequence.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Nesting depth in the row tree, for indentation.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// The original record, absent on synthesized group rows.
    pub fn original(&self) -> Option<&Arc<T>> {
        self.original.as_ref()
    }

    /// Owned sub-rows (tree children or grouped children).
    pub fn sub_rows(&self) -> &[Arc<Row<T>>] {
        &self.sub_rows
    }

    /// Returns `true` if this row has children to expand.
    pub fn can_expand(&self) -> bool {
        !self.sub_rows.is_empty()
    }

    /// Returns `true` for rows synthesized by grouping.
    pub fn is_grouped(&self) -> bool {
        self.grouping_column_id.is_some()
    }

    /// The column this group row was partitioned on.
    pub fn grouping_column_id(&self) -> Option<&str> {
        self.grouping_column_id.as_deref()
    }

    /// The partition key value of this group row.
    pub fn grouping_value(&self) -> Option<&CellValue> {
        self.grouping_value.as_ref()
    }

    /// Every leaf row a group row covers, across nesting levels.
    pub fn leaf_rows(&self) -> &[Arc<Row<T>>] {
        &self.leaf_rows
    }

    /// The accessed values of this row, computed once on first use.
    ///
    /// Group rows are seeded at construction with their partition key and
    /// aggregates; data rows run every leaf accessor against the original
    /// record.
    pub fn values(&self, columns: &ColumnModel<T>) -> &HashMap<String, CellValue> {
        self.values.get_or_init(|| {
            let mut map = HashMap::new();
            if let Some(original) = &self.original {
                for column in &columns.leaf_columns {
                    if let Some(value) = column.accessor_value(original, self.index) {
                        map.insert(column.id().to_string(), value);
                    }
                }
            }
            map
        })
    }

    /// A single accessed value; `Null` for display columns and unknown ids.
    pub fn value(&self, column_id: &str, columns: &ColumnModel<T>) -> CellValue {
        self.values(columns)
            .get(column_id)
            .cloned()
            .unwrap_or(CellValue::Null)
    }
}

/// The result of one pipeline stage.
///
/// `flat_rows` is the pre-order traversal of `rows` through sub-row
/// ownership links, and `rows_by_id` contains every flat row exactly once.
/// Stages share models as `Arc`s; an unchanged stage returns the same
/// allocation, so pointer equality doubles as change detection.
pub struct RowModel<T: RowData> {
    /// Top-level rows in display order.
    pub rows: Vec<Arc<Row<T>>>,
    /// All rows visited depth-first through sub-row links.
    pub flat_rows: Vec<Arc<Row<T>>>,
    /// Id lookup for every row in `flat_rows`.
    pub rows_by_id: HashMap<String, Arc<Row<T>>>,
}

impl<T: RowData> RowModel<T> {
    /// Builds a model from top-level rows, deriving the flat traversal and
    /// the id index.
    pub(crate) fn from_rows(rows: Vec<Arc<Row<T>>>) -> Self {
        let mut flat_rows = Vec::new();
        for row in &rows {
            flatten(row, &mut flat_rows);
        }
        let rows_by_id = flat_rows
            .iter()
            .map(|row| (row.id.clone(), row.clone()))
            .collect();
        Self {
            rows,
            flat_rows,
            rows_by_id,
        }
    }

    /// Looks a row up by id.
    pub fn row(&self, id: &str) -> Option<&Arc<Row<T>>> {
        self.rows_by_id.get(id)
    }
}

fn flatten<T: RowData>(row: &Arc<Row<T>>, out: &mut Vec<Arc<Row<T>>>) {
    out.push(row.clone());
    for sub in &row.sub_rows {
        flatten(sub, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Record = HashMap<String, CellValue>;

    fn leaf(id: &str, index: usize, depth: usize) -> Arc<Row<Record>> {
        Arc::new(Row::new(
            id.to_string(),
            index,
            depth,
            Arc::new(Record::new()),
            Vec::new(),
        ))
    }

    #[test]
    fn test_flat_rows_is_preorder() {
        let child_a = leaf("0.0", 0, 1);
        let child_b = leaf("0.1", 1, 1);
        let parent = Arc::new(Row::new(
            "0".to_string(),
            0,
            0,
            Arc::new(Record::new()),
            vec![child_a, child_b],
        ));
        let sibling = leaf("1", 1, 0);
        let model = RowModel::from_rows(vec![parent, sibling]);

        let ids: Vec<_> = model.flat_rows.iter().map(|r| r.id().to_string()).collect();
        assert_eq!(ids, ["0", "0.0", "0.1", "1"]);
        assert_eq!(model.rows.len(), 2);
        assert_eq!(model.rows_by_id.len(), 4);
        assert!(model.row("0.1").is_some());
    }
}
