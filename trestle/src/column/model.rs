//! Resolved columns and the column model builder.

use std::collections::HashMap;
use std::sync::Arc;

use crate::column::def::{Accessor, ColumnDef, ColumnKind};
use crate::error::TableError;
use crate::model::CellValue;
use crate::model::RowData;

/// The resolved runtime form of a [`ColumnDef`].
///
/// A group column exclusively owns its children. Feature-derived properties
/// (visibility, pin position, current size, sort direction, filter value)
/// are read through the table against current state, never cached here, so
/// the resolved tree only rebuilds when the definitions themselves change.
pub struct Column<T: RowData> {
    pub(crate) id: String,
    pub(crate) def: ColumnDef<T>,
    pub(crate) depth: usize,
    pub(crate) parent: Option<String>,
    pub(crate) columns: Vec<Arc<Column<T>>>,
}

impl<T: RowData> Column<T> {
    /// The column's unique id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The definition this column was resolved from.
    pub fn def(&self) -> &ColumnDef<T> {
        &self.def
    }

    /// Nesting depth: 0 for root columns.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Id of the owning group column, if nested.
    pub fn parent_id(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// Child columns (empty for leaves).
    pub fn children(&self) -> &[Arc<Column<T>>] {
        &self.columns
    }

    /// Returns `true` if this column has no children.
    pub fn is_leaf(&self) -> bool {
        self.columns.is_empty()
    }

    /// Returns `true` for data columns (the ones with an accessor).
    pub fn is_data(&self) -> bool {
        matches!(self.def.kind, ColumnKind::Accessor(_))
    }

    /// Flattened leaf descendants in definition order; a leaf yields itself.
    pub fn leaf_columns(self: &Arc<Self>) -> Vec<Arc<Column<T>>> {
        let mut leaves = Vec::new();
        collect_leaves(self, &mut leaves);
        leaves
    }

    /// Accesses this column's value from a record.
    ///
    /// Returns `None` for group and display columns, which have no data of
    /// their own.
    pub fn accessor_value(&self, record: &T, index: usize) -> Option<CellValue> {
        match &self.def.kind {
            ColumnKind::Accessor(Accessor::Key(key)) => Some(record.field(key)),
            ColumnKind::Accessor(Accessor::Fn(f)) => Some(f(record, index)),
            _ => None,
        }
    }
}

fn collect_leaves<T: RowData>(column: &Arc<Column<T>>, out: &mut Vec<Arc<Column<T>>>) {
    if column.is_leaf() {
        out.push(column.clone());
    } else {
        for child in &column.columns {
            collect_leaves(child, out);
        }
    }
}

/// The resolved column tree plus its flat enumerations.
pub struct ColumnModel<T: RowData> {
    /// Root columns, in definition order.
    pub columns: Vec<Arc<Column<T>>>,
    /// Every column, pre-order.
    pub flat_columns: Vec<Arc<Column<T>>>,
    /// Leaf columns only, in definition order.
    pub leaf_columns: Vec<Arc<Column<T>>>,
    pub(crate) columns_by_id: HashMap<String, Arc<Column<T>>>,
}

impl<T: RowData> ColumnModel<T> {
    /// Looks a column up by id.
    pub fn column(&self, id: &str) -> Option<&Arc<Column<T>>> {
        self.columns_by_id.get(id)
    }

    /// Resolves an ordered sequence of definitions into a column model.
    ///
    /// Fails with [`TableError::DuplicateColumnId`] when two columns resolve
    /// to the same id and with [`TableError::InvalidAccessor`] when a data
    /// column ends up without a usable accessor. The build is pure: the same
    /// definitions always produce a structurally identical tree.
    pub fn build(defs: &[ColumnDef<T>]) -> Result<ColumnModel<T>, TableError> {
        let mut roots = Vec::with_capacity(defs.len());
        for def in defs {
            roots.push(resolve(def, 0, None)?);
        }

        let mut flat_columns = Vec::new();
        let mut leaf_columns = Vec::new();
        let mut columns_by_id = HashMap::new();
        for root in &roots {
            index(root, &mut flat_columns, &mut leaf_columns, &mut columns_by_id)?;
        }

        Ok(ColumnModel {
            columns: roots,
            flat_columns,
            leaf_columns,
            columns_by_id,
        })
    }
}

fn resolve<T: RowData>(
    def: &ColumnDef<T>,
    depth: usize,
    parent: Option<&str>,
) -> Result<Arc<Column<T>>, TableError> {
    if def.id.is_empty() {
        return Err(TableError::InvalidAccessor(String::from("<unnamed>")));
    }
    if let ColumnKind::Accessor(Accessor::Key(key)) = &def.kind {
        if key.is_empty() {
            return Err(TableError::InvalidAccessor(def.id.clone()));
        }
    }

    let children = match &def.kind {
        ColumnKind::Group { columns } => {
            let mut resolved = Vec::with_capacity(columns.len());
            for child in columns {
                resolved.push(resolve(child, depth + 1, Some(&def.id))?);
            }
            resolved
        }
        _ => Vec::new(),
    };

    Ok(Arc::new(Column {
        id: def.id.clone(),
        def: def.clone(),
        depth,
        parent: parent.map(str::to_string),
        columns: children,
    }))
}

fn index<T: RowData>(
    column: &Arc<Column<T>>,
    flat_columns: &mut Vec<Arc<Column<T>>>,
    leaf_columns: &mut Vec<Arc<Column<T>>>,
    columns_by_id: &mut HashMap<String, Arc<Column<T>>>,
) -> Result<(), TableError> {
    if columns_by_id
        .insert(column.id.clone(), column.clone())
        .is_some()
    {
        return Err(TableError::DuplicateColumnId(column.id.clone()));
    }
    flat_columns.push(column.clone());
    if column.is_leaf() {
        leaf_columns.push(column.clone());
    }
    for child in &column.columns {
        index(child, flat_columns, leaf_columns, columns_by_id)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::model::CellValue;

    type Record = HashMap<String, CellValue>;

    fn defs() -> Vec<ColumnDef<Record>> {
        vec![
            ColumnDef::group(
                "Name",
                vec![
                    ColumnDef::accessor("first_name"),
                    ColumnDef::accessor("last_name"),
                ],
            ),
            ColumnDef::group(
                "Info",
                vec![
                    ColumnDef::accessor("age"),
                    ColumnDef::group("More Info", vec![ColumnDef::accessor("visits")]),
                ],
            ),
        ]
    }

    #[test]
    fn test_leaf_enumeration_is_definition_ordered() {
        let model = ColumnModel::build(&defs()).unwrap();
        let ids: Vec<_> = model.leaf_columns.iter().map(|c| c.id().to_string()).collect();
        assert_eq!(ids, ["first_name", "last_name", "age", "visits"]);
        assert_eq!(model.columns.len(), 2);
        assert_eq!(model.flat_columns.len(), 7);
    }

    #[test]
    fn test_depths_and_parents() {
        let model = ColumnModel::build(&defs()).unwrap();
        assert_eq!(model.column("Name").unwrap().depth(), 0);
        assert_eq!(model.column("age").unwrap().depth(), 1);
        let visits = model.column("visits").unwrap();
        assert_eq!(visits.depth(), 2);
        assert_eq!(visits.parent_id(), Some("More Info"));
    }

    #[test]
    fn test_duplicate_id_is_an_error() {
        let dup = vec![
            ColumnDef::<Record>::accessor("age"),
            ColumnDef::<Record>::accessor_fn("age", |_, _| CellValue::Null),
        ];
        assert_eq!(
            ColumnModel::build(&dup).err(),
            Some(TableError::DuplicateColumnId("age".into()))
        );
    }

    #[test]
    fn test_empty_accessor_key_is_an_error() {
        let bad = vec![ColumnDef::<Record>::accessor("")];
        assert!(matches!(
            ColumnModel::build(&bad).err(),
            Some(TableError::InvalidAccessor(_))
        ));
    }

    #[test]
    fn test_group_leaf_descendants() {
        let model = ColumnModel::build(&defs()).unwrap();
        let info = model.column("Info").unwrap();
        let ids: Vec<_> = info
            .leaf_columns()
            .iter()
            .map(|c| c.id().to_string())
            .collect();
        assert_eq!(ids, ["age", "visits"]);
    }
}
