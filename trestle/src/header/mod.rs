//! Header groups: per-depth header rows derived from the visible,
//! ordered, pin-split leaf columns and the original group nesting.

use std::collections::HashMap;
use std::ops::Range;
use std::sync::Arc;

use crate::column::{Column, ColumnModel};
use crate::model::RowData;

/// A header cell: one column bound to a position.
///
/// Real headers wrap the column they label; placeholder headers are
/// synthesized where a leaf has no ancestor at that depth (hidden or
/// reordered groups), keeping header rows aligned. Actual leaf headers
/// always sit on the bottom row.
pub struct Header<T: RowData> {
    /// Unique id within the built header set.
    pub id: String,
    /// Header row this cell belongs to (0 = top).
    pub depth: usize,
    /// The column this header labels (for a placeholder: the leaf it covers).
    pub column: Arc<Column<T>>,
    /// Number of visible leaf columns under this header.
    pub col_span: usize,
    /// `true` when synthesized to fill a gap.
    pub is_placeholder: bool,
    /// For placeholders, the id of the covered leaf column.
    pub placeholder_id: Option<String>,
    /// Headers of the row below covered by this header.
    pub sub_headers: Vec<Arc<Header<T>>>,
}

impl<T: RowData> Header<T> {
    /// Header text: the column's header label, or its id when unlabeled.
    /// Placeholders have no text.
    pub fn label(&self) -> Option<&str> {
        if self.is_placeholder {
            return None;
        }
        Some(self.column.def().header_text().unwrap_or_else(|| self.column.id()))
    }

    /// Leaf headers under this one, in order.
    pub fn leaf_headers(self: &Arc<Self>) -> Vec<Arc<Header<T>>> {
        let mut out = Vec::new();
        collect_leaf_headers(self, &mut out);
        out
    }
}

fn collect_leaf_headers<T: RowData>(header: &Arc<Header<T>>, out: &mut Vec<Arc<Header<T>>>) {
    if header.sub_headers.is_empty() {
        out.push(header.clone());
    } else {
        for sub in &header.sub_headers {
            collect_leaf_headers(sub, out);
        }
    }
}

/// One header row: every header at a given depth, in display order.
pub struct HeaderGroup<T: RowData> {
    /// Group id, unique within the built set.
    pub id: String,
    /// Row depth (0 = top).
    pub depth: usize,
    /// Headers in display order.
    pub headers: Vec<Arc<Header<T>>>,
}

/// Builds the header rows for one region's leaf columns.
///
/// `leaves` must already be visibility-filtered, ordered and pin-split.
/// Each row is produced by walking the leaves left to right and merging
/// consecutive runs that share the same ancestor at that depth; a group
/// split apart by ordering or pinning therefore yields one header per
/// contiguous run. Headers with no visible leaves are never emitted.
pub(crate) fn build_header_groups<T: RowData>(
    prefix: &str,
    leaves: &[Arc<Column<T>>],
    columns: &ColumnModel<T>,
) -> Vec<HeaderGroup<T>> {
    if leaves.is_empty() {
        return Vec::new();
    }

    // Ancestor chain per leaf, root first, leaf excluded.
    let chains: Vec<Vec<Arc<Column<T>>>> = leaves
        .iter()
        .map(|leaf| {
            let mut chain = Vec::new();
            let mut parent = leaf.parent_id();
            while let Some(id) = parent {
                if let Some(column) = columns.column(id) {
                    chain.push(column.clone());
                    parent = column.parent_id();
                } else {
                    break;
                }
            }
            chain.reverse();
            chain
        })
        .collect();
    let max_depth = chains.iter().map(Vec::len).max().unwrap_or(0);

    // Bottom row: the leaf headers themselves.
    let mut below: Vec<(Arc<Header<T>>, Range<usize>)> = Vec::with_capacity(leaves.len());
    let mut ids = IdDeduper::default();
    for (i, leaf) in leaves.iter().enumerate() {
        let header = Arc::new(Header {
            id: ids.claim(format!("{prefix}{}_{}", max_depth, leaf.id())),
            depth: max_depth,
            column: leaf.clone(),
            col_span: 1,
            is_placeholder: false,
            placeholder_id: None,
            sub_headers: Vec::new(),
        });
        below.push((header, i..i + 1));
    }

    let mut groups = vec![HeaderGroup {
        id: format!("{prefix}{max_depth}"),
        depth: max_depth,
        headers: below.iter().map(|(h, _)| h.clone()).collect(),
    }];

    for depth in (0..max_depth).rev() {
        // Scan leaves into merged slots for this row.
        let mut slots: Vec<(Arc<Column<T>>, bool, Range<usize>)> = Vec::new();
        for (i, leaf) in leaves.iter().enumerate() {
            let (column, placeholder) = match chains[i].get(depth) {
                Some(ancestor) => (ancestor.clone(), false),
                None => (leaf.clone(), true),
            };
            let merges = matches!(
                slots.last(),
                Some((last, false, _)) if !placeholder && last.id() == column.id()
            );
            if merges {
                if let Some((_, _, range)) = slots.last_mut() {
                    range.end = i + 1;
                }
            } else {
                slots.push((column, placeholder, i..i + 1));
            }
        }

        let headers: Vec<(Arc<Header<T>>, Range<usize>)> = slots
            .into_iter()
            .map(|(column, is_placeholder, range)| {
                let sub_headers = below
                    .iter()
                    .filter(|(_, r)| r.start >= range.start && r.end <= range.end)
                    .map(|(h, _)| h.clone())
                    .collect();
                let id = if is_placeholder {
                    ids.claim(format!("{prefix}{}_{}_placeholder", depth, column.id()))
                } else {
                    ids.claim(format!("{prefix}{}_{}", depth, column.id()))
                };
                let header = Arc::new(Header {
                    id,
                    depth,
                    col_span: range.len(),
                    placeholder_id: is_placeholder.then(|| column.id().to_string()),
                    is_placeholder,
                    column,
                    sub_headers,
                });
                (header, range)
            })
            .collect();

        groups.push(HeaderGroup {
            id: format!("{prefix}{depth}"),
            depth,
            headers: headers.iter().map(|(h, _)| h.clone()).collect(),
        });
        below = headers;
    }

    groups.reverse();
    groups
}

/// Suffixes repeated ids so a group split by ordering or pinning still
/// yields unique header ids.
#[derive(Default)]
struct IdDeduper {
    seen: HashMap<String, usize>,
}

impl IdDeduper {
    fn claim(&mut self, id: String) -> String {
        let count = self.seen.entry(id.clone()).or_insert(0);
        *count += 1;
        if *count == 1 {
            id
        } else {
            format!("{id}_{}", *count - 1)
        }
    }
}

/// All header rows for a table: the combined view plus the independent
/// left/center/right pin regions, and the footer rows (header rows,
/// bottom-up).
pub struct HeaderModel<T: RowData> {
    /// Combined header rows over left + center + right leaves.
    pub header_groups: Vec<HeaderGroup<T>>,
    /// Header rows over the left-pinned leaves only.
    pub left: Vec<HeaderGroup<T>>,
    /// Header rows over the unpinned leaves only.
    pub center: Vec<HeaderGroup<T>>,
    /// Header rows over the right-pinned leaves only.
    pub right: Vec<HeaderGroup<T>>,
}

impl<T: RowData> HeaderModel<T> {
    /// Footer rows: the combined header rows in bottom-up order.
    pub fn footer_groups(&self) -> Vec<&HeaderGroup<T>> {
        self.header_groups.iter().rev().collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::column::ColumnDef;
    use crate::model::CellValue;

    type Record = HashMap<String, CellValue>;

    fn model() -> ColumnModel<Record> {
        ColumnModel::build(&[
            ColumnDef::group(
                "Name",
                vec![
                    ColumnDef::accessor("first_name"),
                    ColumnDef::accessor("last_name"),
                ],
            ),
            ColumnDef::accessor("age"),
        ])
        .unwrap()
    }

    #[test]
    fn test_group_colspan_and_placeholder() {
        let columns = model();
        let groups = build_header_groups("", &columns.leaf_columns, &columns);
        assert_eq!(groups.len(), 2);

        let top = &groups[0];
        assert_eq!(top.depth, 0);
        assert_eq!(top.headers.len(), 2);
        assert_eq!(top.headers[0].column.id(), "Name");
        assert_eq!(top.headers[0].col_span, 2);
        assert!(!top.headers[0].is_placeholder);
        // The flat "age" column has no depth-0 ancestor: placeholder.
        assert!(top.headers[1].is_placeholder);
        assert_eq!(top.headers[1].placeholder_id.as_deref(), Some("age"));
        assert_eq!(top.headers[1].col_span, 1);

        let bottom = &groups[1];
        let ids: Vec<_> = bottom.headers.iter().map(|h| h.column.id().to_string()).collect();
        assert_eq!(ids, ["first_name", "last_name", "age"]);
    }

    #[test]
    fn test_split_group_yields_two_headers() {
        let columns = model();
        // Reorder so "age" sits between the two Name leaves.
        let last_name = columns.column("last_name").unwrap().clone();
        let first_name = columns.column("first_name").unwrap().clone();
        let age = columns.column("age").unwrap().clone();
        let groups = build_header_groups("", &[first_name, age, last_name], &columns);

        let top = &groups[0];
        assert_eq!(top.headers.len(), 3);
        assert_eq!(top.headers[0].column.id(), "Name");
        assert_eq!(top.headers[0].col_span, 1);
        assert_eq!(top.headers[2].column.id(), "Name");
        assert_eq!(top.headers[2].col_span, 1);
        // Same column twice still gets unique header ids.
        assert_ne!(top.headers[0].id, top.headers[2].id);
    }

    #[test]
    fn test_hidden_leaves_are_omitted() {
        let columns = model();
        // Only "age" visible: the Name group has no visible leaves and
        // must not be emitted at all.
        let age = columns.column("age").unwrap().clone();
        let groups = build_header_groups("", &[age], &columns);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].headers.len(), 1);
        assert_eq!(groups[0].headers[0].column.id(), "age");
        assert!(!groups[0].headers[0].is_placeholder);
    }

    #[test]
    fn test_sub_headers_cover_leaf_ranges() {
        let columns = model();
        let groups = build_header_groups("", &columns.leaf_columns, &columns);
        let name = &groups[0].headers[0];
        let subs: Vec<_> = name.sub_headers.iter().map(|h| h.column.id().to_string()).collect();
        assert_eq!(subs, ["first_name", "last_name"]);
        let leaves: Vec<_> = name.leaf_headers().iter().map(|h| h.column.id().to_string()).collect();
        assert_eq!(leaves, ["first_name", "last_name"]);
    }
}
