//! End-to-end pipeline behavior over a real table instance.

use std::sync::{Arc, Mutex};

use serde_json::json;
use trestle::prelude::*;

fn people() -> Vec<serde_json::Value> {
    vec![
        json!({ "name": "Ada", "age": 24, "status": "active" }),
        json!({ "name": "Grace", "age": 40, "status": "inactive" }),
        json!({ "name": "Edsger", "age": 45, "status": "active" }),
    ]
}

fn columns() -> Vec<ColumnDef<serde_json::Value>> {
    vec![
        ColumnDef::accessor("name"),
        ColumnDef::accessor("age"),
        ColumnDef::accessor("status"),
    ]
}

fn ages(model: &RowModel<serde_json::Value>, table: &Table<serde_json::Value>) -> Vec<i64> {
    let columns = table.column_model();
    model
        .rows
        .iter()
        .filter_map(|row| match row.value("age", &columns) {
            CellValue::Int(age) => Some(age),
            _ => None,
        })
        .collect()
}

#[test]
fn test_filter_sort_paginate_end_to_end() {
    let mut state = TableState::default();
    state.pagination.page_size = 1;
    let table = Table::new(Options::new(people(), columns()).with_initial_state(state)).unwrap();

    table.set_column_filter("age", Some(FilterValue::range(30.0, None)));
    let filtered = table.filtered_row_model();
    assert_eq!(ages(&filtered, &table), [40, 45], "original relative order");

    table.set_sorting(Updater::set(vec![ColumnSort::desc("age")]));
    let sorted = table.sorted_row_model();
    assert_eq!(ages(&sorted, &table), [45, 40]);

    let page = table.row_model();
    assert_eq!(ages(&page, &table), [45]);
    assert_eq!(table.page_count(), 2);
}

#[test]
fn test_stage_getters_return_cached_references() {
    let table = Table::new(Options::new(people(), columns())).unwrap();
    table.set_sorting(Updater::set(vec![ColumnSort::asc("age")]));

    let first = table.sorted_row_model();
    let second = table.sorted_row_model();
    assert!(Arc::ptr_eq(&first, &second));

    // An unrelated slice change must not invalidate the sorted cache.
    table.set_column_size("age", 120.0);
    let third = table.sorted_row_model();
    assert!(Arc::ptr_eq(&first, &third));

    // A relevant change must.
    table.set_sorting(Updater::set(vec![ColumnSort::desc("age")]));
    let fourth = table.sorted_row_model();
    assert!(!Arc::ptr_eq(&first, &fourth));
}

#[test]
fn test_filtered_is_subset_of_pre_filtered() {
    let table = Table::new(Options::new(people(), columns())).unwrap();
    table.set_column_filter("status", Some(FilterValue::from("active")));

    let pre = table.pre_filtered_row_model();
    let filtered = table.filtered_row_model();
    assert!(filtered.flat_rows.len() <= pre.flat_rows.len());
    assert!(filtered
        .flat_rows
        .iter()
        .all(|row| pre.rows_by_id.contains_key(row.id())));
}

#[test]
fn test_flat_rows_is_preorder_and_ids_unique() {
    let table = Table::new(Options::new(people(), columns())).unwrap();
    table.set_grouping(Updater::set(vec!["status".to_string()]));

    let grouped = table.grouped_row_model();

    fn preorder(
        rows: &[Arc<Row<serde_json::Value>>],
        out: &mut Vec<String>,
    ) {
        for row in rows {
            out.push(row.id().to_string());
            preorder(row.sub_rows(), out);
        }
    }
    let mut expected = Vec::new();
    preorder(&grouped.rows, &mut expected);

    let actual: Vec<_> = grouped
        .flat_rows
        .iter()
        .map(|row| row.id().to_string())
        .collect();
    assert_eq!(actual, expected);
    assert_eq!(grouped.rows_by_id.len(), grouped.flat_rows.len());
    for row in &grouped.flat_rows {
        assert!(grouped.rows_by_id.contains_key(row.id()));
    }
}

#[test]
fn test_select_all_then_filter_change_clears_hidden_flags() {
    let table = Table::new(Options::new(people(), columns())).unwrap();

    table.toggle_all_rows_selected(Some(true));
    assert!(table.is_all_rows_selected());
    assert_eq!(table.selected_row_ids().len(), 3);
    assert!(table.is_row_selected("0"));

    // Ada (24) falls out of visibility; her flag reads cleared.
    table.set_column_filter("age", Some(FilterValue::range(30.0, None)));
    assert!(!table.is_row_selected("0"));
    assert_eq!(table.selected_row_ids(), vec!["1".to_string(), "2".to_string()]);
    assert_eq!(table.selected_row_model().rows.len(), 2);

    // Dropping the filter restores the flag: the id was never mutated.
    table.set_column_filter("age", None);
    assert!(table.is_row_selected("0"));
}

#[test]
fn test_uncontrolled_setter_mirrors_into_internal_state() {
    let table = Table::new(Options::new(people(), columns())).unwrap();
    table.set_sorting(Updater::apply(|mut sorting: Vec<ColumnSort>| {
        sorting.push(ColumnSort::asc("name"));
        sorting
    }));
    assert_eq!(table.sorting_state(), vec![ColumnSort::asc("name")]);
    assert_eq!(table.state().sorting, vec![ColumnSort::asc("name")]);
}

#[test]
fn test_controlled_slice_emits_but_does_not_self_update() {
    let seen: Arc<Mutex<Vec<Vec<ColumnSort>>>> = Arc::new(Mutex::new(Vec::new()));
    let seen_in_callback = seen.clone();

    let mut controlled = PartialTableState::default();
    controlled.sorting = Some(vec![ColumnSort::asc("name")]);
    let table = Table::new(
        Options::new(people(), columns())
            .with_state(controlled)
            .on_sorting_change(move |sorting| {
                seen_in_callback.lock().unwrap().push(sorting.clone());
            }),
    )
    .unwrap();

    // The updater resolves against the controlled value.
    table.set_sorting(Updater::apply(|mut sorting: Vec<ColumnSort>| {
        sorting.push(ColumnSort::desc("age"));
        sorting
    }));

    let emitted = seen.lock().unwrap().clone();
    assert_eq!(
        emitted,
        vec![vec![ColumnSort::asc("name"), ColumnSort::desc("age")]]
    );
    // Until the host feeds the new value back, the effective state is
    // still the controlled one.
    assert_eq!(table.sorting_state(), vec![ColumnSort::asc("name")]);

    // Host feeds it back through set_options.
    let mut controlled = PartialTableState::default();
    controlled.sorting = Some(emitted[0].clone());
    table
        .set_options(Options::new(people(), columns()).with_state(controlled))
        .unwrap();
    assert_eq!(table.sorting_state().len(), 2);
}

#[test]
fn test_pinning_splits_header_regions() {
    let table = Table::new(Options::new(people(), columns())).unwrap();
    table.pin_column("status", Some(Pinned::Left));
    table.pin_column("name", Some(Pinned::Right));

    let headers = table.header_model();
    let region_ids = |groups: &[HeaderGroup<serde_json::Value>]| {
        groups
            .last()
            .map(|group| {
                group
                    .headers
                    .iter()
                    .map(|h| h.column.id().to_string())
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default()
    };
    assert_eq!(region_ids(&headers.left), ["status"]);
    assert_eq!(region_ids(&headers.center), ["age"]);
    assert_eq!(region_ids(&headers.right), ["name"]);
    assert_eq!(region_ids(&headers.header_groups), ["status", "age", "name"]);

    let visible: Vec<_> = table
        .visible_leaf_columns()
        .iter()
        .map(|c| c.id().to_string())
        .collect();
    assert_eq!(visible, ["status", "age", "name"]);
}

#[test]
fn test_hiding_a_column_drops_it_from_headers_and_cells() {
    let table = Table::new(Options::new(people(), columns())).unwrap();
    table.toggle_column_visibility("age");
    assert!(!table.is_column_visible("age"));

    let visible: Vec<_> = table
        .visible_leaf_columns()
        .iter()
        .map(|c| c.id().to_string())
        .collect();
    assert_eq!(visible, ["name", "status"]);

    let model = table.row_model();
    let cells = table.visible_cells(&model.rows[0]);
    assert_eq!(cells.len(), 2);
    assert_eq!(cells[0].column.id(), "name");
    assert_eq!(cells[0].render(), "Ada");
}

#[test]
fn test_faceting_helpers_reflect_pre_filtered_rows() {
    let table = Table::new(Options::new(people(), columns())).unwrap();
    table.set_column_filter("status", Some(FilterValue::from("active")));

    let uniques = table.column_unique_values("status");
    assert_eq!(uniques.len(), 2, "counts come from the unfiltered model");
    assert_eq!(
        table.column_min_max("age"),
        Some((CellValue::Int(24), CellValue::Int(45)))
    );
}

#[test]
fn test_toggle_sorting_cycles() {
    let table = Table::new(Options::new(people(), columns())).unwrap();

    table.toggle_column_sorting("age", None, false);
    assert_eq!(table.column_sort_direction("age"), Some(false));
    table.toggle_column_sorting("age", None, false);
    assert_eq!(table.column_sort_direction("age"), Some(true));
    table.toggle_column_sorting("age", None, false);
    assert_eq!(table.column_sort_direction("age"), None);

    // Multi-sort appends instead of replacing.
    table.toggle_column_sorting("name", None, false);
    table.toggle_column_sorting("age", None, true);
    assert_eq!(table.column_sort_index("name"), Some(0));
    assert_eq!(table.column_sort_index("age"), Some(1));
}

#[test]
fn test_global_and_column_filters_combine_with_and() {
    let table = Table::new(Options::new(people(), columns())).unwrap();
    table.set_column_filter("status", Some(FilterValue::from("active")));
    table.set_global_filter(Updater::set(Some(FilterValue::from("eds"))));

    let filtered = table.filtered_row_model();
    assert_eq!(filtered.rows.len(), 1);
    assert_eq!(
        filtered.rows[0].value("name", &table.column_model()),
        CellValue::from("Edsger")
    );
}

#[test]
fn test_grouped_sum_with_pagination() {
    let data = vec![
        json!({ "status": "a", "n": 1 }),
        json!({ "status": "b", "n": 2 }),
        json!({ "status": "a", "n": 3 }),
        json!({ "status": "c", "n": 4 }),
    ];
    let mut state = TableState::default();
    state.pagination.page_size = 2;
    let table = Table::new(
        Options::new(
            data,
            vec![
                ColumnDef::accessor("status"),
                ColumnDef::accessor("n").aggregation_fn(AggregationFn::Sum),
            ],
        )
        .with_initial_state(state),
    )
    .unwrap();
    table.set_grouping(Updater::set(vec!["status".to_string()]));

    // Three collapsed groups paginate two to a page.
    assert_eq!(table.page_count(), 2);
    let page = table.row_model();
    assert_eq!(page.rows.len(), 2);
    assert!(page.rows.iter().all(|row| row.is_grouped()));
    assert_eq!(
        page.rows[0].value("n", &table.column_model()),
        CellValue::Int(4)
    );
}
