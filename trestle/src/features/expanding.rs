//! Row expansion.

use std::collections::HashSet;

use serde::Deserialize;
use serde::Serialize;

use crate::model::RowData;
use crate::state::Updater;
use crate::table::Table;

/// Which rows are expanded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpandedState {
    /// Every expandable row is expanded.
    All,
    /// Exactly the listed row ids are expanded.
    Rows(HashSet<String>),
}

impl ExpandedState {
    /// Returns `true` when the given row id is expanded.
    pub fn is_expanded(&self, row_id: &str) -> bool {
        match self {
            ExpandedState::All => true,
            ExpandedState::Rows(ids) => ids.contains(row_id),
        }
    }
}

impl Default for ExpandedState {
    fn default() -> Self {
        ExpandedState::Rows(HashSet::new())
    }
}

impl<T: RowData> Table<T> {
    /// Effective expansion slice.
    pub fn expanded_state(&self) -> ExpandedState {
        let options = self.options();
        if let Some(controlled) = &options.state.expanded {
            return controlled.clone();
        }
        self.internal_state().expanded
    }

    /// Proposes a new expansion slice through the update protocol.
    pub fn set_expanded(&self, updater: Updater<ExpandedState>) {
        let options = self.options();
        let new = updater.resolve(self.expanded_state());
        if let Some(on_change) = &options.on_expanded_change {
            on_change(&new);
        }
        if options.state.expanded.is_none() {
            self.write_internal_state(|state| state.expanded = new);
        }
    }

    /// Returns `true` when the given row id is currently expanded.
    ///
    /// Ids that no longer resolve to a row are tolerated; they simply
    /// stop mattering to the expansion stage.
    pub fn is_row_expanded(&self, row_id: &str) -> bool {
        self.options().enable_expanding && self.expanded_state().is_expanded(row_id)
    }

    /// Expands or collapses one row. `expanded: None` toggles.
    pub fn toggle_row_expanded(&self, row_id: &str, expanded: Option<bool>) {
        if !self.options().enable_expanding {
            return;
        }
        let target = expanded.unwrap_or(!self.expanded_state().is_expanded(row_id));
        // Leaving expand-all needs the concrete id set it stood for.
        let all_ids: Vec<String> = self
            .pre_expanded_row_model()
            .flat_rows
            .iter()
            .filter(|row| row.can_expand())
            .map(|row| row.id().to_string())
            .collect();
        let id = row_id.to_string();
        self.set_expanded(Updater::apply(move |state: ExpandedState| {
            let mut ids = match state {
                ExpandedState::All => all_ids.into_iter().collect::<HashSet<_>>(),
                ExpandedState::Rows(ids) => ids,
            };
            if target {
                ids.insert(id);
            } else {
                ids.remove(&id);
            }
            ExpandedState::Rows(ids)
        }));
    }

    /// Returns `true` when every expandable row is expanded.
    pub fn is_all_rows_expanded(&self) -> bool {
        match self.expanded_state() {
            ExpandedState::All => true,
            ExpandedState::Rows(ids) => self
                .pre_expanded_row_model()
                .flat_rows
                .iter()
                .filter(|row| row.can_expand())
                .all(|row| ids.contains(row.id())),
        }
    }

    /// Expands everything, or collapses everything if already fully
    /// expanded.
    pub fn toggle_all_rows_expanded(&self) {
        if self.is_all_rows_expanded() {
            self.set_expanded(Updater::set(ExpandedState::default()));
        } else {
            self.set_expanded(Updater::set(ExpandedState::All));
        }
    }

    /// How many levels deep the current expansion reaches.
    pub fn expanded_depth(&self) -> usize {
        let model = self.pre_expanded_row_model();
        match self.expanded_state() {
            ExpandedState::All => model
                .flat_rows
                .iter()
                .map(|row| row.depth())
                .max()
                .unwrap_or(0),
            ExpandedState::Rows(ids) => ids
                .iter()
                .filter_map(|id| model.row(id))
                .map(|row| row.depth() + 1)
                .max()
                .unwrap_or(0),
        }
    }
}
