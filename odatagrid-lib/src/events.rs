//! Grid events and the declarative control-binding table.

use std::collections::HashMap;

use crate::query::FilterInput;
use crate::query::SortInput;

/// A discrete user or host action handled by the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridEvent {
    /// Initial page load: read the address bar and fetch.
    Load,
    /// Sort dialog submitted.
    ApplySort(Vec<SortInput>),
    /// Sort dialog reset.
    ResetSort,
    /// Filter dialog submitted.
    ApplyFilter(Vec<FilterInput>),
    /// Filter dialog reset.
    ResetFilter,
    /// Clears sort, filter and page.
    ResetAll,
    /// Page navigation.
    GoToPage(u32),
    /// Back/forward navigation changed the address bar.
    HistoryChanged,
}

impl GridEvent {
    /// Returns `true` for events that change sort or filter criteria.
    pub fn changes_criteria(&self) -> bool {
        matches!(
            self,
            GridEvent::ApplySort(_)
                | GridEvent::ResetSort
                | GridEvent::ApplyFilter(_)
                | GridEvent::ResetFilter
                | GridEvent::ResetAll
        )
    }
}

/// Maps rendered control ids to the event they fire.
///
/// Built once per rendered control set and swapped wholesale, so a control is
/// never bound twice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventBindings {
    bindings: HashMap<String, GridEvent>,
}

impl EventBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a control, replacing any previous binding for the same id.
    pub fn bind(&mut self, control: impl Into<String>, event: GridEvent) {
        self.bindings.insert(control.into(), event);
    }

    pub fn unbind(&mut self, control: &str) -> Option<GridEvent> {
        self.bindings.remove(control)
    }

    /// Resolves the event fired by a control.
    pub fn resolve(&self, control: &str) -> Option<&GridEvent> {
        self.bindings.get(control)
    }

    pub fn contains(&self, control: &str) -> bool {
        self.bindings.contains_key(control)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl FromIterator<(String, GridEvent)> for EventBindings {
    fn from_iter<I: IntoIterator<Item = (String, GridEvent)>>(iter: I) -> Self {
        Self {
            bindings: iter.into_iter().collect(),
        }
    }
}
