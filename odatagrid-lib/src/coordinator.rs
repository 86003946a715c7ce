//! Grid coordinator.
//!
//! Translates [`GridEvent`]s into query-state changes, address-bar writes and
//! page fetches, and applies completed fetches to the table and pagination.
//!
//! Loading is split in two so that several loads can overlap:
//!
//! ```ignore
//! let first = grid.begin(GridEvent::GoToPage(2));
//! let second = grid.begin(GridEvent::GoToPage(3)); // supersedes `first`
//!
//! let late = first.wait().await;
//! assert_eq!(grid.finish(late), LoadStatus::Superseded);
//! grid.finish(second.wait().await);
//! ```

use std::fmt;
use std::sync::Arc;

use crate::config::GridConfig;
use crate::error::FetchError;
use crate::error::TableError;
use crate::events::GridEvent;
use crate::location::AddressBar;
use crate::markup;
use crate::modal::ModalPanel;
use crate::model::PageResult;
use crate::pagination::PaginationController;
use crate::pagination::PaginationView;
use crate::pagination::total_pages;
use crate::query::FilterCriteria;
use crate::query::QueryState;
use crate::query::SortCriteria;
use crate::query::url::read_from_search;
use crate::query::url::write_to_search;
use crate::request::PendingFetch;
use crate::request::ReqwestTransport;
use crate::request::RequestController;
use crate::request::Transport;
use crate::table::ColumnSpec;
use crate::table::TableModel;

/// Reloads attempted by [`Coordinator::dispatch`] when the total shrinks
/// under the requested page.
const MAX_RELOADS: usize = 2;

/// Non-blocking notice shown after a failed load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    /// HTTP status, when the failure was a status error.
    pub status: Option<u16>,
}

impl Notice {
    fn from_error(err: &FetchError) -> Self {
        Self {
            message: format!("Could not load data: {}", err),
            status: err.status_code(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// What [`Coordinator::finish`] did with a completed load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    /// The page was rendered.
    Applied,
    /// A newer load had started; nothing changed.
    Superseded,
    /// The load failed; the previous table is still shown.
    Failed,
    /// The requested page is past the last page. The state and address bar
    /// now point at the last page, which [`Coordinator::reload`] fetches.
    OutOfRange,
}

/// A load started by [`Coordinator::begin`].
#[derive(Debug)]
pub struct PendingLoad {
    state: QueryState,
    fetch: PendingFetch,
}

impl PendingLoad {
    pub fn generation(&self) -> u64 {
        self.fetch.generation()
    }

    /// The query state this load was issued for.
    pub fn state(&self) -> &QueryState {
        &self.state
    }

    /// Waits for the fetch to complete.
    pub async fn wait(self) -> LoadOutcome {
        let generation = self.fetch.generation();
        let result = self.fetch.await;
        LoadOutcome {
            generation,
            state: self.state,
            result,
        }
    }
}

/// A completed fetch, ready to be applied.
#[derive(Debug)]
pub struct LoadOutcome {
    generation: u64,
    state: QueryState,
    result: Result<PageResult, FetchError>,
}

impl LoadOutcome {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn result(&self) -> &Result<PageResult, FetchError> {
        &self.result
    }
}

/// Owns the grid components and keeps them consistent with the address bar.
pub struct Coordinator<A: AddressBar> {
    config: GridConfig,
    address_bar: A,
    requests: RequestController,
    table: TableModel,
    pagination: PaginationController,
    state: QueryState,
    notice: Option<Notice>,
}

impl<A: AddressBar> Coordinator<A> {
    /// Creates a coordinator fetching over HTTP.
    pub fn new(config: GridConfig, columns: Vec<ColumnSpec>, address_bar: A) -> Result<Self, TableError> {
        let mut transport = ReqwestTransport::new();
        if let Some(timeout) = config.timeout {
            transport = transport.timeout(timeout);
        }
        Self::with_transport(config, columns, address_bar, Arc::new(transport))
    }

    /// Creates a coordinator around a custom transport.
    pub fn with_transport(
        config: GridConfig,
        columns: Vec<ColumnSpec>,
        address_bar: A,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, TableError> {
        let table = TableModel::new(columns)?;
        let requests = RequestController::with_shared_transport(transport, config.base_url.clone());
        let state = QueryState::new(config.page_size);

        Ok(Self {
            config,
            address_bar,
            requests,
            table,
            pagination: PaginationController::new(),
            state,
            notice: None,
        })
    }

    /// Applies an event to the query state and address bar, then starts the
    /// fetch for the new state. Any load still in flight is superseded.
    pub fn begin(&mut self, event: GridEvent) -> PendingLoad {
        let page_size = self.config.page_size;
        let criteria_changed = event.changes_criteria();

        match event {
            GridEvent::Load => {
                let search = self.address_bar.search();
                self.state = read_from_search(&search, page_size);
                let normalized = write_to_search(&search, &self.state);
                if normalized != search {
                    self.address_bar.replace(&normalized);
                }
            }
            GridEvent::HistoryChanged => {
                self.state = read_from_search(&self.address_bar.search(), page_size);
            }
            GridEvent::ApplySort(inputs) => {
                let sort = SortCriteria::from_inputs(&inputs);
                self.state = self.state.clone().with_sort(sort);
            }
            GridEvent::ResetSort => {
                self.state = self.state.clone().with_sort(SortCriteria::new());
            }
            GridEvent::ApplyFilter(inputs) => {
                let filter = FilterCriteria::from_inputs(&inputs);
                self.state = self.state.clone().with_filter(filter);
            }
            GridEvent::ResetFilter => {
                self.state = self.state.clone().with_filter(FilterCriteria::new());
            }
            GridEvent::ResetAll => {
                self.state = QueryState::new(page_size);
            }
            GridEvent::GoToPage(page) => {
                self.state = self.state.clone().with_page(page);
                let search = write_to_search(&self.address_bar.search(), &self.state);
                self.address_bar.push(&search);
            }
        }

        if criteria_changed {
            self.state = self.state.clone().with_page(1);
            let search = write_to_search(&self.address_bar.search(), &self.state);
            self.address_bar.replace(&search);
            log::info!(
                "Criteria changed: {} sort, {} filter",
                self.sort_count(),
                self.filter_count()
            );
        }

        self.reload()
    }

    /// Applies a completed load if it is still the current one.
    pub fn finish(&mut self, outcome: LoadOutcome) -> LoadStatus {
        if outcome.generation != self.requests.current_generation() {
            log::debug!("Dropping stale load {}", outcome.generation);
            return LoadStatus::Superseded;
        }

        match outcome.result {
            Ok(page) => {
                let total = page.effective_total();
                let current = outcome.state.page();
                let last = total_pages(total, outcome.state.page_size());
                if current > last {
                    log::info!("Page {} is past the last page, moving to {}", current, last);
                    self.state = outcome.state.with_page(last);
                    let search = write_to_search(&self.address_bar.search(), &self.state);
                    self.address_bar.replace(&search);
                    return LoadStatus::OutOfRange;
                }
                self.table.set_data(page.into_records(), current);
                self.pagination.render(total, outcome.state.page_size(), current);
                self.notice = None;
                log::info!("Loaded page {} ({} records total)", current, total);
                LoadStatus::Applied
            }
            Err(FetchError::Cancelled) => LoadStatus::Superseded,
            Err(err) => {
                log::error!("Load failed: {}", err);
                self.notice = Some(Notice::from_error(&err));
                LoadStatus::Failed
            }
        }
    }

    /// Fetches the current state again without touching the address bar.
    pub fn reload(&mut self) -> PendingLoad {
        PendingLoad {
            state: self.state.clone(),
            fetch: self.requests.fetch_page(&self.state),
        }
    }

    /// Runs an event to completion, following an out-of-range page to the
    /// last page.
    pub async fn dispatch(&mut self, event: GridEvent) -> LoadStatus {
        let outcome = self.begin(event).wait().await;
        let mut status = self.finish(outcome);
        for _ in 0..MAX_RELOADS {
            if status != LoadStatus::OutOfRange {
                break;
            }
            let outcome = self.reload().wait().await;
            status = self.finish(outcome);
        }
        status
    }

    /// Starts a page load for a clicked pagination control.
    ///
    /// Returns `None` for disabled or unknown controls.
    pub fn click(&mut self, control_id: &str) -> Option<PendingLoad> {
        let page = self.pagination.click(control_id)?;
        Some(self.begin(GridEvent::GoToPage(page)))
    }

    /// Cancels the load in flight, if any.
    pub fn cancel(&self) {
        self.requests.cancel();
    }

    pub fn state(&self) -> &QueryState {
        &self.state
    }

    pub fn table(&self) -> &TableModel {
        &self.table
    }

    pub fn pagination(&self) -> &PaginationView {
        self.pagination.view()
    }

    pub fn pagination_controller(&self) -> &PaginationController {
        &self.pagination
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn address_bar(&self) -> &A {
        &self.address_bar
    }

    /// Gives the host access to the address bar, e.g. for back/forward.
    /// Follow history changes with [`GridEvent::HistoryChanged`].
    pub fn address_bar_mut(&mut self) -> &mut A {
        &mut self.address_bar
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Number of applied sort criteria.
    pub fn sort_count(&self) -> usize {
        self.state.sort().len()
    }

    /// Number of applied filter criteria.
    pub fn filter_count(&self) -> usize {
        self.state.filter().len()
    }

    /// Sort dialog pre-filled with the applied criteria.
    pub fn sort_dialog(&self) -> ModalPanel {
        markup::sort_dialog(&self.table.sortable_columns(), self.state.sort())
    }

    /// Filter dialog pre-filled with the applied criteria.
    pub fn filter_dialog(&self) -> ModalPanel {
        markup::filter_dialog(&self.table.filterable_columns(), self.state.filter())
    }

    /// Table markup for the last applied page.
    /// Sort and Filter buttons with badges for the applied criteria.
    pub fn toolbar_html(&self) -> String {
        markup::toolbar_html(self.sort_count(), self.filter_count())
    }

    pub fn table_html(&self) -> String {
        markup::table_html(&self.table.render())
    }

    pub fn pagination_html(&self) -> String {
        markup::pagination_html(self.pagination.view())
    }
}

impl<A: AddressBar + fmt::Debug> fmt::Debug for Coordinator<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Coordinator")
            .field("config", &self.config)
            .field("address_bar", &self.address_bar)
            .field("state", &self.state)
            .field("notice", &self.notice)
            .finish_non_exhaustive()
    }
}
