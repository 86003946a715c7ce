//! Pagination controls.
//!
//! [`PaginationController::render`] turns `(total_count, page_size,
//! current_page)` into a [`PaginationView`]. Clicks are resolved through an
//! [`EventBindings`] table that is rebuilt only when the control set changes.
//!
//! Only a window of page numbers is rendered: the first and last page and
//! [`PAGE_WINDOW`] pages either side of the current one. Skipped runs are
//! marked with a [`ControlKind::Gap`].

use crate::events::EventBindings;
use crate::events::GridEvent;

/// Control id of the Previous button.
pub const PREVIOUS_ID: &str = "page-prev";
/// Control id of the Next button.
pub const NEXT_ID: &str = "page-next";

/// Page numbers shown on each side of the current page.
pub const PAGE_WINDOW: u32 = 2;

/// Returns the control id of a page-number button.
pub fn page_control_id(page: u32) -> String {
    format!("page-{}", page)
}

/// Number of pages needed for `total_count` records. Never less than one.
pub fn total_pages(total_count: u64, page_size: u32) -> u32 {
    let size = u64::from(page_size.max(1));
    let pages = total_count.div_ceil(size).max(1);
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// Kind of a pagination control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    Previous,
    Page(u32),
    /// Placeholder for skipped page numbers. Never clickable.
    Gap,
    Next,
}

/// One rendered pagination control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageControl {
    pub id: String,
    pub kind: ControlKind,
    pub label: String,
    /// Page requested when the control is clicked.
    pub target_page: u32,
    pub disabled: bool,
    /// Marks the control for the current page.
    pub active: bool,
}

/// Render-ready pagination.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaginationView {
    pub controls: Vec<PageControl>,
    pub current_page: u32,
    pub total_pages: u32,
}

impl PaginationView {
    /// Builds the view. `current_page` is clamped into `1..=total_pages`.
    pub fn build(total_count: u64, page_size: u32, current_page: u32) -> Self {
        let total = total_pages(total_count, page_size);
        let current = current_page.clamp(1, total);

        let mut controls = vec![PageControl {
            id: PREVIOUS_ID.to_string(),
            kind: ControlKind::Previous,
            label: "Previous".to_string(),
            target_page: current.saturating_sub(1).max(1),
            disabled: current == 1,
            active: false,
        }];

        let mut last_shown = 0;
        for page in visible_pages(current, total) {
            if page > last_shown + 1 {
                controls.push(PageControl {
                    id: format!("page-gap-{}", last_shown),
                    kind: ControlKind::Gap,
                    label: "...".to_string(),
                    target_page: current,
                    disabled: true,
                    active: false,
                });
            }
            controls.push(PageControl {
                id: page_control_id(page),
                kind: ControlKind::Page(page),
                label: page.to_string(),
                target_page: page,
                disabled: page == current,
                active: page == current,
            });
            last_shown = page;
        }

        controls.push(PageControl {
            id: NEXT_ID.to_string(),
            kind: ControlKind::Next,
            label: "Next".to_string(),
            target_page: current.saturating_add(1).min(total),
            disabled: current >= total,
            active: false,
        });

        Self {
            controls,
            current_page: current,
            total_pages: total,
        }
    }

    /// "Page X of Y".
    pub fn caption(&self) -> String {
        format!("Page {} of {}", self.current_page, self.total_pages)
    }

    pub fn control(&self, id: &str) -> Option<&PageControl> {
        self.controls.iter().find(|c| c.id == id)
    }

    pub fn previous(&self) -> Option<&PageControl> {
        self.controls.first()
    }

    pub fn next(&self) -> Option<&PageControl> {
        self.controls.last()
    }

    /// Page-number controls only.
    pub fn pages(&self) -> impl Iterator<Item = &PageControl> {
        self.controls
            .iter()
            .filter(|c| matches!(c.kind, ControlKind::Page(_)))
    }

    fn bindings(&self) -> EventBindings {
        self.controls
            .iter()
            .filter(|c| !c.disabled)
            .map(|c| (c.id.clone(), GridEvent::GoToPage(c.target_page)))
            .collect()
    }
}

/// Page numbers rendered for `current` out of `total`, ascending.
fn visible_pages(current: u32, total: u32) -> impl Iterator<Item = u32> {
    let low = current.saturating_sub(PAGE_WINDOW).max(1);
    let high = current.saturating_add(PAGE_WINDOW).min(total);
    let head = (low > 1).then_some(1);
    let tail = (high < total).then_some(total);
    head.into_iter().chain(low..=high).chain(tail)
}

/// Renders pagination and dispatches page clicks.
#[derive(Debug, Default)]
pub struct PaginationController {
    view: PaginationView,
    bindings: EventBindings,
    rebinds: usize,
}

impl PaginationController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Renders the controls for the given counts.
    pub fn render(&mut self, total_count: u64, page_size: u32, current_page: u32) -> &PaginationView {
        let view = PaginationView::build(total_count, page_size, current_page);
        if view != self.view {
            self.bindings = view.bindings();
            self.rebinds += 1;
            log::debug!("Pagination rebound: {}", view.caption());
        }
        self.view = view;
        &self.view
    }

    pub fn view(&self) -> &PaginationView {
        &self.view
    }

    /// Resolves a control click to the page it requests.
    ///
    /// Disabled controls (including the current page) resolve to `None`.
    pub fn click(&self, control_id: &str) -> Option<u32> {
        match self.bindings.resolve(control_id) {
            Some(GridEvent::GoToPage(page)) => Some(*page),
            _ => None,
        }
    }

    /// Number of times the binding table has been rebuilt.
    pub fn rebind_count(&self) -> usize {
        self.rebinds
    }
}
