//! Query state and its encodings.
//!
//! [`QueryState`] is the single source of truth for what the grid shows. This
//! module maps it to the remote service's expression syntax and to the
//! address-bar parameters, in both directions.
//!
//! - [`SortCriteria`] - ordered `$orderby` criteria
//! - [`FilterCriteria`] - `and`-combined `$filter` criteria
//! - [`odata`] - expression encoding / decoding
//! - [`url`] - address-bar parameter reading / writing

mod filter;
pub mod odata;
mod sort;
pub mod url;

pub use filter::FilterCriteria;
pub use filter::FilterCriterion;
pub use filter::FilterInput;
pub use filter::FilterOperator;
pub use sort::Direction;
pub use sort::SortCriteria;
pub use sort::SortCriterion;
pub use sort::SortInput;

/// The full set of user-chosen sort, filter and paging parameters.
///
/// `page` and `page_size` are always at least 1.
///
/// # Example
///
/// ```
/// use odatagrid_lib::query::{QueryState, SortCriteria};
///
/// let state = QueryState::new(5)
///     .with_sort(SortCriteria::desc("LastName"))
///     .with_page(2);
/// assert_eq!(state.skip(), 5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryState {
    sort: SortCriteria,
    filter: FilterCriteria,
    page: u32,
    page_size: u32,
}

impl QueryState {
    /// Creates a state on page 1 with no criteria.
    pub fn new(page_size: u32) -> Self {
        Self {
            sort: SortCriteria::new(),
            filter: FilterCriteria::new(),
            page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn with_sort(mut self, sort: SortCriteria) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_filter(mut self, filter: FilterCriteria) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    pub fn sort(&self) -> &SortCriteria {
        &self.sort
    }

    pub fn filter(&self) -> &FilterCriteria {
        &self.filter
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Number of records to skip for the current page.
    pub fn skip(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.page_size)
    }

    /// Number of records to request for the current page.
    pub fn top(&self) -> u32 {
        self.page_size
    }
}

/// Returns `true` if `field` is a usable OData property path.
///
/// Field names end up unquoted in expressions, so only identifier characters
/// and path separators are allowed.
pub(crate) fn is_valid_field(field: &str) -> bool {
    !field.is_empty()
        && field
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '/' || c == '.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_is_clamped() {
        let state = QueryState::new(0).with_page(0);
        assert_eq!(state.page(), 1);
        assert_eq!(state.page_size(), 1);
        assert_eq!(state.skip(), 0);
    }

    #[test]
    fn test_valid_field() {
        assert!(is_valid_field("LastName"));
        assert!(is_valid_field("AddressInfo/City"));
        assert!(!is_valid_field("Name) or (1 eq 1"));
        assert!(!is_valid_field(""));
    }
}
