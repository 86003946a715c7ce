//! Grid configuration

use std::time::Duration;

use crate::markup::escape_html;
use crate::model::Value;
use crate::table::Alignment;
use crate::table::ColumnSpec;
use crate::table::DataType;

/// Default OData entity set queried by the grid.
pub const DEFAULT_BASE_URL: &str = "https://services.odata.org/v4/TripPinServiceRW/People";

/// Default number of records per page.
pub const DEFAULT_PAGE_SIZE: u32 = 5;

/// Configuration for a grid coordinator.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use odatagrid_lib::GridConfig;
///
/// let config = GridConfig::default()
///     .with_page_size(10)
///     .with_timeout(Duration::from_secs(30));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridConfig {
    /// Entity set URL, without query string.
    ///
    /// Default: TripPin `People`
    pub base_url: String,

    /// Records per page. Values below 1 are treated as 1.
    ///
    /// Default: 5
    pub page_size: u32,

    /// Per-request timeout. `None` leaves it to the HTTP client.
    pub timeout: Option<Duration>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            timeout: None,
        }
    }
}

impl GridConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the entity set URL. A trailing `?` or `/` is dropped.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.base_url = url.trim_end_matches(['?', '/']).to_string();
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Column set for the TripPin `People` entity set.
pub fn people_columns() -> Vec<ColumnSpec> {
    vec![
        ColumnSpec::new("UserName", "UserName"),
        ColumnSpec::new("FirstName", "First Name"),
        ColumnSpec::new("LastName", "Last Name"),
        ColumnSpec::new("MiddleName", "MiddleName"),
        ColumnSpec::new("Gender", "Gender"),
        ColumnSpec::new("Age", "Age")
            .data_type(DataType::Number)
            .align(Alignment::Right),
        ColumnSpec::new("Emails", "Emails")
            .not_sortable()
            .renderer(|record| match record.get("Emails") {
                Some(Value::List(emails)) => emails
                    .iter()
                    .map(|email| format!("<p>{}</p>", escape_html(&email.to_display())))
                    .collect(),
                _ => String::new(),
            }),
    ]
}
