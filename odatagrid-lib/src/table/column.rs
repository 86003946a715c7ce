//! Column definitions.

use std::fmt;
use std::sync::Arc;

use crate::model::Record;

/// Horizontal alignment of a column's header and cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

impl Alignment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
        }
    }
}

/// Declared type of a column's values. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataType {
    #[default]
    String,
    Number,
    Date,
}

/// Produces markup for a cell from the whole record.
pub type CellRenderer = Arc<dyn Fn(&Record) -> String + Send + Sync>;

/// Definition of one table column.
///
/// # Example
///
/// ```
/// use odatagrid_lib::table::{Alignment, ColumnSpec};
///
/// let columns = vec![
///     ColumnSpec::new("UserName", "UserName"),
///     ColumnSpec::new("Age", "Age").align(Alignment::Right).width(60),
///     ColumnSpec::new("Emails", "Emails")
///         .not_sortable()
///         .renderer(|record| format!("<p>{}</p>", record.display("Emails"))),
/// ];
/// ```
#[derive(Clone)]
pub struct ColumnSpec {
    pub(crate) key: String,
    pub(crate) label: String,
    pub(crate) width: u16,
    pub(crate) align: Alignment,
    pub(crate) hidden: bool,
    pub(crate) sortable: bool,
    pub(crate) filterable: bool,
    pub(crate) data_type: DataType,
    pub(crate) renderer: Option<CellRenderer>,
}

impl ColumnSpec {
    /// Creates a visible, sortable, filterable column.
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            width: 100,
            align: Alignment::Left,
            hidden: false,
            sortable: true,
            filterable: true,
            data_type: DataType::String,
            renderer: None,
        }
    }

    /// Sets the column width in pixels.
    pub fn width(mut self, width: u16) -> Self {
        self.width = width;
        self
    }

    pub fn align(mut self, align: Alignment) -> Self {
        self.align = align;
        self
    }

    pub fn data_type(mut self, data_type: DataType) -> Self {
        self.data_type = data_type;
        self
    }

    /// Hides the column from rendering and from the sort/filter dialogs.
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn not_sortable(mut self) -> Self {
        self.sortable = false;
        self
    }

    pub fn not_filterable(mut self) -> Self {
        self.filterable = false;
        self
    }

    /// Sets a custom renderer. Its output is used verbatim as cell markup.
    pub fn renderer<F>(mut self, render: F) -> Self
    where
        F: Fn(&Record) -> String + Send + Sync + 'static,
    {
        self.renderer = Some(Arc::new(render));
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn column_width(&self) -> u16 {
        self.width
    }

    pub fn alignment(&self) -> Alignment {
        self.align
    }

    pub fn declared_type(&self) -> DataType {
        self.data_type
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Returns `true` if the column appears in the sort dialog.
    pub fn is_sortable(&self) -> bool {
        self.sortable && !self.hidden
    }

    /// Returns `true` if the column appears in the filter dialog.
    pub fn is_filterable(&self) -> bool {
        self.filterable && !self.hidden
    }

    pub fn has_renderer(&self) -> bool {
        self.renderer.is_some()
    }
}

impl fmt::Debug for ColumnSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnSpec")
            .field("key", &self.key)
            .field("label", &self.label)
            .field("width", &self.width)
            .field("align", &self.align)
            .field("hidden", &self.hidden)
            .field("sortable", &self.sortable)
            .field("filterable", &self.filterable)
            .field("renderer", &self.renderer.is_some())
            .finish()
    }
}
