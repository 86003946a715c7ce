//! Table model: columns, the current page of records and render-ready rows.
//!
//! The model never fetches anything. It is handed records by the
//! coordinator and turns them into a [`RenderedTable`] whose rows are aligned
//! with the visible columns.

mod column;
mod sort;

pub use column::Alignment;
pub use column::CellRenderer;
pub use column::ColumnSpec;
pub use column::DataType;
pub use sort::compare_values;
pub use sort::sort_records;

use std::collections::HashSet;

use crate::error::TableError;
use crate::model::Record;
use crate::query::Direction;

/// Header cell of a rendered table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCell {
    pub key: String,
    pub label: String,
    pub width: u16,
    pub align: Alignment,
}

/// Content of a rendered cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellContent {
    /// Plain text; must be escaped by markup renderers.
    Text(String),
    /// Trusted markup produced by a column renderer.
    Markup(String),
}

impl CellContent {
    /// Returns the raw string regardless of kind.
    pub fn as_str(&self) -> &str {
        match self {
            CellContent::Text(s) | CellContent::Markup(s) => s,
        }
    }
}

/// A rendered cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub content: CellContent,
    pub align: Alignment,
}

/// Render-ready table: headers and rows aligned to the visible columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedTable {
    pub headers: Vec<HeaderCell>,
    pub rows: Vec<Vec<Cell>>,
}

/// Holds column definitions and the records of the current page.
#[derive(Debug, Clone)]
pub struct TableModel {
    columns: Vec<ColumnSpec>,
    records: Vec<Record>,
    current_page: u32,
    sort: Option<(String, Direction)>,
}

impl TableModel {
    /// Creates a table. Column keys must be non-empty and unique.
    pub fn new(columns: Vec<ColumnSpec>) -> Result<Self, TableError> {
        let mut seen = HashSet::new();
        for column in &columns {
            if column.key.is_empty() {
                return Err(TableError::EmptyKey);
            }
            if !seen.insert(column.key.as_str()) {
                return Err(TableError::duplicate(&column.key));
            }
        }

        Ok(Self {
            columns,
            records: Vec::new(),
            current_page: 1,
            sort: None,
        })
    }

    /// Returns all columns, hidden ones included.
    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    /// Returns the columns that are rendered.
    pub fn visible_columns(&self) -> impl Iterator<Item = &ColumnSpec> {
        self.columns.iter().filter(|c| !c.hidden)
    }

    /// Returns the columns offered by the sort dialog.
    pub fn sortable_columns(&self) -> Vec<&ColumnSpec> {
        self.columns.iter().filter(|c| c.is_sortable()).collect()
    }

    /// Returns the columns offered by the filter dialog.
    pub fn filterable_columns(&self) -> Vec<&ColumnSpec> {
        self.columns.iter().filter(|c| c.is_filterable()).collect()
    }

    /// Replaces the current records and page number.
    pub fn set_data(&mut self, records: Vec<Record>, page: u32) {
        self.records = records;
        self.current_page = page.max(1);
        self.sort = None;
    }

    /// Re-orders the current records in place (client-side sort).
    pub fn set_sort(&mut self, field: impl Into<String>, direction: Direction) {
        let field = field.into();
        sort_records(&mut self.records, &field, direction);
        self.sort = Some((field, direction));
    }

    /// Returns the active client-side sort, if any.
    pub fn sort_state(&self) -> Option<(&str, Direction)> {
        self.sort.as_ref().map(|(field, dir)| (field.as_str(), *dir))
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    /// Resolves the cell content for one record and column.
    pub fn cell(&self, record: &Record, column: &ColumnSpec) -> CellContent {
        match &column.renderer {
            Some(render) => CellContent::Markup(render(record)),
            None => CellContent::Text(record.display(&column.key)),
        }
    }

    /// Produces the render-ready table.
    pub fn render(&self) -> RenderedTable {
        let headers = self
            .visible_columns()
            .map(|c| HeaderCell {
                key: c.key.clone(),
                label: c.label.clone(),
                width: c.width,
                align: c.align,
            })
            .collect();

        let rows = self
            .records
            .iter()
            .map(|record| {
                self.visible_columns()
                    .map(|column| Cell {
                        content: self.cell(record, column),
                        align: column.align,
                    })
                    .collect()
            })
            .collect();

        RenderedTable { headers, rows }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn people_columns() -> Vec<ColumnSpec> {
        vec![
            ColumnSpec::new("UserName", "UserName"),
            ColumnSpec::new("FirstName", "First Name"),
            ColumnSpec::new("Secret", "Secret").hidden(),
            ColumnSpec::new("Age", "Age").align(Alignment::Right).not_filterable(),
            ColumnSpec::new("Emails", "Emails").not_sortable().renderer(|record| {
                match record.get("Emails") {
                    Some(crate::model::Value::List(items)) => items
                        .iter()
                        .map(|e| format!("<p>{}</p>", e))
                        .collect(),
                    _ => String::new(),
                }
            }),
        ]
    }

    #[test]
    fn test_rejects_duplicate_keys() {
        let err = TableModel::new(vec![ColumnSpec::new("A", "a"), ColumnSpec::new("A", "b")]).unwrap_err();
        assert_eq!(err, TableError::duplicate("A"));
        assert_eq!(TableModel::new(vec![ColumnSpec::new("", "x")]).unwrap_err(), TableError::EmptyKey);
    }

    #[test]
    fn test_render_skips_hidden_columns() {
        let mut table = TableModel::new(people_columns()).unwrap();
        table.set_data(
            vec![
                Record::new()
                    .set("UserName", "russellwhyte")
                    .set("FirstName", "Russell")
                    .set("Secret", "x")
                    .set("Emails", vec!["a@x.com".to_string(), "b@x.com".to_string()]),
            ],
            2,
        );

        let rendered = table.render();
        let labels: Vec<_> = rendered.headers.iter().map(|h| h.label.as_str()).collect();
        assert_eq!(labels, ["UserName", "First Name", "Age", "Emails"]);
        assert_eq!(table.current_page(), 2);

        let row = &rendered.rows[0];
        assert_eq!(row.len(), 4);
        assert_eq!(row[0].content, CellContent::Text("russellwhyte".into()));
        assert_eq!(row[2].content, CellContent::Text(String::new()));
        assert_eq!(row[2].align, Alignment::Right);
        assert_eq!(row[3].content, CellContent::Markup("<p>a@x.com</p><p>b@x.com</p>".into()));
    }

    #[test]
    fn test_dialog_column_lists() {
        let table = TableModel::new(people_columns()).unwrap();
        let sortable: Vec<_> = table.sortable_columns().iter().map(|c| c.key()).collect();
        let filterable: Vec<_> = table.filterable_columns().iter().map(|c| c.key()).collect();
        assert_eq!(sortable, ["UserName", "FirstName", "Age"]);
        assert_eq!(filterable, ["UserName", "FirstName", "Emails"]);
    }

    #[test]
    fn test_set_sort_reorders_current_records() {
        let mut table = TableModel::new(people_columns()).unwrap();
        table.set_data(
            vec![
                Record::new().set("Age", "10"),
                Record::new().set("Age", "9"),
                Record::new().set("Age", "2"),
            ],
            1,
        );
        table.set_sort("Age", Direction::Asc);
        let ages: Vec<_> = table.records().iter().map(|r| r.display("Age")).collect();
        assert_eq!(ages, ["2", "9", "10"]);
        assert_eq!(table.sort_state(), Some(("Age", Direction::Asc)));

        table.set_sort("Age", Direction::Asc);
        let again: Vec<_> = table.records().iter().map(|r| r.display("Age")).collect();
        assert_eq!(again, ages);
    }
}
