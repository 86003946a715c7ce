//! HTML rendering for tables, pagination, badges and dialogs.
//!
//! Plain cell text is escaped; renderer output is emitted verbatim.

use std::fmt::Write;

use crate::modal::ModalPanel;
use crate::pagination::ControlKind;
use crate::pagination::PaginationView;
use crate::query::Direction;
use crate::query::FilterCriteria;
use crate::query::FilterOperator;
use crate::query::SortCriteria;
use crate::table::CellContent;
use crate::table::ColumnSpec;
use crate::table::RenderedTable;

/// Control id of the sort dialog's submit button.
pub const APPLY_SORT_ID: &str = "applySort";
/// Control id of the sort dialog's reset button.
pub const RESET_SORT_ID: &str = "resetSort";
/// Control id of the filter dialog's submit button.
pub const APPLY_FILTER_ID: &str = "applyFilter";
/// Control id of the filter dialog's reset button.
pub const RESET_FILTER_ID: &str = "resetFilter";
/// Toolbar button opening the sort dialog.
pub const OPEN_SORT_ID: &str = "sortButton";
/// Toolbar button opening the filter dialog.
pub const OPEN_FILTER_ID: &str = "filterButton";

/// Escapes text for use in element content and quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Renders a table element.
pub fn table_html(table: &RenderedTable) -> String {
    let mut html = String::from("<table><thead><tr>");
    for header in &table.headers {
        let _ = write!(
            html,
            r#"<th data-key="{}" style="width:{}px;text-align:{}">{}</th>"#,
            escape_html(&header.key),
            header.width,
            header.align.as_str(),
            escape_html(&header.label)
        );
    }
    html.push_str("</tr></thead><tbody>");

    for row in &table.rows {
        html.push_str("<tr>");
        for cell in row {
            let content = match &cell.content {
                CellContent::Text(text) => escape_html(text),
                CellContent::Markup(markup) => markup.clone(),
            };
            let _ = write!(html, r#"<td style="text-align:{}">{}</td>"#, cell.align.as_str(), content);
        }
        html.push_str("</tr>");
    }

    html.push_str("</tbody></table>");
    html
}

/// Renders the pagination bar.
pub fn pagination_html(view: &PaginationView) -> String {
    let mut html = String::from(r#"<div class="pagination">"#);
    for control in &view.controls {
        if control.kind == ControlKind::Gap {
            let _ = write!(html, r#"<span class="page-gap">{}</span>"#, escape_html(&control.label));
            continue;
        }
        let mut classes = vec![match control.kind {
            ControlKind::Previous => "prev",
            ControlKind::Page(_) | ControlKind::Gap => "page",
            ControlKind::Next => "next",
        }];
        if control.active {
            classes.push("active-page");
        }
        let _ = write!(
            html,
            r#"<button id="{}" class="{}" data-page="{}"{}>{}</button>"#,
            control.id,
            classes.join(" "),
            control.target_page,
            if control.disabled { " disabled" } else { "" },
            escape_html(&control.label)
        );
    }
    let _ = write!(html, r#"<span class="page-info">{}</span></div>"#, view.caption());
    html
}

/// Renders a criteria-count badge. Zero renders as an empty string.
pub fn badge_html(count: usize) -> String {
    if count == 0 {
        String::new()
    } else {
        format!(r#"<span class="badge">{}</span>"#, count)
    }
}

/// Renders the Sort and Filter toolbar buttons with their badges.
pub fn toolbar_html(sort_count: usize, filter_count: usize) -> String {
    format!(
        r#"<div class="toolbar"><button id="{}">Sort{}</button><button id="{}">Filter{}</button></div>"#,
        OPEN_SORT_ID,
        badge_html(sort_count),
        OPEN_FILTER_ID,
        badge_html(filter_count)
    )
}

fn field_options(columns: &[&ColumnSpec], selected: &str) -> String {
    columns
        .iter()
        .map(|c| {
            format!(
                r#"<option value="{}"{}>{}</option>"#,
                escape_html(c.key()),
                if c.key() == selected { " selected" } else { "" },
                escape_html(c.label())
            )
        })
        .collect()
}

fn sort_row(columns: &[&ColumnSpec], field: &str, direction: Direction) -> String {
    let order = [(Direction::Asc, "Ascending"), (Direction::Desc, "Descending")]
        .iter()
        .map(|(dir, label)| {
            format!(
                r#"<option value="{}"{}>{}</option>"#,
                dir.as_str(),
                if *dir == direction { " selected" } else { "" },
                label
            )
        })
        .collect::<String>();
    format!(
        r#"<div class="sortRow"><select class="sortField">{}</select><select class="sortOrder">{}</select></div>"#,
        field_options(columns, field),
        order
    )
}

fn filter_row(columns: &[&ColumnSpec], field: &str, operator: FilterOperator, value: &str) -> String {
    let ops = FilterOperator::ALL
        .iter()
        .map(|op| {
            format!(
                r#"<option value="{}"{}>{}</option>"#,
                op.form_value(),
                if *op == operator { " selected" } else { "" },
                op.label()
            )
        })
        .collect::<String>();
    format!(
        r#"<div class="filterRow"><select class="filterField">{}</select><select class="filterOp">{}</select><input class="filterVal" placeholder="Value" value="{}" /></div>"#,
        field_options(columns, field),
        ops,
        escape_html(value)
    )
}

/// Builds the sort dialog, one row per active criterion (or one empty row).
pub fn sort_dialog(columns: &[&ColumnSpec], active: &SortCriteria) -> ModalPanel {
    let mut body = String::from(r#"<div id="sortFields" class="filter-body">"#);
    if active.is_empty() {
        body.push_str(&sort_row(columns, "", Direction::Asc));
    }
    for criterion in active.iter() {
        body.push_str(&sort_row(columns, &criterion.field, criterion.direction));
    }
    body.push_str(r#"</div><button id="addSort">Add Sort</button>"#);

    ModalPanel::new(
        "Sort",
        body,
        format!(
            r#"<button id="{}" class="cancel">Reset</button><button id="{}" class="modal-close-btn">Submit</button>"#,
            RESET_SORT_ID, APPLY_SORT_ID
        ),
    )
}

/// Builds the filter dialog, one row per active criterion (or one empty row).
pub fn filter_dialog(columns: &[&ColumnSpec], active: &FilterCriteria) -> ModalPanel {
    let mut body = String::from(r#"<div id="filterFields">"#);
    if active.is_empty() {
        body.push_str(&filter_row(columns, "", FilterOperator::Equals, ""));
    }
    for criterion in active.iter() {
        body.push_str(&filter_row(
            columns,
            &criterion.field,
            criterion.operator,
            &criterion.value,
        ));
    }
    body.push_str(r#"</div><button id="addFilterBtn">Add Filter</button>"#);

    ModalPanel::new(
        "Filter",
        body,
        format!(
            r#"<button id="{}" class="cancel">Reset</button><button id="{}" class="modal-close-btn">Submit</button>"#,
            RESET_FILTER_ID, APPLY_FILTER_ID
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Record;
    use crate::query::FilterCriterion;
    use crate::table::TableModel;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html(r#"<b>"O'Brien" & co</b>"#), "&lt;b&gt;&quot;O&#39;Brien&quot; &amp; co&lt;/b&gt;");
    }

    #[test]
    fn test_table_escapes_text_but_not_renderer_output() {
        let mut table = TableModel::new(vec![
            ColumnSpec::new("Name", "Name"),
            ColumnSpec::new("Tag", "Tag").renderer(|_| "<em>x</em>".to_string()),
        ])
        .unwrap();
        table.set_data(vec![Record::new().set("Name", "<script>")], 1);

        let html = table_html(&table.render());
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("<em>x</em>"));
        assert!(html.contains(r#"<th data-key="Name" style="width:100px;text-align:left">Name</th>"#));
    }

    #[test]
    fn test_pagination_marks_active_page() {
        let view = PaginationView::build(20, 5, 2);
        let html = pagination_html(&view);
        assert!(html.contains(r#"<button id="page-2" class="page active-page" data-page="2" disabled>2</button>"#));
        assert!(html.contains(r#"<button id="page-3" class="page" data-page="3">3</button>"#));
        assert!(html.contains("Page 2 of 4"));
    }

    #[test]
    fn test_pagination_gap_is_not_a_button() {
        let view = PaginationView::build(100, 5, 10);
        let html = pagination_html(&view);
        assert_eq!(html.matches(r#"<span class="page-gap">...</span>"#).count(), 2);
        assert!(html.contains(r#"<button id="page-20" class="page" data-page="20">20</button>"#));
        assert!(!html.contains("page-15"));
    }

    #[test]
    fn test_badge() {
        assert_eq!(badge_html(0), "");
        assert_eq!(badge_html(2), r#"<span class="badge">2</span>"#);
    }

    #[test]
    fn test_toolbar_shows_only_nonzero_badges() {
        assert_eq!(
            toolbar_html(0, 3),
            r#"<div class="toolbar"><button id="sortButton">Sort</button><button id="filterButton">Filter<span class="badge">3</span></button></div>"#
        );
    }

    #[test]
    fn test_filter_dialog_prefills_active_criteria() {
        let first = ColumnSpec::new("FirstName", "First Name");
        let last = ColumnSpec::new("LastName", "Last Name");
        let columns = vec![&first, &last];
        let active = FilterCriteria::new().and(FilterCriterion::contains("LastName", "O'Brien"));

        let panel = filter_dialog(&columns, &active);
        assert_eq!(panel.title, "Filter");
        assert!(panel.body.contains(r#"<option value="LastName" selected>Last Name</option>"#));
        assert!(panel.body.contains(r#"<option value="contains" selected>Contains</option>"#));
        assert!(panel.body.contains(r#"value="O&#39;Brien""#));
        assert!(panel.footer.contains(APPLY_FILTER_ID));
    }

    #[test]
    fn test_sort_dialog_has_empty_row_without_criteria() {
        let name = ColumnSpec::new("UserName", "UserName");
        let panel = sort_dialog(&[&name], &SortCriteria::new());
        assert_eq!(panel.body.matches("sortRow").count(), 1);
        assert!(panel.body.contains(r#"<option value="asc" selected>Ascending</option>"#));
    }
}
