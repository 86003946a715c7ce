//! Plain-text rendering for the terminal.

use odatagrid_lib::modal::ModalPanel;
use odatagrid_lib::modal::ModalPresenter;
use odatagrid_lib::pagination::ControlKind;
use odatagrid_lib::pagination::PaginationView;
use odatagrid_lib::table::Alignment;
use odatagrid_lib::table::CellContent;
use odatagrid_lib::table::RenderedTable;

/// Removes markup tags, keeping text content. Block tags become spaces.
pub fn strip_tags(markup: &str) -> String {
    let mut out = String::with_capacity(markup.len());
    let mut in_tag = false;
    for c in markup.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                if !out.is_empty() && !out.ends_with(' ') {
                    out.push(' ');
                }
            }
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out.trim()
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

fn cell_text(content: &CellContent) -> String {
    match content {
        CellContent::Text(text) => text.clone(),
        CellContent::Markup(markup) => strip_tags(markup),
    }
}

fn pad(text: &str, width: usize, align: Alignment) -> String {
    match align {
        Alignment::Left => format!("{:<width$}", text, width = width),
        Alignment::Center => format!("{:^width$}", text, width = width),
        Alignment::Right => format!("{:>width$}", text, width = width),
    }
}

/// Renders the table with columns sized to their content.
pub fn table_text(table: &RenderedTable) -> String {
    let rows: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|row| row.iter().map(|cell| cell_text(&cell.content)).collect())
        .collect();

    let widths: Vec<usize> = table
        .headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            rows.iter()
                .filter_map(|row| row.get(i))
                .map(|text| text.chars().count())
                .chain(std::iter::once(header.label.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(
        table
            .headers
            .iter()
            .zip(&widths)
            .map(|(h, w)| pad(&h.label, *w, h.align))
            .collect::<Vec<_>>()
            .join(" | "),
    );
    lines.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    for row in &rows {
        lines.push(
            row.iter()
                .zip(&table.headers)
                .zip(&widths)
                .map(|((text, h), w)| pad(text, *w, h.align))
                .collect::<Vec<_>>()
                .join(" | "),
        );
    }

    lines
        .into_iter()
        .map(|line| line.trim_end().to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Renders the pagination bar: `[n]` clickable, `<n>` current, `(x)` disabled.
pub fn pagination_text(view: &PaginationView) -> String {
    let controls = view
        .controls
        .iter()
        .map(|control| {
            if control.kind == ControlKind::Gap {
                control.label.clone()
            } else if control.active {
                format!("<{}>", control.label)
            } else if control.disabled {
                format!("({})", control.label)
            } else {
                format!("[{}]", control.label)
            }
        })
        .collect::<Vec<_>>()
        .join(" ");
    format!("{}  {}", controls, view.caption())
}

/// Prints modal panels to stdout.
#[derive(Debug, Default)]
pub struct TerminalPresenter {
    open: bool,
}

impl ModalPresenter for TerminalPresenter {
    fn show(&mut self, panel: ModalPanel) {
        self.open = true;
        println!("== {} ==", strip_tags(&panel.title));
        println!("{}", panel.body);
        println!("{}", panel.footer);
    }

    fn close(&mut self) {
        if self.open {
            println!("== closed ==");
        }
        self.open = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use odatagrid_lib::model::Record;
    use odatagrid_lib::table::ColumnSpec;
    use odatagrid_lib::table::TableModel;

    #[test]
    fn test_strip_tags() {
        assert_eq!(strip_tags("<p>a@x.com</p><p>b&amp;c</p>"), "a@x.com b&c");
        assert_eq!(strip_tags("plain"), "plain");
    }

    #[test]
    fn test_table_text() {
        let mut table = TableModel::new(vec![
            ColumnSpec::new("UserName", "User"),
            ColumnSpec::new("Age", "Age").align(Alignment::Right),
        ])
        .unwrap();
        table.set_data(
            vec![
                Record::new().set("UserName", "russellwhyte").set("Age", 35),
                Record::new().set("UserName", "ann").set("Age", 7),
            ],
            1,
        );

        let text = table_text(&table.render());
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "User         | Age");
        assert_eq!(lines[1], "-------------+----");
        assert_eq!(lines[2], "russellwhyte |  35");
        assert_eq!(lines[3], "ann          |   7");
    }

    #[test]
    fn test_pagination_text() {
        let view = PaginationView::build(12, 5, 1);
        assert_eq!(
            pagination_text(&view),
            "(Previous) <1> [2] [3] [Next]  Page 1 of 3"
        );
    }

    #[test]
    fn test_pagination_text_with_gaps() {
        let view = PaginationView::build(50, 5, 5);
        assert_eq!(
            pagination_text(&view),
            "[Previous] [1] ... [3] [4] <5> [6] [7] ... [10] [Next]  Page 5 of 10"
        );
    }
}
