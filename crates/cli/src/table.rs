//! Plain-text rendering of a grid page

use colored::Colorize;
use roster_grid::{GridView, ImportReport};

/// Render a page as an aligned table with a pager footer
pub fn render_view(view: &GridView, color: bool) -> String {
    let labels: Vec<String> = view.headers.iter().map(|h| h.label()).collect();
    let mut widths: Vec<usize> = labels.iter().map(|l| l.chars().count()).collect();
    for row in &view.rows {
        for (width, cell) in widths.iter_mut().zip(&row.cells) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let header = join_padded(&labels, &widths);
    if color {
        out.push_str(&header.bold().to_string());
    } else {
        out.push_str(&header);
    }
    out.push('\n');
    out.push_str(
        &widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    out.push('\n');

    if view.rows.is_empty() {
        out.push_str("No records found\n");
    }
    for row in &view.rows {
        out.push_str(&join_padded(&row.cells, &widths));
        out.push('\n');
    }

    let footer = view.page.to_string();
    if color {
        out.push_str(&footer.dimmed().to_string());
    } else {
        out.push_str(&footer);
    }
    out.push('\n');
    out
}

fn join_padded(cells: &[String], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

/// Summarize an import validation
pub fn render_import_report(report: &ImportReport, color: bool) -> String {
    let mut out = String::new();
    let accepted = format!("Accepted: {}", report.accepted.len());
    let rejected = format!("Rejected: {}", report.rejected.len());
    if color {
        out.push_str(&format!("{}\n{}\n", accepted.green(), rejected.red()));
    } else {
        out.push_str(&format!("{accepted}\n{rejected}\n"));
    }
    for row in &report.rejected {
        out.push_str(&format!("  line {}: {}\n", row.line, row.reason));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use roster_grid::{HeaderCell, PageWindow, RejectedRow, RenderedRow};
    use roster_core::SortDirection;

    fn view() -> GridView {
        GridView {
            headers: vec![
                HeaderCell {
                    id: "name".to_string(),
                    title: "Name".to_string(),
                    sort_key: Some("name_flat".to_string()),
                    sorted: Some(SortDirection::Ascending),
                },
                HeaderCell {
                    id: "status".to_string(),
                    title: "Status".to_string(),
                    sort_key: None,
                    sorted: None,
                },
            ],
            rows: vec![
                RenderedRow {
                    id: Some("2".to_string()),
                    cells: vec!["Ann Lee".to_string(), "Inactive".to_string()],
                },
                RenderedRow {
                    id: Some("1".to_string()),
                    cells: vec!["Bob".to_string(), "Active".to_string()],
                },
            ],
            page: PageWindow::new(2).info(3),
        }
    }

    #[test]
    fn test_render_view_aligns_columns() {
        let text = render_view(&view(), false);
        let expected = "\
Name ▲   Status
-------  --------
Ann Lee  Inactive
Bob      Active
Page 1 of 2 (showing 1-2 of 3 items)
";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_render_empty_view() {
        let mut empty = view();
        empty.rows.clear();
        empty.page = PageWindow::new(2).info(0);
        let text = render_view(&empty, false);
        assert!(text.contains("No records found"));
        assert!(text.ends_with("Page 1 of 1 (0 items)\n"));
    }

    #[test]
    fn test_render_import_report() {
        let report = ImportReport {
            accepted: Vec::new(),
            rejected: vec![RejectedRow {
                line: 3,
                reason: "name is required".to_string(),
            }],
        };
        assert_eq!(
            render_import_report(&report, false),
            "Accepted: 0\nRejected: 1\n  line 3: name is required\n"
        );
    }
}
