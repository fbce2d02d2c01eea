use unicode_width::UnicodeWidthStr;

use datagrid_lib::config::ColumnDef;
use datagrid_lib::view::View;

const GAP: &str = "  ";

/// Renders the page as an aligned text table with a footer line.
pub fn render_table(columns: &[&ColumnDef], view: &View<'_>) -> String {
    let header: Vec<String> = columns.iter().map(|c| c.label.clone()).collect();
    let cells: Vec<Vec<String>> = view
        .rows
        .iter()
        .map(|r| columns.iter().map(|c| c.render(r.row)).collect())
        .collect();

    let widths: Vec<usize> = (0..columns.len())
        .map(|i| {
            cells
                .iter()
                .map(|line| line[i].width())
                .chain(std::iter::once(header[i].width()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    push_line(&mut out, &header, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_line(&mut out, &rule, &widths);
    for line in &cells {
        push_line(&mut out, line, &widths);
    }

    out.push_str(&format!(
        "page {}/{}, {} rows",
        view.current_page, view.total_pages, view.total_filtered
    ));
    if !view.bulk_actions.is_empty() {
        let ids: Vec<&str> = view.bulk_actions.iter().map(|a| a.id.as_str()).collect();
        out.push_str(&format!(", bulk actions: {}", ids.join(", ")));
    }
    out.push('\n');
    out
}

fn push_line(out: &mut String, cells: &[String], widths: &[usize]) {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| {
            let pad = width.saturating_sub(cell.width());
            format!("{}{}", cell, " ".repeat(pad))
        })
        .collect();
    out.push_str(padded.join(GAP).trim_end());
    out.push('\n');
}
