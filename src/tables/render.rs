/// Render a pipe-delimited Markdown table
///
/// Header row, a `---` separator per column, then one row per record. Cell
/// values are written verbatim; downstream prompts expect exactly this shape.
pub fn render_markdown<S: AsRef<str>>(columns: &[S], rows: &[Vec<String>]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 2);

    lines.push(render_row(columns.iter().map(|c| c.as_ref())));
    lines.push(render_row(columns.iter().map(|_| "---")));
    for row in rows {
        debug_assert_eq!(row.len(), columns.len());
        lines.push(render_row(row.iter().map(String::as_str)));
    }

    lines.join("\n")
}

fn render_row<'a>(cells: impl Iterator<Item = &'a str>) -> String {
    let mut line = String::from("|");
    for cell in cells {
        line.push_str(cell);
        line.push('|');
    }
    line
}
