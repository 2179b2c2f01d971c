pub mod parser;
pub mod render;
pub mod schema;

pub use parser::*;
pub use render::*;
pub use schema::*;

/// A parsed pipe table: header names plus string cells
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Number of data rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Find a column by name, ignoring case, spacing and Markdown emphasis
    pub fn column_index(&self, name: &str) -> Option<usize> {
        find_column(&self.columns, name)
    }

    /// Required columns that are not present
    pub fn missing_columns(&self, required: &[&str]) -> Vec<String> {
        required
            .iter()
            .filter(|name| self.column_index(name).is_none())
            .map(|name| name.to_string())
            .collect()
    }

    /// Cell text, trimmed; empty if the row is shorter than expected
    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(|c| c.trim())
            .unwrap_or("")
    }
}

/// Position of `name` among `columns`, compared as [`Table::column_index`] does
pub fn find_column(columns: &[String], name: &str) -> Option<usize> {
    let wanted = normalize_header(name);
    columns.iter().position(|c| normalize_header(c) == wanted)
}

fn normalize_header(name: &str) -> String {
    name.trim()
        .trim_matches(|c| c == '*' || c == '"' || c == '\'' || c == '`')
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
