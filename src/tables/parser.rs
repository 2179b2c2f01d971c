use thiserror::Error;

use super::Table;
use crate::models::EndReason;

/// Why a raw response could not be turned into a table
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableParseError {
    #[error("response was truncated before completion")]
    Truncated,
    #[error("response was withheld by the content filter")]
    ContentFiltered,
    #[error("no table found in response")]
    NoTable,
    #[error("table header is not followed by a separator row")]
    MissingSeparator,
    #[error("row {line} has {found} cells, expected {expected}")]
    RaggedRow {
        line: usize,
        expected: usize,
        found: usize,
    },
}

/// A parsed table plus the exact text it was parsed from, for debugging
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTable {
    pub table: Table,
    pub raw_debug: String,
}

/// Turns a tabular text-generation response into a structured table
pub trait TableParser {
    fn parse_table(
        &self,
        raw: &str,
        end_reason: EndReason,
    ) -> Result<ParsedTable, TableParseError>;
}

/// Parser for the pipe tables produced by the generation stages
///
/// The first run of consecutive pipe-containing lines is taken as the table;
/// anything around it (wrapper tags, prose) is ignored. Outer pipes are optional.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownTableParser;

impl TableParser for MarkdownTableParser {
    fn parse_table(
        &self,
        raw: &str,
        end_reason: EndReason,
    ) -> Result<ParsedTable, TableParseError> {
        match end_reason {
            EndReason::Stop => {}
            EndReason::Length => return Err(TableParseError::Truncated),
            EndReason::ContentFilter => return Err(TableParseError::ContentFiltered),
        }

        let lines: Vec<&str> = raw
            .lines()
            .map(str::trim)
            .skip_while(|line| !line.contains('|'))
            .take_while(|line| line.contains('|'))
            .collect();

        let (header, rest) = lines.split_first().ok_or(TableParseError::NoTable)?;
        let columns = split_cells(header);

        let (separator, body) = rest
            .split_first()
            .ok_or(TableParseError::MissingSeparator)?;
        if !is_separator(separator) {
            return Err(TableParseError::MissingSeparator);
        }

        let mut table = Table::new(columns.iter().map(|c| c.to_string()).collect());
        for (i, line) in body.iter().enumerate() {
            let cells = split_cells(line);
            if cells.len() != columns.len() {
                return Err(TableParseError::RaggedRow {
                    line: i + 1,
                    expected: columns.len(),
                    found: cells.len(),
                });
            }
            table.rows.push(cells.iter().map(|c| c.to_string()).collect());
        }

        Ok(ParsedTable {
            table,
            raw_debug: lines.join("\n"),
        })
    }
}

fn split_cells(line: &str) -> Vec<&str> {
    let line = line.trim();
    let line = line.strip_prefix('|').unwrap_or(line);
    let line = line.strip_suffix('|').unwrap_or(line);
    line.split('|').map(str::trim).collect()
}

fn is_separator(line: &str) -> bool {
    split_cells(line).iter().all(|cell| {
        !cell.is_empty() && cell.contains('-') && cell.chars().all(|c| c == '-' || c == ':')
    })
}
