use serde::{Deserialize, Serialize};

use super::UtteranceRange;
use crate::tables::find_column;

/// One row of the abstractives table
///
/// Only the topic range is interpreted. The cells are kept exactly as the
/// abstractives stage wrote them so the combined table can pass them through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicRow {
    pub range: UtteranceRange,
    /// Raw cells, in the order of [`TopicTable::columns`]
    pub cells: Vec<String>,
}

/// The abstractives table, one row per topic in meeting order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopicTable {
    pub columns: Vec<String>,
    pub topics: Vec<TopicRow>,
}

impl TopicTable {
    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    pub fn ranges(&self) -> Vec<UtteranceRange> {
        self.topics.iter().map(|t| t.range).collect()
    }

    /// Raw cell of `topic` under the column called `name`
    pub fn cell(&self, topic: usize, name: &str) -> Option<&str> {
        let column = find_column(&self.columns, name)?;
        self.topics
            .get(topic)
            .and_then(|t| t.cells.get(column))
            .map(String::as_str)
    }
}

/// The extractive attached to a topic in the combined table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractiveAttachment {
    pub range: UtteranceRange,
    pub text: String,
    pub speaker: String,
}

/// A topic row joined with its (optional) extractive
///
/// `None` fields are rendered as `NA`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedRow {
    pub topic: TopicRow,
    pub transition: Option<String>,
    pub extractive: Option<ExtractiveAttachment>,
}

impl CombinedRow {
    pub fn abstractive_only(topic: TopicRow) -> Self {
        Self {
            topic,
            transition: None,
            extractive: None,
        }
    }

    pub fn has_extractive(&self) -> bool {
        self.extractive.is_some()
    }
}

/// The abstractives table extended with the transition and extractive columns
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CombinedTable {
    /// Abstractive columns, as read from the abstractives table
    pub columns: Vec<String>,
    pub rows: Vec<CombinedRow>,
}

impl CombinedTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The row carrying the extractive, if any
    pub fn extractive_row(&self) -> Option<usize> {
        self.rows.iter().position(CombinedRow::has_extractive)
    }
}
