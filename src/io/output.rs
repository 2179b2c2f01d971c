use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;

use crate::models::{CombinedTable, HighlightsContext};
use crate::pipeline::CombineSummary;
use crate::stages::WinningExtractive;

/// Machine-readable combined rows
#[derive(Debug, Clone, Serialize)]
pub struct CombinedReport {
    /// Abstractive columns and one row per topic, in topic order
    #[serde(flatten)]
    pub combined: CombinedTable,
    /// The single extractive of the meeting, if one was chosen
    pub winner: Option<WinningExtractive>,
    pub metadata: ReportMetadata,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    pub total_topics: usize,
    pub extractive_topic: Option<usize>,
    /// RFC 3339 time the report was produced
    pub generated_at: String,
}

impl CombinedReport {
    pub fn from_summary(summary: &CombineSummary) -> Self {
        Self {
            combined: summary.combined.clone(),
            winner: summary.winner.clone(),
            metadata: ReportMetadata {
                total_topics: summary.topics,
                extractive_topic: summary.winner.as_ref().map(|w| w.topic_index),
                generated_at: Utc::now().to_rfc3339(),
            },
        }
    }

    /// Write to a JSON file
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create file: {:?}", path))?;
        serde_json::to_writer_pretty(file, self).context("Failed to write JSON")?;
        Ok(())
    }
}

/// Write the pipeline context back out as JSON
pub fn write_context(path: &Path, ctx: &HighlightsContext) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create file: {:?}", path))?;
    serde_json::to_writer_pretty(file, ctx).context("Failed to write context JSON")?;
    Ok(())
}

/// Write a rendered Markdown table, newline-terminated
pub fn write_table(path: &Path, table: &str) -> Result<()> {
    let mut file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create file: {:?}", path))?;
    writeln!(file, "{}", table).with_context(|| format!("Failed to write table: {:?}", path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::load_context;
    use crate::models::{CombinedRow, StageOutput, TopicRow, UtteranceRange};

    fn combined() -> CombinedTable {
        CombinedTable {
            columns: vec!["Topic title".to_string(), "Topic Utterance Range".to_string()],
            rows: vec![CombinedRow::abstractive_only(TopicRow {
                range: UtteranceRange::new(3, 9).unwrap(),
                cells: vec!["Launch".to_string(), "3-9".to_string()],
            })],
        }
    }

    #[test]
    fn test_context_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("context.json");
        let ctx = HighlightsContext {
            abstractives_output: Some(StageOutput::new("|a|\n|---|\n|1|")),
            candidate_blocks: Some("|utterance_range|uttrances_texts|\n|---|---|".to_string()),
            ..Default::default()
        };

        write_context(&path, &ctx).unwrap();

        assert_eq!(load_context(&path).unwrap(), ctx);
    }

    #[test]
    fn test_write_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("combined.md");

        write_table(&path, "|a|b|\n|---|---|").unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "|a|b|\n|---|---|\n");
    }

    #[test]
    fn test_report_without_winner() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.json");
        let summary = CombineSummary {
            topics: 1,
            winner: None,
            combined: combined(),
        };

        CombinedReport::from_summary(&summary).write_json(&path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["metadata"]["total_topics"], 1);
        assert!(value["metadata"]["extractive_topic"].is_null());
        assert!(value["winner"].is_null());
        assert_eq!(value["columns"][0], "Topic title");
        assert_eq!(value["rows"][0]["topic"]["cells"][0], "Launch");
        assert!(value["rows"][0]["extractive"].is_null());
    }

    #[test]
    fn test_create_in_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("table.md");
        assert!(write_table(&path, "|a|").is_err());
    }
}
