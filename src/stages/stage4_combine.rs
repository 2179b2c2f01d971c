use serde::Serialize;
use tracing::info;

use super::MatchedCandidate;
use crate::error::{HighlightsError, Result};
use crate::models::{
    CombinedRow, CombinedTable, ExtractiveAttachment, TopicTable, TranscriptStore, UtteranceRange,
};
use crate::tables::{render_markdown, COMBINED_EXTRA_COLUMNS, NOT_AVAILABLE};

/// The single extractive chosen for the whole meeting
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WinningExtractive {
    pub topic_index: usize,
    pub range: UtteranceRange,
    /// Verbatim transcript text of the block
    pub text: String,
    /// Display name of the speaker holding the floor
    pub speaker: String,
    pub overall_rank: usize,
    pub selection_reason: String,
}

/// Derive the winner's final attributes from the transcript
///
/// The speaker is the one who opens the block; after filtering this is the
/// sole speaker or the one bracketing an insignificant interruption.
pub fn resolve_winner(
    transcript: &TranscriptStore,
    winner: &MatchedCandidate,
) -> Result<WinningExtractive> {
    let range = winner.row.range();
    let block = transcript.block(range).ok_or_else(|| {
        HighlightsError::HighlightsRankingProcessingFailed(format!(
            "candidate {} exceeds transcript of {} utterances",
            range,
            transcript.len()
        ))
    })?;

    let speaker = block.speakers.first().cloned().ok_or_else(|| {
        HighlightsError::HighlightsRankingProcessingFailed(format!(
            "candidate {} has no speaker",
            range
        ))
    })?;

    let mut text = block.joined_text();
    if text.is_empty() {
        text = winner.row.candidate.text.trim().to_string();
    }
    if text.is_empty() {
        return Err(HighlightsError::HighlightsRankingProcessingFailed(format!(
            "candidate {} has no text",
            range
        )));
    }

    Ok(WinningExtractive {
        topic_index: winner.topic_index,
        range,
        text,
        speaker,
        overall_rank: winner.row.overall_rank,
        selection_reason: winner.row.candidate.selection_reason.clone(),
    })
}

/// Execute Stage 4: attach the winning extractive to its topic
///
/// Every other topic keeps `NA` extractive columns. Row order is the topic order.
pub fn combine_tables(topics: TopicTable, winner: Option<&WinningExtractive>) -> CombinedTable {
    let rows: Vec<CombinedRow> = topics
        .topics
        .into_iter()
        .enumerate()
        .map(|(index, topic)| {
            let mut row = CombinedRow::abstractive_only(topic);
            row.extractive = winner
                .filter(|w| w.topic_index == index)
                .map(|w| ExtractiveAttachment {
                    range: w.range,
                    text: w.text.clone(),
                    speaker: w.speaker.clone(),
                });
            row
        })
        .collect();

    info!(
        "Stage 4: combined {} topics, {} with an extractive",
        rows.len(),
        rows.iter().filter(|r| r.has_extractive()).count()
    );

    CombinedTable {
        columns: topics.columns,
        rows,
    }
}

/// Render the combined table consumed by the narration stage
///
/// Abstractive cells are written exactly as they were read.
pub fn render_combined(table: &CombinedTable) -> String {
    let columns: Vec<&str> = table
        .columns
        .iter()
        .map(String::as_str)
        .chain(COMBINED_EXTRA_COLUMNS)
        .collect();

    let records: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|row| {
            let extractive = row.extractive.as_ref();
            let mut record = row.topic.cells.clone();
            record.extend([
                or_not_available(row.transition.clone()),
                or_not_available(extractive.map(|e| e.range.to_string())),
                or_not_available(extractive.map(|e| e.text.clone())),
                or_not_available(extractive.map(|e| e.speaker.clone())),
            ]);
            record
        })
        .collect();

    render_markdown(&columns, &records)
}

fn or_not_available(value: Option<String>) -> String {
    value.unwrap_or_else(|| NOT_AVAILABLE.to_string())
}
