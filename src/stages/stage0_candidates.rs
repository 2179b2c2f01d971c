use tracing::{debug, info};

use crate::error::{HighlightsError, Result};
use crate::models::{TranscriptStore, UtteranceBlock, UtteranceRange};

/// Configuration for candidate generation
#[derive(Debug, Clone)]
pub struct CandidateConfig {
    /// Shortest admissible block, in seconds
    pub duration_low_secs: f64,
    /// Longest admissible block, in seconds
    pub duration_high_secs: f64,
}

impl Default for CandidateConfig {
    fn default() -> Self {
        Self {
            duration_low_secs: 15.0,
            duration_high_secs: 45.0,
        }
    }
}

impl CandidateConfig {
    /// True if a block spanning `secs` of wall-clock time is admissible
    pub fn admits(&self, secs: f64) -> bool {
        secs >= self.duration_low_secs && secs <= self.duration_high_secs
    }
}

/// Candidate blocks of one topic
#[derive(Debug, Clone, PartialEq)]
pub struct TopicCandidates {
    /// Index of the topic in the abstractives table
    pub topic_index: usize,
    pub blocks: Vec<UtteranceBlock>,
}

/// Execute Stage 0: candidate generation
///
/// For every topic except the first and the last (meeting intro and outro),
/// enumerate every contiguous sub-span `j..=k` of the topic whose duration,
/// measured from the start of `j` to the end of `k`, lies within the configured
/// window. Spans are short, so the quadratic scan is fine.
pub fn generate_candidates(
    transcript: &TranscriptStore,
    topic_ranges: &[UtteranceRange],
    config: &CandidateConfig,
) -> Result<Vec<TopicCandidates>> {
    let eligible = topic_ranges.len().saturating_sub(1);
    let mut result = Vec::with_capacity(eligible.saturating_sub(1));

    for (topic_index, range) in topic_ranges.iter().enumerate().take(eligible).skip(1) {
        let utterances = transcript.slice(*range).ok_or_else(|| {
            HighlightsError::TopicRangeExtractionFailed(format!(
                "topic {} range {} exceeds transcript of {} utterances",
                topic_index,
                range,
                transcript.len()
            ))
        })?;

        let mut blocks = Vec::new();
        for (j, first) in utterances.iter().enumerate() {
            for (k, last) in utterances.iter().enumerate().skip(j) {
                if !config.admits(last.end_secs - first.start_secs) {
                    continue;
                }
                let span = UtteranceRange {
                    start: range.start + j,
                    end: range.start + k,
                };
                blocks.push(UtteranceBlock::from_utterances(span, &utterances[j..=k]));
            }
        }

        debug!(
            "Topic {} ({}): {} candidate blocks",
            topic_index,
            range,
            blocks.len()
        );
        result.push(TopicCandidates {
            topic_index,
            blocks,
        });
    }

    info!(
        "Stage 0: {} candidate blocks across {} eligible topics",
        result.iter().map(|t| t.blocks.len()).sum::<usize>(),
        result.len()
    );

    Ok(result)
}
