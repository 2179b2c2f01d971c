use serde::{Deserialize, Serialize};

use super::TranscriptBlock;

/// Why an upstream generation stage stopped producing text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// Natural end of the response
    #[default]
    Stop,
    /// Output token limit reached; the response is truncated
    Length,
    /// Response withheld by a content filter
    ContentFilter,
}

/// Raw response of an upstream generation stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageOutput {
    pub text: String,
    #[serde(default)]
    pub end_reason: EndReason,
}

impl StageOutput {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            end_reason: EndReason::Stop,
        }
    }
}

/// State threaded by the orchestrator between generation stages
///
/// The candidate step reads `transcript` and `abstractives_output` and fills
/// `candidate_blocks`. The ranking-input step turns `extractives_output` into
/// `ranking_input`. The combine step additionally reads
/// `extractives_ranking_output` (and `extractives_output` when present) and
/// fills `combined_input`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HighlightsContext {
    #[serde(default)]
    pub transcript: Vec<TranscriptBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abstractives_output: Option<StageOutput>,
    /// Candidate table handed to the extractive selection stage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidate_blocks: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extractives_output: Option<StageOutput>,
    /// Extractives table without annotations, handed to the ranking stage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ranking_input: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extractives_ranking_output: Option<StageOutput>,
    /// Combined table handed to the final narration stage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combined_input: Option<String>,
}
