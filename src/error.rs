use std::fmt;

use thiserror::Error;

/// Which upstream table a parsing failure belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    /// Topic table produced by the abstractives stage
    Abstractives,
    /// Extractive selection and extractive ranking tables
    Extractives,
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableKind::Abstractives => write!(f, "abstractives"),
            TableKind::Extractives => write!(f, "extractives"),
        }
    }
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, HighlightsError>;

/// Every way a highlights stage can fail.
///
/// Any of these means the meeting gets no extractive highlight; callers fall
/// back to abstractive-only output.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HighlightsError {
    #[error("failed to parse {table} table: {message}")]
    TableParsing { table: TableKind, message: String },

    #[error("{table} table is missing required columns: {}", .missing.join(", "))]
    TableMissingColumns {
        table: TableKind,
        missing: Vec<String>,
    },

    #[error("invalid utterance range {0:?}")]
    RangeFormat(String),

    #[error("topic range extraction failed: {0}")]
    TopicRangeExtractionFailed(String),

    #[error("no self-contained highlight candidates")]
    NoSelfContainedHighlights,

    #[error("highlight candidate filtering failed: {0}")]
    HighlightsCandidateFilteringFailed(String),

    #[error("highlight ranking processing failed: {0}")]
    HighlightsRankingProcessingFailed(String),

    #[error("invalid overall rank: {0}")]
    InvalidOverallRank(String),

    #[error("extractive ranking table is empty")]
    EmptyHighlights,

    #[error("malformed transcript: {0}")]
    MalformedTranscript(String),

    #[error("pipeline context has no {0}")]
    MissingContextValue(&'static str),

    #[error("meeting has no transcript blocks")]
    MeetingContextsBlocksMissing,

    #[error("meeting transcript has no utterance timestamps")]
    MeetingTimestampDataMissing,

    #[error("meeting lasts {0:.1} minutes, too short for highlights")]
    MeetingDurationTooShort(f64),

    #[error("meeting lasts {0:.1} minutes, too long for highlights")]
    MeetingDurationTooLong(f64),
}
