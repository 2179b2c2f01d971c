pub mod error;
pub mod filters;
pub mod io;
pub mod models;
pub mod pipeline;
pub mod stages;
pub mod tables;
pub mod tokenizer;

pub use error::{HighlightsError, Result, TableKind};
pub use filters::{apply_filters, FilterConfig, FilterResult};
pub use io::{load_context, write_context, write_table, CombinedReport};
pub use models::{
    CombinedRow, CombinedTable, EndReason, HighlightsContext, StageOutput, TopicRow, TopicTable,
    TranscriptBlock, TranscriptStore, UtteranceBlock, UtteranceRange,
};
pub use pipeline::{CandidateSummary, CombineSummary, HighlightsPipeline, PipelineConfig};
pub use stages::{
    check_meeting_supported, filter_candidates, generate_candidates, CandidateConfig,
    EligibilityConfig, SelectorConfig, WinningExtractive,
};
pub use tables::{
    interest_levels, parse_abstractives, MarkdownTableParser, TableParser,
    CANDIDATE_TOPIC_COLUMNS, TOPIC_TITLE,
};
pub use tokenizer::{EstimatingTokenCounter, TokenCounter};
