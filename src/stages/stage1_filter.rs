use tracing::{debug, info};

use super::TopicCandidates;
use crate::filters::{apply_filters, FilterConfig};

/// Result of Stage 1 filtering
#[derive(Debug, Clone, Default)]
pub struct Stage1Result {
    /// Filtered candidate lists, still in topic order
    pub topics: Vec<TopicCandidates>,
    pub removed_short_openers: usize,
    pub removed_dangling_questions: usize,
    pub removed_multi_speaker: usize,
}

impl Stage1Result {
    pub fn remaining(&self) -> usize {
        self.topics.iter().map(|t| t.blocks.len()).sum()
    }
}

/// Execute Stage 1: run the block filter chain over every topic's candidates
pub fn filter_candidates(topics: Vec<TopicCandidates>, config: &FilterConfig) -> Stage1Result {
    let mut result = Stage1Result::default();

    for topic in topics {
        let generated = topic.blocks.len();
        let filtered = apply_filters(topic.blocks, config);

        debug!(
            "Topic {}: {} of {} blocks kept",
            topic.topic_index,
            filtered.blocks.len(),
            generated
        );

        result.removed_short_openers += filtered.removed_short_openers;
        result.removed_dangling_questions += filtered.removed_dangling_questions;
        result.removed_multi_speaker += filtered.removed_multi_speaker;
        result.topics.push(TopicCandidates {
            topic_index: topic.topic_index,
            blocks: filtered.blocks,
        });
    }

    info!(
        "Stage 1: {} blocks kept ({} short openers, {} dangling questions, {} multi-speaker removed)",
        result.remaining(),
        result.removed_short_openers,
        result.removed_dangling_questions,
        result.removed_multi_speaker
    );

    result
}
