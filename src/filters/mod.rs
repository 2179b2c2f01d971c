pub mod dangling_questions;
pub mod multi_speaker;
pub mod short_openers;

pub use dangling_questions::*;
pub use multi_speaker::*;
pub use short_openers::*;

use crate::models::UtteranceBlock;

/// Configuration for the block filter chain
#[derive(Debug, Clone)]
pub struct FilterConfig {
    /// Blocks whose first utterance has at most this many characters are dropped
    pub max_opener_chars: usize,
    /// Word allowance for the interrupting speaker in a two-speaker block
    pub max_interruption_words: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            max_opener_chars: 2,
            max_interruption_words: 3,
        }
    }
}

/// Result of running the filter chain over one candidate list
#[derive(Debug, Clone, Default)]
pub struct FilterResult {
    /// Surviving blocks, in their original order
    pub blocks: Vec<UtteranceBlock>,
    pub removed_short_openers: usize,
    pub removed_dangling_questions: usize,
    pub removed_multi_speaker: usize,
}

impl FilterResult {
    pub fn removed(&self) -> usize {
        self.removed_short_openers + self.removed_dangling_questions + self.removed_multi_speaker
    }
}

/// Apply the filter chain to a candidate list
///
/// Stages run in a fixed order and only ever remove blocks:
/// 1. Drop blocks opening with a trivially short utterance
/// 2. Drop blocks ending on a question
/// 3. Drop multi-speaker blocks, except insignificant interruptions
pub fn apply_filters(blocks: Vec<UtteranceBlock>, config: &FilterConfig) -> FilterResult {
    let mut blocks = blocks;

    let before = blocks.len();
    blocks.retain(|b| !has_short_opener(b, config.max_opener_chars));
    let removed_short_openers = before - blocks.len();

    let before = blocks.len();
    blocks.retain(|b| !ends_with_question(b));
    let removed_dangling_questions = before - blocks.len();

    let before = blocks.len();
    blocks.retain(|b| passes_speaker_filter(b, config.max_interruption_words));
    let removed_multi_speaker = before - blocks.len();

    FilterResult {
        blocks,
        removed_short_openers,
        removed_dangling_questions,
        removed_multi_speaker,
    }
}
