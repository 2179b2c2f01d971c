use std::collections::HashMap;

use tracing::{debug, info, warn};

use super::TopicCandidates;
use crate::models::UtteranceBlock;
use crate::tables::{render_markdown, CANDIDATE_COLUMNS};
use crate::tokenizer::TokenCounter;

/// Configuration for the token-budgeted selector
#[derive(Debug, Clone)]
pub struct SelectorConfig {
    /// Maximum tokens of candidate table handed to the extractive stage
    pub token_budget: usize,
    /// Model whose tokenizer the budget is measured with
    pub model_name: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            token_budget: 128_000,
            model_name: "gpt-4.1".to_string(),
        }
    }
}

/// Result of Stage 2 selection
#[derive(Debug, Clone, Default)]
pub struct Stage2Result {
    /// Candidate table (`utterance_range | uttrances_texts`)
    pub table: String,
    /// Topics whose candidates were included, in chronological order
    pub selected_topics: Vec<usize>,
    /// Topics dropped because they did not fit in the remaining budget
    pub skipped_topics: Vec<usize>,
    /// Tokens consumed by the included topics
    pub tokens_used: usize,
    /// Number of candidate rows in `table`
    pub block_count: usize,
}

/// Execute Stage 2: token-budgeted candidate selection
///
/// `interests` holds every topic's level of interest, in topic order. Topics
/// are visited by descending interest (ties keep chronological order),
/// skipping the first and last topic. A topic's candidates are included all at
/// once if their table still fits within the budget, or not at all. The
/// included topics are emitted in chronological order.
pub fn select_candidates<T: TokenCounter + ?Sized>(
    interests: &[u8],
    candidates: &[TopicCandidates],
    tokenizer: &T,
    config: &SelectorConfig,
) -> Stage2Result {
    let by_topic: HashMap<usize, &[UtteranceBlock]> = candidates
        .iter()
        .map(|t| (t.topic_index, t.blocks.as_slice()))
        .collect();

    let mut order: Vec<usize> = (0..interests.len()).collect();
    order.sort_by(|a, b| interests[*b].cmp(&interests[*a]));

    let last = interests.len().saturating_sub(1);
    let mut result = Stage2Result::default();

    for topic_index in order {
        if topic_index == 0 || topic_index == last {
            continue;
        }
        let Some(blocks) = by_topic.get(&topic_index).filter(|b| !b.is_empty()) else {
            continue;
        };

        let rendered = render_markdown(&CANDIDATE_COLUMNS, &candidate_rows(blocks));
        let tokens = tokenizer.token_count(&rendered, &config.model_name);

        if result.tokens_used + tokens <= config.token_budget {
            debug!(
                "Topic {} (interest {}): {} blocks, {} tokens",
                topic_index,
                interests[topic_index],
                blocks.len(),
                tokens
            );
            result.tokens_used += tokens;
            result.selected_topics.push(topic_index);
        } else {
            debug!(
                "Topic {}: {} tokens exceed remaining budget of {}",
                topic_index,
                tokens,
                config.token_budget - result.tokens_used
            );
            result.skipped_topics.push(topic_index);
        }
    }

    result.selected_topics.sort_unstable();

    let rows: Vec<Vec<String>> = result
        .selected_topics
        .iter()
        .flat_map(|index| candidate_rows(by_topic[index]))
        .collect();
    result.block_count = rows.len();
    result.table = render_markdown(&CANDIDATE_COLUMNS, &rows);

    if result.block_count == 0 {
        warn!("Stage 2: no candidate blocks selected");
    }
    info!(
        "Stage 2: {} blocks from {} topics selected, {} topics over budget, {} of {} tokens used",
        result.block_count,
        result.selected_topics.len(),
        result.skipped_topics.len(),
        result.tokens_used,
        config.token_budget
    );

    result
}

/// One row per block: the range in list form and the texts as a JSON list
fn candidate_rows(blocks: &[UtteranceBlock]) -> Vec<Vec<String>> {
    blocks
        .iter()
        .map(|b| {
            let texts = serde_json::to_string(&b.texts).unwrap_or_default();
            vec![b.range.bracketed(), texts]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UtteranceRange;

    /// One token per table line
    struct LineCounter;

    impl TokenCounter for LineCounter {
        fn token_count(&self, text: &str, _model_name: &str) -> usize {
            text.lines().count()
        }
    }

    fn candidates(topic_index: usize, count: usize) -> TopicCandidates {
        TopicCandidates {
            topic_index,
            blocks: (0..count)
                .map(|i| {
                    let start = topic_index * 10 + i;
                    UtteranceBlock {
                        range: UtteranceRange::new(start, start).unwrap(),
                        texts: vec![format!("Text {}.", start)],
                        speakers: vec!["Ana".to_string()],
                    }
                })
                .collect(),
        }
    }

    fn config(budget: usize) -> SelectorConfig {
        SelectorConfig {
            token_budget: budget,
            ..Default::default()
        }
    }

    #[test]
    fn test_everything_fits() {
        let cands = vec![candidates(1, 2), candidates(2, 1)];

        let result = select_candidates(&[99, 10, 80, 99], &cands, &LineCounter, &config(1000));

        assert_eq!(result.selected_topics, vec![1, 2]);
        assert!(result.skipped_topics.is_empty());
        assert_eq!(result.block_count, 3);
        // 2 header lines + 2 rows, then 2 header lines + 1 row
        assert_eq!(result.tokens_used, 7);
        assert_eq!(
            result.table,
            "|utterance_range|uttrances_texts|\n|---|---|\n|[10, 10]|[\"Text 10.\"]|\n|[11, 11]|[\"Text 11.\"]|\n|[20, 20]|[\"Text 20.\"]|"
        );
    }

    #[test]
    fn test_budget_prefers_interesting_topics() {
        let cands = vec![candidates(1, 1), candidates(2, 3), candidates(3, 2)];

        // topic 2 costs 5, topic 3 costs 4, topic 1 costs 3
        let result = select_candidates(&[100, 20, 90, 50, 100], &cands, &LineCounter, &config(8));

        assert_eq!(result.selected_topics, vec![1, 2]);
        assert_eq!(result.skipped_topics, vec![3]);
        assert_eq!(result.tokens_used, 8);
        assert!(result.table.contains("|[20, 20]|"));
        assert!(!result.table.contains("|[30, 30]|"));
        // chronological output order
        let pos_1 = result.table.find("|[10, 10]|").unwrap();
        let pos_2 = result.table.find("|[20, 20]|").unwrap();
        assert!(pos_1 < pos_2);
    }

    #[test]
    fn test_topic_never_partially_included() {
        let cands = vec![candidates(1, 5)];

        let result = select_candidates(&[0, 50, 0], &cands, &LineCounter, &config(6));

        assert!(result.selected_topics.is_empty());
        assert_eq!(result.skipped_topics, vec![1]);
        assert_eq!(result.block_count, 0);
        assert_eq!(result.table, "|utterance_range|uttrances_texts|\n|---|---|");
    }

    #[test]
    fn test_empty_candidate_lists_skipped() {
        let cands = vec![candidates(1, 0), candidates(2, 1)];

        let result = select_candidates(&[0, 50, 40, 0], &cands, &LineCounter, &config(100));

        assert_eq!(result.selected_topics, vec![2]);
        assert!(result.skipped_topics.is_empty());
    }
}
