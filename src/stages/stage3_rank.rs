use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::error::{HighlightsError, Result};
use crate::models::{RankedCandidateRow, TopicRow};

/// A ranked candidate attributed to the topic containing it
#[derive(Debug, Clone, PartialEq)]
pub struct MatchedCandidate {
    pub topic_index: usize,
    pub row: RankedCandidateRow,
}

/// Attribute each ranked row to the single topic whose range contains it
pub fn match_topics(
    topics: &[TopicRow],
    rows: Vec<RankedCandidateRow>,
) -> Result<Vec<MatchedCandidate>> {
    rows.into_iter()
        .map(|row| {
            let range = row.range();
            let mut containing = topics
                .iter()
                .enumerate()
                .filter(|(_, topic)| topic.range.contains(&range))
                .map(|(index, _)| index);

            match (containing.next(), containing.next()) {
                (Some(topic_index), None) => Ok(MatchedCandidate { topic_index, row }),
                (None, _) => Err(HighlightsError::TopicRangeExtractionFailed(format!(
                    "candidate {} is not inside any topic",
                    range
                ))),
                (Some(first), Some(second)) => {
                    Err(HighlightsError::TopicRangeExtractionFailed(format!(
                        "candidate {} is inside both topic {} and topic {}",
                        range, first, second
                    )))
                }
            }
        })
        .collect()
}

/// Reduce the matched candidates to the single best self-contained one
///
/// 1. Keep self-contained rows
/// 2. Within each topic keep the rows at that topic's minimum rank
/// 3. Pick the survivor with the smallest rank; ties go to the lowest topic
///    index, then the lowest range start
pub fn select_winner(matched: Vec<MatchedCandidate>) -> Result<MatchedCandidate> {
    let total = matched.len();
    let self_contained: Vec<MatchedCandidate> = matched
        .into_iter()
        .filter(|m| m.row.self_contained)
        .collect();

    if self_contained.is_empty() {
        return Err(HighlightsError::NoSelfContainedHighlights);
    }
    debug!(
        "{} of {} ranked candidates are self-contained",
        self_contained.len(),
        total
    );

    let mut best_per_topic: BTreeMap<usize, Vec<MatchedCandidate>> = BTreeMap::new();
    for candidate in self_contained {
        let group = best_per_topic.entry(candidate.topic_index).or_default();
        match group.first().map(|g| g.row.overall_rank) {
            Some(min) if candidate.row.overall_rank > min => {}
            Some(min) if candidate.row.overall_rank < min => *group = vec![candidate],
            _ => group.push(candidate),
        }
    }

    let winner = best_per_topic
        .into_values()
        .flatten()
        .min_by_key(|m| (m.row.overall_rank, m.topic_index, m.row.range().start))
        .ok_or_else(|| {
            HighlightsError::HighlightsCandidateFilteringFailed(
                "no candidate survived rank filtering".to_string(),
            )
        })?;

    info!(
        "Stage 3: winning candidate {} in topic {} (rank {})",
        winner.row.range(),
        winner.topic_index,
        winner.row.overall_rank
    );

    Ok(winner)
}
