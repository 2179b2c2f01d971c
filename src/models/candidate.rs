use serde::{Deserialize, Serialize};

use super::{Utterance, UtteranceRange};

/// A contiguous run of utterances considered as a potential extractive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UtteranceBlock {
    pub range: UtteranceRange,
    /// Utterance texts, one per index in `range`
    pub texts: Vec<String>,
    /// Speaker display names, parallel to `texts`
    pub speakers: Vec<String>,
}

impl UtteranceBlock {
    pub fn from_utterances(range: UtteranceRange, utterances: &[Utterance]) -> Self {
        debug_assert_eq!(utterances.len(), range.utterance_count());
        Self {
            range,
            texts: utterances.iter().map(|u| u.text.clone()).collect(),
            speakers: utterances.iter().map(|u| u.speaker.clone()).collect(),
        }
    }

    pub fn first_text(&self) -> Option<&str> {
        self.texts.first().map(String::as_str)
    }

    pub fn last_text(&self) -> Option<&str> {
        self.texts.last().map(String::as_str)
    }

    /// Distinct speakers in order of first appearance
    pub fn distinct_speakers(&self) -> Vec<&str> {
        let mut distinct: Vec<&str> = Vec::new();
        for speaker in &self.speakers {
            if !distinct.contains(&speaker.as_str()) {
                distinct.push(speaker);
            }
        }
        distinct
    }

    /// Number of utterances attributed to `speaker`
    pub fn utterance_count_for(&self, speaker: &str) -> usize {
        self.speakers.iter().filter(|s| *s == speaker).count()
    }

    /// Total words spoken by `speaker` across the block
    pub fn word_count_for(&self, speaker: &str) -> usize {
        self.texts
            .iter()
            .zip(&self.speakers)
            .filter(|(_, s)| *s == speaker)
            .map(|(text, _)| text.split_whitespace().count())
            .sum()
    }

    /// All texts joined by single spaces
    pub fn joined_text(&self) -> String {
        self.texts
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A block chosen by the extractive selection stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractiveCandidateRow {
    pub range: UtteranceRange,
    pub text: String,
    pub selection_reason: String,
}

/// An extractive candidate with the scores assigned by the ranking stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCandidateRow {
    #[serde(flatten)]
    pub candidate: ExtractiveCandidateRow,
    pub clarity: bool,
    pub self_contained: bool,
    /// Level of interest, 0-100
    pub interest: u8,
    /// Unique 1..=N quality rank, 1 is best
    pub overall_rank: usize,
}

impl RankedCandidateRow {
    pub fn range(&self) -> UtteranceRange {
        self.candidate.range
    }
}
