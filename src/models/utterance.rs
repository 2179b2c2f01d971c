use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use super::{UtteranceBlock, UtteranceRange};
use crate::error::{HighlightsError, Result};

/// One transcribed speech turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Utterance {
    /// Position in the transcript; the only addressing scheme used by the pipeline
    pub index: usize,
    /// Display name of the speaker
    pub speaker: String,
    /// Start time in seconds from the beginning of the meeting
    pub start_secs: f64,
    /// End time in seconds from the beginning of the meeting
    pub end_secs: f64,
    /// Transcribed text
    pub text: String,
}

impl Utterance {
    pub fn duration_secs(&self) -> f64 {
        self.end_secs - self.start_secs
    }
}

/// Speaker entry of a transcript block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeakerInfo {
    #[serde(alias = "displayName", alias = "DisplayName")]
    pub display_name: String,
}

/// A timestamp as written by the transcription service: either seconds or a clock string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    Seconds(f64),
    Clock(String),
}

impl Timestamp {
    /// Convert to seconds, accepting `"12.5"` and `"00:01:02.250"`
    pub fn as_secs(&self) -> Option<f64> {
        match self {
            Timestamp::Seconds(secs) => Some(*secs),
            Timestamp::Clock(s) => {
                let s = s.trim();
                if let Ok(secs) = s.parse::<f64>() {
                    return Some(secs);
                }
                let time = NaiveTime::parse_from_str(s, "%H:%M:%S%.f").ok()?;
                Some(time.num_seconds_from_midnight() as f64 + time.nanosecond() as f64 / 1e9)
            }
        }
    }
}

/// Raw transcript block: parallel arrays indexed by utterance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranscriptBlock {
    #[serde(rename = "uttrances_start_times")]
    pub start_times: Vec<Timestamp>,
    #[serde(rename = "uttrances_end_times")]
    pub end_times: Vec<Timestamp>,
    #[serde(rename = "uttrances_texts")]
    pub texts: Vec<String>,
    #[serde(rename = "uttrances_ids")]
    pub ids: Vec<usize>,
    #[serde(rename = "uttrances_speakers_info")]
    pub speakers_info: Vec<SpeakerInfo>,
}

impl TranscriptBlock {
    fn utterance_count(&self) -> Result<usize> {
        let count = self.texts.len();
        let lengths = [
            self.start_times.len(),
            self.end_times.len(),
            self.ids.len(),
            self.speakers_info.len(),
        ];
        if lengths.iter().any(|&len| len != count) {
            return Err(HighlightsError::MalformedTranscript(format!(
                "block arrays have different lengths (texts {}, start times {}, end times {}, ids {}, speakers {})",
                count, lengths[0], lengths[1], lengths[2], lengths[3]
            )));
        }
        Ok(count)
    }
}

/// Read-only, densely indexed utterance sequence for one pipeline run
#[derive(Debug, Clone, Default)]
pub struct TranscriptStore {
    utterances: Vec<Utterance>,
}

impl TranscriptStore {
    /// Build the store from utterances whose indices must be `0..n` in order
    pub fn new(utterances: Vec<Utterance>) -> Result<Self> {
        for (position, utterance) in utterances.iter().enumerate() {
            if utterance.index != position {
                return Err(HighlightsError::MalformedTranscript(format!(
                    "utterance at position {} has index {}",
                    position, utterance.index
                )));
            }
            if utterance.end_secs < utterance.start_secs {
                return Err(HighlightsError::MalformedTranscript(format!(
                    "utterance {} ends before it starts",
                    utterance.index
                )));
            }
        }
        Ok(Self { utterances })
    }

    /// Concatenate raw transcript blocks into one store
    pub fn from_blocks(blocks: &[TranscriptBlock]) -> Result<Self> {
        let mut utterances = Vec::new();

        for block in blocks {
            let count = block.utterance_count()?;
            for i in 0..count {
                let index = block.ids[i];
                let read_time = |t: &Timestamp| {
                    t.as_secs().ok_or_else(|| {
                        HighlightsError::MalformedTranscript(format!(
                            "unreadable timestamp {:?} for utterance {}",
                            t, index
                        ))
                    })
                };

                utterances.push(Utterance {
                    index,
                    speaker: block.speakers_info[i].display_name.clone(),
                    start_secs: read_time(&block.start_times[i])?,
                    end_secs: read_time(&block.end_times[i])?,
                    text: block.texts[i].clone(),
                });
            }
        }

        Self::new(utterances)
    }

    pub fn len(&self) -> usize {
        self.utterances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.utterances.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Utterance> {
        self.utterances.get(index)
    }

    pub fn utterances(&self) -> &[Utterance] {
        &self.utterances
    }

    /// Utterances covered by `range`, or `None` if it runs past the transcript
    pub fn slice(&self, range: UtteranceRange) -> Option<&[Utterance]> {
        self.utterances.get(range.indices())
    }

    /// Materialize the block of utterances covered by `range`
    pub fn block(&self, range: UtteranceRange) -> Option<UtteranceBlock> {
        self.slice(range)
            .map(|utterances| UtteranceBlock::from_utterances(range, utterances))
    }

    /// Distinct speakers in order of first appearance
    pub fn speakers(&self) -> Vec<&str> {
        let mut speakers: Vec<&str> = Vec::new();
        for utterance in &self.utterances {
            if !speakers.contains(&utterance.speaker.as_str()) {
                speakers.push(&utterance.speaker);
            }
        }
        speakers
    }

    /// Wall-clock span from the first start to the last end
    pub fn duration_secs(&self) -> f64 {
        match (self.utterances.first(), self.utterances.last()) {
            (Some(first), Some(last)) => last.end_secs - first.start_secs,
            _ => 0.0,
        }
    }
}
