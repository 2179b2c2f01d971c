use tracing::{info, warn};

use crate::error::{HighlightsError, Result};
use crate::models::TranscriptStore;

/// Meeting length limits for highlights generation
#[derive(Debug, Clone)]
pub struct EligibilityConfig {
    /// Meetings this short or shorter are rejected
    pub min_duration_secs: f64,
    /// Meetings this long or longer are rejected
    pub max_duration_secs: f64,
}

impl Default for EligibilityConfig {
    fn default() -> Self {
        Self {
            min_duration_secs: 10.0 * 60.0,
            max_duration_secs: 90.0 * 60.0,
        }
    }
}

/// Reject meetings that cannot produce highlights
///
/// The duration runs from the first utterance's start to the last one's end
/// and must lie strictly between the configured limits.
pub fn check_meeting_supported(transcript: &TranscriptStore, config: &EligibilityConfig) -> Result<()> {
    if transcript.is_empty() {
        warn!("Transcript has no timestamped utterances");
        return Err(HighlightsError::MeetingTimestampDataMissing);
    }

    let secs = transcript.duration_secs();
    let minutes = secs / 60.0;
    if secs <= config.min_duration_secs {
        return Err(HighlightsError::MeetingDurationTooShort(minutes));
    }
    if secs >= config.max_duration_secs {
        return Err(HighlightsError::MeetingDurationTooLong(minutes));
    }

    info!("Meeting of {:.1} minutes is eligible for highlights", minutes);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Utterance;

    /// Two utterances spanning `secs` seconds
    fn transcript(secs: f64) -> TranscriptStore {
        TranscriptStore::new(vec![
            Utterance {
                index: 0,
                speaker: "Ana".to_string(),
                start_secs: 0.0,
                end_secs: 5.0,
                text: "Welcome.".to_string(),
            },
            Utterance {
                index: 1,
                speaker: "Ana".to_string(),
                start_secs: secs - 5.0,
                end_secs: secs,
                text: "Thanks all.".to_string(),
            },
        ])
        .unwrap()
    }

    #[test]
    fn test_duration_limits() {
        let config = EligibilityConfig::default();

        assert_eq!(
            check_meeting_supported(&transcript(600.0), &config),
            Err(HighlightsError::MeetingDurationTooShort(10.0))
        );
        assert!(check_meeting_supported(&transcript(601.0), &config).is_ok());
        assert!(check_meeting_supported(&transcript(5399.0), &config).is_ok());
        assert_eq!(
            check_meeting_supported(&transcript(5400.0), &config),
            Err(HighlightsError::MeetingDurationTooLong(90.0))
        );
    }

    #[test]
    fn test_custom_limits() {
        let config = EligibilityConfig {
            min_duration_secs: 60.0,
            max_duration_secs: 120.0,
        };

        assert!(check_meeting_supported(&transcript(90.0), &config).is_ok());
        assert!(check_meeting_supported(&transcript(600.0), &config).is_err());
    }

    #[test]
    fn test_empty_transcript() {
        let empty = TranscriptStore::new(Vec::new()).unwrap();

        assert_eq!(
            check_meeting_supported(&empty, &EligibilityConfig::default()),
            Err(HighlightsError::MeetingTimestampDataMissing)
        );
    }
}
