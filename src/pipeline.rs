use std::collections::HashMap;

use tracing::{info, warn};

use crate::error::{HighlightsError, Result};
use crate::filters::FilterConfig;
use crate::models::{CombinedTable, HighlightsContext, StageOutput, TopicTable, TranscriptStore};
use crate::stages::{
    check_meeting_supported, combine_tables, filter_candidates, generate_candidates, match_topics,
    render_combined, resolve_winner, select_candidates, select_winner, CandidateConfig,
    EligibilityConfig, SelectorConfig, WinningExtractive,
};
use crate::tables::{
    interest_levels, parse_abstractives, parse_extractives, parse_ranking, ranking_input_table,
    MarkdownTableParser, TableParser, CANDIDATE_TOPIC_COLUMNS, COMBINE_TOPIC_COLUMNS,
};
use crate::tokenizer::{EstimatingTokenCounter, TokenCounter};

/// Configuration for every stage of the pipeline
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    pub eligibility: EligibilityConfig,
    pub candidates: CandidateConfig,
    pub filters: FilterConfig,
    pub selector: SelectorConfig,
}

/// Outcome of the candidate step
#[derive(Debug, Clone)]
pub struct CandidateSummary {
    pub topics: usize,
    pub generated_blocks: usize,
    pub filtered_blocks: usize,
    pub selected_blocks: usize,
    pub selected_topics: Vec<usize>,
    pub skipped_topics: Vec<usize>,
    pub tokens_used: usize,
}

/// Outcome of the combine step
#[derive(Debug, Clone)]
pub struct CombineSummary {
    pub topics: usize,
    pub winner: Option<WinningExtractive>,
    pub combined: CombinedTable,
}

/// Runs the highlights stages over a [`HighlightsContext`]
///
/// The table parser and tokenizer are collaborators; the defaults are the
/// built-in Markdown parser and the character-based token estimate.
pub struct HighlightsPipeline<P = MarkdownTableParser, T = EstimatingTokenCounter> {
    parser: P,
    tokenizer: T,
    config: PipelineConfig,
}

impl HighlightsPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self::with_collaborators(MarkdownTableParser, EstimatingTokenCounter, config)
    }
}

impl<P: TableParser, T: TokenCounter> HighlightsPipeline<P, T> {
    pub fn with_collaborators(parser: P, tokenizer: T, config: PipelineConfig) -> Self {
        Self {
            parser,
            tokenizer,
            config,
        }
    }

    /// Build the candidate table for the extractive selection stage
    ///
    /// Rejects meetings outside the configured length limits first. Reads the
    /// transcript and the abstractives output, writes `candidate_blocks`.
    pub fn prepare_candidates(&self, ctx: &mut HighlightsContext) -> Result<CandidateSummary> {
        if ctx.transcript.is_empty() {
            return Err(HighlightsError::MeetingContextsBlocksMissing);
        }
        let transcript = TranscriptStore::from_blocks(&ctx.transcript)?;
        check_meeting_supported(&transcript, &self.config.eligibility)?;

        let topics = self.abstractives(ctx, &CANDIDATE_TOPIC_COLUMNS)?;
        let interests = interest_levels(&topics)?;
        info!(
            "Preparing candidates: {} utterances, {} topics",
            transcript.len(),
            topics.len()
        );

        let generated = generate_candidates(&transcript, &topics.ranges(), &self.config.candidates)?;
        let generated_blocks = generated.iter().map(|t| t.blocks.len()).sum();

        let filtered = filter_candidates(generated, &self.config.filters);
        let selection = select_candidates(
            &interests,
            &filtered.topics,
            &self.tokenizer,
            &self.config.selector,
        );

        ctx.candidate_blocks = Some(selection.table);

        Ok(CandidateSummary {
            topics: topics.len(),
            generated_blocks,
            filtered_blocks: filtered.remaining(),
            selected_blocks: selection.block_count,
            selected_topics: selection.selected_topics,
            skipped_topics: selection.skipped_topics,
            tokens_used: selection.tokens_used,
        })
    }

    /// Build the ranking stage input from the extractive selection output
    ///
    /// The annotation columns are dropped and the remaining columns rendered
    /// into `ranking_input`. Returns the rendered table.
    pub fn prepare_ranking_input(&self, ctx: &mut HighlightsContext) -> Result<String> {
        let extractives = ctx
            .extractives_output
            .as_ref()
            .ok_or(HighlightsError::MissingContextValue("extractives_output"))?;
        let table = ranking_input_table(&self.parser, extractives)?;
        info!(
            "Ranking input prepared: {} candidate rows",
            table.lines().count().saturating_sub(2)
        );

        ctx.ranking_input = Some(table.clone());
        Ok(table)
    }

    /// Combine the abstractives table with the best-ranked extractive
    ///
    /// Reads the transcript, the abstractives output, the ranking output and,
    /// when present, the extractive selection output. Writes `combined_input`.
    pub fn combine(&self, ctx: &mut HighlightsContext) -> Result<CombineSummary> {
        let transcript = TranscriptStore::from_blocks(&ctx.transcript)?;
        let topics = self.abstractives(ctx, &COMBINE_TOPIC_COLUMNS)?;

        let ranking = ctx
            .extractives_ranking_output
            .as_ref()
            .ok_or(HighlightsError::MissingContextValue("extractives_ranking_output"))?;
        let mut rows = parse_ranking(&self.parser, ranking)?;

        if let Some(extractives) = &ctx.extractives_output {
            let selected: HashMap<_, _> = parse_extractives(&self.parser, extractives)?
                .into_iter()
                .map(|row| (row.range, row))
                .collect();
            for row in &mut rows {
                if let Some(source) = selected.get(&row.range()) {
                    row.candidate.text = source.text.clone();
                    row.candidate.selection_reason = source.selection_reason.clone();
                }
            }
        }

        let matched = match_topics(&topics.topics, rows)?;
        let winner = select_winner(matched)?;
        let winner = resolve_winner(&transcript, &winner)?;

        let combined = combine_tables(topics, Some(&winner));
        ctx.combined_input = Some(render_combined(&combined));

        Ok(CombineSummary {
            topics: combined.len(),
            winner: Some(winner),
            combined,
        })
    }

    /// Combined table with no extractive, for meetings where `combine` failed
    pub fn combine_without_extractive(&self, ctx: &mut HighlightsContext) -> Result<CombineSummary> {
        let topics = self.abstractives(ctx, &COMBINE_TOPIC_COLUMNS)?;
        warn!("Combining {} topics without an extractive", topics.len());

        let combined = combine_tables(topics, None);
        ctx.combined_input = Some(render_combined(&combined));

        Ok(CombineSummary {
            topics: combined.len(),
            winner: None,
            combined,
        })
    }

    fn abstractives(&self, ctx: &HighlightsContext, required: &[&str]) -> Result<TopicTable> {
        let output: &StageOutput = ctx
            .abstractives_output
            .as_ref()
            .ok_or(HighlightsError::MissingContextValue("abstractives_output"))?;
        parse_abstractives(&self.parser, output, required)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SpeakerInfo, Timestamp, TranscriptBlock};
    use crate::error::TableKind;

    /// 90 utterances, 8 seconds each (12 minutes); Ana speaks except in 60-69 (Ben)
    fn transcript_block() -> TranscriptBlock {
        transcript_of(90, 8.0)
    }

    fn transcript_of(n: usize, secs: f64) -> TranscriptBlock {
        TranscriptBlock {
            start_times: (0..n).map(|i| Timestamp::Seconds(i as f64 * secs)).collect(),
            end_times: (0..n).map(|i| Timestamp::Seconds(i as f64 * secs + secs)).collect(),
            texts: (0..n).map(|i| format!("Point number {} is settled.", i)).collect(),
            ids: (0..n).collect(),
            speakers_info: (0..n)
                .map(|i| SpeakerInfo {
                    display_name: if (60..70).contains(&i) { "Ben" } else { "Ana" }.to_string(),
                })
                .collect(),
        }
    }

    const ABSTRACTIVES: &str = "<Copilot Response>
|Topic title|Topic Utterance Range|Narration|Playback Video Start Utterance Index|Is topic taken from meeting intro|Category|Level of interest|
|-----------|---------------------|---------|------------------------------------|---------------------------------|--------|-----------------|
|Welcome|0-15|The meeting opened with introductions.|5|False|other|10|
|Roadmap|16-34|The team reviewed the roadmap.|20|False|important feedback|60|
|Launch|35-50|A launch date was announced.|40|False|exciting news|90|
|Demo|51-80|Ben demoed the new editor.|62|False|live demo|75|
|Wrap-up|81-89|The meeting closed with action items.|85|False|other|30|
</Copilot Response>";

    fn ranking(rows: &[(&str, &str, &str)]) -> StageOutput {
        let mut text = String::from(
            "|range|clarity|self-containment|level of interest|overall rank|\n|-----|-------|----------------|-----------------|------------|\n",
        );
        for (range, contained, rank) in rows {
            text.push_str(&format!("|{}|true|{}|70|{}|\n", range, contained, rank));
        }
        StageOutput::new(text)
    }

    fn context(ranking_rows: &[(&str, &str, &str)]) -> HighlightsContext {
        HighlightsContext {
            transcript: vec![transcript_block()],
            abstractives_output: Some(StageOutput::new(ABSTRACTIVES)),
            extractives_ranking_output: Some(ranking(ranking_rows)),
            ..Default::default()
        }
    }

    fn combined_rows(ctx: &HighlightsContext) -> Vec<Vec<String>> {
        ctx.combined_input
            .as_ref()
            .unwrap()
            .lines()
            .skip(2)
            .map(|line| {
                line.trim_matches('|')
                    .split('|')
                    .map(str::to_string)
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_happy_path_combination() {
        let mut ctx = context(&[
            ("20-24", "true", "2"),
            ("40-44", "true", "1"),
            ("[60, 63]", "false", "3"),
        ]);

        let summary = HighlightsPipeline::new(PipelineConfig::default())
            .combine(&mut ctx)
            .unwrap();

        let winner = summary.winner.unwrap();
        assert_eq!(winner.topic_index, 2);
        assert_eq!(winner.range.to_string(), "40-44");
        assert_eq!(winner.speaker, "Ana");

        let rows = combined_rows(&ctx);
        assert_eq!(rows.len(), 5);
        for (i, row) in rows.iter().enumerate() {
            if i == 2 {
                assert_eq!(row[8], "40-44");
                assert!(row[9].starts_with("Point number 40 is settled."));
                assert_eq!(row[10], "Ana");
            } else {
                assert_eq!(&row[8..], &["NA", "NA", "NA"]);
            }
            assert_eq!(row[7], "NA");
        }
    }

    #[test]
    fn test_no_self_contained_candidates() {
        let mut ctx = context(&[("20-24", "false", "1"), ("40-44", "false", "2")]);

        let err = HighlightsPipeline::new(PipelineConfig::default())
            .combine(&mut ctx)
            .unwrap_err();

        assert_eq!(err, HighlightsError::NoSelfContainedHighlights);
        assert!(ctx.combined_input.is_none());
    }

    #[test]
    fn test_empty_ranking_table() {
        let mut ctx = context(&[]);

        let err = HighlightsPipeline::new(PipelineConfig::default())
            .combine(&mut ctx)
            .unwrap_err();

        assert_eq!(err, HighlightsError::EmptyHighlights);
    }

    #[test]
    fn test_malformed_rank_column() {
        let mut ctx = context(&[("20-24", "true", "first"), ("40-44", "true", "2")]);

        let err = HighlightsPipeline::new(PipelineConfig::default())
            .combine(&mut ctx)
            .unwrap_err();

        assert!(matches!(err, HighlightsError::InvalidOverallRank(_)));
    }

    #[test]
    fn test_candidate_outside_topics() {
        let mut ctx = context(&[("95-97", "true", "1")]);

        let err = HighlightsPipeline::new(PipelineConfig::default())
            .combine(&mut ctx)
            .unwrap_err();

        assert!(matches!(err, HighlightsError::TopicRangeExtractionFailed(_)));
    }

    #[test]
    fn test_selection_reason_joined_from_extractives() {
        let mut ctx = context(&[("40-44", "true", "1")]);
        ctx.extractives_output = Some(StageOutput::new(
            "|utterance_range|uttrances_texts|selection_reason|is_self_contained|is_engaging|\n|---|---|---|---|---|\n|40-44|Point number 40...|exciting news or declaration|true|true|",
        ));

        let summary = HighlightsPipeline::new(PipelineConfig::default())
            .combine(&mut ctx)
            .unwrap();

        let winner = summary.winner.unwrap();
        assert_eq!(winner.selection_reason, "exciting news or declaration");
        assert!(winner.text.starts_with("Point number 40 is settled."));
    }

    #[test]
    fn test_fallback_without_extractive() {
        let mut ctx = context(&[]);
        let pipeline = HighlightsPipeline::new(PipelineConfig::default());

        assert!(pipeline.combine(&mut ctx).is_err());
        let summary = pipeline.combine_without_extractive(&mut ctx).unwrap();

        assert_eq!(summary.topics, 5);
        assert!(summary.winner.is_none());
        assert_eq!(summary.combined.extractive_row(), None);
        assert!(combined_rows(&ctx).iter().all(|row| row[8] == "NA"));
    }

    #[test]
    fn test_missing_context_values() {
        let pipeline = HighlightsPipeline::new(PipelineConfig::default());

        let mut ctx = context(&[("40-44", "true", "1")]);
        ctx.extractives_ranking_output = None;
        assert_eq!(
            pipeline.combine(&mut ctx).unwrap_err(),
            HighlightsError::MissingContextValue("extractives_ranking_output")
        );

        let mut ctx = HighlightsContext::default();
        assert_eq!(
            pipeline.prepare_candidates(&mut ctx).unwrap_err(),
            HighlightsError::MeetingContextsBlocksMissing
        );

        let mut ctx = context(&[]);
        ctx.abstractives_output = None;
        assert_eq!(
            pipeline.prepare_candidates(&mut ctx).unwrap_err(),
            HighlightsError::MissingContextValue("abstractives_output")
        );
        assert_eq!(
            pipeline.prepare_ranking_input(&mut ctx).unwrap_err(),
            HighlightsError::MissingContextValue("extractives_output")
        );
    }

    #[test]
    fn test_prepare_candidates() {
        let mut ctx = context(&[]);
        let config = PipelineConfig {
            candidates: CandidateConfig {
                duration_low_secs: 15.0,
                duration_high_secs: 20.0,
            },
            ..Default::default()
        };

        let summary = HighlightsPipeline::new(config)
            .prepare_candidates(&mut ctx)
            .unwrap();

        assert_eq!(summary.topics, 5);
        assert_eq!(summary.selected_topics, vec![1, 2, 3]);
        assert!(summary.skipped_topics.is_empty());
        assert!(summary.filtered_blocks <= summary.generated_blocks);
        assert_eq!(summary.selected_blocks, summary.filtered_blocks);

        let table = ctx.candidate_blocks.unwrap();
        assert!(table.starts_with("|utterance_range|uttrances_texts|\n|---|---|\n"));
        assert!(table.contains("|[16, 17]|[\"Point number 16 is settled.\",\"Point number 17 is settled.\"]|"));
        // intro and outro never contribute candidates
        assert!(!table.contains("|[0, 1]|"));
        assert!(!table.contains("|[81, 82]|"));
        // Ana-Ben boundary blocks in the demo topic are dropped
        assert!(!table.contains("|[59, 60]|"));
        assert!(!table.contains("|[69, 70]|"));
        assert!(table.contains("|[60, 61]|"));
    }

    #[test]
    fn test_meeting_length_gate() {
        let pipeline = HighlightsPipeline::new(PipelineConfig::default());

        // 90 utterances of 5 seconds: seven and a half minutes
        let mut ctx = context(&[]);
        ctx.transcript = vec![transcript_of(90, 5.0)];
        assert_eq!(
            pipeline.prepare_candidates(&mut ctx).unwrap_err(),
            HighlightsError::MeetingDurationTooShort(7.5)
        );
        assert!(ctx.candidate_blocks.is_none());

        // 90 utterances of 60 seconds: an hour and a half
        ctx.transcript = vec![transcript_of(90, 60.0)];
        assert_eq!(
            pipeline.prepare_candidates(&mut ctx).unwrap_err(),
            HighlightsError::MeetingDurationTooLong(90.0)
        );

        let lenient = HighlightsPipeline::new(PipelineConfig {
            eligibility: EligibilityConfig {
                min_duration_secs: 60.0,
                max_duration_secs: 3600.0,
            },
            ..Default::default()
        });
        ctx.transcript = vec![transcript_of(90, 5.0)];
        assert!(lenient.prepare_candidates(&mut ctx).is_ok());
    }

    const MINIMAL_ABSTRACTIVES: &str = "|Topic title|Topic Utterance Range|Playback Video Start Utterance Index|Level of interest|
|---|---|---|---|
|Welcome|[0, 15]|n/a|10|
|Roadmap|[16, 34]|n/a|60|
|Launch|[35, 50]|n/a|90|
|Wrap-up|[51, 89]|n/a|30|";

    #[test]
    fn test_abstractives_without_optional_columns() {
        let pipeline = HighlightsPipeline::new(PipelineConfig::default());
        let mut ctx = context(&[("40-44", "true", "1")]);
        ctx.abstractives_output = Some(StageOutput::new(MINIMAL_ABSTRACTIVES));

        let summary = pipeline.prepare_candidates(&mut ctx).unwrap();
        assert_eq!(summary.topics, 4);
        assert_eq!(summary.selected_topics, vec![1, 2]);

        let summary = pipeline.combine(&mut ctx).unwrap();
        assert_eq!(summary.winner.unwrap().topic_index, 2);

        let combined = ctx.combined_input.unwrap();
        assert!(combined.starts_with(
            "|Topic title|Topic Utterance Range|Playback Video Start Utterance Index|Level of interest|Transition sentence|"
        ));
        assert!(combined.contains("|Launch|[35, 50]|n/a|90|NA|40-44|"));
    }

    #[test]
    fn test_combine_only_needs_topic_ranges() {
        let mut ctx = context(&[("40-44", "true", "1")]);
        ctx.abstractives_output = Some(StageOutput::new(
            "|Topic Utterance Range|Is topic taken from meeting intro|Mood|\n|---|---|---|\n|0-34|false|calm|\n|[35, 50]|false|upbeat|\n|51-89|false|calm|",
        ));
        let pipeline = HighlightsPipeline::new(PipelineConfig::default());

        pipeline.combine(&mut ctx).unwrap();
        let rows = combined_rows(&ctx);
        assert_eq!(rows.len(), 3);
        assert_eq!(&rows[1][..5], &["[35, 50]", "false", "upbeat", "NA", "40-44"]);
        assert_eq!(rows[1][6], "Ana");
        assert_eq!(&rows[0][..4], &["0-34", "false", "calm", "NA"]);

        // the candidate step still needs interest levels
        assert_eq!(
            pipeline.prepare_candidates(&mut ctx).unwrap_err(),
            HighlightsError::TableMissingColumns {
                table: TableKind::Abstractives,
                missing: vec!["Level of interest".to_string()],
            }
        );
    }

    #[test]
    fn test_prepare_ranking_input() {
        let mut ctx = context(&[]);
        ctx.extractives_output = Some(StageOutput::new(
            "|utterance_range|uttrances_texts|selection_reason|is_self_contained|is_engaging|\n|---|---|---|---|---|\n|40-44|Point number 40...|exciting news or declaration|true|true|\n|[60, 63]|Point number 60...|live demo|false|true|",
        ));

        let table = HighlightsPipeline::new(PipelineConfig::default())
            .prepare_ranking_input(&mut ctx)
            .unwrap();

        assert_eq!(
            table,
            "|utterance_range|uttrances_texts|\n|---|---|\n|40-44|Point number 40...|\n|[60, 63]|Point number 60...|"
        );
        assert_eq!(ctx.ranking_input.as_deref(), Some(table.as_str()));
    }

    #[test]
    fn test_prepare_ranking_input_missing_annotations() {
        let mut ctx = context(&[]);
        ctx.extractives_output = Some(StageOutput::new(
            "|utterance_range|uttrances_texts|selection_reason|\n|---|---|---|\n|40-44|Point number 40...|live demo|",
        ));

        let err = HighlightsPipeline::new(PipelineConfig::default())
            .prepare_ranking_input(&mut ctx)
            .unwrap_err();

        assert_eq!(
            err,
            HighlightsError::TableMissingColumns {
                table: TableKind::Extractives,
                missing: vec!["is_self_contained".to_string(), "is_engaging".to_string()],
            }
        );
        assert!(ctx.ranking_input.is_none());
    }

    #[test]
    fn test_prepare_candidates_respects_budget() {
        let mut ctx = context(&[]);
        let config = PipelineConfig {
            selector: SelectorConfig {
                token_budget: 0,
                ..Default::default()
            },
            ..Default::default()
        };

        let summary = HighlightsPipeline::new(config)
            .prepare_candidates(&mut ctx)
            .unwrap();

        assert!(summary.selected_topics.is_empty());
        assert_eq!(summary.skipped_topics.len(), 3);
        assert_eq!(summary.selected_blocks, 0);
    }
}
