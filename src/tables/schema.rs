use std::collections::HashSet;

use tracing::debug;

use super::{find_column, render_markdown, Table, TableParser};
use crate::error::{HighlightsError, Result, TableKind};
use crate::models::{
    ExtractiveCandidateRow, RankedCandidateRow, StageOutput, TopicRow, TopicTable, UtteranceRange,
};

pub const TOPIC_TITLE: &str = "Topic title";
pub const TOPIC_RANGE: &str = "Topic Utterance Range";
pub const TOPIC_INTEREST: &str = "Level of interest";

pub const UTTERANCE_RANGE: &str = "utterance_range";
pub const UTTERANCE_TEXTS: &str = "uttrances_texts";
pub const SELECTION_REASON: &str = "selection_reason";
pub const IS_SELF_CONTAINED: &str = "is_self_contained";
pub const IS_ENGAGING: &str = "is_engaging";

pub const RANK_RANGE: &str = "range";
pub const CLARITY: &str = "clarity";
pub const SELF_CONTAINMENT: &str = "self-containment";
pub const RANK_INTEREST: &str = "level of interest";
pub const OVERALL_RANK: &str = "overall rank";

pub const TRANSITION: &str = "Transition sentence";
pub const EXTRACTIVE_RANGE: &str = "extractive range";
pub const EXTRACTIVE_TEXT: &str = "extractive text";
pub const SPEAKER: &str = "speaker";

/// Placeholder for an absent value in rendered tables
pub const NOT_AVAILABLE: &str = "NA";

/// Abstractive columns the candidate step reads
pub const CANDIDATE_TOPIC_COLUMNS: [&str; 2] = [TOPIC_RANGE, TOPIC_INTEREST];

/// Abstractive columns the combine step reads
pub const COMBINE_TOPIC_COLUMNS: [&str; 1] = [TOPIC_RANGE];

pub const CANDIDATE_COLUMNS: [&str; 2] = [UTTERANCE_RANGE, UTTERANCE_TEXTS];

pub const EXTRACTIVE_COLUMNS: [&str; 3] = [UTTERANCE_RANGE, UTTERANCE_TEXTS, SELECTION_REASON];

/// Annotation columns of the extractives table, removed before ranking
pub const EXTRACTIVE_ANNOTATION_COLUMNS: [&str; 3] = [SELECTION_REASON, IS_SELF_CONTAINED, IS_ENGAGING];

pub const RANKING_COLUMNS: [&str; 5] = [
    RANK_RANGE,
    CLARITY,
    SELF_CONTAINMENT,
    RANK_INTEREST,
    OVERALL_RANK,
];

/// Columns appended to the abstractive columns in the combined table
pub const COMBINED_EXTRA_COLUMNS: [&str; 4] = [TRANSITION, EXTRACTIVE_RANGE, EXTRACTIVE_TEXT, SPEAKER];

/// Parse the abstractives stage output into topics
///
/// Fails if any of `required` is missing; the topic range column is always
/// required and is the only one interpreted. All cells are kept verbatim.
pub fn parse_abstractives<P: TableParser + ?Sized>(
    parser: &P,
    output: &StageOutput,
    required: &[&str],
) -> Result<TopicTable> {
    let table = parse_table(parser, output, TableKind::Abstractives)?;

    let mut columns = vec![TOPIC_RANGE];
    columns.extend(required.iter().copied().filter(|c| *c != TOPIC_RANGE));
    require_columns(&table, TableKind::Abstractives, &columns)?;
    let range_column = column(&table, TOPIC_RANGE);

    let mut topics = Vec::with_capacity(table.len());
    for (row, cells) in table.rows.iter().enumerate() {
        let range = UtteranceRange::parse(table.cell(row, range_column)).map_err(|e| {
            HighlightsError::TopicRangeExtractionFailed(format!("topic {}: {}", row + 1, e))
        })?;
        topics.push(TopicRow {
            range,
            cells: cells.clone(),
        });
    }

    debug!("Parsed {} topics from abstractives table", topics.len());
    Ok(TopicTable {
        columns: table.columns,
        topics,
    })
}

/// Level of interest of every topic, 0-100
pub fn interest_levels(topics: &TopicTable) -> Result<Vec<u8>> {
    let column = find_column(&topics.columns, TOPIC_INTEREST).ok_or_else(|| {
        HighlightsError::TableMissingColumns {
            table: TableKind::Abstractives,
            missing: vec![TOPIC_INTEREST.to_string()],
        }
    })?;

    topics
        .topics
        .iter()
        .enumerate()
        .map(|(row, topic)| {
            let value = topic.cells.get(column).map(|c| c.trim()).unwrap_or("");
            parse_interest(value).ok_or_else(|| HighlightsError::TableParsing {
                table: TableKind::Abstractives,
                message: format!("row {}: invalid {} {:?}", row + 1, TOPIC_INTEREST, value),
            })
        })
        .collect()
}

/// Parse the extractive selection output
pub fn parse_extractives<P: TableParser + ?Sized>(
    parser: &P,
    output: &StageOutput,
) -> Result<Vec<ExtractiveCandidateRow>> {
    let table = parse_checked(parser, output, TableKind::Extractives, &EXTRACTIVE_COLUMNS)?;
    let col = |name| column(&table, name);

    let mut rows = Vec::with_capacity(table.len());
    for row in 0..table.len() {
        rows.push(ExtractiveCandidateRow {
            range: UtteranceRange::parse(table.cell(row, col(UTTERANCE_RANGE)))?,
            text: table.cell(row, col(UTTERANCE_TEXTS)).to_string(),
            selection_reason: table.cell(row, col(SELECTION_REASON)).to_string(),
        });
    }
    Ok(rows)
}

/// Render the extractives table as the ranking stage's input
///
/// The annotation columns must all be present and are removed; every other
/// column and row passes through unchanged.
pub fn ranking_input_table<P: TableParser + ?Sized>(
    parser: &P,
    output: &StageOutput,
) -> Result<String> {
    let table = parse_checked(parser, output, TableKind::Extractives, &EXTRACTIVE_ANNOTATION_COLUMNS)?;

    let dropped: Vec<usize> = EXTRACTIVE_ANNOTATION_COLUMNS
        .iter()
        .map(|name| column(&table, name))
        .collect();
    let kept: Vec<usize> = (0..table.columns.len())
        .filter(|i| !dropped.contains(i))
        .collect();
    if kept.is_empty() {
        return Err(HighlightsError::HighlightsRankingProcessingFailed(
            "extractives table has no columns left to rank".to_string(),
        ));
    }

    let columns: Vec<&str> = kept.iter().map(|&i| table.columns[i].as_str()).collect();
    let rows: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|row| kept.iter().map(|&i| row.get(i).cloned().unwrap_or_default()).collect())
        .collect();

    debug!(
        "Ranking input: {} rows, columns {:?}",
        rows.len(),
        columns
    );
    Ok(render_markdown(&columns, &rows))
}

/// Parse and validate the extractive ranking output
///
/// The rank column is coerced first and must hold a permutation of `1..=N`.
pub fn parse_ranking<P: TableParser + ?Sized>(
    parser: &P,
    output: &StageOutput,
) -> Result<Vec<RankedCandidateRow>> {
    let table = parse_table(parser, output, TableKind::Extractives)?;
    if table.is_empty() {
        return Err(HighlightsError::EmptyHighlights);
    }
    require_columns(&table, TableKind::Extractives, &RANKING_COLUMNS)?;
    let col = |name| column(&table, name);

    let ranks = parse_ranks(&table, col(OVERALL_RANK))?;

    let invalid = |row: usize, name: &str, value: &str| {
        HighlightsError::HighlightsCandidateFilteringFailed(format!(
            "ranking row {}: invalid {} {:?}",
            row + 1,
            name,
            value
        ))
    };

    let mut rows = Vec::with_capacity(table.len());
    for (row, overall_rank) in ranks.into_iter().enumerate() {
        let range = UtteranceRange::parse(table.cell(row, col(RANK_RANGE)))?;

        let clarity = table.cell(row, col(CLARITY));
        let clarity = parse_bool(clarity).ok_or_else(|| invalid(row, CLARITY, clarity))?;

        let contained = table.cell(row, col(SELF_CONTAINMENT));
        let self_contained =
            parse_bool(contained).ok_or_else(|| invalid(row, SELF_CONTAINMENT, contained))?;

        let interest = table.cell(row, col(RANK_INTEREST));
        let interest = parse_interest(interest).ok_or_else(|| invalid(row, RANK_INTEREST, interest))?;

        rows.push(RankedCandidateRow {
            candidate: ExtractiveCandidateRow {
                range,
                text: String::new(),
                selection_reason: String::new(),
            },
            clarity,
            self_contained,
            interest,
            overall_rank,
        });
    }
    Ok(rows)
}

fn parse_ranks(table: &Table, column: usize) -> Result<Vec<usize>> {
    let n = table.len();
    let mut seen = HashSet::with_capacity(n);
    let mut ranks = Vec::with_capacity(n);

    for row in 0..n {
        let value = table.cell(row, column);
        let rank: usize = value.parse().map_err(|_| {
            HighlightsError::InvalidOverallRank(format!("row {}: {:?} is not an integer", row + 1, value))
        })?;
        if rank == 0 || rank > n {
            return Err(HighlightsError::InvalidOverallRank(format!(
                "row {}: rank {} outside 1..={}",
                row + 1,
                rank,
                n
            )));
        }
        if !seen.insert(rank) {
            return Err(HighlightsError::InvalidOverallRank(format!(
                "rank {} appears more than once",
                rank
            )));
        }
        ranks.push(rank);
    }
    Ok(ranks)
}

fn parse_table<P: TableParser + ?Sized>(
    parser: &P,
    output: &StageOutput,
    kind: TableKind,
) -> Result<Table> {
    let parsed = parser
        .parse_table(&output.text, output.end_reason)
        .map_err(|e| HighlightsError::TableParsing {
            table: kind,
            message: e.to_string(),
        })?;
    debug!("Parsed {} table:\n{}", kind, parsed.raw_debug);
    Ok(parsed.table)
}

fn require_columns(table: &Table, kind: TableKind, required: &[&str]) -> Result<()> {
    let missing = table.missing_columns(required);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(HighlightsError::TableMissingColumns {
            table: kind,
            missing,
        })
    }
}

fn parse_checked<P: TableParser + ?Sized>(
    parser: &P,
    output: &StageOutput,
    kind: TableKind,
    required: &[&str],
) -> Result<Table> {
    let table = parse_table(parser, output, kind)?;
    require_columns(&table, kind, required)?;
    Ok(table)
}

// Only called after require_columns succeeded for `name`.
fn column(table: &Table, name: &str) -> usize {
    table.column_index(name).unwrap_or(usize::MAX)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

fn parse_interest(value: &str) -> Option<u8> {
    value.trim().parse::<u8>().ok().filter(|v| *v <= 100)
}
