use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use highlights::{
    check_meeting_supported, filter_candidates, generate_candidates, interest_levels,
    load_context, parse_abstractives, write_context, write_table, CandidateConfig,
    CombinedReport, EligibilityConfig, FilterConfig, HighlightsPipeline, MarkdownTableParser,
    PipelineConfig, SelectorConfig, TranscriptStore, CANDIDATE_TOPIC_COLUMNS, TOPIC_TITLE,
};

#[derive(Parser)]
#[command(name = "highlights")]
#[command(author, version, about = "Meeting highlights candidate and combination pipeline", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the candidate table for extractive selection
    Candidates {
        /// Pipeline context file (JSON)
        #[arg(short, long)]
        context: PathBuf,

        /// Output file for the updated context (JSON)
        #[arg(short, long)]
        output: PathBuf,

        /// Output file for the candidate table (Markdown)
        #[arg(long)]
        table: Option<PathBuf>,

        /// Meetings this many minutes long or shorter are rejected
        #[arg(long, default_value = "10")]
        min_duration_mins: f64,

        /// Meetings this many minutes long or longer are rejected
        #[arg(long, default_value = "90")]
        max_duration_mins: f64,

        /// Minimum candidate duration in seconds
        #[arg(long, default_value = "15.0")]
        duration_low: f64,

        /// Maximum candidate duration in seconds
        #[arg(long, default_value = "45.0")]
        duration_high: f64,

        /// Token budget for the candidate table
        #[arg(long, default_value = "128000")]
        token_budget: usize,

        /// Model whose tokenizer measures the budget
        #[arg(long, default_value = "gpt-4.1")]
        model: String,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Build the ranking stage input from the extractive selection
    RankingInput {
        /// Pipeline context file (JSON)
        #[arg(short, long)]
        context: PathBuf,

        /// Output file for the updated context (JSON)
        #[arg(short, long)]
        output: PathBuf,

        /// Output file for the ranking input table (Markdown)
        #[arg(long)]
        table: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Combine the abstractives with the best-ranked extractive
    Combine {
        /// Pipeline context file (JSON)
        #[arg(short, long)]
        context: PathBuf,

        /// Output file for the updated context (JSON)
        #[arg(short, long)]
        output: PathBuf,

        /// Output file for the combined table (Markdown)
        #[arg(long)]
        table: Option<PathBuf>,

        /// Output file for machine-readable combined rows (JSON)
        #[arg(long)]
        rows: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Report transcript and candidate statistics without writing anything
    Analyze {
        /// Pipeline context file (JSON)
        #[arg(short, long)]
        context: PathBuf,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Candidates {
            context,
            output,
            table,
            min_duration_mins,
            max_duration_mins,
            duration_low,
            duration_high,
            token_budget,
            model,
            verbose,
        } => {
            setup_logging(verbose);
            let config = PipelineConfig {
                eligibility: EligibilityConfig {
                    min_duration_secs: min_duration_mins * 60.0,
                    max_duration_secs: max_duration_mins * 60.0,
                },
                candidates: CandidateConfig {
                    duration_low_secs: duration_low,
                    duration_high_secs: duration_high,
                },
                filters: FilterConfig::default(),
                selector: SelectorConfig {
                    token_budget,
                    model_name: model,
                },
            };
            prepare_candidates(context, output, table, config)
        }
        Commands::RankingInput {
            context,
            output,
            table,
            verbose,
        } => {
            setup_logging(verbose);
            ranking_input(context, output, table)
        }
        Commands::Combine {
            context,
            output,
            table,
            rows,
            verbose,
        } => {
            setup_logging(verbose);
            combine(context, output, table, rows)
        }
        Commands::Analyze { context, verbose } => {
            setup_logging(verbose);
            analyze(context)
        }
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

fn prepare_candidates(
    context: PathBuf,
    output: PathBuf,
    table: Option<PathBuf>,
    config: PipelineConfig,
) -> Result<()> {
    info!("Loading context from {:?}", context);
    let mut ctx = load_context(&context)?;

    let pipeline = HighlightsPipeline::new(config);
    let summary = pipeline
        .prepare_candidates(&mut ctx)
        .context("Failed to prepare highlight candidates")?;

    info!(
        "Candidates: {} generated, {} after filtering, {} selected from topics {:?}",
        summary.generated_blocks,
        summary.filtered_blocks,
        summary.selected_blocks,
        summary.selected_topics
    );
    if !summary.skipped_topics.is_empty() {
        warn!(
            "Topics {:?} did not fit in the token budget",
            summary.skipped_topics
        );
    }

    write_context(&output, &ctx)?;
    info!("Context written to {:?}", output);

    if let (Some(path), Some(candidates)) = (table, ctx.candidate_blocks.as_deref()) {
        write_table(&path, candidates)?;
        info!("Candidate table written to {:?}", path);
    }

    Ok(())
}

fn ranking_input(context: PathBuf, output: PathBuf, table: Option<PathBuf>) -> Result<()> {
    info!("Loading context from {:?}", context);
    let mut ctx = load_context(&context)?;

    let rendered = HighlightsPipeline::new(PipelineConfig::default())
        .prepare_ranking_input(&mut ctx)
        .context("Failed to prepare ranking input")?;

    write_context(&output, &ctx)?;
    info!("Context written to {:?}", output);

    if let Some(path) = table {
        write_table(&path, &rendered)?;
        info!("Ranking input written to {:?}", path);
    }

    Ok(())
}

fn combine(
    context: PathBuf,
    output: PathBuf,
    table: Option<PathBuf>,
    rows: Option<PathBuf>,
) -> Result<()> {
    info!("Loading context from {:?}", context);
    let mut ctx = load_context(&context)?;

    let pipeline = HighlightsPipeline::new(PipelineConfig::default());
    let summary = match pipeline.combine(&mut ctx) {
        Ok(summary) => summary,
        Err(e) => {
            warn!("Extractive selection failed, continuing without it: {}", e);
            pipeline
                .combine_without_extractive(&mut ctx)
                .context("Failed to combine abstractives")?
        }
    };

    match &summary.winner {
        Some(winner) => info!(
            "Combined {} topics; extractive {} by {} in topic {}",
            summary.topics, winner.range, winner.speaker, winner.topic_index
        ),
        None => info!("Combined {} topics without an extractive", summary.topics),
    }

    write_context(&output, &ctx)?;
    info!("Context written to {:?}", output);

    if let (Some(path), Some(combined)) = (table, ctx.combined_input.as_deref()) {
        write_table(&path, combined)?;
        info!("Combined table written to {:?}", path);
    }

    if let Some(path) = rows {
        CombinedReport::from_summary(&summary).write_json(&path)?;
        info!("Combined rows written to {:?}", path);
    }

    Ok(())
}

fn analyze(context: PathBuf) -> Result<()> {
    info!("Analyzing context from {:?}", context);
    let ctx = load_context(&context)?;
    let transcript =
        TranscriptStore::from_blocks(&ctx.transcript).context("Failed to read transcript")?;

    println!("Transcript Analysis");
    println!("===================");
    println!("Utterances: {}", transcript.len());
    println!("Duration: {:.1}s", transcript.duration_secs());
    match check_meeting_supported(&transcript, &EligibilityConfig::default()) {
        Ok(()) => println!("Eligible for highlights: yes"),
        Err(e) => println!("Eligible for highlights: no ({})", e),
    }
    println!();

    println!("Speaker Statistics");
    println!("------------------");
    for speaker in transcript.speakers() {
        let spoken: Vec<_> = transcript
            .utterances()
            .iter()
            .filter(|u| u.speaker == speaker)
            .collect();
        let seconds: f64 = spoken.iter().map(|u| u.duration_secs()).sum();
        let words: usize = spoken
            .iter()
            .map(|u| u.text.split_whitespace().count())
            .sum();
        println!(
            "{}: {} utterances, {} words, {:.1}s",
            speaker,
            spoken.len(),
            words,
            seconds
        );
    }

    let Some(abstractives) = &ctx.abstractives_output else {
        println!();
        println!("No abstractives in context; skipping candidate statistics");
        return Ok(());
    };

    let topics = parse_abstractives(&MarkdownTableParser, abstractives, &CANDIDATE_TOPIC_COLUMNS)
        .context("Failed to parse abstractives table")?;
    let interests = interest_levels(&topics).context("Failed to read topic interest levels")?;
    let generated = generate_candidates(&transcript, &topics.ranges(), &CandidateConfig::default())?;
    let generated_counts: Vec<usize> = generated.iter().map(|t| t.blocks.len()).collect();
    let filtered = filter_candidates(generated, &FilterConfig::default());

    println!();
    println!("Topics");
    println!("------");
    for (index, topic) in topics.topics.iter().enumerate() {
        let title = topics.cell(index, TOPIC_TITLE).unwrap_or("-");
        let counts = filtered
            .topics
            .iter()
            .position(|t| t.topic_index == index)
            .map(|i| (generated_counts[i], filtered.topics[i].blocks.len()));
        match counts {
            Some((generated, kept)) => println!(
                "{} [{}] interest {}: {} candidates, {} after filtering",
                title, topic.range, interests[index], generated, kept
            ),
            None => println!(
                "{} [{}] interest {}: excluded",
                title, topic.range, interests[index]
            ),
        }
    }

    println!();
    println!(
        "Filtered out: {} short openers, {} dangling questions, {} multi-speaker",
        filtered.removed_short_openers,
        filtered.removed_dangling_questions,
        filtered.removed_multi_speaker
    );

    Ok(())
}
