use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use pronunciation_feedback::{
    execute_analysis, execute_personalized, execute_prepare, parse_score, parse_word_scores,
    AnthropicClient, AnthropicConfig, AnthropicSummarizer, DataPaths, HistorySummarizer,
    NewUtterance, PersonalizedFeedbackLog, PrepareConfig, RecordStore, RuleBasedSummarizer,
    ScoreSet, ValidationError, WordScore,
};

#[derive(Parser)]
#[command(name = "pronunciation-feedback")]
#[command(author, version, about = "Pronunciation scoring and feedback generation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build (or load) the record store and fill in missing analysis feedback
    Prepare {
        /// Directory holding the record store and the raw corpus
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,

        /// Utterances processed between store flushes
        #[arg(long, default_value = "100")]
        batch_size: usize,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Generate analysis and personalized feedback for an utterance
    Feedback {
        /// Speaker ID (e.g., 0001)
        #[arg(long)]
        speaker_id: String,

        /// Utterance ID (e.g., 000010200)
        #[arg(long)]
        utt_id: String,

        /// The spoken text (e.g., 'HELLO WORLD')
        #[arg(long)]
        text: String,

        /// Accuracy score, 0-10
        #[arg(long, value_parser = accuracy_score)]
        accuracy: f64,

        /// Fluency score, 0-10
        #[arg(long, value_parser = fluency_score)]
        fluency: f64,

        /// Prosodic score, 0-10
        #[arg(long, value_parser = prosodic_score)]
        prosodic: f64,

        /// Completeness score, 0-10
        #[arg(long, value_parser = completeness_score)]
        completeness: f64,

        /// JSON array of word scores
        #[arg(long, value_parser = word_scores)]
        word_scores: WordScoresArg,

        /// Directory holding the record store
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,

        /// Summarize history without calling the LLM
        #[arg(long)]
        offline: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Print a speaker's stored utterances and feedback
    History {
        /// Speaker ID (e.g., 0001)
        #[arg(long)]
        speaker_id: String,

        /// Directory holding the record store
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

#[derive(Debug, Clone)]
struct WordScoresArg(Vec<WordScore>);

fn word_scores(raw: &str) -> Result<WordScoresArg, ValidationError> {
    parse_word_scores(raw).map(WordScoresArg)
}

fn accuracy_score(raw: &str) -> Result<f64, ValidationError> {
    parse_score("accuracy", raw)
}

fn fluency_score(raw: &str) -> Result<f64, ValidationError> {
    parse_score("fluency", raw)
}

fn prosodic_score(raw: &str) -> Result<f64, ValidationError> {
    parse_score("prosodic", raw)
}

fn completeness_score(raw: &str) -> Result<f64, ValidationError> {
    parse_score("completeness", raw)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Prepare {
            data_dir,
            batch_size,
            verbose,
        } => {
            setup_logging(verbose);
            prepare(DataPaths::under(&data_dir), batch_size)
        }
        Commands::Feedback {
            speaker_id,
            utt_id,
            text,
            accuracy,
            fluency,
            prosodic,
            completeness,
            word_scores,
            data_dir,
            offline,
            verbose,
        } => {
            setup_logging(verbose);
            let scores = ScoreSet {
                accuracy,
                completeness,
                fluency,
                prosodic,
                total: None,
                word_scores: word_scores.0,
            };
            let utterance = NewUtterance {
                speaker_id,
                text,
                scores,
            };
            feedback(DataPaths::under(&data_dir), &utt_id, utterance, offline).await
        }
        Commands::History {
            speaker_id,
            data_dir,
            verbose,
        } => {
            setup_logging(verbose);
            history(DataPaths::under(&data_dir), &speaker_id)
        }
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

fn prepare(paths: DataPaths, batch_size: usize) -> Result<()> {
    info!("Starting data preparation...");
    let mut store = RecordStore::load_or_build(&paths).context("Failed to load record store")?;

    let result = execute_prepare(&mut store, &PrepareConfig { batch_size })?;

    info!(
        "Data preparation completed: {} generated, {} already present, {} skipped. Store saved to {:?}",
        result.generated,
        result.already_present,
        result.skipped,
        store.path()
    );
    Ok(())
}

async fn feedback(
    paths: DataPaths,
    utt_id: &str,
    utterance: NewUtterance,
    offline: bool,
) -> Result<()> {
    let speaker_id = utterance.speaker_id.clone();
    let mut store = RecordStore::open(&paths.database)?;

    let analysis = execute_analysis(&mut store, utt_id, Some(utterance))?;
    println!("Analysis Feedback for {}:", utt_id);
    println!("{}", analysis.text());

    let summarizer: Box<dyn HistorySummarizer> = if offline {
        Box::new(RuleBasedSummarizer)
    } else {
        match AnthropicConfig::from_env() {
            Ok(config) => Box::new(AnthropicSummarizer::new(AnthropicClient::new(config))),
            Err(e) => {
                warn!("{:#}; using offline history summary", e);
                Box::new(RuleBasedSummarizer)
            }
        }
    };

    let mut log = PersonalizedFeedbackLog::load(&paths.personalized_feedback)?;
    let personalized =
        execute_personalized(summarizer.as_ref(), &store, &mut log, &speaker_id, utt_id).await?;
    println!();
    println!("Personalized Feedback for Speaker {}:", speaker_id);
    println!("{}", personalized);

    Ok(())
}

fn history(paths: DataPaths, speaker_id: &str) -> Result<()> {
    let store = RecordStore::open(&paths.database)?;
    let records = store.get_speaker_history(speaker_id);

    println!("Speaker {}", speaker_id);
    println!("============");
    println!("Utterances: {}", records.len());
    println!();

    for record in records {
        let scores = &record.scores;
        println!("{}: {}", record.utt_id, record.text);
        println!(
            "  accuracy {:.1}, completeness {:.1}, fluency {:.1}, prosodic {:.1}, words {}",
            scores.accuracy,
            scores.completeness,
            scores.fluency,
            scores.prosodic,
            scores.word_scores.len()
        );
        match &record.analysis_feedback {
            Some(text) => {
                for line in text.lines() {
                    println!("  | {}", line);
                }
            }
            None => println!("  (no analysis feedback yet)"),
        }
        println!();
    }

    Ok(())
}
