mod display;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::Level;
use tripfix_core::{CaseInput, ConversationTurn, ScoringConfig};
use tripfix_risk::evaluation::{self, GoldenCase};
use tripfix_risk::{PrecedentSet, RiskEngine};

#[derive(Parser)]
#[command(name = "tripfix")]
#[command(about = "Score flight-delay cases and decide when to hand off to a human reviewer")]
#[command(version)]
struct Cli {
    /// Scoring configuration (JSON). Defaults apply when omitted.
    #[arg(long, global = true, env = "TRIPFIX_CONFIG")]
    config: Option<PathBuf>,

    /// Log per-factor detail to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Assess one finalised case
    Assess {
        /// Case record (JSON)
        case: PathBuf,

        /// Prior conversation turns (JSON array)
        #[arg(long)]
        conversation: Option<PathBuf>,

        /// Precedent patterns (JSON array); built-in set when omitted
        #[arg(long)]
        precedents: Option<PathBuf>,

        /// Print the assessment as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run the engine over a labelled golden dataset
    Evaluate {
        /// Golden cases (JSON array); built-in set when omitted
        #[arg(long)]
        dataset: Option<PathBuf>,

        #[arg(long)]
        precedents: Option<PathBuf>,

        #[arg(long)]
        json: bool,
    },

    /// Print the effective scoring configuration
    Config,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Assess {
            case,
            conversation,
            precedents,
            json,
        } => {
            let engine = build_engine(config, precedents.as_deref())?;
            let case: CaseInput = read_json(&case, "case")?;
            let turns: Vec<ConversationTurn> = match conversation {
                Some(path) => read_json(&path, "conversation")?,
                None => Vec::new(),
            };
            let assessment = engine.assess(&case, &turns);
            if json {
                println!("{}", serde_json::to_string_pretty(&assessment)?);
            } else {
                display::print_assessment(&assessment);
            }
        }
        Command::Evaluate {
            dataset,
            precedents,
            json,
        } => {
            let engine = build_engine(config, precedents.as_deref())?;
            let cases: Vec<GoldenCase> = match dataset {
                Some(path) => evaluation::load_golden_cases(&path)
                    .with_context(|| format!("loading golden cases from {}", path.display()))?,
                None => evaluation::builtin_golden_cases().context("parsing built-in golden cases")?,
            };
            let report = evaluation::evaluate(&engine, &cases)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                display::print_report(&report);
            }
        }
        Command::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<ScoringConfig> {
    match path {
        Some(path) => ScoringConfig::load(path)
            .with_context(|| format!("loading scoring config from {}", path.display())),
        None => Ok(ScoringConfig::default()),
    }
}

fn build_engine(config: ScoringConfig, precedents: Option<&Path>) -> anyhow::Result<RiskEngine> {
    let precedents = match precedents {
        Some(path) => PrecedentSet::load(path)
            .with_context(|| format!("loading precedents from {}", path.display()))?,
        None => PrecedentSet::builtin(),
    };
    RiskEngine::new(config, precedents).context("invalid scoring configuration")
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path, what: &str) -> anyhow::Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {what} from {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {what} from {}", path.display()))
}
