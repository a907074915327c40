//! Command-line report runner shared by the demo binary.

use std::error::Error;
use std::fmt::Write as _;
use std::path::PathBuf;

use clap::{Parser, ValueEnum, error::ErrorKind};

use crate::config::{RankingConfig, SnapshotConfig};
use crate::data::{Direction, PathTable, Ranking, TransitionTable};
use crate::ingest::load_catalog;
use crate::source::{DatasetSource, SnapshotSource};

/// Message shown when a transition query matched nothing.
pub const NO_DATA_MESSAGE: &str = "Not enough data for this specific job.";
/// Message shown when no two-step path reaches the job.
pub const NO_PATHS_MESSAGE: &str = "Insufficient data for 2-step sequences.";
const BAR_WIDTH: f64 = 40.0;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DirectionArg {
    Forward,
    Reverse,
}

impl From<DirectionArg> for Direction {
    fn from(value: DirectionArg) -> Self {
        match value {
            DirectionArg::Forward => Direction::Forward,
            DirectionArg::Reverse => Direction::Reverse,
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "career_report",
    disable_help_subcommand = true,
    about = "Rank real career transitions for a job title",
    long_about = "Load a JobHop-shaped dataset, then rank where people holding a job go next (forward), where they come from (reverse), and the most common two-step paths into it.",
    after_help = "Set RUST_LOG=info to see load progress."
)]
struct CareerReportCli {
    #[arg(
        long = "snapshot-dir",
        value_name = "PATH",
        help = "Directory of JSONL (or, with the huggingface feature, parquet) shards"
    )]
    snapshot_dir: Option<PathBuf>,
    #[cfg(feature = "huggingface")]
    #[arg(
        long = "hf-cache-dir",
        value_name = "DIR",
        default_value = ".career_cache/jobhop",
        help = "Where the JobHop file is materialized when no snapshot dir is given"
    )]
    hf_cache_dir: PathBuf,
    #[cfg(feature = "huggingface")]
    #[arg(long, value_name = "ID", help = "Hugging Face dataset id (default: aida-ugent/JobHop)")]
    dataset: Option<String>,
    #[cfg(feature = "huggingface")]
    #[arg(
        long,
        value_name = "PATH",
        help = "File inside the dataset repo, or url::<direct url>"
    )]
    file: Option<String>,
    #[cfg(feature = "huggingface")]
    #[arg(long, value_name = "REF", help = "Dataset repo revision")]
    revision: Option<String>,
    #[arg(long, value_name = "TITLE", help = "Job title to analyze (case-sensitive)")]
    job: Option<String>,
    #[arg(
        long,
        value_enum,
        default_value = "forward",
        help = "Rank next jobs (forward) or previous jobs (reverse)"
    )]
    direction: DirectionArg,
    #[arg(
        long = "top-k",
        default_value_t = RankingConfig::default().top_k,
        value_parser = parse_positive_usize,
        help = "Number of ranked entries to show"
    )]
    top_k: usize,
    #[arg(long, help = "Also rank two-step paths leading into the job")]
    paths: bool,
    #[arg(long = "list-titles", help = "Print every job title and exit")]
    list_titles: bool,
    #[arg(long, help = "Print results as JSON")]
    json: bool,
}

/// Parse `args_iter` (without the program name) and print a report.
pub fn run_career_report<I>(args_iter: I) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let Some(cli) =
        parse_cli::<CareerReportCli, _>(std::iter::once("career_report".to_string()).chain(args_iter))?
    else {
        return Ok(());
    };

    let source = build_source(&cli)?;
    let ranking = RankingConfig { top_k: cli.top_k };
    let catalog = load_catalog(source.as_ref(), ranking)?;

    if cli.list_titles {
        for title in catalog.list_job_titles() {
            println!("{title}");
        }
        return Ok(());
    }

    let Some(job) = cli.job.as_deref() else {
        return Err("either --job <TITLE> or --list-titles is required".into());
    };
    if !catalog.contains_title(job) {
        eprintln!("'{job}' does not appear in the dataset (titles are case-sensitive).");
    }

    let direction: Direction = cli.direction.into();
    let transitions = catalog.rank_transitions_default(job, direction);
    let paths = cli
        .paths
        .then(|| catalog.rank_two_step_paths_default(job));

    if cli.json {
        let payload = serde_json::json!({
            "job": job,
            "transitions": transitions,
            "paths": paths,
            "load": catalog.report(),
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    print!("{}", format_transition_ranking(job, direction, &transitions));
    if let Some(paths) = paths {
        println!();
        print!("{}", format_path_ranking(&paths));
    }
    Ok(())
}

fn build_source(cli: &CareerReportCli) -> Result<Box<dyn DatasetSource>, Box<dyn Error>> {
    if let Some(dir) = &cli.snapshot_dir {
        return Ok(Box::new(SnapshotSource::new(SnapshotConfig::new(dir))));
    }
    #[cfg(feature = "huggingface")]
    {
        let mut config = crate::source::HuggingFaceConfig::jobhop_train(&cli.hf_cache_dir);
        if let Some(dataset) = &cli.dataset {
            config.dataset = dataset.clone();
            config.revision = None;
        }
        if let Some(file) = &cli.file {
            config.file = file.clone();
        }
        if let Some(revision) = &cli.revision {
            config.revision = Some(revision.clone());
        }
        return Ok(Box::new(crate::source::HuggingFaceSource::new(config)?));
    }
    #[cfg(not(feature = "huggingface"))]
    Err("--snapshot-dir is required (build with the `huggingface` feature to fetch JobHop)".into())
}

/// Render a transition ranking as a text table with proportional bars.
pub fn format_transition_ranking(
    job: &str,
    direction: Direction,
    ranking: &Ranking<TransitionTable>,
) -> String {
    let mut out = String::new();
    let Some(table) = ranking.ranked() else {
        let _ = writeln!(out, "{NO_DATA_MESSAGE}");
        return out;
    };
    match direction {
        Direction::Forward => {
            let _ = writeln!(out, "Where do {job}s go? ({} transitions analyzed)", table.total);
        }
        Direction::Reverse => {
            let _ = writeln!(out, "Where do {job}s come from?");
            let _ = writeln!(
                out,
                "Most common previous roles ({} transitions analyzed)",
                table.total
            );
        }
    }
    let width = table
        .entries
        .iter()
        .map(|entry| entry.target_job.chars().count())
        .max()
        .unwrap_or(0);
    for entry in &table.entries {
        let bar = "#".repeat((entry.percentage / 100.0 * BAR_WIDTH).round() as usize);
        let _ = writeln!(
            out,
            "  {:<width$}  {:>5.1}%  {}",
            entry.target_job, entry.percentage, bar
        );
    }
    out
}

/// Render a two-step path ranking as a bullet list.
pub fn format_path_ranking(ranking: &Ranking<PathTable>) -> String {
    let mut out = String::new();
    let Some(table) = ranking.ranked() else {
        let _ = writeln!(out, "{NO_PATHS_MESSAGE}");
        return out;
    };
    let _ = writeln!(out, "Typical career sequences (2 steps)");
    for path in &table.entries {
        let _ = writeln!(
            out,
            "- {} -> {} -> {} ({} people)",
            path.step_1, path.step_2, path.destination, path.count
        );
    }
    out
}

fn parse_positive_usize(raw: &str) -> Result<usize, String> {
    let parsed = raw
        .parse::<usize>()
        .map_err(|_| format!("Could not parse --top-k value '{raw}' as a positive integer"))?;
    if parsed == 0 {
        return Err("--top-k must be greater than zero".to_string());
    }
    Ok(parsed)
}

fn parse_cli<T, I>(args: I) -> Result<Option<T>, Box<dyn Error>>
where
    T: Parser,
    I: IntoIterator,
    I::Item: Into<std::ffi::OsString> + Clone,
{
    match T::try_parse_from(args) {
        Ok(cli) => Ok(Some(cli)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                err.print()?;
                Ok(None)
            }
            _ => Err(err.into()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{TransitionShare, TwoStepPath};

    #[test]
    fn parse_positive_usize_rejects_zero_and_garbage() {
        assert_eq!(parse_positive_usize("3"), Ok(3));
        assert!(parse_positive_usize("0").is_err());
        assert!(parse_positive_usize("many").is_err());
    }

    #[test]
    fn cli_parses_direction_and_defaults() {
        let cli = CareerReportCli::try_parse_from([
            "career_report",
            "--snapshot-dir",
            "/data",
            "--job",
            "Cook",
            "--direction",
            "reverse",
        ])
        .unwrap();
        assert!(matches!(cli.direction, DirectionArg::Reverse));
        assert_eq!(cli.top_k, 5);
        assert!(!cli.paths);
    }

    #[test]
    fn help_is_not_an_error() {
        let parsed = parse_cli::<CareerReportCli, _>(["career_report", "--help"]).unwrap();
        assert!(parsed.is_none());
    }

    #[test]
    fn formats_insufficient_data_messages() {
        let transitions: Ranking<TransitionTable> = Ranking::InsufficientData;
        assert_eq!(
            format_transition_ranking("Cook", Direction::Forward, &transitions).trim(),
            NO_DATA_MESSAGE
        );
        let paths: Ranking<PathTable> = Ranking::InsufficientData;
        assert_eq!(format_path_ranking(&paths).trim(), NO_PATHS_MESSAGE);
    }

    #[test]
    fn formats_ranked_tables() {
        let transitions = Ranking::Ranked(TransitionTable {
            source_job: "Cook".into(),
            direction: Direction::Reverse,
            total: 4,
            entries: vec![TransitionShare {
                target_job: "Waiter".into(),
                count: 2,
                percentage: 50.0,
            }],
        });
        let text = format_transition_ranking("Cook", Direction::Reverse, &transitions);
        assert!(text.contains("Where do Cooks come from?"));
        assert!(text.contains("(4 transitions analyzed)"));
        assert!(text.contains(&"#".repeat(20)));

        let paths = Ranking::Ranked(PathTable {
            destination_job: "Nurse".into(),
            total_paths: 1,
            entries: vec![TwoStepPath {
                step_1: "Student".into(),
                step_2: "Intern".into(),
                destination: "Nurse".into(),
                count: 1,
            }],
        });
        assert!(format_path_ranking(&paths).contains("- Student -> Intern -> Nurse (1 people)"));
    }
}
