use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use dupgate::{
    Algorithm, DedupEngine, DedupError, DetectionResult, DupgateConfig, ProcessSummary, RunOutcome,
    RunReport, SimilarityResult, EXIT_CANCELLED, suggest_angles,
};
use tracing_subscriber::EnvFilter;

/// Find near-duplicate articles before they are published.
#[derive(Parser, Debug)]
#[command(name = "dupgate", version, about)]
#[command(args_conflicts_with_subcommands = true, subcommand_negates_reqs = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    detect: DetectArgs,

    /// YAML configuration file; flags override its values.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbose logging.
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Args, Debug)]
struct DetectArgs {
    /// Directory of articles to check.
    #[arg(required_unless_present = "compare")]
    directory: Option<PathBuf>,

    /// Comparison strategy: linear or graph.
    #[arg(long)]
    algorithm: Option<Algorithm>,

    /// Similarity threshold in [0, 1].
    #[arg(long)]
    threshold: Option<f64>,

    /// Only compare documents at most this many days apart.
    #[arg(long)]
    window_days: Option<u32>,

    /// Documents with fewer words are never compared.
    #[arg(long, value_name = "N")]
    min_words: Option<usize>,

    /// Build the similarity matrix on all cores.
    #[arg(long)]
    parallel: bool,

    /// Score two files against each other instead of scanning a directory.
    #[arg(long, num_args = 2, value_names = ["FILE1", "FILE2"])]
    compare: Option<Vec<PathBuf>>,

    /// Move kept and duplicate files into dated folders.
    #[arg(long)]
    auto_process: bool,

    /// Show the planned moves without touching any file.
    #[arg(long)]
    dry_run: bool,

    /// Write the full report as JSON.
    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check a proposed keyword against recent output and re-angle it when it repeats.
    Keyword(KeywordArgs),
    /// List angle rewrites of a keyword and the axes that pair with each.
    Angles(AnglesArgs),
}

#[derive(Args, Debug)]
struct AnglesArgs {
    keyword: String,

    /// Number of axes to rewrite along.
    #[arg(long, default_value_t = 8)]
    max: usize,
}

#[derive(Args, Debug)]
struct KeywordArgs {
    keyword: String,

    #[arg(long)]
    category: String,

    #[arg(long, default_value = "cli")]
    source: String,

    /// Where the stem store, title store and audit log live.
    #[arg(long, value_name = "DIR", default_value = ".dupgate")]
    state_dir: PathBuf,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprintln!("error: {err:#}");
            let code = err
                .downcast_ref::<DedupError>()
                .map(DedupError::exit_code)
                .unwrap_or(1);
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}

/// Logs go to stderr so stdout stays machine-readable.
/// `DUPGATE_LOG_JSON=1` switches to one JSON object per event.
fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let json = std::env::var("DUPGATE_LOG_JSON").is_ok_and(|v| v == "1");

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn run(cli: Cli) -> anyhow::Result<u8> {
    let mut config = match &cli.config {
        Some(path) => DupgateConfig::from_file(path).map_err(DedupError::from)?,
        None => DupgateConfig::default(),
    };

    match cli.command {
        Some(Command::Keyword(args)) => return run_keyword(config, &args),
        Some(Command::Angles(args)) => {
            let suggestions = suggest_angles(&args.keyword, args.max);
            println!("{}", serde_json::to_string_pretty(&suggestions)?);
            return Ok(0);
        }
        None => {}
    }

    let args = cli.detect;
    apply_overrides(&mut config, &args);
    let engine = DedupEngine::new(config)?;

    if let Some(files) = &args.compare {
        let result = engine.compare(&files[0], &files[1])?;
        print_comparison(&result);
        if let Some(path) = &args.output {
            write_json(path, &result)?;
        }
        return Ok(0);
    }

    let Some(directory) = &args.directory else {
        anyhow::bail!("a DIRECTORY is required");
    };
    let report = match engine.run(directory)? {
        RunOutcome::Completed(report) => report,
        RunOutcome::Cancelled => {
            eprintln!("run cancelled");
            return Ok(EXIT_CANCELLED as u8);
        }
    };
    print_report(&report);
    if let Some(path) = &args.output {
        write_json(path, &report)?;
    }

    if args.auto_process || args.dry_run {
        let summary = engine.process_results(&report.result, args.dry_run);
        print_process_summary(&summary);
    }
    Ok(0)
}

fn apply_overrides(config: &mut DupgateConfig, args: &DetectArgs) {
    let detection = &mut config.detection;
    if let Some(algorithm) = args.algorithm {
        detection.algorithm = algorithm;
    }
    if let Some(threshold) = args.threshold {
        detection.similarity_threshold = threshold;
    }
    if let Some(days) = args.window_days {
        detection.comparison_window_days = days;
    }
    if let Some(words) = args.min_words {
        detection.min_content_length = words;
    }
    if args.parallel {
        detection.parallel = true;
    }
}

fn run_keyword(config: DupgateConfig, args: &KeywordArgs) -> anyhow::Result<u8> {
    let engine = DedupEngine::new(config)?;
    let mut dedup = engine.keyword_deduplicator(&args.state_dir)?;
    let result = dedup
        .process(&args.keyword, &args.category, &args.source)
        .map_err(DedupError::from)?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(0)
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), value)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

fn print_comparison(result: &SimilarityResult) {
    println!("{} vs {}", result.doc_a_id, result.doc_b_id);
    if result.skipped.is_some() {
        println!("  skipped: below the minimum word count");
        return;
    }
    println!("  title similarity:   {:.3}", result.title_similarity);
    println!("  content similarity: {:.3}", result.content_similarity);
    println!("  overall similarity: {:.3}", result.overall_similarity);
    println!("  hamming distance:   {}", result.hamming_distance);
    if let Some(semantic) = result.semantic_similarity {
        println!("  semantic:           {semantic:.3}");
    }
    println!(
        "  duplicate:          {} (threshold {:.2}{})",
        result.is_duplicate,
        result.threshold_used,
        if result.cross_topic { ", cross-topic" } else { "" }
    );
}

fn print_report(report: &RunReport) {
    println!(
        "Analyzed {} document(s) in {} with the {} strategy ({} failed)",
        report.documents_analyzed,
        report.directory.display(),
        report.algorithm,
        report.failures.len()
    );
    for failure in &report.failures {
        println!("  failed: {} ({})", failure.path.display(), failure.reason);
    }
    println!("Comparisons: {}", report.result.total_comparisons());

    match &report.result {
        DetectionResult::Linear { kept, moved, .. } => {
            println!("Kept: {}", kept.len());
            println!("Duplicates: {}", moved.len());
            for member in moved {
                println!(
                    "  {} -> {} (similarity {:.3})",
                    member.document.file_name, member.base_id, member.similarity_to_base
                );
            }
        }
        DetectionResult::Graph {
            duplicate_groups,
            unique_documents,
            ..
        } => {
            println!("Unique: {}", unique_documents.len());
            println!("Duplicate groups: {}", duplicate_groups.len());
            for group in duplicate_groups {
                println!(
                    "  group {} [{}] base {}",
                    group.group_id, group.topic, group.base_document.file_name
                );
                for member in group.members.iter().filter(|m| !m.is_base) {
                    println!(
                        "    {} (similarity {:.3})",
                        member.document.file_name, member.similarity_to_base
                    );
                }
            }
        }
    }
    if report.stats.count > 0 {
        println!(
            "Similarity: mean {:.3}, median {:.3}, max {:.3}",
            report.stats.mean, report.stats.median, report.stats.max
        );
    }
}

fn print_process_summary(summary: &ProcessSummary) {
    let verb = if summary.dry_run { "would move" } else { "moved" };
    println!(
        "{verb} {} kept file(s) to {} and {} duplicate(s) to {}",
        summary.kept_count,
        summary.new_folder.display(),
        summary.moved_count,
        summary.old_folder.display()
    );
    for planned in &summary.planned {
        println!("  {} -> {}", planned.from.display(), planned.to.display());
    }
    for failure in &summary.failures {
        println!("  failed: {} ({})", failure.path.display(), failure.reason);
    }
}
