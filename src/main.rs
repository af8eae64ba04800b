use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;
use tweetsieve::config::{DEFAULT_OUTPUT_DIR, DEFAULT_WORKERS};
use tweetsieve::pipeline::{run_pipeline, PipelineConfig};
use tweetsieve::stats::PipelineStats;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "tweetsieve")]
#[command(about = "Validate and deduplicate a tweet dump into post, author and hashtag files")]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to the newline-delimited tweet dump
    #[arg(short, long)]
    input: PathBuf,

    /// Output directory for the three result files
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    output: PathBuf,

    /// Override the posts output path
    #[arg(long)]
    posts: Option<PathBuf>,

    /// Override the authors output path
    #[arg(long)]
    authors: Option<PathBuf>,

    /// Override the hashtags output path
    #[arg(long)]
    hashtags: Option<PathBuf>,

    /// Size of the worker pool used by every pass
    #[arg(short, long, default_value_t = DEFAULT_WORKERS)]
    workers: usize,

    /// Disable the progress bar
    #[arg(long)]
    no_progress: bool,
}

impl Cli {
    fn into_config(self) -> PipelineConfig {
        let mut config = PipelineConfig::new(self.input, &self.output);
        if let Some(path) = self.posts {
            config.posts_path = path;
        }
        if let Some(path) = self.authors {
            config.authors_path = path;
        }
        if let Some(path) = self.hashtags {
            config.hashtags_path = path;
        }
        config.workers = self.workers;
        config.show_progress = !self.no_progress;
        config
    }
}

fn print_summary(config: &PipelineConfig, stats: &PipelineStats) {
    println!();
    println!("=== Summary ===");
    for (pass, duration) in &stats.pass_durations {
        println!("{:<20}{:.2}s", format!("{} time:", pass), duration.as_secs_f64());
    }
    println!("{:<20}{:.2}s", "Total time:", stats.total_duration().as_secs_f64());
    println!();
    println!("Lines read:         {}", stats.lines_read);
    println!("Lines rejected:     {}", stats.rejections.rejected());
    for (reason, count) in stats.rejections.breakdown() {
        if count > 0 {
            println!("  {:<18}{}", format!("{}:", reason), count);
        }
    }
    println!("Duplicates dropped: {}", stats.total_duplicates());
    println!("Records validated:  {}", stats.records_validated);
    println!();
    println!(
        "Posts written:      {} -> {}",
        stats.posts_written,
        config.posts_path.display()
    );
    println!(
        "Authors written:    {} -> {}",
        stats.authors_written,
        config.authors_path.display()
    );
    println!(
        "Hashtags written:   {} -> {}",
        stats.hashtags_written,
        config.hashtags_path.display()
    );
}

fn run(config: PipelineConfig) -> Result<()> {
    let stats = run_pipeline(&config)?;
    print_summary(&config, &stats);
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return ExitCode::FAILURE;
    }

    match run(cli.into_config()) {
        Ok(()) => {
            info!("Completed successfully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Error: {:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
