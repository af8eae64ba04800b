use crate::config::{
    AUTHORS_FILE, DEFAULT_WORKERS, HASHTAGS_FILE, IO_BUFFER_SIZE, PASS_COUNT, POSTS_FILE,
};
use crate::extract::{extract_authors, extract_hashtags, extract_posts};
use crate::models::Record;
use crate::partition::partition;
use crate::reconcile::{reconcile, reconcile_authors, reconcile_posts};
use crate::runner::ChunkRunner;
use crate::stats::PipelineStats;
use crate::validate::validate_chunk;
use crate::writer::write_jsonl;
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, info_span};

pub struct PipelineConfig {
    pub input: PathBuf,
    pub posts_path: PathBuf,
    pub authors_path: PathBuf,
    pub hashtags_path: PathBuf,
    pub workers: usize,
    pub show_progress: bool,
}

impl PipelineConfig {
    /// Config writing the three default file names into `output_dir`
    pub fn new(input: impl Into<PathBuf>, output_dir: impl AsRef<Path>) -> Self {
        let output_dir = output_dir.as_ref();
        Self {
            input: input.into(),
            posts_path: output_dir.join(POSTS_FILE),
            authors_path: output_dir.join(AUTHORS_FILE),
            hashtags_path: output_dir.join(HASHTAGS_FILE),
            workers: DEFAULT_WORKERS,
            show_progress: false,
        }
    }
}

/// Reads the input as raw lines. Bytes are kept as-is so that a line with
/// invalid UTF-8 is dropped by validation instead of failing the run.
pub fn read_lines(path: &Path) -> Result<Vec<Vec<u8>>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open input file: {}", path.display()))?;
    BufReader::with_capacity(IO_BUFFER_SIZE, file)
        .split(b'\n')
        .collect::<std::io::Result<Vec<_>>>()
        .with_context(|| format!("Failed to read input file: {}", path.display()))
}

fn pass_progress(show: bool) -> Result<ProgressBar> {
    if !show {
        return Ok(ProgressBar::hidden());
    }
    let pb = ProgressBar::new(PASS_COUNT);
    pb.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] [{bar:20.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("=> "),
    );
    Ok(pb)
}

/// Runs one extraction pass over `chunks`, merges the per-chunk results in
/// chunk order with `merge` and writes them to `path`.
fn extract_and_write<R, F, M>(
    runner: &ChunkRunner,
    chunks: &[&[Record]],
    extract: F,
    merge: M,
    name: &'static str,
    path: &Path,
    stats: &mut PipelineStats,
) -> Result<u64>
where
    R: Serialize + Send,
    F: Fn(&[Record]) -> Vec<R> + Sync,
    M: FnOnce(Vec<Vec<R>>) -> Vec<R>,
{
    let _span = info_span!("pass", pass = name).entered();
    let started = Instant::now();
    let per_chunk = runner.run(chunks, extract);
    let extracted: usize = per_chunk.iter().map(Vec::len).sum();
    let entities = merge(per_chunk);
    let written = write_jsonl(path, &entities)?;
    let elapsed = started.elapsed();

    info!(
        pass = name,
        records = written,
        merged = extracted - written,
        path = %path.display(),
        duration_secs = elapsed.as_secs_f64(),
        "Pass complete"
    );
    stats.pass_durations.push((name, elapsed));
    Ok(written as u64)
}

/// Validates, deduplicates and splits the input into the three output streams.
///
/// Four synchronous passes share one worker pool: validation with
/// chunk-local dedup (followed by global reconciliation), then post, author
/// and hashtag extraction over a fresh partition of the reconciled records.
/// Posts and authors are merged across chunks before writing; hashtag
/// associations are only deduplicated within a chunk.
pub fn run_pipeline(config: &PipelineConfig) -> Result<PipelineStats> {
    let runner = ChunkRunner::new(config.workers)?;
    let progress = pass_progress(config.show_progress)?;
    let mut stats = PipelineStats::default();

    info!(
        input = %config.input.display(),
        workers = runner.workers(),
        "Starting pipeline"
    );

    let validate_span = info_span!("pass", pass = "validate").entered();
    let started = Instant::now();
    progress.set_message("validating");
    let lines = read_lines(&config.input)?;
    stats.lines_read = lines.len() as u64;

    let validated = runner.run(&partition(&lines, runner.workers()), validate_chunk);
    drop(lines);

    let mut chunk_records = Vec::with_capacity(validated.len());
    for chunk in validated {
        stats.rejections += chunk.counts;
        chunk_records.push(chunk.records);
    }
    let reconciled = reconcile(chunk_records);
    stats.cross_chunk_duplicates = reconciled.duplicates;
    stats.records_validated = reconciled.records.len() as u64;

    let elapsed = started.elapsed();
    info!(
        lines = stats.lines_read,
        valid = stats.records_validated,
        rejected = stats.rejections.rejected(),
        duplicates = stats.total_duplicates(),
        duration_secs = elapsed.as_secs_f64(),
        "Validation complete"
    );
    stats.pass_durations.push(("validate", elapsed));
    progress.inc(1);
    drop(validate_span);

    let records = reconciled.records;
    let chunks = partition(&records, runner.workers());

    progress.set_message("extracting posts");
    stats.posts_written = extract_and_write(
        &runner,
        &chunks,
        extract_posts,
        reconcile_posts,
        "posts",
        &config.posts_path,
        &mut stats,
    )?;
    progress.inc(1);

    progress.set_message("extracting authors");
    stats.authors_written = extract_and_write(
        &runner,
        &chunks,
        extract_authors,
        reconcile_authors,
        "authors",
        &config.authors_path,
        &mut stats,
    )?;
    progress.inc(1);

    progress.set_message("extracting hashtags");
    stats.hashtags_written = extract_and_write(
        &runner,
        &chunks,
        extract_hashtags,
        |per_chunk| per_chunk.into_iter().flatten().collect(),
        "hashtags",
        &config.hashtags_path,
        &mut stats,
    )?;
    progress.inc(1);
    progress.finish_and_clear();

    Ok(stats)
}
