use crate::config::IO_BUFFER_SIZE;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes `items` as JSON Lines, one object per line. Returns the count written.
pub fn write_jsonl<T: Serialize>(path: &Path, items: &[T]) -> Result<usize> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let file = File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    let mut writer = BufWriter::with_capacity(IO_BUFFER_SIZE, file);

    for item in items {
        serde_json::to_writer(&mut writer, item)
            .with_context(|| format!("Failed to serialize record to {}", path.display()))?;
        writer.write_all(b"\n")?;
    }

    writer
        .flush()
        .with_context(|| format!("Failed to flush output file: {}", path.display()))?;
    Ok(items.len())
}
