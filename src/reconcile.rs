//! Cross-chunk merging at pass boundaries.
//!
//! Workers only see their own chunk, so an id can survive in more than one
//! chunk result. The coordinator folds the results here, in chunk order.
//! Hashtag associations are deliberately not reconciled.

use crate::extract::AuthorTable;
use crate::models::{Author, Post, Record};
use rustc_hash::FxHashSet;
use tracing::{debug, info};

/// Globally deduplicated records plus the number of cross-chunk repeats dropped
#[derive(Debug, Default)]
pub struct Reconciled {
    pub records: Vec<Record>,
    pub duplicates: u64,
}

/// Flattens `chunks` in order, keeping the first item for each key.
fn first_by_id<T>(chunks: Vec<Vec<T>>, id: impl Fn(&T) -> u64) -> (Vec<T>, u64) {
    let total: usize = chunks.iter().map(Vec::len).sum();
    let mut seen_ids = FxHashSet::default();
    let mut kept = Vec::with_capacity(total);
    let mut dropped = 0u64;

    for item in chunks.into_iter().flatten() {
        if seen_ids.insert(id(&item)) {
            kept.push(item);
        } else {
            dropped += 1;
        }
    }

    (kept, dropped)
}

/// Flattens per-chunk validation results, keeping the first occurrence of
/// each id in chunk order. Chunk-local dedup cannot see repeats that
/// straddle a chunk boundary; this pass does.
pub fn reconcile(chunks: Vec<Vec<Record>>) -> Reconciled {
    let (records, duplicates) = first_by_id(chunks, |record| record.id);

    info!(
        unique = records.len(),
        duplicates = duplicates,
        "Reconciled chunk results"
    );
    Reconciled {
        records,
        duplicates,
    }
}

/// An original embedded by retweets in two chunks is extracted by both.
/// Keeps the first post per id in chunk order.
pub fn reconcile_posts(chunks: Vec<Vec<Post>>) -> Vec<Post> {
    let (posts, duplicates) = first_by_id(chunks, |post| post.id);
    debug!(duplicates = duplicates, "Reconciled posts");
    posts
}

/// Folds per-chunk author tables in chunk order with the same
/// last-write-wins rule used inside a chunk.
pub fn reconcile_authors(chunks: Vec<Vec<Author>>) -> Vec<Author> {
    let mut table = AuthorTable::default();
    for author in chunks.into_iter().flatten() {
        table.upsert(author);
    }
    table.into_authors()
}
