//! Tweetsieve: tweet dump validation and deduplication pipeline
//!
//! This crate turns a newline-delimited JSON dump of tweets into three clean,
//! deduplicated JSON Lines datasets for a downstream loader:
//!
//! 1. **Validation Pass** -- Parse each line, drop malformed or incomplete records,
//!    normalize ids, and drop repeated ids within each chunk
//! 2. **Reconciliation** -- Merge chunk results and drop ids repeated across chunks
//!    (first occurrence in chunk order wins)
//! 3. **Post Pass** -- One post per id; embedded retweeted originals become posts of
//!    their own, emitted before the tweet that reshares them
//! 4. **Author Pass** -- One author per id, last-write-wins by tweet timestamp, merged
//!    within each chunk and then across chunks in chunk order
//! 5. **Hashtag Pass** -- One association per hashtag for each (author, post) pair
//!    first seen in a chunk
//!
//! # Architecture
//!
//! - **Fixed worker pool** -- One rayon pool, reused by all four passes
//! - **Contiguous chunks** -- Input order is preserved inside and across chunks
//! - **No shared state** -- Each chunk owns its identity sets and returns its own
//!   result; the coordinator merges at pass boundaries
//! - **Total extraction** -- Validation produces a fully-typed [`models::Record`], so
//!   extractors cannot fail on missing fields
//!
//! Hashtag associations are deduplicated per chunk only. The same (author, post)
//! pair can appear in two chunks of the extraction partition and is then
//! written twice; the downstream loader's composite key absorbs it.
//!
//! # Key Modules
//!
//! - [`validate`] -- Record validation and chunk-local identity dedup
//! - [`partition`] -- Contiguous chunking for the worker pool
//! - [`runner`] -- Fan-out/fan-in over a fixed rayon pool
//! - [`extract`] -- Post, author (with merge) and hashtag extractors
//! - [`reconcile`] -- Cross-chunk dedup after validation
//! - [`writer`] -- JSON Lines output
//! - [`pipeline`] -- Pass orchestration
//! - [`models`] -- Wire and derived types, timestamp parsing
//! - [`stats`] -- Rejection counts and run summary
//! - [`config`] -- Constants
//!
//! # Example Usage
//!
//! ```bash
//! tweetsieve -i dataset/query2_ref.txt -o filtered/ --workers 8 -v
//! ```

pub mod config;
pub mod extract;
pub mod models;
pub mod partition;
pub mod pipeline;
pub mod reconcile;
pub mod runner;
pub mod stats;
pub mod validate;
pub mod writer;
