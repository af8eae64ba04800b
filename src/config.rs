/// Timestamp layout used by `created_at` on tweets and users
/// (e.g. `Mon Jan 01 00:00:00 +0000 2024`)
pub const TIMESTAMP_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

/// Default size of the worker pool shared by all passes
pub const DEFAULT_WORKERS: usize = 4;

/// Default directory for the three output streams
pub const DEFAULT_OUTPUT_DIR: &str = "filtered";

pub const POSTS_FILE: &str = "valid_tweets.jsonl";
pub const AUTHORS_FILE: &str = "valid_users.jsonl";
pub const HASHTAGS_FILE: &str = "valid_hashtags.jsonl";

/// Buffer size for the input reader and JSONL writers
pub const IO_BUFFER_SIZE: usize = 128 * 1024;

/// Number of pipeline passes reported on the progress bar
pub const PASS_COUNT: u64 = 4;
