use crate::validate::Rejection;
use std::ops::AddAssign;
use std::time::Duration;

/// Per-chunk tally of dropped lines. Each worker fills its own and the
/// coordinator sums them, so nothing is shared while a pass runs.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RejectionCounts {
    pub malformed: u64,
    pub missing_id: u64,
    pub unresolvable_id: u64,
    pub missing_user_id: u64,
    pub unresolvable_user_id: u64,
    pub missing_text: u64,
    pub missing_created_at: u64,
    pub missing_hashtags: u64,
    pub invalid_retweet: u64,
    /// Valid lines whose id already appeared earlier in the same chunk
    pub duplicates: u64,
}

impl RejectionCounts {
    pub fn record(&mut self, reason: Rejection) {
        let slot = match reason {
            Rejection::Malformed => &mut self.malformed,
            Rejection::MissingId => &mut self.missing_id,
            Rejection::UnresolvableId => &mut self.unresolvable_id,
            Rejection::MissingUserId => &mut self.missing_user_id,
            Rejection::UnresolvableUserId => &mut self.unresolvable_user_id,
            Rejection::MissingText => &mut self.missing_text,
            Rejection::MissingCreatedAt => &mut self.missing_created_at,
            Rejection::MissingHashtags => &mut self.missing_hashtags,
            Rejection::InvalidRetweet => &mut self.invalid_retweet,
        };
        *slot += 1;
    }

    /// Lines dropped for failing validation (duplicates excluded)
    pub fn rejected(&self) -> u64 {
        self.malformed
            + self.missing_id
            + self.unresolvable_id
            + self.missing_user_id
            + self.unresolvable_user_id
            + self.missing_text
            + self.missing_created_at
            + self.missing_hashtags
            + self.invalid_retweet
    }

    pub fn breakdown(&self) -> [(&'static str, u64); 9] {
        [
            ("malformed", self.malformed),
            ("missing id", self.missing_id),
            ("unresolvable id", self.unresolvable_id),
            ("missing user id", self.missing_user_id),
            ("unresolvable user id", self.unresolvable_user_id),
            ("missing text", self.missing_text),
            ("missing created_at", self.missing_created_at),
            ("missing hashtags", self.missing_hashtags),
            ("invalid retweet", self.invalid_retweet),
        ]
    }
}

impl AddAssign for RejectionCounts {
    fn add_assign(&mut self, other: Self) {
        self.malformed += other.malformed;
        self.missing_id += other.missing_id;
        self.unresolvable_id += other.unresolvable_id;
        self.missing_user_id += other.missing_user_id;
        self.unresolvable_user_id += other.unresolvable_user_id;
        self.missing_text += other.missing_text;
        self.missing_created_at += other.missing_created_at;
        self.missing_hashtags += other.missing_hashtags;
        self.invalid_retweet += other.invalid_retweet;
        self.duplicates += other.duplicates;
    }
}

/// Summary of one pipeline run
#[derive(Debug, Default, Clone)]
pub struct PipelineStats {
    pub lines_read: u64,
    pub rejections: RejectionCounts,
    /// Duplicates only visible once chunks were reconciled
    pub cross_chunk_duplicates: u64,
    pub records_validated: u64,
    pub posts_written: u64,
    pub authors_written: u64,
    pub hashtags_written: u64,
    pub pass_durations: Vec<(&'static str, Duration)>,
}

impl PipelineStats {
    pub fn total_duplicates(&self) -> u64 {
        self.rejections.duplicates + self.cross_chunk_duplicates
    }

    pub fn total_duration(&self) -> Duration {
        self.pass_durations.iter().map(|(_, d)| *d).sum()
    }
}
