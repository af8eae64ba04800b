use crate::models::{RawId, RawTweet, RawUser, Record, UserInfo};
use crate::stats::RejectionCounts;
use rustc_hash::FxHashSet;
use thiserror::Error;
use tracing::trace;

/// Why a raw line was dropped. Rejections never leave the chunk that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("line is not a well-formed JSON object")]
    Malformed,
    #[error("both id and id_str are absent")]
    MissingId,
    #[error("tweet id does not resolve to an integer")]
    UnresolvableId,
    #[error("user or both user id fields are absent")]
    MissingUserId,
    #[error("user id does not resolve to an integer")]
    UnresolvableUserId,
    #[error("text is absent or empty")]
    MissingText,
    #[error("created_at is absent")]
    MissingCreatedAt,
    #[error("entities.hashtags is absent or empty")]
    MissingHashtags,
    #[error("embedded retweeted_status is incomplete")]
    InvalidRetweet,
}

/// Records that survived validation in one chunk, first occurrence per id.
#[derive(Debug, Default)]
pub struct ValidatedChunk {
    pub records: Vec<Record>,
    pub counts: RejectionCounts,
}

/// Prefers the numeric `id`, falling back to `id_str`.
fn resolve_id(
    id: Option<RawId>,
    id_str: Option<RawId>,
    missing: Rejection,
    unresolvable: Rejection,
) -> Result<u64, Rejection> {
    if id.is_none() && id_str.is_none() {
        return Err(missing);
    }
    id.and_then(RawId::resolved)
        .or_else(|| id_str.and_then(RawId::resolved))
        .ok_or(unresolvable)
}

fn validate_user(
    user: Option<RawUser>,
    missing: Rejection,
    unresolvable: Rejection,
) -> Result<UserInfo, Rejection> {
    let user = user.ok_or(missing)?;
    let id = resolve_id(user.id, user.id_str, missing, unresolvable)?;
    Ok(UserInfo {
        id,
        screen_name: user.screen_name.unwrap_or_default(),
        description: user.description,
        lang: user.lang.unwrap_or_default(),
    })
}

pub fn validate_line(line: &[u8]) -> Result<Record, Rejection> {
    let raw: RawTweet = serde_json::from_slice(line).map_err(|_| Rejection::Malformed)?;
    validate_tweet(raw)
}

pub fn validate_tweet(raw: RawTweet) -> Result<Record, Rejection> {
    let id = resolve_id(
        raw.id,
        raw.id_str,
        Rejection::MissingId,
        Rejection::UnresolvableId,
    )?;
    let user = validate_user(
        raw.user,
        Rejection::MissingUserId,
        Rejection::UnresolvableUserId,
    )?;
    let text = raw
        .text
        .filter(|text| !text.is_empty())
        .ok_or(Rejection::MissingText)?;
    let created_at = raw.created_at.ok_or(Rejection::MissingCreatedAt)?;
    let hashtags: Vec<String> = raw
        .entities
        .and_then(|entities| entities.hashtags)
        .filter(|hashtags| !hashtags.is_empty())
        .ok_or(Rejection::MissingHashtags)?
        .into_iter()
        .map(|tag| tag.text)
        .collect();
    let retweeted_status = raw
        .retweeted_status
        .map(|embedded| validate_embedded(*embedded).map(Box::new))
        .transpose()?;

    Ok(Record {
        id,
        user,
        text,
        created_at,
        lang: raw.lang.unwrap_or_default(),
        hashtags,
        in_reply_to_user_id: raw.in_reply_to_user_id.and_then(RawId::resolved),
        retweeted_status,
    })
}

/// Embedded originals only need enough structure for extraction to be total:
/// an id, a user id and a timestamp. Text and hashtags may be empty.
fn validate_embedded(raw: RawTweet) -> Result<Record, Rejection> {
    let id = resolve_id(
        raw.id,
        raw.id_str,
        Rejection::InvalidRetweet,
        Rejection::InvalidRetweet,
    )?;
    let user = validate_user(
        raw.user,
        Rejection::InvalidRetweet,
        Rejection::InvalidRetweet,
    )?;
    let created_at = raw.created_at.ok_or(Rejection::InvalidRetweet)?;
    let hashtags = raw
        .entities
        .and_then(|entities| entities.hashtags)
        .unwrap_or_default()
        .into_iter()
        .map(|tag| tag.text)
        .collect();

    Ok(Record {
        id,
        user,
        text: raw.text.unwrap_or_default(),
        created_at,
        lang: raw.lang.unwrap_or_default(),
        hashtags,
        in_reply_to_user_id: raw.in_reply_to_user_id.and_then(RawId::resolved),
        retweeted_status: None,
    })
}

/// Validates every line of a chunk and drops repeated ids within it.
pub fn validate_chunk(lines: &[Vec<u8>]) -> ValidatedChunk {
    let mut seen = FxHashSet::default();
    let mut chunk = ValidatedChunk {
        records: Vec::with_capacity(lines.len()),
        counts: RejectionCounts::default(),
    };

    for line in lines {
        match validate_line(line) {
            Ok(record) => {
                if seen.insert(record.id) {
                    chunk.records.push(record);
                } else {
                    chunk.counts.duplicates += 1;
                }
            }
            Err(reason) => {
                trace!(reason = %reason, "Rejected line");
                chunk.counts.record(reason);
            }
        }
    }

    chunk
}
