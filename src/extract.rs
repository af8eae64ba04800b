//! Per-chunk entity extraction.
//!
//! Each extractor sees one chunk of validated records and owns its own
//! identity set, so duplicates are only collapsed within that chunk.

use crate::models::{parse_timestamp, Author, HashtagAssociation, Post, Record};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

/// Emits one post per id. An embedded original always precedes the tweet
/// that reshares it, and only the resharing post carries `retweet_of`.
pub fn extract_posts(records: &[Record]) -> Vec<Post> {
    let mut seen = FxHashSet::default();
    let mut posts = Vec::with_capacity(records.len());

    for record in records {
        let retweet_of = match &record.retweeted_status {
            Some(original) => {
                if seen.insert(original.id) {
                    posts.push(Post::from_record(original, None));
                }
                Some(original.id)
            }
            None => None,
        };

        if seen.insert(record.id) {
            posts.push(Post::from_record(record, retweet_of));
        }
    }

    posts
}

/// Returns the survivor of two views of the same author.
///
/// The candidate wins only when both `updated_at` values parse and the
/// candidate's is strictly later. An unparsable timestamp on either side
/// counts as not newer, so the existing view is kept.
pub fn merge_author(existing: Author, candidate: Author) -> Author {
    match (
        parse_timestamp(&existing.updated_at),
        parse_timestamp(&candidate.updated_at),
    ) {
        (Some(current), Some(incoming)) if incoming > current => candidate,
        (Some(_), Some(_)) => existing,
        _ => {
            debug!(
                author_id = existing.id,
                existing = %existing.updated_at,
                candidate = %candidate.updated_at,
                "Unparsable author timestamp, keeping existing view"
            );
            existing
        }
    }
}

/// Author table keyed by id, preserving first-seen order. Every update goes
/// through [`merge_author`].
#[derive(Default)]
pub struct AuthorTable {
    authors: Vec<Author>,
    positions: FxHashMap<u64, usize>,
}

impl AuthorTable {
    pub fn upsert(&mut self, candidate: Author) {
        match self.positions.get(&candidate.id) {
            Some(&pos) => {
                let existing = std::mem::take(&mut self.authors[pos]);
                self.authors[pos] = merge_author(existing, candidate);
            }
            None => {
                self.positions.insert(candidate.id, self.authors.len());
                self.authors.push(candidate);
            }
        }
    }

    pub fn into_authors(self) -> Vec<Author> {
        self.authors
    }
}

/// Emits one author per id with last-write-wins by tweet timestamp.
///
/// Views are taken from the embedded original's user first, then from the
/// tweet's own user.
pub fn extract_authors(records: &[Record]) -> Vec<Author> {
    let mut table = AuthorTable::default();

    for record in records {
        if let Some(original) = &record.retweeted_status {
            table.upsert(Author::from_record(original));
        }
        table.upsert(Author::from_record(record));
    }

    table.into_authors()
}

/// Emits every hashtag of a record once per (author, post) pair in this chunk.
pub fn extract_hashtags(records: &[Record]) -> Vec<HashtagAssociation> {
    let mut seen: FxHashSet<(u64, u64)> = FxHashSet::default();
    let mut associations = Vec::new();

    let mut emit = |record: &Record, out: &mut Vec<HashtagAssociation>| {
        if seen.insert((record.user.id, record.id)) {
            out.extend(record.hashtags.iter().map(|tag| HashtagAssociation {
                author_id: record.user.id,
                post_id: record.id,
                tag_text: tag.clone(),
            }));
        }
    };

    for record in records {
        emit(record, &mut associations);
        if let Some(original) = &record.retweeted_status {
            emit(original, &mut associations);
        }
    }

    associations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserInfo;

    const T1: &str = "Mon Jan 01 00:00:00 +0000 2024";
    const T2: &str = "Tue Jan 02 00:00:00 +0000 2024";
    const T3: &str = "Wed Jan 03 00:00:00 +0000 2024";

    fn record(id: u64, user_id: u64, created_at: &str, tags: &[&str]) -> Record {
        Record {
            id,
            user: UserInfo {
                id: user_id,
                screen_name: format!("user{}", user_id),
                description: None,
                lang: "en".to_string(),
            },
            text: format!("tweet {}", id),
            created_at: created_at.to_string(),
            lang: "en".to_string(),
            hashtags: tags.iter().map(|t| t.to_string()).collect(),
            in_reply_to_user_id: None,
            retweeted_status: None,
        }
    }

    fn retweet(id: u64, user_id: u64, created_at: &str, original: Record) -> Record {
        Record {
            retweeted_status: Some(Box::new(original)),
            ..record(id, user_id, created_at, &["rt"])
        }
    }

    fn author(id: u64, name: &str, updated_at: &str) -> Author {
        Author {
            id,
            screen_name: name.to_string(),
            description: Some(format!("about {}", name)),
            lang: "en".to_string(),
            created_at: T1.to_string(),
            updated_at: updated_at.to_string(),
        }
    }

    // -- posts --

    #[test]
    fn plain_record_yields_single_post() {
        let posts = extract_posts(&[record(1, 10, T1, &["x"])]);
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].id, 1);
        assert_eq!(posts[0].author_id, 10);
        assert_eq!(posts[0].retweet_of, None);
    }

    #[test]
    fn embedded_original_precedes_retweet() {
        let rt = retweet(2, 20, T2, record(1, 10, T1, &["x"]));
        let posts = extract_posts(&[rt]);

        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].id, 1);
        assert_eq!(posts[0].author_id, 10);
        assert_eq!(posts[0].retweet_of, None);
        assert_eq!(posts[1].id, 2);
        assert_eq!(posts[1].retweet_of, Some(1));
    }

    #[test]
    fn post_ids_are_not_reemitted_within_chunk() {
        let records = vec![
            record(1, 10, T1, &["x"]),
            retweet(2, 20, T2, record(1, 10, T1, &["x"])),
            retweet(3, 30, T3, record(1, 10, T1, &["x"])),
        ];
        let posts = extract_posts(&records);
        let ids: Vec<u64> = posts.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(posts[2].retweet_of, Some(1));
    }

    #[test]
    fn original_seen_as_embedded_suppresses_later_plain_copy() {
        let records = vec![
            retweet(2, 20, T2, record(1, 10, T1, &["x"])),
            record(1, 10, T1, &["x"]),
        ];
        let ids: Vec<u64> = extract_posts(&records).iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn self_embedding_record_emits_once() {
        let rt = retweet(5, 50, T2, record(5, 50, T1, &["x"]));
        let posts = extract_posts(&[rt]);
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].retweet_of, None);
    }

    // -- authors --

    #[test]
    fn merge_prefers_strictly_newer() {
        let merged = merge_author(author(1, "old", T1), author(1, "new", T2));
        assert_eq!(merged, author(1, "new", T2));
    }

    #[test]
    fn merge_discards_older_or_equal() {
        let merged = merge_author(author(1, "new", T2), author(1, "old", T1));
        assert_eq!(merged.screen_name, "new");

        let merged = merge_author(author(1, "first", T2), author(1, "second", T2));
        assert_eq!(merged.screen_name, "first");
    }

    #[test]
    fn merge_keeps_existing_when_candidate_timestamp_unparsable() {
        let merged = merge_author(author(1, "kept", T1), author(1, "bad", "yesterday"));
        assert_eq!(merged.screen_name, "kept");
    }

    #[test]
    fn merge_keeps_existing_when_existing_timestamp_unparsable() {
        let merged = merge_author(author(1, "kept", "garbled"), author(1, "newer", T3));
        assert_eq!(merged.screen_name, "kept");
        assert_eq!(merged.updated_at, "garbled");
    }

    #[test]
    fn authors_last_write_wins_in_order() {
        let mut older = record(1, 10, T1, &["x"]);
        older.user.screen_name = "before".to_string();
        older.user.description = Some("old bio".to_string());
        let mut newer = record(2, 10, T2, &["x"]);
        newer.user.screen_name = "after".to_string();
        newer.user.description = None;

        let authors = extract_authors(&[older, newer]);
        assert_eq!(authors.len(), 1);
        assert_eq!(authors[0].screen_name, "after");
        assert_eq!(authors[0].description, None);
        assert_eq!(authors[0].updated_at, T2);
    }

    #[test]
    fn authors_out_of_order_newer_survives() {
        let mut newer = record(2, 10, T2, &["x"]);
        newer.user.screen_name = "after".to_string();
        let mut older = record(1, 10, T1, &["x"]);
        older.user.screen_name = "before".to_string();

        let authors = extract_authors(&[newer, older]);
        assert_eq!(authors.len(), 1);
        assert_eq!(authors[0].screen_name, "after");
        assert_eq!(authors[0].updated_at, T2);
    }

    #[test]
    fn retweet_contributes_both_authors() {
        let rt = retweet(2, 20, T2, record(1, 10, T1, &["x"]));
        let authors = extract_authors(&[rt]);

        let ids: Vec<u64> = authors.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![10, 20]);
        assert_eq!(authors[0].updated_at, T1);
        assert_eq!(authors[1].updated_at, T2);
    }

    #[test]
    fn embedded_author_updates_from_original_timestamp() {
        let mut early = record(1, 10, T1, &["x"]);
        early.user.screen_name = "early".to_string();
        let mut original = record(5, 10, T3, &["y"]);
        original.user.screen_name = "late".to_string();
        let rt = retweet(6, 20, T3, original);

        let authors = extract_authors(&[early, rt]);
        let alice = authors.iter().find(|a| a.id == 10).unwrap();
        assert_eq!(alice.screen_name, "late");
        assert_eq!(alice.updated_at, T3);
    }

    #[test]
    fn author_keeps_first_position_after_update() {
        let records = vec![
            record(1, 10, T1, &["x"]),
            record(2, 20, T1, &["x"]),
            record(3, 10, T2, &["x"]),
        ];
        let ids: Vec<u64> = extract_authors(&records).iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![10, 20]);
    }

    // -- hashtags --

    #[test]
    fn one_association_per_hashtag() {
        let tags = extract_hashtags(&[record(1, 10, T1, &["rust", "etl"])]);
        assert_eq!(
            tags,
            vec![
                HashtagAssociation {
                    author_id: 10,
                    post_id: 1,
                    tag_text: "rust".to_string()
                },
                HashtagAssociation {
                    author_id: 10,
                    post_id: 1,
                    tag_text: "etl".to_string()
                },
            ]
        );
    }

    #[test]
    fn repeated_pair_emits_only_first_occurrence() {
        let first = record(1, 10, T1, &["a"]);
        let mut second = record(1, 10, T2, &["b", "c"]);
        second.text = "edited".to_string();

        let tags = extract_hashtags(&[first, second]);
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].tag_text, "a");
    }

    #[test]
    fn retweet_pairs_are_tracked_independently() {
        let rt = retweet(2, 20, T2, record(1, 10, T1, &["orig"]));
        let tags = extract_hashtags(&[rt]);

        assert_eq!(tags.len(), 2);
        assert_eq!((tags[0].author_id, tags[0].post_id), (20, 2));
        assert_eq!(tags[0].tag_text, "rt");
        assert_eq!((tags[1].author_id, tags[1].post_id), (10, 1));
        assert_eq!(tags[1].tag_text, "orig");
    }

    #[test]
    fn embedded_original_with_known_pair_is_skipped() {
        let records = vec![
            record(1, 10, T1, &["orig"]),
            retweet(2, 20, T2, record(1, 10, T1, &["orig"])),
        ];
        let tags = extract_hashtags(&records);
        let pairs: Vec<(u64, u64)> = tags.iter().map(|t| (t.author_id, t.post_id)).collect();
        assert_eq!(pairs, vec![(10, 1), (20, 2)]);
    }

    #[test]
    fn embedded_without_hashtags_emits_nothing_for_its_pair() {
        let rt = retweet(2, 20, T2, record(1, 10, T1, &[]));
        let tags = extract_hashtags(&[rt]);
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].post_id, 2);
    }
}
