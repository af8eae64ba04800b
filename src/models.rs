use crate::config::TIMESTAMP_FORMAT;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// An identity field as it appeared on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawId {
    Numeric(u64),
    /// Present, but neither an unsigned integer nor a numeric string
    Unparsable,
}

impl RawId {
    pub fn resolved(self) -> Option<u64> {
        match self {
            RawId::Numeric(id) => Some(id),
            RawId::Unparsable => None,
        }
    }
}

/// Accepts a JSON number or a numeric string; `null` reads as absent.
fn deserialize_raw_id<'de, D>(deserializer: D) -> Result<Option<RawId>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => None,
        Value::Number(n) => Some(n.as_u64().map_or(RawId::Unparsable, RawId::Numeric)),
        Value::String(s) => Some(
            s.trim()
                .parse::<u64>()
                .map_or(RawId::Unparsable, RawId::Numeric),
        ),
        _ => Some(RawId::Unparsable),
    })
}

/// One input line as parsed, before validation. Every field is optional here.
#[derive(Debug, Default, Deserialize)]
pub struct RawTweet {
    #[serde(default, deserialize_with = "deserialize_raw_id")]
    pub id: Option<RawId>,
    #[serde(default, deserialize_with = "deserialize_raw_id")]
    pub id_str: Option<RawId>,
    pub user: Option<RawUser>,
    pub text: Option<String>,
    pub created_at: Option<String>,
    pub lang: Option<String>,
    pub entities: Option<RawEntities>,
    #[serde(default, deserialize_with = "deserialize_raw_id")]
    pub in_reply_to_user_id: Option<RawId>,
    pub retweeted_status: Option<Box<RawTweet>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawUser {
    #[serde(default, deserialize_with = "deserialize_raw_id")]
    pub id: Option<RawId>,
    #[serde(default, deserialize_with = "deserialize_raw_id")]
    pub id_str: Option<RawId>,
    pub screen_name: Option<String>,
    pub description: Option<String>,
    pub lang: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawEntities {
    pub hashtags: Option<Vec<RawHashtag>>,
}

#[derive(Debug, Deserialize)]
pub struct RawHashtag {
    pub text: String,
}

/// A validated tweet. Every field the extractors read is guaranteed present.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: u64,
    pub user: UserInfo,
    pub text: String,
    pub created_at: String,
    pub lang: String,
    pub hashtags: Vec<String>,
    pub in_reply_to_user_id: Option<u64>,
    pub retweeted_status: Option<Box<Record>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserInfo {
    pub id: u64,
    pub screen_name: String,
    pub description: Option<String>,
    pub lang: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: u64,
    pub author_id: u64,
    pub text: String,
    pub reply_to_user_id: Option<u64>,
    pub lang: String,
    pub created_at: String,
    pub retweet_of: Option<u64>,
}

impl Post {
    pub fn from_record(record: &Record, retweet_of: Option<u64>) -> Self {
        Self {
            id: record.id,
            author_id: record.user.id,
            text: record.text.clone(),
            reply_to_user_id: record.in_reply_to_user_id,
            lang: record.lang.clone(),
            created_at: record.created_at.clone(),
            retweet_of,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: u64,
    pub screen_name: String,
    pub description: Option<String>,
    pub lang: String,
    pub created_at: String,
    /// Timestamp of the tweet this view of the user was taken from
    pub updated_at: String,
}

impl Author {
    /// Builds the author view carried by `record`. Both timestamps are the
    /// tweet's own `created_at`.
    pub fn from_record(record: &Record) -> Self {
        let user = &record.user;
        Self {
            id: user.id,
            screen_name: user.screen_name.clone(),
            description: user.description.clone(),
            lang: user.lang.clone(),
            created_at: record.created_at.clone(),
            updated_at: record.created_at.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashtagAssociation {
    pub author_id: u64,
    pub post_id: u64,
    pub tag_text: String,
}

pub fn parse_timestamp(value: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_str(value, TIMESTAMP_FORMAT).ok()
}
