use chrono::{DateTime, Utc};
use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UserId(pub i64);

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PostId(pub i64);

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TopicId(pub i64);

/// A forum account as the host knows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub admin: bool,
    #[serde(default)]
    pub moderator: bool,
}

impl User {
    #[inline]
    pub fn is_staff(&self) -> bool {
        self.admin || self.moderator
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub topic_id: TopicId,
    /// Author as displayed on the forum; the alias account for aliased posts.
    pub user_id: UserId,
    pub post_number: i32,
}

/// Records which staff member actually wrote a post that shows the alias as its author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasPostLink {
    pub user_id: UserId,
    pub post_id: PostId,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl AliasPostLink {
    pub fn new(user_id: UserId, post_id: PostId) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            post_id,
            created_at: now,
            updated_at: now,
        }
    }
}
