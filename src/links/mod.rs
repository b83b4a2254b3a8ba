//! Which staff member is really behind each aliased post.

use crate::{
    models::{AliasPostLink, PostId, UserId},
    Result,
};
use async_trait::async_trait;
use std::collections::HashMap;

mod memory;
mod mongo;

pub use memory::MemoryLinkStore;
pub use mongo::{MongoLinkStore, COLLECTION_NAME};

/// At most one link exists per post. `create` fails with
/// [`Error::DuplicateLink`](crate::Error::DuplicateLink) otherwise, and with
/// `UnknownUser`/`UnknownPost` when either side is not a forum record.
#[async_trait]
pub trait LinkStore: Send + Sync {
    async fn create(&self, user: UserId, post: PostId) -> Result<AliasPostLink>;

    async fn find_by_post(&self, post: PostId) -> Result<Option<UserId>>;

    /// Links for every given post that has one.
    async fn find_by_posts(&self, posts: &[PostId]) -> Result<HashMap<PostId, UserId>>;

    async fn delete_for_post(&self, post: PostId) -> Result<u64>;

    async fn delete_for_user(&self, user: UserId) -> Result<u64>;
}
