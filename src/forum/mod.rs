//! Read access to the host forum's users and posts.

use crate::{
    models::{Post, PostId, User, UserId},
    Result,
};
use async_trait::async_trait;

mod memory;
mod mongo;

pub use memory::MemoryForum;
pub use mongo::MongoForum;

#[async_trait]
pub trait Forum: Send + Sync {
    async fn user(&self, id: UserId) -> Result<Option<User>>;
    async fn user_by_username(&self, username: &str) -> Result<Option<User>>;
    async fn post(&self, id: PostId) -> Result<Option<Post>>;
}
