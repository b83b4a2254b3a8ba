use super::Forum;
use crate::{
    models::{Post, PostId, User, UserId},
    Result,
};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Records {
    users: HashMap<UserId, User>,
    posts: HashMap<PostId, Post>,
}

/// In-process forum, for embedding hosts that keep their own records and for tests.
#[derive(Debug, Default)]
pub struct MemoryForum {
    records: RwLock<Records>,
}

impl MemoryForum {
    pub async fn insert_user(&self, user: User) {
        self.records.write().await.users.insert(user.id, user);
    }

    pub async fn insert_post(&self, post: Post) {
        self.records.write().await.posts.insert(post.id, post);
    }

    pub async fn remove_user(&self, id: UserId) -> Option<User> {
        self.records.write().await.users.remove(&id)
    }

    pub async fn remove_post(&self, id: PostId) -> Option<Post> {
        self.records.write().await.posts.remove(&id)
    }
}

#[async_trait]
impl Forum for MemoryForum {
    async fn user(&self, id: UserId) -> Result<Option<User>> {
        Ok(self.records.read().await.users.get(&id).cloned())
    }

    async fn user_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self
            .records
            .read()
            .await
            .users
            .values()
            .find(|user| user.username.eq_ignore_ascii_case(username))
            .cloned())
    }

    async fn post(&self, id: PostId) -> Result<Option<Post>> {
        Ok(self.records.read().await.posts.get(&id).cloned())
    }
}
