use super::LinkStore;
use crate::{
    forum::Forum,
    models::{AliasPostLink, PostId, UserId},
    Error, Result,
};
use async_trait::async_trait;
use log::info;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;

pub struct MemoryLinkStore {
    forum: Arc<dyn Forum>,
    links: RwLock<HashMap<PostId, AliasPostLink>>,
}

impl MemoryLinkStore {
    pub fn new(forum: Arc<dyn Forum>) -> Self {
        Self {
            forum,
            links: RwLock::new(HashMap::new()),
        }
    }

    pub async fn len(&self) -> usize {
        self.links.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.links.read().await.is_empty()
    }
}

#[async_trait]
impl LinkStore for MemoryLinkStore {
    async fn create(&self, user: UserId, post: PostId) -> Result<AliasPostLink> {
        if self.forum.user(user).await?.is_none() {
            return Err(Error::UnknownUser(user));
        }
        if self.forum.post(post).await?.is_none() {
            return Err(Error::UnknownPost(post));
        }

        let mut links = self.links.write().await;
        if links.contains_key(&post) {
            return Err(Error::DuplicateLink(post));
        }
        let link = AliasPostLink::new(user, post);
        links.insert(post, link.clone());
        info!("Linked post {post} to staff user {user}");
        Ok(link)
    }

    async fn find_by_post(&self, post: PostId) -> Result<Option<UserId>> {
        Ok(self.links.read().await.get(&post).map(|link| link.user_id))
    }

    async fn find_by_posts(&self, posts: &[PostId]) -> Result<HashMap<PostId, UserId>> {
        let links = self.links.read().await;
        Ok(posts
            .iter()
            .filter_map(|post| links.get(post).map(|link| (*post, link.user_id)))
            .collect())
    }

    async fn delete_for_post(&self, post: PostId) -> Result<u64> {
        Ok(u64::from(self.links.write().await.remove(&post).is_some()))
    }

    async fn delete_for_user(&self, user: UserId) -> Result<u64> {
        let mut links = self.links.write().await;
        let before = links.len();
        links.retain(|_, link| link.user_id != user);
        Ok((before - links.len()) as u64)
    }
}
