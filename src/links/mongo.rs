use super::LinkStore;
use crate::{
    forum::Forum,
    models::{AliasPostLink, PostId, UserId},
    Error, Result,
};
use async_trait::async_trait;
use futures::TryStreamExt;
use log::info;
use mongodb::{
    bson::doc,
    error::{ErrorKind, WriteFailure},
    options::FindOptions,
    Collection, Database,
};
use std::{collections::HashMap, sync::Arc};

pub const COLLECTION_NAME: &str = "discourse-staff-alias-users-posts-links";

const DUPLICATE_KEY: i32 = 11000;

/// Link store backed by a collection with a unique index on `post_id`
/// (see [`migrations::mongo`](crate::migrations::mongo)).
pub struct MongoLinkStore {
    forum: Arc<dyn Forum>,
    collection: Collection<AliasPostLink>,
}

impl MongoLinkStore {
    pub fn new(db: &Database, forum: Arc<dyn Forum>) -> Self {
        Self {
            forum,
            collection: db.collection(COLLECTION_NAME),
        }
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        &*err.kind,
        ErrorKind::Write(WriteFailure::WriteError(write_error)) if write_error.code == DUPLICATE_KEY
    )
}

#[async_trait]
impl LinkStore for MongoLinkStore {
    async fn create(&self, user: UserId, post: PostId) -> Result<AliasPostLink> {
        if self.forum.user(user).await?.is_none() {
            return Err(Error::UnknownUser(user));
        }
        if self.forum.post(post).await?.is_none() {
            return Err(Error::UnknownPost(post));
        }

        let link = AliasPostLink::new(user, post);
        match self.collection.insert_one(&link, None).await {
            Ok(_) => {
                info!("Linked post {post} to staff user {user}");
                Ok(link)
            }
            Err(err) if is_duplicate_key(&err) => Err(Error::DuplicateLink(post)),
            Err(err) => Err(err.into()),
        }
    }

    async fn find_by_post(&self, post: PostId) -> Result<Option<UserId>> {
        Ok(self
            .collection
            .find_one(doc! { "post_id": post.0 }, None)
            .await?
            .map(|link| link.user_id))
    }

    async fn find_by_posts(&self, posts: &[PostId]) -> Result<HashMap<PostId, UserId>> {
        if posts.is_empty() {
            return Ok(HashMap::new());
        }
        let ids: Vec<i64> = posts.iter().map(|post| post.0).collect();
        let links: Vec<AliasPostLink> = self
            .collection
            .find(
                doc! { "post_id": { "$in": ids } },
                FindOptions::builder()
                    .batch_size(u32::try_from(posts.len()).ok())
                    .build(),
            )
            .await?
            .try_collect()
            .await?;
        Ok(links
            .into_iter()
            .map(|link| (link.post_id, link.user_id))
            .collect())
    }

    async fn delete_for_post(&self, post: PostId) -> Result<u64> {
        Ok(self
            .collection
            .delete_one(doc! { "post_id": post.0 }, None)
            .await?
            .deleted_count)
    }

    async fn delete_for_user(&self, user: UserId) -> Result<u64> {
        Ok(self
            .collection
            .delete_many(doc! { "user_id": user.0 }, None)
            .await?
            .deleted_count)
    }
}
