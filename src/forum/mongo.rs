use super::Forum;
use crate::{
    models::{Post, PostId, User, UserId},
    Result,
};
use async_trait::async_trait;
use mongodb::{
    bson::doc,
    options::{Collation, CollationStrength, FindOneOptions},
    Collection, Database,
};

pub const USERS_COLLECTION: &str = "users";
pub const POSTS_COLLECTION: &str = "posts";

/// Host records living in the same MongoDB database.
///
/// Usernames are matched case-insensitively through a secondary-strength collation.
#[derive(Debug, Clone)]
pub struct MongoForum {
    users: Collection<User>,
    posts: Collection<Post>,
}

impl MongoForum {
    pub fn new(db: &Database) -> Self {
        Self {
            users: db.collection(USERS_COLLECTION),
            posts: db.collection(POSTS_COLLECTION),
        }
    }
}

#[async_trait]
impl Forum for MongoForum {
    async fn user(&self, id: UserId) -> Result<Option<User>> {
        Ok(self.users.find_one(doc! { "id": id.0 }, None).await?)
    }

    async fn user_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .find_one(
                doc! { "username": username },
                FindOneOptions::builder()
                    .collation(
                        Collation::builder()
                            .locale("en")
                            .strength(CollationStrength::Secondary)
                            .build(),
                    )
                    .build(),
            )
            .await?)
    }

    async fn post(&self, id: PostId) -> Result<Option<Post>> {
        Ok(self.posts.find_one(doc! { "id": id.0 }, None).await?)
    }
}
