use crate::models::{PostId, UserId};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("post {0} is already linked to a staff user")]
    DuplicateLink(PostId),
    #[error("user {0} does not exist")]
    UnknownUser(UserId),
    #[error("post {0} does not exist")]
    UnknownPost(PostId),
    #[error("staff alias is disabled")]
    Disabled,
    #[error("user {0} is not allowed to act as the staff alias")]
    NotStaff(String),
    #[error("alias user {0:?} does not exist")]
    MissingAliasUser(String),
    #[error("post {0} was not created by the alias user")]
    NotAliasPost(PostId),
    #[error(transparent)]
    Mongo(#[from] mongodb::error::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
