use crate::{
    links::LinkStore,
    models::{PostId, TopicId, UserId},
    Result,
};
use itertools::Itertools;
use log::trace;
use std::collections::{HashMap, HashSet};

/// Posts of one topic being rendered together, with their alias links loaded up front.
#[derive(Debug, Clone)]
pub struct TopicView {
    pub topic_id: TopicId,
    loaded: HashSet<PostId>,
    links: HashMap<PostId, UserId>,
}

impl TopicView {
    pub async fn load<S>(store: &S, topic_id: TopicId, posts: &[PostId]) -> Result<Self>
    where
        S: LinkStore + ?Sized,
    {
        let posts: Vec<PostId> = posts.iter().copied().unique().collect();
        let links = store.find_by_posts(&posts).await?;
        trace!(
            "Preloaded {} alias links for {} posts in topic {topic_id}",
            links.len(),
            posts.len()
        );
        Ok(Self {
            topic_id,
            loaded: posts.into_iter().collect(),
            links,
        })
    }

    /// `None` when the post was not part of the preload; `Some(None)` when it was and has no link.
    pub fn aliased_staff(&self, post: PostId) -> Option<Option<UserId>> {
        self.loaded
            .contains(&post)
            .then(|| self.links.get(&post).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        forum::MemoryForum,
        links::MemoryLinkStore,
        models::{Post, User},
    };
    use std::sync::Arc;

    #[tokio::test]
    async fn test_preload() {
        let forum = Arc::new(MemoryForum::default());
        forum
            .insert_user(User {
                id: UserId(2),
                username: "mod".to_owned(),
                admin: false,
                moderator: true,
            })
            .await;
        for id in [10, 11] {
            forum
                .insert_post(Post {
                    id: PostId(id),
                    topic_id: TopicId(1),
                    user_id: UserId(1),
                    post_number: 1,
                })
                .await;
        }
        let store = MemoryLinkStore::new(forum);
        store.create(UserId(2), PostId(10)).await.unwrap();

        let view = TopicView::load(&store, TopicId(1), &[PostId(10), PostId(11), PostId(10)])
            .await
            .unwrap();
        assert_eq!(view.aliased_staff(PostId(10)), Some(Some(UserId(2))));
        assert_eq!(view.aliased_staff(PostId(11)), Some(None));
        assert_eq!(view.aliased_staff(PostId(12)), None);
    }
}
