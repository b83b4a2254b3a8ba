//! Adds `aliased_staff_username` to serialized posts.

use crate::{
    forum::Forum,
    guardian::Guardian,
    links::LinkStore,
    models::{Post, UserId},
    settings::SiteSettings,
    topic_view::TopicView,
    Result,
};
use log::{debug, trace};
use serde_json::{Map, Value};

pub const FIELD_NAME: &str = "aliased_staff_username";

/// Decorates the host's post payload. Borrowing everything keeps it cheap to build per request.
#[derive(Clone, Copy)]
pub struct StaffAliasSerializer<'a> {
    settings: &'a SiteSettings,
    forum: &'a dyn Forum,
    links: &'a dyn LinkStore,
}

impl<'a> StaffAliasSerializer<'a> {
    pub fn new(settings: &'a SiteSettings, forum: &'a dyn Forum, links: &'a dyn LinkStore) -> Self {
        Self {
            settings,
            forum,
            links,
        }
    }

    /// Flag on, staff viewer, post authored by the alias account. Only the last one needs a lookup.
    pub async fn include_aliased_staff_username(
        &self,
        post: &Post,
        scope: &Guardian,
    ) -> Result<bool> {
        if !self.settings.is_feature_enabled() || !scope.is_staff() {
            return Ok(false);
        }
        let Some(alias) = self.settings.alias_user(self.forum).await? else {
            return Ok(false);
        };
        Ok(post.user_id == alias.id)
    }

    pub async fn aliased_staff_username(
        &self,
        post: &Post,
        scope: &Guardian,
        topic_view: Option<&TopicView>,
    ) -> Result<Option<String>> {
        if !self.include_aliased_staff_username(post, scope).await? {
            return Ok(None);
        }

        let Some(staff_id) = self.aliased_staff(post, topic_view).await? else {
            trace!("Post {} has no alias link", post.id);
            return Ok(None);
        };
        match self.forum.user(staff_id).await? {
            Some(user) => Ok(Some(user.username)),
            None => {
                debug!("Post {} is linked to missing user {staff_id}", post.id);
                Ok(None)
            }
        }
    }

    async fn aliased_staff(
        &self,
        post: &Post,
        topic_view: Option<&TopicView>,
    ) -> Result<Option<UserId>> {
        if let Some(preloaded) = topic_view.and_then(|view| view.aliased_staff(post.id)) {
            return Ok(preloaded);
        }
        self.links.find_by_post(post.id).await
    }

    /// Inserts the field into `payload` when it applies; otherwise leaves it untouched.
    pub async fn decorate(
        &self,
        post: &Post,
        scope: &Guardian,
        topic_view: Option<&TopicView>,
        payload: &mut Map<String, Value>,
    ) -> Result<()> {
        if let Some(username) = self.aliased_staff_username(post, scope, topic_view).await? {
            payload.insert(FIELD_NAME.to_owned(), Value::String(username));
        }
        Ok(())
    }

    /// Base post fields plus the decoration, for hosts without a serializer of their own.
    pub async fn serialize(
        &self,
        post: &Post,
        scope: &Guardian,
        topic_view: Option<&TopicView>,
    ) -> Result<Map<String, Value>> {
        let mut payload = Map::new();
        payload.insert("id".to_owned(), post.id.0.into());
        payload.insert("topic_id".to_owned(), post.topic_id.0.into());
        payload.insert("user_id".to_owned(), post.user_id.0.into());
        payload.insert("post_number".to_owned(), post.post_number.into());
        self.decorate(post, scope, topic_view, &mut payload).await?;
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        forum::MemoryForum,
        links::MemoryLinkStore,
        models::{AliasPostLink, PostId, TopicId, User},
    };
    use async_trait::async_trait;
    use proptest::prelude::*;
    use std::{
        collections::HashMap,
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc,
        },
    };

    const ALIAS: UserId = UserId(1);
    const MODERATOR: UserId = UserId(2);
    const MEMBER: UserId = UserId(3);
    const ALIAS_POST: PostId = PostId(10);
    const NORMAL_POST: PostId = PostId(11);
    const UNLINKED_ALIAS_POST: PostId = PostId(12);

    struct Fixture {
        forum: Arc<MemoryForum>,
        links: MemoryLinkStore,
        settings: SiteSettings,
    }

    impl Fixture {
        async fn new() -> Self {
            let forum = Arc::new(MemoryForum::default());
            for (id, username, moderator) in [
                (ALIAS, "some_alias", false),
                (MODERATOR, "moderator", true),
                (MEMBER, "member", false),
            ] {
                forum
                    .insert_user(User {
                        id,
                        username: username.to_owned(),
                        admin: false,
                        moderator,
                    })
                    .await;
            }
            for (id, user_id) in [
                (ALIAS_POST, ALIAS),
                (NORMAL_POST, MEMBER),
                (UNLINKED_ALIAS_POST, ALIAS),
            ] {
                forum.insert_post(post(id, user_id)).await;
            }
            let links = MemoryLinkStore::new(forum.clone());
            links.create(MODERATOR, ALIAS_POST).await.unwrap();
            Self {
                forum,
                links,
                settings: SiteSettings::new(true, "some_alias"),
            }
        }

        fn serializer(&self) -> StaffAliasSerializer<'_> {
            StaffAliasSerializer::new(&self.settings, self.forum.as_ref(), &self.links)
        }

        async fn guardian(&self, id: UserId) -> Guardian {
            Guardian::new(self.forum.user(id).await.unwrap())
        }

        async fn topic_view(&self) -> TopicView {
            TopicView::load(
                &self.links,
                TopicId(1),
                &[ALIAS_POST, NORMAL_POST, UNLINKED_ALIAS_POST],
            )
            .await
            .unwrap()
        }

        async fn field(
            &self,
            post_id: PostId,
            scope: &Guardian,
            topic_view: Option<&TopicView>,
        ) -> Option<Value> {
            let post = self.forum.post(post_id).await.unwrap().unwrap();
            self.serializer()
                .serialize(&post, scope, topic_view)
                .await
                .unwrap()
                .remove(FIELD_NAME)
        }
    }

    fn post(id: PostId, user_id: UserId) -> Post {
        Post {
            id,
            topic_id: TopicId(1),
            user_id,
            post_number: 1,
        }
    }

    #[tokio::test]
    async fn test_not_included_when_disabled() {
        let mut fixture = Fixture::new().await;
        fixture.settings.enabled = false;
        let scope = fixture.guardian(MODERATOR).await;
        assert_eq!(fixture.field(ALIAS_POST, &scope, None).await, None);
        // the link itself survives
        assert_eq!(
            fixture.links.find_by_post(ALIAS_POST).await.unwrap(),
            Some(MODERATOR)
        );
    }

    #[tokio::test]
    async fn test_not_included_for_post_not_by_alias() {
        let fixture = Fixture::new().await;
        let scope = fixture.guardian(MODERATOR).await;
        assert_eq!(fixture.field(NORMAL_POST, &scope, None).await, None);
    }

    #[tokio::test]
    async fn test_not_included_for_non_staff() {
        let fixture = Fixture::new().await;
        let view = fixture.topic_view().await;
        assert_eq!(
            fixture
                .field(ALIAS_POST, &Guardian::anonymous(), Some(&view))
                .await,
            None
        );
        let member = fixture.guardian(MEMBER).await;
        assert_eq!(fixture.field(ALIAS_POST, &member, Some(&view)).await, None);
        assert_eq!(fixture.field(ALIAS_POST, &member, None).await, None);
    }

    #[tokio::test]
    async fn test_included_with_topic_view() {
        let fixture = Fixture::new().await;
        let scope = fixture.guardian(MODERATOR).await;
        let view = fixture.topic_view().await;
        assert_eq!(
            fixture.field(ALIAS_POST, &scope, Some(&view)).await,
            Some(Value::from("moderator"))
        );
    }

    #[tokio::test]
    async fn test_included_without_topic_view() {
        let fixture = Fixture::new().await;
        let scope = fixture.guardian(MODERATOR).await;
        assert_eq!(
            fixture.field(ALIAS_POST, &scope, None).await,
            Some(Value::from("moderator"))
        );
    }

    #[tokio::test]
    async fn test_topic_view_without_post_falls_back_to_store() {
        let fixture = Fixture::new().await;
        let scope = fixture.guardian(MODERATOR).await;
        let view = TopicView::load(&fixture.links, TopicId(1), &[NORMAL_POST])
            .await
            .unwrap();
        assert_eq!(
            fixture.field(ALIAS_POST, &scope, Some(&view)).await,
            Some(Value::from("moderator"))
        );
    }

    #[tokio::test]
    async fn test_omitted_without_link() {
        let fixture = Fixture::new().await;
        let scope = fixture.guardian(MODERATOR).await;
        let view = fixture.topic_view().await;
        assert_eq!(fixture.field(UNLINKED_ALIAS_POST, &scope, None).await, None);
        assert_eq!(
            fixture
                .field(UNLINKED_ALIAS_POST, &scope, Some(&view))
                .await,
            None
        );
    }

    #[tokio::test]
    async fn test_omitted_when_alias_user_missing() {
        let mut fixture = Fixture::new().await;
        fixture.settings = SiteSettings::new(true, "renamed_alias");
        let scope = fixture.guardian(MODERATOR).await;
        assert_eq!(fixture.field(ALIAS_POST, &scope, None).await, None);
    }

    #[tokio::test]
    async fn test_omitted_when_linked_user_deleted() {
        let fixture = Fixture::new().await;
        let scope = fixture.guardian(MODERATOR).await;
        fixture.forum.remove_user(MODERATOR).await;
        assert_eq!(fixture.field(ALIAS_POST, &scope, None).await, None);
    }

    #[tokio::test]
    async fn test_omitted_after_link_deleted() {
        let fixture = Fixture::new().await;
        let scope = fixture.guardian(MODERATOR).await;
        fixture.links.delete_for_post(ALIAS_POST).await.unwrap();
        assert_eq!(fixture.field(ALIAS_POST, &scope, None).await, None);
    }

    #[tokio::test]
    async fn test_decorate_keeps_base_payload() {
        let fixture = Fixture::new().await;
        let scope = fixture.guardian(MODERATOR).await;
        let post = fixture.forum.post(ALIAS_POST).await.unwrap().unwrap();
        let mut payload = Map::new();
        payload.insert("cooked".to_owned(), Value::from("<p>hi</p>"));
        fixture
            .serializer()
            .decorate(&post, &scope, None, &mut payload)
            .await
            .unwrap();
        assert_eq!(payload.len(), 2);
        assert_eq!(payload["cooked"], "<p>hi</p>");
        assert_eq!(payload[FIELD_NAME], "moderator");
    }

    /// Counts every lookup that reaches the forum or the link store.
    struct Counting<'a> {
        fixture: &'a Fixture,
        lookups: AtomicUsize,
    }

    impl<'a> Counting<'a> {
        fn new(fixture: &'a Fixture) -> Self {
            Self {
                fixture,
                lookups: AtomicUsize::new(0),
            }
        }

        fn lookups(&self) -> usize {
            self.lookups.load(Ordering::SeqCst)
        }

        fn hit(&self) {
            self.lookups.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl<'a> Forum for Counting<'a> {
        async fn user(&self, id: UserId) -> Result<Option<User>> {
            self.hit();
            self.fixture.forum.user(id).await
        }

        async fn user_by_username(&self, username: &str) -> Result<Option<User>> {
            self.hit();
            self.fixture.forum.user_by_username(username).await
        }

        async fn post(&self, id: PostId) -> Result<Option<Post>> {
            self.hit();
            self.fixture.forum.post(id).await
        }
    }

    #[async_trait]
    impl<'a> LinkStore for Counting<'a> {
        async fn create(&self, user: UserId, post: PostId) -> Result<AliasPostLink> {
            self.hit();
            self.fixture.links.create(user, post).await
        }

        async fn find_by_post(&self, post: PostId) -> Result<Option<UserId>> {
            self.hit();
            self.fixture.links.find_by_post(post).await
        }

        async fn find_by_posts(&self, posts: &[PostId]) -> Result<HashMap<PostId, UserId>> {
            self.hit();
            self.fixture.links.find_by_posts(posts).await
        }

        async fn delete_for_post(&self, post: PostId) -> Result<u64> {
            self.hit();
            self.fixture.links.delete_for_post(post).await
        }

        async fn delete_for_user(&self, user: UserId) -> Result<u64> {
            self.hit();
            self.fixture.links.delete_for_user(user).await
        }
    }

    #[tokio::test]
    async fn test_disabled_does_no_lookups() {
        let mut fixture = Fixture::new().await;
        fixture.settings.enabled = false;
        let scope = fixture.guardian(MODERATOR).await;
        let post = post(ALIAS_POST, ALIAS);

        let counting = Counting::new(&fixture);
        let serializer = StaffAliasSerializer::new(&fixture.settings, &counting, &counting);
        let payload = serializer.serialize(&post, &scope, None).await.unwrap();
        assert!(!payload.contains_key(FIELD_NAME));
        assert_eq!(counting.lookups(), 0);
    }

    #[tokio::test]
    async fn test_non_staff_does_no_lookups() {
        let fixture = Fixture::new().await;
        let member = fixture.guardian(MEMBER).await;
        let post = post(ALIAS_POST, ALIAS);

        let counting = Counting::new(&fixture);
        let serializer = StaffAliasSerializer::new(&fixture.settings, &counting, &counting);
        for scope in [Guardian::anonymous(), member] {
            let payload = serializer.serialize(&post, &scope, None).await.unwrap();
            assert!(!payload.contains_key(FIELD_NAME));
        }
        assert_eq!(counting.lookups(), 0);
    }

    #[tokio::test]
    async fn test_enabled_staff_view_looks_up() {
        let fixture = Fixture::new().await;
        let scope = fixture.guardian(MODERATOR).await;
        let post = post(ALIAS_POST, ALIAS);

        let counting = Counting::new(&fixture);
        let serializer = StaffAliasSerializer::new(&fixture.settings, &counting, &counting);
        let payload = serializer.serialize(&post, &scope, None).await.unwrap();
        assert_eq!(payload[FIELD_NAME], "moderator");
        // alias user, link, linked user
        assert_eq!(counting.lookups(), 3);
    }

    proptest! {
        #[test]
        fn prop_non_alias_posts_never_show_field(
            author in 2_i64..1000,
            enabled: bool,
            viewer_is_staff: bool,
            anonymous: bool,
        ) {
            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let field = runtime.block_on(async {
                let mut fixture = Fixture::new().await;
                fixture.settings.enabled = enabled;
                let scope = if anonymous {
                    Guardian::anonymous()
                } else {
                    Guardian::from(User {
                        id: UserId(500),
                        username: "viewer".to_owned(),
                        admin: viewer_is_staff,
                        moderator: false,
                    })
                };
                let post = post(PostId(1000), UserId(author));
                fixture.serializer().serialize(&post, &scope, None).await.unwrap()
            });
            prop_assert!(!field.contains_key(FIELD_NAME));
        }

        #[test]
        fn prop_topic_view_does_not_change_result(
            post_id in 10_i64..13,
            viewer in 1_i64..4,
            enabled: bool,
        ) {
            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let (with_view, without_view) = runtime.block_on(async {
                let mut fixture = Fixture::new().await;
                fixture.settings.enabled = enabled;
                let scope = fixture.guardian(UserId(viewer)).await;
                let view = fixture.topic_view().await;
                (
                    fixture.field(PostId(post_id), &scope, Some(&view)).await,
                    fixture.field(PostId(post_id), &scope, None).await,
                )
            });
            prop_assert_eq!(with_view, without_view);
        }
    }
}
