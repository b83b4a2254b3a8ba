use crate::{
    forum::Forum,
    links::LinkStore,
    models::{AliasPostLink, Post, User},
    settings::SiteSettings,
    Error, Result,
};
use log::{info, warn};

/// Records a post a staff member just wrote under the alias account.
#[derive(Clone, Copy)]
pub struct AliasPosting<'a> {
    settings: &'a SiteSettings,
    forum: &'a dyn Forum,
    links: &'a dyn LinkStore,
}

impl<'a> AliasPosting<'a> {
    pub fn new(settings: &'a SiteSettings, forum: &'a dyn Forum, links: &'a dyn LinkStore) -> Self {
        Self {
            settings,
            forum,
            links,
        }
    }

    #[inline]
    pub fn can_act_as_alias(&self, user: &User) -> bool {
        self.settings.is_feature_enabled() && user.is_staff()
    }

    pub async fn link_post(&self, acting_user: &User, post: &Post) -> Result<AliasPostLink> {
        if !self.settings.is_feature_enabled() {
            return Err(Error::Disabled);
        }
        if !acting_user.is_staff() {
            warn!(
                "{} tried to post as the staff alias without being staff",
                acting_user.username
            );
            return Err(Error::NotStaff(acting_user.username.clone()));
        }
        let alias = self
            .settings
            .alias_user(self.forum)
            .await?
            .ok_or_else(|| Error::MissingAliasUser(self.settings.alias_username.to_string()))?;
        if post.user_id != alias.id {
            return Err(Error::NotAliasPost(post.id));
        }

        let link = self.links.create(acting_user.id, post.id).await?;
        info!(
            "{} posted {} as {}",
            acting_user.username, post.id, alias.username
        );
        Ok(link)
    }
}
