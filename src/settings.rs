use crate::{forum::Forum, models::User, substituting_string::SubstitutingString, Result};
use log::debug;
use serde::Deserialize;

/// Site settings the add-on reads, keyed the way the host names them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SiteSettings {
    #[serde(rename = "discourse_staff_alias_enabled", default)]
    pub enabled: bool,
    #[serde(rename = "discourse_staff_alias_username", default)]
    pub alias_username: SubstitutingString,
}

impl SiteSettings {
    pub fn new(enabled: bool, alias_username: &str) -> Self {
        Self {
            enabled,
            alias_username: alias_username.into(),
        }
    }

    #[inline]
    pub fn is_feature_enabled(&self) -> bool {
        self.enabled
    }

    /// The account staff post as. `None` when the configured username matches nobody.
    pub async fn alias_user<F>(&self, forum: &F) -> Result<Option<User>>
    where
        F: Forum + ?Sized,
    {
        if self.alias_username.is_empty() {
            return Ok(None);
        }
        let user = forum.user_by_username(&self.alias_username).await?;
        if user.is_none() {
            debug!("Alias user {:?} not found", &*self.alias_username);
        }
        Ok(user)
    }
}
