use crate::{
    config::Config,
    forum::{Forum, MongoForum},
    links::{LinkStore, MongoLinkStore},
    migrations,
    models::{PostId, UserId},
    posting::AliasPosting,
    serializer::StaffAliasSerializer,
    settings::SiteSettings,
    Result,
};
use log::{info, warn};
use std::sync::Arc;

pub const ENGINE_NAME: &str = "DiscourseStaffAlias";
pub const MOUNT_PATH: &str = "/discourse-staff-alias";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mount {
    pub engine: &'static str,
    pub at: &'static str,
}

/// Engine mounts the host collects at boot.
#[derive(Debug, Default)]
pub struct Routes {
    mounts: Vec<Mount>,
}

impl Routes {
    /// Returns `false` if the engine is already mounted at that path.
    pub fn mount(&mut self, engine: &'static str, at: &'static str) -> bool {
        let mount = Mount { engine, at };
        if self.mounts.contains(&mount) {
            return false;
        }
        self.mounts.push(mount);
        true
    }

    pub fn mounts(&self) -> &[Mount] {
        &self.mounts
    }

    pub fn engine_at(&self, path: &str) -> Option<&'static str> {
        self.mounts
            .iter()
            .find(|mount| mount.at == path)
            .map(|mount| mount.engine)
    }
}

pub struct StaffAlias {
    settings: SiteSettings,
    forum: Arc<dyn Forum>,
    links: Arc<dyn LinkStore>,
}

impl StaffAlias {
    pub fn new(settings: SiteSettings, forum: Arc<dyn Forum>, links: Arc<dyn LinkStore>) -> Self {
        Self {
            settings,
            forum,
            links,
        }
    }

    /// Connects to the configured database and brings its indexes up to date.
    pub async fn boot(config: &Config) -> color_eyre::eyre::Result<Self> {
        let db = mongodb::Client::with_uri_str(&*config.mongodb.uri)
            .await?
            .database(&config.mongodb.database);
        migrations::mongo(&db).await?;

        let forum: Arc<dyn Forum> = Arc::new(MongoForum::new(&db));
        let links = Arc::new(MongoLinkStore::new(&db, forum.clone()));
        Ok(Self::new(config.settings.clone(), forum, links))
    }

    pub fn register(routes: &mut Routes) {
        if routes.mount(ENGINE_NAME, MOUNT_PATH) {
            info!("Mounted {ENGINE_NAME} at {MOUNT_PATH}");
        }
    }

    #[inline]
    pub fn enabled(&self) -> bool {
        self.settings.is_feature_enabled()
    }

    pub fn settings(&self) -> &SiteSettings {
        &self.settings
    }

    pub fn update_settings(&mut self, settings: SiteSettings) {
        info!(
            "Staff alias settings changed: enabled={}, username={:?}",
            settings.enabled, &*settings.alias_username
        );
        self.settings = settings;
    }

    pub fn serializer(&self) -> StaffAliasSerializer<'_> {
        StaffAliasSerializer::new(&self.settings, self.forum.as_ref(), self.links.as_ref())
    }

    pub fn posting(&self) -> AliasPosting<'_> {
        AliasPosting::new(&self.settings, self.forum.as_ref(), self.links.as_ref())
    }

    pub async fn on_post_destroyed(&self, post: PostId) -> Result<u64> {
        self.links.delete_for_post(post).await
    }

    pub async fn on_user_destroyed(&self, user: UserId) -> Result<u64> {
        self.links.delete_for_user(user).await
    }

    /// Logs whether the configured alias account exists. A missing one leaves the add-on inert.
    pub async fn check(&self) -> Result<()> {
        if !self.enabled() {
            info!("Staff alias is disabled");
            return Ok(());
        }
        match self.settings.alias_user(self.forum.as_ref()).await? {
            Some(user) => info!("Staff alias posts as {} ({})", user.username, user.id),
            None => warn!(
                "Staff alias user {:?} does not exist; no aliased usernames will be shown",
                &*self.settings.alias_username
            ),
        }
        Ok(())
    }
}
