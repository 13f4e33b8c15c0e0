//! `FolioApi`: one handle wiring the client, transport and stores into every
//! repository.

use std::sync::Arc;

use tracing::debug;

use crate::client::FolioClient;
use crate::config::ClientConfig;
use crate::endpoint::{ARTWORKS, CONTACTS, IMAGES, NAV_ITEMS, SECTIONS, SOCIAL_LINKS, WRITINGS};
use crate::repository::{
    ArtworkRepository, AuthRepository, ContactRepository, Context, CrudRepository,
    DashboardRepository, ImageRepository, NavigationItemRepository, SectionRepository,
    SiteRepository, SocialLinkRepository, WritingRepository,
};
use crate::session::{SessionStore, ThemeStore};
use crate::store::{JsonFileStore, KeyValueStore, MemoryStore, StoreError};
use crate::transport::Transport;

#[derive(Clone)]
pub struct FolioApi {
    ctx: Arc<Context>,
    theme: Arc<ThemeStore>,
}

impl FolioApi {
    /// Build from configuration. The session lives in `session_file` when one
    /// is configured and in memory otherwise.
    pub fn new(config: &ClientConfig, transport: Arc<dyn Transport>) -> Result<Self, StoreError> {
        let kv: Arc<dyn KeyValueStore> = match &config.session_file {
            Some(path) => {
                debug!(path = %path.display(), "using file-backed session store");
                Arc::new(JsonFileStore::open(path)?)
            }
            None => Arc::new(MemoryStore::new()),
        };
        Ok(Self::with_store(&config.base_url, transport, kv))
    }

    pub fn with_store(
        base_url: &str,
        transport: Arc<dyn Transport>,
        kv: Arc<dyn KeyValueStore>,
    ) -> Self {
        let session = Arc::new(SessionStore::new(kv.clone()));
        let ctx = Arc::new(Context::new(FolioClient::new(base_url), transport, session));
        Self {
            ctx,
            theme: Arc::new(ThemeStore::new(kv)),
        }
    }

    pub fn client(&self) -> &FolioClient {
        &self.ctx.client
    }

    pub fn session(&self) -> &SessionStore {
        &self.ctx.session
    }

    pub fn theme(&self) -> &ThemeStore {
        &self.theme
    }

    pub fn auth(&self) -> AuthRepository {
        AuthRepository::new(self.ctx.clone())
    }

    pub fn dashboard(&self) -> DashboardRepository {
        DashboardRepository::new(self.ctx.clone())
    }

    pub fn artworks(&self) -> ArtworkRepository {
        CrudRepository::new(self.ctx.clone(), ARTWORKS)
    }

    pub fn writings(&self) -> WritingRepository {
        CrudRepository::new(self.ctx.clone(), WRITINGS)
    }

    pub fn images(&self) -> ImageRepository {
        CrudRepository::new(self.ctx.clone(), IMAGES)
    }

    pub fn contacts(&self) -> ContactRepository {
        CrudRepository::new(self.ctx.clone(), CONTACTS)
    }

    pub fn navigation_items(&self) -> NavigationItemRepository {
        CrudRepository::new(self.ctx.clone(), NAV_ITEMS)
    }

    pub fn social_links(&self) -> SocialLinkRepository {
        CrudRepository::new(self.ctx.clone(), SOCIAL_LINKS)
    }

    pub fn sections(&self) -> SectionRepository {
        CrudRepository::new(self.ctx.clone(), SECTIONS)
    }

    pub fn site(&self) -> SiteRepository {
        SiteRepository::new(self.ctx.clone())
    }
}
