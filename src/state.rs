use crate::config::AppConfig;
use crate::mailer::{self, Mailer};
use crate::storage::{LocalStorage, StorageClient};
use crate::users::repo::{PgUserStore, UserStore};
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn UserStore>,
    pub storage: Arc<dyn StorageClient>,
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    pub async fn init(config: AppConfig, db: PgPool) -> anyhow::Result<Self> {
        let local = LocalStorage::new(&config.uploads.dir).await?;
        tracing::info!(dir = %local.root().display(), "upload storage ready");
        let storage = Arc::new(local) as Arc<dyn StorageClient>;
        let mailer = mailer::from_config(&config.mail)?;
        let store = Arc::new(PgUserStore::new(db)) as Arc<dyn UserStore>;

        Ok(Self::from_parts(Arc::new(config), store, storage, mailer))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        store: Arc<dyn UserStore>,
        storage: Arc<dyn StorageClient>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            config,
            store,
            storage,
            mailer,
        }
    }
}
