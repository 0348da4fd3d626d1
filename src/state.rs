use crate::config::AppConfig;
use crate::notify::{Notifier, SupabaseNotifier};
use crate::store::{self, EntityStore};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn EntityStore>,
    pub config: Arc<AppConfig>,
    pub notifier: Option<Arc<dyn Notifier>>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let store = store::connect(&config.database_url, config.max_connections).await?;

        let notifier = match &config.supabase {
            Some(supabase) => {
                tracing::info!(url = %supabase.url, "supabase notifier enabled");
                Some(Arc::new(SupabaseNotifier::new(supabase.clone())?) as Arc<dyn Notifier>)
            }
            None => None,
        };

        Ok(Self {
            store,
            config,
            notifier,
        })
    }

    pub fn from_parts(
        store: Arc<dyn EntityStore>,
        config: Arc<AppConfig>,
        notifier: Option<Arc<dyn Notifier>>,
    ) -> Self {
        Self {
            store,
            config,
            notifier,
        }
    }

    /// In-memory state for tests.
    #[cfg(test)]
    pub fn fake() -> Self {
        let config = Arc::new(AppConfig {
            database_url: "memory://".into(),
            max_connections: 1,
            host: "127.0.0.1".into(),
            port: 0,
            supabase: None,
        });
        Self::from_parts(Arc::new(store::MemoryStore::new()), config, None)
    }
}
