//! Store wrappers used by handler tests to observe session lifetimes.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::AppConfig;
use crate::state::AppState;
use crate::store::{EntityStore, Item, MemoryStore, StoreError, StoreSession, User};

/// Wraps [`MemoryStore`] and counts sessions that have not been dropped yet.
#[derive(Clone, Default)]
pub struct CountingStore {
    inner: MemoryStore,
    live: Arc<AtomicUsize>,
}

impl CountingStore {
    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    pub fn live_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.live)
    }

    pub fn state(&self) -> AppState {
        let fake = AppState::fake();
        AppState::from_parts(Arc::new(self.clone()), fake.config, None)
    }
}

#[async_trait]
impl EntityStore for CountingStore {
    async fn session(&self) -> Result<Box<dyn StoreSession>, StoreError> {
        let inner = self.inner.session().await?;
        self.live.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(CountingSession {
            inner,
            live: Arc::clone(&self.live),
        }))
    }

    async fn ensure_schema(&self) -> Result<(), StoreError> {
        self.inner.ensure_schema().await
    }
}

struct CountingSession {
    inner: Box<dyn StoreSession>,
    live: Arc<AtomicUsize>,
}

impl Drop for CountingSession {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl StoreSession for CountingSession {
    async fn get_user_by_id(&mut self, id: i64) -> Result<Option<User>, StoreError> {
        self.inner.get_user_by_id(id).await
    }

    async fn get_user_by_email(&mut self, email: &str) -> Result<Option<User>, StoreError> {
        self.inner.get_user_by_email(email).await
    }

    async fn get_user_by_username(&mut self, username: &str) -> Result<Option<User>, StoreError> {
        self.inner.get_user_by_username(username).await
    }

    async fn create_user(
        &mut self,
        email: Option<&str>,
        username: &str,
        hashed_password: &str,
    ) -> Result<User, StoreError> {
        self.inner.create_user(email, username, hashed_password).await
    }

    async fn list_items(&mut self, offset: u32, limit: u32) -> Result<Vec<Item>, StoreError> {
        self.inner.list_items(offset, limit).await
    }

    async fn create_item(
        &mut self,
        title: &str,
        description: Option<&str>,
        owner_id: i64,
    ) -> Result<Item, StoreError> {
        self.inner.create_item(title, description, owner_id).await
    }
}

/// A store whose sessions can never be acquired, like an exhausted pool.
pub struct UnreachableStore;

#[async_trait]
impl EntityStore for UnreachableStore {
    async fn session(&self) -> Result<Box<dyn StoreSession>, StoreError> {
        Err(StoreError::Unavailable("pool timed out".into()))
    }

    async fn ensure_schema(&self) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("pool timed out".into()))
    }
}

impl UnreachableStore {
    pub fn state() -> AppState {
        let config: Arc<AppConfig> = AppState::fake().config;
        AppState::from_parts(Arc::new(UnreachableStore), config, None)
    }
}
