//! Durable storage for users and items.
//!
//! A [`EntityStore`] is built once at startup and shared through `AppState`.
//! Every request carves its own [`StoreSession`] out of it; the session owns
//! whatever connection it holds and gives it back when dropped, so an early
//! return, an error or a cancelled request all release it the same way.

use std::sync::Arc;

use async_trait::async_trait;

mod error;
pub mod memory;
mod models;
pub mod postgres;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use models::{Item, User};
pub use postgres::PgStore;

/// Process-wide store handle.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Acquires a session for the duration of one request.
    async fn session(&self) -> Result<Box<dyn StoreSession>, StoreError>;

    /// Creates the `users` and `items` tables when they are missing.
    async fn ensure_schema(&self) -> Result<(), StoreError>;
}

/// Request-scoped view of the store.
#[async_trait]
pub trait StoreSession: Send {
    async fn get_user_by_id(&mut self, id: i64) -> Result<Option<User>, StoreError>;

    async fn get_user_by_email(&mut self, email: &str) -> Result<Option<User>, StoreError>;

    async fn get_user_by_username(&mut self, username: &str) -> Result<Option<User>, StoreError>;

    /// Inserts a user and returns it with the store-assigned id.
    /// Fails with [`StoreError::Conflict`] on a duplicate username or email.
    async fn create_user(
        &mut self,
        email: Option<&str>,
        username: &str,
        hashed_password: &str,
    ) -> Result<User, StoreError>;

    /// Items ordered by id. An offset past the end yields an empty list.
    async fn list_items(&mut self, offset: u32, limit: u32) -> Result<Vec<Item>, StoreError>;

    /// Fails with [`StoreError::ForeignKeyViolation`] when `owner_id` is unknown.
    async fn create_item(
        &mut self,
        title: &str,
        description: Option<&str>,
        owner_id: i64,
    ) -> Result<Item, StoreError>;
}

/// Picks a backend from the database URL: `memory://` for the in-process
/// store, anything else is handed to PostgreSQL.
pub async fn connect(
    database_url: &str,
    max_connections: u32,
) -> anyhow::Result<Arc<dyn EntityStore>> {
    if database_url.starts_with("memory:") {
        tracing::warn!("using in-memory store; data is lost on shutdown");
        return Ok(Arc::new(MemoryStore::new()));
    }
    let store = PgStore::connect(database_url, max_connections).await?;
    Ok(Arc::new(store))
}
