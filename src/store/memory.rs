use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{EntityStore, Item, StoreError, StoreSession, User};

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    items: BTreeMap<i64, Item>,
    last_user_id: i64,
    last_item_id: i64,
}

/// In-process store with the same uniqueness and ownership rules as the
/// PostgreSQL schema. Each write holds the lock for its whole check-then-insert.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn session(&self) -> Result<Box<dyn StoreSession>, StoreError> {
        Ok(Box::new(MemorySession {
            tables: Arc::clone(&self.tables),
        }))
    }

    async fn ensure_schema(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

pub struct MemorySession {
    tables: Arc<Mutex<Tables>>,
}

#[async_trait]
impl StoreSession for MemorySession {
    async fn get_user_by_id(&mut self, id: i64) -> Result<Option<User>, StoreError> {
        Ok(self.tables.lock().await.users.get(&id).cloned())
    }

    async fn get_user_by_email(&mut self, email: &str) -> Result<Option<User>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.email.as_deref() == Some(email))
            .cloned())
    }

    async fn get_user_by_username(&mut self, username: &str) -> Result<Option<User>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn create_user(
        &mut self,
        email: Option<&str>,
        username: &str,
        hashed_password: &str,
    ) -> Result<User, StoreError> {
        let mut tables = self.tables.lock().await;
        if tables.users.values().any(|u| u.username == username) {
            return Err(StoreError::Conflict("username already registered".into()));
        }
        // Absent emails never collide, matching NULL semantics of a UNIQUE column.
        if let Some(email) = email {
            if tables.users.values().any(|u| u.email.as_deref() == Some(email)) {
                return Err(StoreError::Conflict("email already registered".into()));
            }
        }

        tables.last_user_id += 1;
        let user = User {
            id: tables.last_user_id,
            email: email.map(str::to_string),
            username: username.to_string(),
            hashed_password: hashed_password.to_string(),
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn list_items(&mut self, offset: u32, limit: u32) -> Result<Vec<Item>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .items
            .values()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn create_item(
        &mut self,
        title: &str,
        description: Option<&str>,
        owner_id: i64,
    ) -> Result<Item, StoreError> {
        let mut tables = self.tables.lock().await;
        if !tables.users.contains_key(&owner_id) {
            return Err(StoreError::ForeignKeyViolation(
                "owner user does not exist".into(),
            ));
        }

        tables.last_item_id += 1;
        let item = Item {
            id: tables.last_item_id,
            title: title.to_string(),
            description: description.map(str::to_string),
            owner_id,
        };
        tables.items.insert(item.id, item.clone());
        Ok(item)
    }
}
