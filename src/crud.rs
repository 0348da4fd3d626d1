//! Request-level operations over a store session.
//!
//! Every function takes the session explicitly. Store errors are returned
//! as-is; mapping them to a transport status is the caller's job.

use serde::Deserialize;
use tracing::debug;

use crate::auth::{hash_password, HashError};
use crate::store::{Item, StoreError, StoreSession, User};

#[derive(Debug, thiserror::Error)]
pub enum CrudError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Hash(#[from] HashError),
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserCreate {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ItemCreate {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

pub async fn get_user(
    session: &mut dyn StoreSession,
    user_id: i64,
) -> Result<Option<User>, CrudError> {
    Ok(session.get_user_by_id(user_id).await?)
}

pub async fn get_user_by_email(
    session: &mut dyn StoreSession,
    email: &str,
) -> Result<Option<User>, CrudError> {
    Ok(session.get_user_by_email(email).await?)
}

pub async fn get_user_by_username(
    session: &mut dyn StoreSession,
    username: &str,
) -> Result<Option<User>, CrudError> {
    Ok(session.get_user_by_username(username).await?)
}

/// Hashes the password and inserts the user. Uniqueness is left to the store.
pub async fn register_user(
    session: &mut dyn StoreSession,
    user: &UserCreate,
) -> Result<User, CrudError> {
    let hashed = hash_password(&user.password)?;
    let created = session
        .create_user(user.email.as_deref(), &user.username, &hashed)
        .await?;
    debug!(user_id = created.id, "user row created");
    Ok(created)
}

pub async fn list_items(
    session: &mut dyn StoreSession,
    skip: u32,
    limit: u32,
) -> Result<Vec<Item>, CrudError> {
    Ok(session.list_items(skip, limit).await?)
}

pub async fn create_item_for_user(
    session: &mut dyn StoreSession,
    item: &ItemCreate,
    user_id: i64,
) -> Result<Item, CrudError> {
    Ok(session
        .create_item(&item.title, item.description.as_deref(), user_id)
        .await?)
}
