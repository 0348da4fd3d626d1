use serde::Serialize;
use sqlx::FromRow;

/// User record in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    pub email: Option<String>,
    pub username: String,
    #[serde(skip_serializing)]
    pub hashed_password: String, // argon2 PHC string, never exposed in JSON
}

/// Item record; `owner_id` is fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Item {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub owner_id: i64,
}
