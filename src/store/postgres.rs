use anyhow::Context;
use async_trait::async_trait;
use sqlx::{pool::PoolConnection, postgres::PgPoolOptions, Executor, PgPool, Postgres};

use super::{EntityStore, Item, StoreError, StoreSession, User};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id              BIGSERIAL PRIMARY KEY,
    email           TEXT UNIQUE,
    username        TEXT NOT NULL UNIQUE,
    hashed_password TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS items (
    id          BIGSERIAL PRIMARY KEY,
    title       TEXT NOT NULL,
    description TEXT,
    owner_id    BIGINT NOT NULL REFERENCES users (id)
);

CREATE INDEX IF NOT EXISTS items_owner_id_idx ON items (owner_id);
"#;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("connect to database")?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl EntityStore for PgStore {
    async fn session(&self) -> Result<Box<dyn StoreSession>, StoreError> {
        let conn = self.pool.acquire().await?;
        Ok(Box::new(PgSession { conn }))
    }

    async fn ensure_schema(&self) -> Result<(), StoreError> {
        // Plain &str runs over the simple protocol, which accepts several statements.
        self.pool.execute(SCHEMA).await?;
        Ok(())
    }
}

/// Holds one pooled connection; dropping it returns the connection to the pool.
pub struct PgSession {
    conn: PoolConnection<Postgres>,
}

#[async_trait]
impl StoreSession for PgSession {
    async fn get_user_by_id(&mut self, id: i64) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, username, hashed_password
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?;
        Ok(user)
    }

    async fn get_user_by_email(&mut self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, username, hashed_password
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&mut *self.conn)
        .await?;
        Ok(user)
    }

    async fn get_user_by_username(&mut self, username: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, username, hashed_password
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&mut *self.conn)
        .await?;
        Ok(user)
    }

    async fn create_user(
        &mut self,
        email: Option<&str>,
        username: &str,
        hashed_password: &str,
    ) -> Result<User, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, username, hashed_password)
            VALUES ($1, $2, $3)
            RETURNING id, email, username, hashed_password
            "#,
        )
        .bind(email)
        .bind(username)
        .bind(hashed_password)
        .fetch_one(&mut *self.conn)
        .await?;
        Ok(user)
    }

    async fn list_items(&mut self, offset: u32, limit: u32) -> Result<Vec<Item>, StoreError> {
        let rows = sqlx::query_as::<_, Item>(
            r#"
            SELECT id, title, description, owner_id
            FROM items
            ORDER BY id ASC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(i64::from(limit))
        .bind(i64::from(offset))
        .fetch_all(&mut *self.conn)
        .await?;
        Ok(rows)
    }

    async fn create_item(
        &mut self,
        title: &str,
        description: Option<&str>,
        owner_id: i64,
    ) -> Result<Item, StoreError> {
        let item = sqlx::query_as::<_, Item>(
            r#"
            INSERT INTO items (title, description, owner_id)
            VALUES ($1, $2, $3)
            RETURNING id, title, description, owner_id
            "#,
        )
        .bind(title)
        .bind(description)
        .bind(owner_id)
        .fetch_one(&mut *self.conn)
        .await?;
        Ok(item)
    }
}
