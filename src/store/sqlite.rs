use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use crate::auth::UserDirectory;

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        // An in-memory database only exists for the connection that opened it.
        let options = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };
        let pool = options.connect(database_url).await?;
        Ok(Self { pool })
    }

    /// Create tables if they do not exist yet.
    pub async fn migrate(&self) -> anyhow::Result<()> {
        let queries = [
            r#"CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL UNIQUE,
                public_key TEXT NOT NULL
            );"#,
            r#"CREATE TABLE IF NOT EXISTS messages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                content TEXT NOT NULL,
                sender_id INTEGER NOT NULL,
                receiver_id INTEGER NOT NULL,
                FOREIGN KEY (sender_id) REFERENCES users(id),
                FOREIGN KEY (receiver_id) REFERENCES users(id)
            );"#,
            "CREATE INDEX IF NOT EXISTS idx_messages_sender ON messages(sender_id);",
            "CREATE INDEX IF NOT EXISTS idx_messages_receiver ON messages(receiver_id);",
        ];

        for q in queries {
            sqlx::query(q).execute(&self.pool).await?;
        }
        Ok(())
    }

    // -- User Operations --

    /// Returns the new user's id, or `None` if the username is taken.
    pub async fn create_user(&self, username: &str, public_key: &str) -> anyhow::Result<Option<i64>> {
        let result = sqlx::query("INSERT INTO users (username, public_key) VALUES (?, ?)")
            .bind(username)
            .bind(public_key)
            .execute(&self.pool)
            .await;

        match result {
            Ok(r) => Ok(Some(r.last_insert_rowid())),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn list_users(&self) -> anyhow::Result<Vec<UserRow>> {
        let rows = sqlx::query_as::<_, UserRow>("SELECT id, username FROM users ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn get_user(&self, id: i64) -> anyhow::Result<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>("SELECT id, username FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    // -- Message Operations --

    /// Returns the new message id, or `None` if sender or receiver does
    /// not reference an existing user.
    pub async fn insert_message(
        &self,
        content: &str,
        sender_id: i64,
        receiver_id: i64,
    ) -> anyhow::Result<Option<i64>> {
        let result =
            sqlx::query("INSERT INTO messages (content, sender_id, receiver_id) VALUES (?, ?, ?)")
                .bind(content)
                .bind(sender_id)
                .bind(receiver_id)
                .execute(&self.pool)
                .await;

        match result {
            Ok(r) => Ok(Some(r.last_insert_rowid())),
            Err(sqlx::Error::Database(e)) if e.is_foreign_key_violation() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn list_messages(&self) -> anyhow::Result<Vec<MessageRow>> {
        let rows = sqlx::query_as::<_, MessageRow>(
            "SELECT id, content, sender_id, receiver_id FROM messages ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Messages exchanged between two users, in either direction.
    pub async fn list_messages_between(&self, a: i64, b: i64) -> anyhow::Result<Vec<MessageRow>> {
        let rows = sqlx::query_as::<_, MessageRow>(
            r#"SELECT id, content, sender_id, receiver_id FROM messages
               WHERE (sender_id = ? AND receiver_id = ?) OR (sender_id = ? AND receiver_id = ?)
               ORDER BY id ASC"#,
        )
        .bind(a)
        .bind(b)
        .bind(b)
        .bind(a)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Users `user_id` has sent to or received from, excluding themselves.
    pub async fn list_discussion_partners(&self, user_id: i64) -> anyhow::Result<Vec<UserRow>> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"SELECT id, username FROM users
               WHERE id != ? AND id IN (
                   SELECT receiver_id FROM messages WHERE sender_id = ?
                   UNION
                   SELECT sender_id FROM messages WHERE receiver_id = ?
               )
               ORDER BY id ASC"#,
        )
        .bind(user_id)
        .bind(user_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

#[async_trait]
impl UserDirectory for SqliteStore {
    async fn public_key(&self, username: &str) -> anyhow::Result<Option<String>> {
        let key = sqlx::query_scalar::<_, String>("SELECT public_key FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(key)
    }

    async fn user_id(&self, username: &str) -> anyhow::Result<Option<i64>> {
        let id = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MessageRow {
    pub id: i64,
    pub content: String,
    pub sender_id: i64,
    pub receiver_id: i64,
}
