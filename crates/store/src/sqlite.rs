//! SQLite conversation store.
//!
//! Two tables:
//! - `sessions` keyed by the caller's session id
//! - `messages` with an autoincrement id giving the per-session order
//!
//! Timestamps are RFC 3339 text with fixed precision so they sort
//! lexicographically.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use helpdesk_core::error::StoreError;
use helpdesk_core::message::{Role, Session, SessionId, StoredMessage};
use helpdesk_core::store::{ConversationStore, validate_content};
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow, SqliteSynchronous,
};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use tracing::{debug, info};

/// A SQLite-backed [`ConversationStore`].
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and apply the schema.
    ///
    /// Pass `"sqlite::memory:"` for an ephemeral database (useful for tests).
    pub async fn new(path: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(path)
            .map_err(|e| StoreError::Storage(format!("Invalid SQLite path: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .pragma("foreign_keys", "ON");

        // Every in-memory connection is its own database, so keep exactly one alive.
        let pool_options = if path.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(4)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Storage(format!("Failed to open SQLite: {e}")))?;

        let store = Self { pool };
        store.run_migrations().await?;
        info!("SQLite conversation store initialized at {path}");
        Ok(store)
    }

    /// Create from an existing pool.
    pub async fn from_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS sessions (
                id          TEXT PRIMARY KEY,
                created_at  TEXT NOT NULL,
                updated_at  TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Migration(format!("sessions table: {e}")))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS messages (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                session_id  TEXT NOT NULL REFERENCES sessions(id) ON DELETE CASCADE,
                role        TEXT NOT NULL CHECK(role IN ('user', 'assistant')),
                content     TEXT NOT NULL,
                created_at  TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Migration(format!("messages table: {e}")))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_messages_session ON messages(session_id, id)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Migration(format!("messages index: {e}")))?;

        debug!("SQLite conversation schema ready");
        Ok(())
    }

    async fn session_exists(&self, id: &SessionId) -> Result<bool, StoreError> {
        let row = sqlx::query("SELECT 1 FROM sessions WHERE id = ?")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Query(format!("Session lookup failed: {e}")))?;
        Ok(row.is_some())
    }
}

fn now_text() -> String {
    format_ts(Utc::now())
}

fn format_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_ts(raw: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| StoreError::Query(format!("Bad timestamp '{raw}': {e}")))
}

fn row_to_message(row: &SqliteRow) -> Result<StoredMessage, StoreError> {
    let id: i64 = row
        .try_get("id")
        .map_err(|e| StoreError::Query(format!("id: {e}")))?;
    let session_id: String = row
        .try_get("session_id")
        .map_err(|e| StoreError::Query(format!("session_id: {e}")))?;
    let role: String = row
        .try_get("role")
        .map_err(|e| StoreError::Query(format!("role: {e}")))?;
    let content: String = row
        .try_get("content")
        .map_err(|e| StoreError::Query(format!("content: {e}")))?;
    let created_at: String = row
        .try_get("created_at")
        .map_err(|e| StoreError::Query(format!("created_at: {e}")))?;

    Ok(StoredMessage {
        id,
        session_id: SessionId(session_id),
        role: Role::from_str(&role)?,
        content,
        created_at: parse_ts(&created_at)?,
    })
}

fn row_to_session(row: &SqliteRow) -> Result<Session, StoreError> {
    let id: String = row
        .try_get("id")
        .map_err(|e| StoreError::Query(format!("id: {e}")))?;
    let created_at: String = row
        .try_get("created_at")
        .map_err(|e| StoreError::Query(format!("created_at: {e}")))?;
    let updated_at: String = row
        .try_get("updated_at")
        .map_err(|e| StoreError::Query(format!("updated_at: {e}")))?;

    Ok(Session {
        id: SessionId(id),
        created_at: parse_ts(&created_at)?,
        updated_at: parse_ts(&updated_at)?,
    })
}

#[async_trait]
impl ConversationStore for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn ensure_session(&self, id: &SessionId) -> Result<(), StoreError> {
        let now = now_text();
        sqlx::query("INSERT OR IGNORE INTO sessions (id, created_at, updated_at) VALUES (?, ?, ?)")
            .bind(id.as_str())
            .bind(&now)
            .bind(&now)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Query(format!("Session insert failed: {e}")))?;
        Ok(())
    }

    async fn append_message(
        &self,
        id: &SessionId,
        role: Role,
        content: &str,
    ) -> Result<StoredMessage, StoreError> {
        validate_content(content)?;
        if !self.session_exists(id).await? {
            return Err(StoreError::SessionNotFound(id.to_string()));
        }

        let created_at = Utc::now();
        let result = sqlx::query(
            "INSERT INTO messages (session_id, role, content, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(id.as_str())
        .bind(role.as_str())
        .bind(content)
        .bind(format_ts(created_at))
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Query(format!("Message insert failed: {e}")))?;

        debug!(session = %id, role = %role, "Message stored");
        Ok(StoredMessage {
            id: result.last_insert_rowid(),
            session_id: id.clone(),
            role,
            content: content.to_string(),
            created_at,
        })
    }

    async fn recent_messages(
        &self,
        id: &SessionId,
        limit: usize,
        before: Option<i64>,
    ) -> Result<Vec<StoredMessage>, StoreError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = sqlx::query(
            r#"
            SELECT id, session_id, role, content, created_at
            FROM messages
            WHERE session_id = ? AND id < ?
            ORDER BY id DESC
            LIMIT ?
            "#,
        )
        .bind(id.as_str())
        .bind(before.unwrap_or(i64::MAX))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Query(format!("Recent messages query failed: {e}")))?;

        let mut messages = rows
            .iter()
            .map(row_to_message)
            .collect::<Result<Vec<_>, _>>()?;
        messages.reverse();
        Ok(messages)
    }

    async fn all_messages(&self, id: &SessionId) -> Result<Vec<StoredMessage>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, session_id, role, content, created_at
            FROM messages
            WHERE session_id = ?
            ORDER BY id ASC
            "#,
        )
        .bind(id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Query(format!("Messages query failed: {e}")))?;

        rows.iter().map(row_to_message).collect()
    }

    async fn touch_session(&self, id: &SessionId) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE sessions SET updated_at = ? WHERE id = ?")
            .bind(now_text())
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Query(format!("Session update failed: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::SessionNotFound(id.to_string()));
        }
        Ok(())
    }

    async fn list_sessions(&self) -> Result<Vec<Session>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, created_at, updated_at FROM sessions ORDER BY updated_at DESC, id ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Query(format!("Sessions query failed: {e}")))?;

        rows.iter().map(row_to_session).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_store() -> SqliteStore {
        SqliteStore::new("sqlite::memory:").await.unwrap()
    }

    #[tokio::test]
    async fn user_then_assistant_round_trip() {
        let store = test_store().await;
        let session = SessionId::from("s-1");
        store.ensure_session(&session).await.unwrap();

        let first = store
            .append_message(&session, Role::User, "What is your refund policy?")
            .await
            .unwrap();
        let second = store
            .append_message(&session, Role::Assistant, "30-day refund window.")
            .await
            .unwrap();
        assert!(second.id > first.id);

        let all = store.all_messages(&session).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].role, Role::User);
        assert_eq!(all[0].content, "What is your refund policy?");
        assert_eq!(all[1].role, Role::Assistant);
        assert_eq!(all[1].content, "30-day refund window.");
    }

    #[tokio::test]
    async fn recent_returns_last_n_ascending() {
        let store = test_store().await;
        let session = SessionId::from("s-window");
        store.ensure_session(&session).await.unwrap();

        for i in 0..15 {
            let role = if i % 2 == 0 { Role::User } else { Role::Assistant };
            store
                .append_message(&session, role, &format!("message {i}"))
                .await
                .unwrap();
        }

        let recent = store.recent_messages(&session, 10, None).await.unwrap();
        let contents: Vec<String> = recent.iter().map(|m| m.content.clone()).collect();
        let expected: Vec<String> = (5..15).map(|i| format!("message {i}")).collect();
        assert_eq!(contents, expected);
    }

    #[tokio::test]
    async fn recent_before_excludes_the_bound_and_later() {
        let store = test_store().await;
        let session = SessionId::from("s-bound");
        store.ensure_session(&session).await.unwrap();

        let mut stored = Vec::new();
        for i in 0..6 {
            stored.push(
                store
                    .append_message(&session, Role::User, &format!("m{i}"))
                    .await
                    .unwrap(),
            );
        }

        let recent = store
            .recent_messages(&session, 2, Some(stored[4].id))
            .await
            .unwrap();
        let contents: Vec<&str> = recent.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, ["m2", "m3"]);
    }

    #[tokio::test]
    async fn recent_never_crosses_sessions() {
        let store = test_store().await;
        let a = SessionId::from("a");
        let b = SessionId::from("b");
        store.ensure_session(&a).await.unwrap();
        store.ensure_session(&b).await.unwrap();

        store.append_message(&a, Role::User, "from a").await.unwrap();
        store.append_message(&b, Role::User, "from b").await.unwrap();
        store.append_message(&a, Role::Assistant, "reply a").await.unwrap();

        let recent = store.recent_messages(&a, 10, None).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert!(recent.iter().all(|m| m.session_id == a));
    }

    #[tokio::test]
    async fn ensure_session_is_idempotent() {
        let store = test_store().await;
        let session = SessionId::from("dup");
        store.ensure_session(&session).await.unwrap();
        store.ensure_session(&session).await.unwrap();
        assert_eq!(store.list_sessions().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn blank_content_rejected() {
        let store = test_store().await;
        let session = SessionId::from("blank");
        store.ensure_session(&session).await.unwrap();
        let err = store
            .append_message(&session, Role::User, "   ")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::EmptyContent));
    }

    #[tokio::test]
    async fn append_to_unknown_session_fails() {
        let store = test_store().await;
        let err = store
            .append_message(&SessionId::from("ghost"), Role::User, "hi")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::SessionNotFound(_)));
    }

    #[tokio::test]
    async fn sessions_listed_by_latest_activity() {
        let store = test_store().await;
        let old = SessionId::from("old");
        let new = SessionId::from("new");
        store.ensure_session(&old).await.unwrap();
        store.ensure_session(&new).await.unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        store.touch_session(&old).await.unwrap();

        let sessions = store.list_sessions().await.unwrap();
        assert_eq!(sessions[0].id, old);
        assert!(sessions[0].updated_at >= sessions[0].created_at);
    }

    #[tokio::test]
    async fn file_backed_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("helpdesk.db");
        let url = format!("sqlite://{}", path.display());
        let session = SessionId::from("durable");

        {
            let store = SqliteStore::new(&url).await.unwrap();
            store.ensure_session(&session).await.unwrap();
            store
                .append_message(&session, Role::User, "still here?")
                .await
                .unwrap();
        }

        let reopened = SqliteStore::new(&url).await.unwrap();
        let all = reopened.all_messages(&session).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].content, "still here?");
    }
}
