use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tokio::sync::Mutex;
use uuid::Uuid;

use dalryeok_core::{
    current_epoch_ms, DateKey, Event, EventStore, NewEvent, SnapshotHub, StorageError,
    Subscription, Validator,
};

/// Initialize database connection pool with recommended pragmas.
pub async fn init_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .busy_timeout(std::time::Duration::from_secs(5))
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);

    // Every connection to an in-memory database opens a fresh, empty one.
    let max_connections = if database_url.contains(":memory:") {
        1
    } else {
        10
    };

    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
}

/// Run database migrations.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(include_str!("../migrations/001_create_events.sql"))
        .execute(pool)
        .await?;
    Ok(())
}

#[derive(Debug, sqlx::FromRow)]
struct EventRow {
    id: String,
    org_id: String,
    date_key: String,
    title: String,
    body: String,
    created_at: i64,
}

impl TryFrom<EventRow> for Event {
    type Error = StorageError;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&row.id).map_err(|e| StorageError::Corrupt {
            id: row.id.clone(),
            reason: e.to_string(),
        })?;
        let date_key = DateKey::parse_canonical(&row.date_key).map_err(|e| StorageError::Corrupt {
            id: row.id.clone(),
            reason: e.to_string(),
        })?;
        Ok(Event {
            id,
            org_id: row.org_id,
            date_key,
            title: row.title,
            body: row.body,
            created_at: row.created_at,
        })
    }
}

fn db_error(e: sqlx::Error) -> StorageError {
    StorageError::Database(e.to_string())
}

/// SQLite implementation of EventStore.
pub struct SqliteEventStore {
    pool: SqlitePool,
    hub: SnapshotHub,
    /// Held from listing to publishing, so the newest snapshot is never
    /// older than a committed write.
    snapshot_lock: Mutex<()>,
}

impl SqliteEventStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            hub: SnapshotHub::new(),
            snapshot_lock: Mutex::new(()),
        }
    }

    async fn publish(&self, org_id: &str) -> Result<u64, StorageError> {
        let _guard = self.snapshot_lock.lock().await;
        let events = self.list(org_id).await?;
        Ok(self.hub.publish(org_id, events))
    }

    /// Publish after a committed write. The write stands even if the
    /// snapshot cannot be refreshed.
    async fn publish_after_write(&self, org_id: &str) {
        match self.publish(org_id).await {
            Ok(version) => tracing::debug!("Published snapshot {} for {}", version, org_id),
            Err(e) => tracing::error!("Failed to publish snapshot for {}: {}", org_id, e),
        }
    }

    #[cfg(test)]
    async fn insert_with_ts(&self, draft: NewEvent, created_at: i64) -> Result<Event, StorageError> {
        let key = Validator::validate_new_event(&draft)?;
        let event = draft.into_event(key, Uuid::new_v4(), created_at);
        self.write(&event).await?;
        Ok(event)
    }

    async fn write(&self, event: &Event) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO events (id, org_id, date_key, title, body, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(event.id.to_string())
        .bind(&event.org_id)
        .bind(event.date_key.as_str())
        .bind(&event.title)
        .bind(&event.body)
        .bind(event.created_at)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(())
    }
}

#[async_trait]
impl EventStore for SqliteEventStore {
    async fn list(&self, org_id: &str) -> Result<Vec<Event>, StorageError> {
        let rows = sqlx::query_as::<_, EventRow>(
            r#"
            SELECT id, org_id, date_key, title, body, created_at
            FROM events
            WHERE org_id = ?
            ORDER BY date_key ASC, created_at ASC
            "#,
        )
        .bind(org_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.into_iter().map(Event::try_from).collect()
    }

    async fn subscribe(&self, org_id: &str) -> Result<Subscription, StorageError> {
        if let Some(sub) = self.hub.get(org_id) {
            return Ok(sub);
        }
        let _guard = self.snapshot_lock.lock().await;
        let current = self.list(org_id).await?;
        Ok(self.hub.subscribe(org_id, current))
    }

    async fn insert(&self, draft: NewEvent) -> Result<Event, StorageError> {
        let key = Validator::validate_new_event(&draft)?;
        let event = draft.into_event(key, Uuid::new_v4(), current_epoch_ms());

        self.write(&event).await?;
        self.publish_after_write(&event.org_id).await;
        Ok(event)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StorageError> {
        let org_id: Option<String> =
            sqlx::query_scalar("DELETE FROM events WHERE id = ? RETURNING org_id")
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error)?;

        match org_id {
            Some(org_id) => {
                self.publish_after_write(&org_id).await;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
