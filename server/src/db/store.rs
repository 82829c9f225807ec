use std::collections::VecDeque;
use std::path::Path;

use chrono::Utc;
use rusqlite::{params, params_from_iter, types::Value as SqlValue, Connection};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::migrations;
use super::StoreError;

/// Lazy, finite, non-restartable sequence of documents.
pub type Cursor<'a> = Box<dyn Iterator<Item = Result<Value, StoreError>> + 'a>;

/// Outcome of a successful insert.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InsertOneResult {
    pub inserted_id: String,
}

/// Conjunction of top-level field equalities. An empty filter matches
/// every document in the collection.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    fields: Vec<(String, String)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((field.into(), value.into()));
        self
    }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Document store operations the request handlers rely on.
pub trait DocumentStore {
    /// Insert a JSON object into `collection`. The store assigns the
    /// document's `id` field and returns it.
    fn insert_one(&self, collection: &str, document: Value) -> Result<InsertOneResult, StoreError>;

    /// First matching document in insertion order, or `None`.
    fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Value>, StoreError>;

    /// All matching documents in insertion order.
    fn find(&self, collection: &str, filter: &Filter) -> Result<Cursor<'_>, StoreError>;
}

// ─── SQLite Implementation ──────────────────────────────────────────────────

/// Documents live in a single table keyed by (collection, id). `seq`
/// preserves insertion order and drives cursor pagination.
pub struct SqliteStore {
    conn: Connection,
    batch_size: usize,
}

impl SqliteStore {
    /// Open (or create) the database file, enable WAL mode, and run migrations.
    pub fn open(path: &Path, batch_size: usize) -> Result<Self, StoreError> {
        let mut conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        migrations::migrations().to_latest(&mut conn)?;
        Ok(Self::with_connection(conn, batch_size))
    }

    /// Open a private in-memory database with the schema applied.
    pub fn open_in_memory(batch_size: usize) -> Result<Self, StoreError> {
        let mut conn = Connection::open_in_memory()?;
        migrations::migrations().to_latest(&mut conn)?;
        Ok(Self::with_connection(conn, batch_size))
    }

    fn with_connection(conn: Connection, batch_size: usize) -> Self {
        Self {
            conn,
            batch_size: batch_size.max(1),
        }
    }

    /// Fetch up to `limit` matching rows with `seq > after`, ordered by `seq`.
    fn fetch(
        &self,
        collection: &str,
        filter: &Filter,
        after: i64,
        limit: usize,
    ) -> Result<Vec<(i64, String)>, StoreError> {
        let mut sql = String::from("SELECT seq, body FROM documents WHERE collection = ?1 AND seq > ?2");
        let mut args = vec![
            SqlValue::Text(collection.to_string()),
            SqlValue::Integer(after),
        ];
        for (field, value) in &filter.fields {
            sql.push_str(&format!(
                " AND json_extract(body, ?{}) = ?{}",
                args.len() + 1,
                args.len() + 2
            ));
            args.push(SqlValue::Text(json_path(field)));
            args.push(SqlValue::Text(value.clone()));
        }
        sql.push_str(&format!(" ORDER BY seq ASC LIMIT ?{}", args.len() + 1));
        args.push(SqlValue::Integer(limit as i64));

        let mut stmt = self.conn.prepare_cached(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(args), |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

/// JSON path selecting a top-level member; quoted so any key is addressable.
fn json_path(field: &str) -> String {
    format!("$.\"{}\"", field.replace('"', ""))
}

impl DocumentStore for SqliteStore {
    fn insert_one(&self, collection: &str, mut document: Value) -> Result<InsertOneResult, StoreError> {
        let id = Uuid::now_v7().to_string();
        document
            .as_object_mut()
            .ok_or(StoreError::NotADocument)?
            .insert("id".to_string(), Value::String(id.clone()));
        let body = serde_json::to_string(&document)?;

        self.conn.execute(
            "INSERT INTO documents (collection, id, body, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![collection, id, body, Utc::now().to_rfc3339()],
        )?;

        tracing::debug!("Inserted document {} into {}", id, collection);
        Ok(InsertOneResult { inserted_id: id })
    }

    fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Value>, StoreError> {
        match self.fetch(collection, filter, 0, 1)?.into_iter().next() {
            Some((_, body)) => Ok(Some(serde_json::from_str(&body)?)),
            None => Ok(None),
        }
    }

    fn find(&self, collection: &str, filter: &Filter) -> Result<Cursor<'_>, StoreError> {
        let mut cursor = SqliteCursor {
            store: self,
            collection: collection.to_string(),
            filter: filter.clone(),
            last_seq: 0,
            buffer: VecDeque::new(),
            exhausted: false,
        };
        // Surface query errors from `find` itself rather than the first `next`.
        cursor.refill()?;
        Ok(Box::new(cursor))
    }
}

/// Keyset-paginated cursor: pulls `batch_size` rows at a time after the
/// last `seq` it has seen.
struct SqliteCursor<'a> {
    store: &'a SqliteStore,
    collection: String,
    filter: Filter,
    last_seq: i64,
    buffer: VecDeque<(i64, String)>,
    exhausted: bool,
}

impl SqliteCursor<'_> {
    fn refill(&mut self) -> Result<(), StoreError> {
        let batch = self.store.fetch(
            &self.collection,
            &self.filter,
            self.last_seq,
            self.store.batch_size,
        )?;
        if batch.len() < self.store.batch_size {
            self.exhausted = true;
        }
        if let Some((seq, _)) = batch.last() {
            self.last_seq = *seq;
        }
        self.buffer.extend(batch);
        Ok(())
    }
}

impl Iterator for SqliteCursor<'_> {
    type Item = Result<Value, StoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.buffer.is_empty() && !self.exhausted {
            if let Err(e) = self.refill() {
                self.exhausted = true;
                return Some(Err(e));
            }
        }
        let (_, body) = self.buffer.pop_front()?;
        Some(serde_json::from_str(&body).map_err(StoreError::from))
    }
}
