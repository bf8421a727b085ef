use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use uuid::Uuid;

use super::{ListFilter, RecordStore};
use crate::entity::{Record, RecordBase};
use crate::error::{ClefError, Result};

pub const CLEF_DIR: &str = ".clef";
const CLEF_DB: &str = "clef.db";

/// All record families in one SQLite table, editable fields kept as a JSON body
pub struct SqliteStore {
    conn: Connection,
    path: PathBuf,
}

impl SqliteStore {
    /// Create `.clef/` under `root` with an empty database
    pub fn init(root: &Path) -> Result<Self> {
        let clef_dir = root.join(CLEF_DIR);

        if clef_dir.exists() {
            return Err(ClefError::AlreadyInitialized);
        }

        fs::create_dir_all(&clef_dir)?;
        let store = Self::connect(clef_dir.join(CLEF_DB))?;
        tracing::info!(path = %store.path.display(), "initialized record store");
        Ok(store)
    }

    /// Open the database of an existing workspace
    pub fn open(root: &Path) -> Result<Self> {
        let path = root.join(CLEF_DIR).join(CLEF_DB);

        if !path.exists() {
            return Err(ClefError::NotInitialized);
        }

        let store = Self::connect(path)?;
        tracing::debug!(path = %store.path.display(), "opened record store");
        Ok(store)
    }

    /// In-memory database, used by tests and dry runs
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn,
            path: PathBuf::from(":memory:"),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn connect(path: PathBuf) -> Result<Self> {
        let conn = Connection::open(&path)?;
        let store = Self { conn, path };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS records (
                id TEXT PRIMARY KEY,
                kind TEXT NOT NULL,
                created_at TEXT NOT NULL,
                body TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_records_kind_created
                ON records(kind, created_at);",
        )?;
        Ok(())
    }

    /// The `.clef` directory holding this database
    pub fn clef_dir(&self) -> Option<&Path> {
        self.path.parent()
    }

    fn row_to_record<R: Record>(id: String, created_at: String, body: String) -> Result<R> {
        let id = Uuid::parse_str(&id)
            .map_err(|e| ClefError::Storage(format!("Corrupt record id {}: {}", id, e)))?;
        let created_at = DateTime::parse_from_rfc3339(&created_at)
            .map_err(|e| ClefError::Storage(format!("Corrupt timestamp on {}: {}", id, e)))?
            .with_timezone(&Utc);
        let fields: R::Fields = serde_json::from_str(&body)?;
        Ok(R::from_parts(RecordBase { id, created_at }, fields))
    }
}

fn timestamp(at: &DateTime<Utc>) -> String {
    // fixed width so text order matches time order
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// JSON path for a top-level field, rejecting anything but identifiers
fn field_path(field: &str) -> Result<String> {
    let valid = !field.is_empty()
        && field
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid {
        return Err(ClefError::Storage(format!("Invalid field name: {}", field)));
    }
    Ok(format!("$.{}", field))
}

impl RecordStore for SqliteStore {
    fn list<R: Record>(&self, filter: &ListFilter) -> Result<Vec<R>> {
        let mut sql = String::from("SELECT id, created_at, body FROM records WHERE kind = ?");
        let mut values: Vec<Value> = vec![Value::Text(R::KIND.to_string())];

        if let Some(after) = &filter.created_after {
            sql.push_str(" AND created_at >= ?");
            values.push(Value::Text(timestamp(after)));
        }
        if let Some(before) = &filter.created_before {
            sql.push_str(" AND created_at < ?");
            values.push(Value::Text(timestamp(before)));
        }
        sql.push_str(" ORDER BY created_at DESC, rowid DESC");
        if let Some(limit) = filter.limit {
            sql.push_str(" LIMIT ?");
            values.push(Value::Integer(i64::try_from(limit).unwrap_or(i64::MAX)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values), |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (id, created_at, body) = row?;
            records.push(Self::row_to_record(id, created_at, body)?);
        }
        tracing::debug!(kind = R::KIND, count = records.len(), "listed records");
        Ok(records)
    }

    fn get<R: Record>(&self, id: &Uuid) -> Result<Option<R>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, created_at, body FROM records WHERE kind = ?1 AND id = ?2",
                params![R::KIND, id.to_string()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()?;

        row.map(|(id, created_at, body)| Self::row_to_record(id, created_at, body))
            .transpose()
    }

    fn create<R: Record>(&self, fields: &R::Fields) -> Result<R> {
        let base = RecordBase::at(Utc::now().trunc_subsecs(6));
        let body = serde_json::to_string(fields)?;

        self.conn.execute(
            "INSERT INTO records (id, kind, created_at, body) VALUES (?1, ?2, ?3, ?4)",
            params![base.id.to_string(), R::KIND, timestamp(&base.created_at), body],
        )?;

        tracing::info!(kind = R::KIND, id = %base.id, "created record");
        Ok(R::from_parts(base, fields.clone()))
    }

    fn update<R: Record>(&self, id: &Uuid, fields: &R::Fields) -> Result<R> {
        let body = serde_json::to_string(fields)?;
        let changed = self.conn.execute(
            "UPDATE records SET body = ?1 WHERE kind = ?2 AND id = ?3",
            params![body, R::KIND, id.to_string()],
        )?;

        if changed == 0 {
            return Err(ClefError::RecordNotFound(id.to_string()));
        }

        tracing::info!(kind = R::KIND, id = %id, "updated record");
        self.get(id)?
            .ok_or_else(|| ClefError::RecordNotFound(id.to_string()))
    }

    fn delete<R: Record>(&self, id: &Uuid) -> Result<()> {
        let changed = self.conn.execute(
            "DELETE FROM records WHERE kind = ?1 AND id = ?2",
            params![R::KIND, id.to_string()],
        )?;

        if changed == 0 {
            return Err(ClefError::RecordNotFound(id.to_string()));
        }

        tracing::info!(kind = R::KIND, id = %id, "deleted record");
        Ok(())
    }

    fn is_value_taken<R: Record>(
        &self,
        field: &str,
        value: &str,
        exclude_id: Option<&Uuid>,
    ) -> Result<bool> {
        let path = field_path(field)?;
        let exclude = exclude_id.map(|id| id.to_string());

        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM records
             WHERE kind = ?1
               AND trim(json_extract(body, ?2)) = ?3
               AND (?4 IS NULL OR id != ?4)",
            params![R::KIND, path, value.trim(), exclude],
            |row| row.get(0),
        )?;

        tracing::debug!(kind = R::KIND, field, taken = count > 0, "uniqueness lookup");
        Ok(count > 0)
    }
}

impl From<rusqlite::Error> for ClefError {
    fn from(e: rusqlite::Error) -> Self {
        ClefError::Storage(format!("SQLite error: {}", e))
    }
}
