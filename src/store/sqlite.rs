//! SQLite Record Store
//!
//! Holds the five record collections in a single SQLite database.
//! Timestamps are stored as INTEGER milliseconds since the Unix epoch.
//!
//! The connection sits behind a `std::sync::Mutex` because `rusqlite::Connection`
//! is not `Sync`; the lock is never held across an await point.

use crate::store::error::{StoreError, StoreResult};
use crate::store::types::*;
use crate::store::RecordStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::types::{Type, Value};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS clients (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        phone TEXT,
        address TEXT
    );

    CREATE TABLE IF NOT EXISTS blade_types (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        code TEXT NOT NULL UNIQUE,
        name TEXT NOT NULL,
        description TEXT
    );

    CREATE TABLE IF NOT EXISTS blades (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        code TEXT NOT NULL UNIQUE,
        client_id INTEGER NOT NULL REFERENCES clients(id),
        blade_type_id INTEGER NOT NULL REFERENCES blade_types(id),
        last_sharpened_at INTEGER,
        active INTEGER NOT NULL DEFAULT 1
    );

    CREATE TABLE IF NOT EXISTS operators (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        role TEXT NOT NULL,
        active INTEGER NOT NULL DEFAULT 1
    );

    CREATE TABLE IF NOT EXISTS sharpening_records (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        blade_id INTEGER NOT NULL REFERENCES blades(id),
        kind TEXT NOT NULL,
        notes TEXT,
        operator_id INTEGER NOT NULL REFERENCES operators(id),
        performed_at INTEGER NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_records_performed_at ON sharpening_records(performed_at);
    CREATE INDEX IF NOT EXISTS idx_records_blade ON sharpening_records(blade_id);
    CREATE INDEX IF NOT EXISTS idx_blades_client ON blades(client_id);
    CREATE INDEX IF NOT EXISTS idx_blades_last_sharpened ON blades(last_sharpened_at);
";

const BLADE_SELECT: &str = "
    SELECT b.id, b.code, b.client_id, b.blade_type_id, b.last_sharpened_at, b.active,
           t.id, t.code, t.name, t.description,
           c.id, c.name, c.phone, c.address
    FROM blades b
    JOIN blade_types t ON t.id = b.blade_type_id
    JOIN clients c ON c.id = b.client_id";

const RECORD_SELECT: &str = "
    SELECT r.id, r.blade_id, r.kind, r.notes, r.operator_id, r.performed_at,
           b.code, c.id, c.name, o.name
    FROM sharpening_records r
    JOIN blades b ON b.id = r.blade_id
    JOIN clients c ON c.id = b.client_id
    JOIN operators o ON o.id = r.operator_id";

/// SQLite-backed record store
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) a database file
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            ",
        )?;
        conn.execute_batch(SCHEMA)?;

        tracing::debug!(path = %path.display(), "Opened record store");

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory database (for testing and demos)
    pub fn in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| StoreError::Lock(format!("Failed to acquire connection lock: {}", e)))
    }

    // ============================================
    // WRITES (seeding, record keeping)
    // ============================================

    /// Whether no clients, blade types or operators have been stored yet
    pub fn is_empty(&self) -> StoreResult<bool> {
        let conn = self.conn()?;
        let populated: bool = conn.query_row(
            "SELECT EXISTS (SELECT 1 FROM clients)
                 OR EXISTS (SELECT 1 FROM blade_types)
                 OR EXISTS (SELECT 1 FROM operators)",
            [],
            |row| row.get(0),
        )?;
        Ok(!populated)
    }

    /// Insert a client, returning it with its assigned id
    pub fn insert_client(&self, client: &Client) -> StoreResult<Client> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO clients (name, phone, address) VALUES (?1, ?2, ?3)",
            params![client.name, client.phone, client.address],
        )?;

        Ok(Client {
            id: conn.last_insert_rowid(),
            ..client.clone()
        })
    }

    /// Insert a blade type, returning it with its assigned id
    pub fn insert_blade_type(&self, blade_type: &BladeType) -> StoreResult<BladeType> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO blade_types (code, name, description) VALUES (?1, ?2, ?3)",
            params![blade_type.code, blade_type.name, blade_type.description],
        )?;

        Ok(BladeType {
            id: conn.last_insert_rowid(),
            ..blade_type.clone()
        })
    }

    /// Insert a blade, returning it with its assigned id
    pub fn insert_blade(&self, blade: &Blade) -> StoreResult<Blade> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO blades (code, client_id, blade_type_id, last_sharpened_at, active)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                blade.code,
                blade.client_id,
                blade.blade_type_id,
                blade.last_sharpened_at.map(|t| t.timestamp_millis()),
                blade.active,
            ],
        )?;

        Ok(Blade {
            id: conn.last_insert_rowid(),
            ..blade.clone()
        })
    }

    /// Insert an operator account, returning it with its assigned id
    pub fn insert_operator(&self, operator: &Operator) -> StoreResult<Operator> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO operators (name, role, active) VALUES (?1, ?2, ?3)",
            params![operator.name, operator.role.as_str(), operator.active],
        )?;

        Ok(Operator {
            id: conn.last_insert_rowid(),
            ..operator.clone()
        })
    }

    /// Store a sharpening record and advance the blade's `last_sharpened_at`
    ///
    /// The blade must exist and be active. `last_sharpened_at` becomes the
    /// latest `performed_at` seen for the blade, so a backdated record never
    /// moves it backwards.
    pub fn record_sharpening(&self, new: &NewSharpening) -> StoreResult<SharpeningRecord> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let active: Option<bool> = tx
            .query_row(
                "SELECT active FROM blades WHERE id = ?1",
                params![new.blade_id],
                |row| row.get(0),
            )
            .optional()?;

        match active {
            None => return Err(StoreError::BladeNotFound(new.blade_id)),
            Some(false) => return Err(StoreError::InactiveBlade(new.blade_id)),
            Some(true) => {}
        }

        let performed_at = new.performed_at.timestamp_millis();

        tx.execute(
            "INSERT INTO sharpening_records (blade_id, kind, notes, operator_id, performed_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                new.blade_id,
                new.kind.as_str(),
                new.notes,
                new.operator_id,
                performed_at,
            ],
        )?;
        let id = tx.last_insert_rowid();

        tx.execute(
            "UPDATE blades
             SET last_sharpened_at = MAX(COALESCE(last_sharpened_at, ?1), ?1)
             WHERE id = ?2",
            params![performed_at, new.blade_id],
        )?;

        tx.commit()?;

        tracing::debug!(
            record_id = id,
            blade_id = new.blade_id,
            kind = %new.kind,
            "Stored sharpening record"
        );

        Ok(SharpeningRecord {
            id,
            blade_id: new.blade_id,
            kind: new.kind,
            notes: new.notes.clone(),
            operator_id: new.operator_id,
            performed_at: new.performed_at,
        })
    }

    /// Correct the kind and notes of an existing record
    ///
    /// History entries are never deleted and their timestamps never change.
    pub fn correct_record(
        &self,
        id: i64,
        kind: SharpenKind,
        notes: Option<&str>,
    ) -> StoreResult<SharpeningRecord> {
        let conn = self.conn()?;

        let changed = conn.execute(
            "UPDATE sharpening_records SET kind = ?1, notes = ?2 WHERE id = ?3",
            params![kind.as_str(), notes, id],
        )?;

        if changed == 0 {
            return Err(StoreError::RecordNotFound(id));
        }

        conn.query_row(
            "SELECT id, blade_id, kind, notes, operator_id, performed_at
             FROM sharpening_records WHERE id = ?1",
            params![id],
            record_from_row,
        )
        .map_err(decode_error)
    }

    // ============================================
    // READS
    // ============================================

    fn find_client(&self, id: i64) -> StoreResult<Option<Client>> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT id, name, phone, address FROM clients WHERE id = ?1",
            params![id],
            |row| client_from_row(row, 0),
        )
        .optional()
        .map_err(decode_error)
    }

    fn find_clients(&self, ids: &[i64]) -> StoreResult<Vec<Client>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            "SELECT id, name, phone, address FROM clients WHERE id IN ({})",
            placeholders
        );

        let conn = self.conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(ids.iter()), |row| client_from_row(row, 0))?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(decode_error)
    }

    fn find_clients_named(&self, fragment: &str) -> StoreResult<Vec<Client>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare_cached(
            "SELECT id, name, phone, address FROM clients
             WHERE name LIKE ?1 ESCAPE '\\'
             ORDER BY name, id",
        )?;
        let rows = stmt.query_map(params![like_pattern(fragment)], |row| {
            client_from_row(row, 0)
        })?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(decode_error)
    }

    fn find_blade(&self, id: i64) -> StoreResult<Option<BladeDetail>> {
        let conn = self.conn()?;
        let sql = format!("{} WHERE b.id = ?1", BLADE_SELECT);

        conn.query_row(&sql, params![id], blade_detail_from_row)
            .optional()
            .map_err(decode_error)
    }

    fn find_blades(&self, filter: &BladeFilter) -> StoreResult<Vec<BladeDetail>> {
        let mut clauses: Vec<&str> = Vec::new();
        let mut args: Vec<Value> = Vec::new();

        if let Some(client_id) = filter.client_id {
            clauses.push("b.client_id = ?");
            args.push(Value::Integer(client_id));
        }
        if filter.active_only {
            clauses.push("b.active = 1");
        }
        if let Some(fragment) = &filter.code_contains {
            clauses.push("b.code LIKE ? ESCAPE '\\'");
            args.push(Value::Text(like_pattern(fragment)));
        }
        if let Some(since) = filter.sharpened_since {
            clauses.push("b.last_sharpened_at >= ?");
            args.push(Value::Integer(since.timestamp_millis()));
        }
        if let Some(until) = filter.sharpened_until {
            clauses.push("b.last_sharpened_at <= ?");
            args.push(Value::Integer(until.timestamp_millis()));
        }
        if let Some(cutoff) = filter.stale_before {
            clauses.push("(b.last_sharpened_at IS NULL OR b.last_sharpened_at < ?)");
            args.push(Value::Integer(cutoff.timestamp_millis()));
        }

        let order = match filter.order {
            BladeOrder::Code => "ORDER BY b.code, b.id",
            BladeOrder::LastSharpenedAsc => {
                "ORDER BY b.last_sharpened_at IS NOT NULL, b.last_sharpened_at, b.id"
            }
        };

        let sql = format!("{}{} {}", BLADE_SELECT, where_clause(&clauses), order);

        let conn = self.conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(args), blade_detail_from_row)?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(decode_error)
    }

    fn find_records(&self, filter: &RecordFilter) -> StoreResult<Vec<RecordDetail>> {
        let mut clauses: Vec<&str> = Vec::new();
        let mut args: Vec<Value> = Vec::new();

        if let Some(blade_id) = filter.blade_id {
            clauses.push("r.blade_id = ?");
            args.push(Value::Integer(blade_id));
        }
        if let Some(client_id) = filter.client_id {
            clauses.push("b.client_id = ?");
            args.push(Value::Integer(client_id));
        }
        if let Some(since) = filter.since {
            clauses.push("r.performed_at >= ?");
            args.push(Value::Integer(since.timestamp_millis()));
        }
        if let Some(until) = filter.until {
            clauses.push("r.performed_at <= ?");
            args.push(Value::Integer(until.timestamp_millis()));
        }
        if let Some(kind) = filter.kind {
            clauses.push("r.kind = ?");
            args.push(Value::Text(kind.as_str().to_string()));
        }

        let sql = format!(
            "{}{} ORDER BY r.performed_at DESC, r.id DESC",
            RECORD_SELECT,
            where_clause(&clauses)
        );

        let conn = self.conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(args), record_detail_from_row)?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(decode_error)
    }

    fn find_operator(&self, id: i64) -> StoreResult<Option<Operator>> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT id, name, role, active FROM operators WHERE id = ?1",
            params![id],
            |row| {
                Ok(Operator {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    role: parse_text(row, 2)?,
                    active: row.get(3)?,
                })
            },
        )
        .optional()
        .map_err(decode_error)
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn client(&self, id: i64) -> StoreResult<Option<Client>> {
        self.find_client(id)
    }

    async fn clients_by_ids(&self, ids: &[i64]) -> StoreResult<Vec<Client>> {
        self.find_clients(ids)
    }

    async fn clients_named(&self, fragment: &str) -> StoreResult<Vec<Client>> {
        self.find_clients_named(fragment)
    }

    async fn blade(&self, id: i64) -> StoreResult<Option<BladeDetail>> {
        self.find_blade(id)
    }

    async fn blades(&self, filter: &BladeFilter) -> StoreResult<Vec<BladeDetail>> {
        self.find_blades(filter)
    }

    async fn records(&self, filter: &RecordFilter) -> StoreResult<Vec<RecordDetail>> {
        self.find_records(filter)
    }

    async fn operator(&self, id: i64) -> StoreResult<Option<Operator>> {
        self.find_operator(id)
    }

    async fn ping(&self) -> StoreResult<()> {
        let conn = self.conn()?;
        conn.query_row("SELECT 1", [], |_| Ok(()))?;
        Ok(())
    }
}

fn where_clause(clauses: &[&str]) -> String {
    if clauses.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", clauses.join(" AND "))
    }
}

/// Build a LIKE pattern matching `fragment` anywhere, with wildcards escaped
fn like_pattern(fragment: &str) -> String {
    let escaped = fragment
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// Map row-decoding failures to `Corrupt`, everything else to `Sqlite`
fn decode_error(err: rusqlite::Error) -> StoreError {
    match err {
        rusqlite::Error::FromSqlConversionFailure(idx, _, cause) => {
            StoreError::Corrupt(format!("column {}: {}", idx, cause))
        }
        other => StoreError::Sqlite(other),
    }
}

fn timestamp_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let millis: Option<i64> = row.get(idx)?;
    millis
        .map(|ms| {
            DateTime::from_timestamp_millis(ms).ok_or_else(|| {
                rusqlite::Error::FromSqlConversionFailure(
                    idx,
                    Type::Integer,
                    format!("timestamp out of range: {}", ms).into(),
                )
            })
        })
        .transpose()
}

fn required_timestamp_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    timestamp_at(row, idx)?.ok_or(rusqlite::Error::InvalidColumnType(
        idx,
        "performed_at".to_string(),
        Type::Null,
    ))
}

fn parse_text<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: std::str::FromStr<Err = String>,
{
    let text: String = row.get(idx)?;
    text.parse()
        .map_err(|e: String| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.into()))
}

fn client_from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<Client> {
    Ok(Client {
        id: row.get(offset)?,
        name: row.get(offset + 1)?,
        phone: row.get(offset + 2)?,
        address: row.get(offset + 3)?,
    })
}

fn blade_detail_from_row(row: &Row<'_>) -> rusqlite::Result<BladeDetail> {
    Ok(BladeDetail {
        blade: Blade {
            id: row.get(0)?,
            code: row.get(1)?,
            client_id: row.get(2)?,
            blade_type_id: row.get(3)?,
            last_sharpened_at: timestamp_at(row, 4)?,
            active: row.get(5)?,
        },
        blade_type: BladeType {
            id: row.get(6)?,
            code: row.get(7)?,
            name: row.get(8)?,
            description: row.get(9)?,
        },
        client: client_from_row(row, 10)?,
    })
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<SharpeningRecord> {
    Ok(SharpeningRecord {
        id: row.get(0)?,
        blade_id: row.get(1)?,
        kind: parse_text(row, 2)?,
        notes: row.get(3)?,
        operator_id: row.get(4)?,
        performed_at: required_timestamp_at(row, 5)?,
    })
}

fn record_detail_from_row(row: &Row<'_>) -> rusqlite::Result<RecordDetail> {
    Ok(RecordDetail {
        record: record_from_row(row)?,
        blade_code: row.get(6)?,
        client_id: row.get(7)?,
        client_name: row.get(8)?,
        operator_name: row.get(9)?,
    })
}
