//! SQLite-backed tick store
//!
//! Append-only tables of one-minute OHLCV records, one table per
//! trading pair. The engine only needs two query shapes: the single
//! most-recent tick, and an ascending scan of everything at or after a
//! timestamp. A collector process owns the writes; `append` exists for
//! that side and for tests.

use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use crate::error::EngineResult;
use crate::types::Tick;

#[derive(Clone)]
pub struct TickStore {
    conn: Arc<Mutex<Connection>>,
}

impl TickStore {
    /// Open (or create) the store at `db_path`.
    pub fn open<P: AsRef<Path>>(db_path: P) -> EngineResult<Self> {
        let db_path = db_path.as_ref();
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).ok();
            }
        }

        let conn = Connection::open(db_path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        info!("Tick store opened: {}", db_path.display());
        Ok(TickStore {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// In-memory store, used by tests.
    pub fn open_in_memory() -> EngineResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(TickStore {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Create the per-pair tick table if it does not exist yet.
    pub fn ensure_table(&self, table: &str) -> EngineResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS {table} (
                    timestamp INTEGER PRIMARY KEY,
                    open REAL NOT NULL,
                    high REAL NOT NULL,
                    low REAL NOT NULL,
                    close REAL NOT NULL,
                    volume REAL NOT NULL DEFAULT 0
                )"
            ),
            [],
        )?;
        debug!("Tick table ensured: {}", table);
        Ok(())
    }

    /// Append one tick. Duplicate timestamps are a collector bug and
    /// fail the primary-key constraint rather than overwrite history.
    pub fn append(&self, table: &str, tick: &Tick) -> EngineResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            &format!(
                "INSERT INTO {table} (timestamp, open, high, low, close, volume)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)"
            ),
            params![
                tick.timestamp,
                tick.open,
                tick.high,
                tick.low,
                tick.close,
                tick.volume,
            ],
        )?;
        Ok(())
    }

    /// Timestamp of the freshest tick, or `None` for an empty table.
    pub fn latest_timestamp(&self, table: &str) -> EngineResult<Option<i64>> {
        Ok(self.latest_tick(table)?.map(|t| t.timestamp))
    }

    /// The single most-recent tick, or `None` for an empty table.
    pub fn latest_tick(&self, table: &str) -> EngineResult<Option<Tick>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT timestamp, open, high, low, close, volume
             FROM {table} ORDER BY timestamp DESC LIMIT 1"
        ))?;

        match stmt.query_row([], row_to_tick) {
            Ok(tick) => Ok(Some(tick)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// All ticks with `timestamp >= begin`, ordered ascending.
    pub fn ticks_since(&self, table: &str, begin: i64) -> EngineResult<Vec<Tick>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT timestamp, open, high, low, close, volume
             FROM {table} WHERE timestamp >= ?1 ORDER BY timestamp ASC"
        ))?;

        let ticks = stmt
            .query_map(params![begin], row_to_tick)?
            .collect::<Result<Vec<_>, _>>()?;

        debug!("Fetched {} ticks from {} since {}", ticks.len(), table, begin);
        Ok(ticks)
    }
}

fn row_to_tick(row: &rusqlite::Row<'_>) -> rusqlite::Result<Tick> {
    Ok(Tick {
        timestamp: row.get(0)?,
        open: row.get(1)?,
        high: row.get(2)?,
        low: row.get(3)?,
        close: row.get(4)?,
        volume: row.get(5)?,
    })
}
