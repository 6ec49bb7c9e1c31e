//! Pooled `DuckDB` connections sharing one database handle.

use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use ::duckdb::Connection;

use crate::WarehouseError;

/// Where the database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbLocation {
    File(PathBuf),
    Memory,
}

struct PoolInner {
    location: DbLocation,
    root: Mutex<Connection>,
    idle: Mutex<Vec<Connection>>,
    max_idle: usize,
}

/// Hands out connections cloned from a single root handle so every
/// connection sees the same database, in-memory ones included.
#[derive(Clone)]
pub struct ConnectionPool {
    inner: Arc<PoolInner>,
}

impl ConnectionPool {
    /// Open the database at `location` and keep up to `max_idle` spare
    /// connections around between checkouts.
    pub fn open(location: DbLocation, max_idle: usize) -> Result<Self, WarehouseError> {
        let root = match &location {
            DbLocation::File(path) => Connection::open(path)?,
            DbLocation::Memory => Connection::open_in_memory()?,
        };
        root.execute_batch("PRAGMA disable_progress_bar;")?;

        Ok(Self {
            inner: Arc::new(PoolInner {
                location,
                root: Mutex::new(root),
                idle: Mutex::new(Vec::new()),
                max_idle: max_idle.max(1),
            }),
        })
    }

    /// Take an idle connection, or clone a fresh one from the root handle.
    pub fn checkout(&self) -> Result<PooledConnection, WarehouseError> {
        let reused = self
            .inner
            .idle
            .lock()
            .map_err(|_| WarehouseError::PoolPoisoned)?
            .pop();

        let connection = match reused {
            Some(connection) => connection,
            None => self
                .inner
                .root
                .lock()
                .map_err(|_| WarehouseError::PoolPoisoned)?
                .try_clone()?,
        };

        Ok(PooledConnection {
            pool: Arc::clone(&self.inner),
            connection: Some(connection),
        })
    }

    /// File path of the database, `None` when in memory.
    pub fn db_path(&self) -> Option<&Path> {
        match &self.inner.location {
            DbLocation::File(path) => Some(path.as_path()),
            DbLocation::Memory => None,
        }
    }
}

/// A checked-out connection; returns to the idle list on drop.
pub struct PooledConnection {
    pool: Arc<PoolInner>,
    connection: Option<Connection>,
}

impl Deref for PooledConnection {
    type Target = Connection;

    fn deref(&self) -> &Self::Target {
        self.connection
            .as_ref()
            .expect("pooled connection is present until drop")
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        let Some(connection) = self.connection.take() else {
            return;
        };

        if let Ok(mut idle) = self.pool.idle.lock() {
            if idle.len() < self.pool.max_idle {
                idle.push(connection);
            }
        }
    }
}
