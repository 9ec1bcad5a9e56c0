//! Connection handling for the `SQLite` store.

use crate::Result;
use rusqlite::Connection;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// Busy timeout applied to every connection, in milliseconds.
pub const BUSY_TIMEOUT_MS: u32 = 5000;

/// Acquires the connection mutex, recovering from poison.
///
/// A panic inside a previous critical section leaves the connection usable:
/// any open transaction was rolled back when its guard dropped.
pub fn acquire_lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            tracing::warn!("SQLite mutex was poisoned, recovering");
            metrics::counter!("sqlite_mutex_poison_recovery_total").increment(1);
            poisoned.into_inner()
        },
    }
}

/// Configures a connection for concurrent use.
///
/// - **WAL mode**: readers see a committed snapshot while a writer is active
/// - **NORMAL synchronous**: balances durability with performance
/// - **`busy_timeout`**: waits for the write lock instead of failing with `SQLITE_BUSY`
/// - **`foreign_keys`**: enforces user → role and grant → permission references
pub fn configure_connection(conn: &Connection) -> Result<()> {
    // journal_mode returns a row, so pragma_update's result is ignored here;
    // in-memory databases stay in "memory" mode.
    let _ = conn.pragma_update(None, "journal_mode", "WAL");
    let _ = conn.pragma_update(None, "synchronous", "NORMAL");
    conn.busy_timeout(Duration::from_millis(u64::from(BUSY_TIMEOUT_MS)))
        .map_err(|e| crate::Error::operation("configure_busy_timeout", e))?;
    conn.pragma_update(None, "foreign_keys", "ON")
        .map_err(|e| crate::Error::operation("configure_foreign_keys", e))?;
    Ok(())
}
