// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::ledger::Ledger;

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Loanledger", "loanledger"));

pub const DB_ENV: &str = "LOANLEDGER_DB";
pub const BUSY_TIMEOUT_ENV: &str = "LOANLEDGER_BUSY_TIMEOUT_MS";
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

pub fn db_path() -> Result<PathBuf> {
    if let Some(p) = std::env::var_os(DB_ENV).filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(p));
    }
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("loanledger.sqlite"))
}

/// How long a writer waits on a locked database before giving up.
pub fn busy_timeout() -> Duration {
    busy_timeout_from(std::env::var(BUSY_TIMEOUT_ENV).ok().as_deref())
}

fn busy_timeout_from(raw: Option<&str>) -> Duration {
    let ms = raw
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(DEFAULT_BUSY_TIMEOUT_MS);
    Duration::from_millis(ms)
}

pub fn open_or_init(path_override: Option<&Path>) -> Result<Ledger> {
    let path = match path_override {
        Some(p) => p.to_path_buf(),
        None => db_path()?,
    };
    Ledger::open(&path).with_context(|| format!("Open DB at {}", path.display()))
}

/// Connection settings applied to every file-backed ledger.
pub(crate) fn configure(conn: &Connection) -> rusqlite::Result<()> {
    conn.busy_timeout(busy_timeout())?;
    // WAL lets readers keep their snapshot while a writer commits.
    let mode: String =
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |r| r.get(0))?;
    log::debug!("journal_mode={mode}");
    Ok(())
}

pub(crate) fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
    CREATE TABLE IF NOT EXISTS loans(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        loan_id TEXT NOT NULL UNIQUE,
        lender TEXT NOT NULL,
        borrower TEXT NOT NULL,
        amount TEXT NOT NULL,
        currency TEXT NOT NULL,
        date_created TEXT NOT NULL,
        original_thread TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'active'
            CHECK(status IN ('active','confirmed','partially_repaid','repaid','refunded')),
        amount_repaid TEXT NOT NULL DEFAULT '0',
        last_updated TEXT NOT NULL,
        CHECK(lender != borrower)
    );
    CREATE INDEX IF NOT EXISTS idx_loans_lender ON loans(lender);
    CREATE INDEX IF NOT EXISTS idx_loans_borrower ON loans(borrower);
    CREATE INDEX IF NOT EXISTS idx_loans_status ON loans(status);
    CREATE INDEX IF NOT EXISTS idx_loans_date_created ON loans(date_created);

    -- Derived from loans; rewritten by the ledger on every loan mutation
    CREATE TABLE IF NOT EXISTS users(
        username TEXT PRIMARY KEY,
        loans_as_borrower INTEGER NOT NULL DEFAULT 0,
        loans_as_lender INTEGER NOT NULL DEFAULT 0,
        amount_borrowed TEXT NOT NULL DEFAULT '0',
        amount_lent TEXT NOT NULL DEFAULT '0',
        amount_repaid TEXT NOT NULL DEFAULT '0',
        unpaid_loans INTEGER NOT NULL DEFAULT 0,
        unpaid_amount TEXT NOT NULL DEFAULT '0',
        last_updated TEXT NOT NULL
    );
    "#,
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn busy_timeout_falls_back_on_missing_or_bad_values() {
        assert_eq!(busy_timeout_from(Some(" 250 ")), Duration::from_millis(250));
        assert_eq!(busy_timeout_from(Some("0")), Duration::ZERO);
        assert_eq!(busy_timeout_from(Some("soon")), Duration::from_millis(5_000));
        assert_eq!(busy_timeout_from(None), Duration::from_millis(5_000));
    }
}
