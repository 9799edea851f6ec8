// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime, Utc};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::{params, Connection, OptionalExtension, Row};
use rust_decimal::Decimal;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::StoreError;
use crate::models::{BusinessLine, Detail, OldBalance, Party, Record, Transaction};

static APP: Lazy<(&str, &str, &str)> = Lazy::new(|| ("in", "KBS Tractors", "rentbook"));

pub const TIMESTAMP_FMT: &str = "%Y-%m-%d %H:%M:%S";

pub fn db_path() -> Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("rentbook.sqlite"))
}

/// Open the database at `path`, or at the platform data dir when unset.
pub fn open_or_init(path: Option<&Path>) -> Result<Connection> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => db_path()?,
    };
    let conn =
        Connection::open(&path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&conn)?;
    tracing::debug!(path = %path.display(), "database ready");
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS records(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        line TEXT NOT NULL CHECK(line IN ('rental','service')),
        name TEXT NOT NULL,
        driver_name TEXT,
        mobile_number TEXT,
        work_date TEXT,
        details TEXT NOT NULL DEFAULT '[]', -- JSON array of line items
        total_amount TEXT NOT NULL,
        received_amount TEXT NOT NULL DEFAULT '0',
        advance_amount TEXT NOT NULL DEFAULT '0',
        old_balance TEXT,
        old_balance_status TEXT CHECK(old_balance_status IN ('paid','pending')),
        old_balance_reason TEXT,
        created_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_records_line_created ON records(line, created_at);
    "#,
    )?;
    Ok(())
}

/// Storage operations the application needs. Records are replaced whole on
/// update.
pub trait RecordStore {
    fn create(&self, tx: &Transaction) -> Result<Record, StoreError>;
    fn get(&self, id: i64) -> Result<Record, StoreError>;
    /// Newest first.
    fn list_all(&self, line: BusinessLine) -> Result<Vec<Record>, StoreError>;
    fn update(&self, id: i64, tx: &Transaction) -> Result<Record, StoreError>;
    fn delete(&self, id: i64) -> Result<(), StoreError>;
}

const COLUMNS: &str = "id, line, name, driver_name, mobile_number, work_date, details, \
     total_amount, received_amount, advance_amount, old_balance, old_balance_status, \
     old_balance_reason, created_at";

struct Columns {
    name: String,
    driver_name: Option<String>,
    details: String,
    old_balance: Option<String>,
    old_balance_status: Option<String>,
    old_balance_reason: Option<String>,
}

fn columns(tx: &Transaction) -> Result<Columns, StoreError> {
    let (name, driver_name) = match &tx.party {
        Party::Customer { name } => (name.clone(), None),
        Party::Company {
            company_name,
            driver_name,
        } => (company_name.clone(), Some(driver_name.clone())),
    };
    let ob = tx.old_balance.as_ref();
    Ok(Columns {
        name,
        driver_name,
        details: serde_json::to_string(&tx.details)?,
        old_balance: ob.map(|o| o.amount.clone()),
        old_balance_status: ob.map(|o| o.status.to_string()),
        old_balance_reason: ob.and_then(|o| o.reason.clone()),
    })
}

/// Insert with an explicit creation time.
pub fn insert_record(
    conn: &Connection,
    tx: &Transaction,
    created_at: NaiveDateTime,
) -> Result<Record, StoreError> {
    let c = columns(tx)?;
    conn.execute(
        "INSERT INTO records(line, name, driver_name, mobile_number, work_date, details,
             total_amount, received_amount, advance_amount, old_balance, old_balance_status,
             old_balance_reason, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            tx.line.as_str(),
            c.name,
            c.driver_name,
            tx.mobile_number,
            tx.work_date.map(|d| d.to_string()),
            c.details,
            tx.total_amount.to_string(),
            tx.received_amount.to_string(),
            tx.advance_amount.to_string(),
            c.old_balance,
            c.old_balance_status,
            c.old_balance_reason,
            created_at.format(TIMESTAMP_FMT).to_string(),
        ],
    )?;
    let id = conn.last_insert_rowid();
    tracing::info!(id, line = %tx.line, total = %tx.total_amount, "record created");
    conn.get(id)
}

struct RawRow {
    id: i64,
    line: String,
    name: String,
    driver_name: Option<String>,
    mobile_number: Option<String>,
    work_date: Option<String>,
    details: String,
    total_amount: String,
    received_amount: String,
    advance_amount: String,
    old_balance: Option<String>,
    old_balance_status: Option<String>,
    old_balance_reason: Option<String>,
    created_at: String,
}

fn raw_row(r: &Row<'_>) -> rusqlite::Result<RawRow> {
    Ok(RawRow {
        id: r.get(0)?,
        line: r.get(1)?,
        name: r.get(2)?,
        driver_name: r.get(3)?,
        mobile_number: r.get(4)?,
        work_date: r.get(5)?,
        details: r.get(6)?,
        total_amount: r.get(7)?,
        received_amount: r.get(8)?,
        advance_amount: r.get(9)?,
        old_balance: r.get(10)?,
        old_balance_status: r.get(11)?,
        old_balance_reason: r.get(12)?,
        created_at: r.get(13)?,
    })
}

impl RawRow {
    fn corrupt(&self, reason: impl Into<String>) -> StoreError {
        StoreError::Corrupt {
            id: self.id,
            reason: reason.into(),
        }
    }

    fn decimal(&self, field: &str, s: &str) -> Result<Decimal, StoreError> {
        s.trim()
            .parse::<Decimal>()
            .map_err(|_| self.corrupt(format!("invalid {} '{}'", field, s)))
    }

    fn into_record(self) -> Result<Record, StoreError> {
        let line: BusinessLine = self
            .line
            .parse()
            .map_err(|e: anyhow::Error| self.corrupt(e.to_string()))?;
        let party = match (&line, &self.driver_name) {
            (BusinessLine::Service, Some(driver)) => Party::Company {
                company_name: self.name.clone(),
                driver_name: driver.clone(),
            },
            _ => Party::Customer {
                name: self.name.clone(),
            },
        };
        let details: Vec<Detail> = serde_json::from_str(&self.details)
            .map_err(|e| self.corrupt(format!("details: {}", e)))?;
        let work_date = match &self.work_date {
            Some(d) => Some(
                NaiveDate::parse_from_str(d, "%Y-%m-%d")
                    .map_err(|_| self.corrupt(format!("invalid work date '{}'", d)))?,
            ),
            None => None,
        };
        let old_balance = match &self.old_balance {
            Some(amount) => Some(OldBalance {
                amount: amount.clone(),
                // Unset status means pending.
                status: match &self.old_balance_status {
                    Some(s) => s
                        .parse()
                        .map_err(|e: anyhow::Error| self.corrupt(e.to_string()))?,
                    None => Default::default(),
                },
                reason: self.old_balance_reason.clone(),
            }),
            None => None,
        };
        let created_at = NaiveDateTime::parse_from_str(&self.created_at, TIMESTAMP_FMT)
            .map_err(|_| self.corrupt(format!("invalid timestamp '{}'", self.created_at)))?;
        let transaction = Transaction {
            line,
            party,
            mobile_number: self.mobile_number.clone(),
            work_date,
            details,
            total_amount: self.decimal("total", &self.total_amount)?,
            received_amount: self.decimal("received amount", &self.received_amount)?,
            advance_amount: self.decimal("advance amount", &self.advance_amount)?,
            old_balance,
        };
        Ok(Record {
            id: self.id,
            created_at,
            transaction,
        })
    }
}

impl RecordStore for Connection {
    fn create(&self, tx: &Transaction) -> Result<Record, StoreError> {
        insert_record(self, tx, Utc::now().naive_utc())
    }

    fn get(&self, id: i64) -> Result<Record, StoreError> {
        let sql = format!("SELECT {} FROM records WHERE id=?1", COLUMNS);
        let raw = self
            .query_row(&sql, params![id], raw_row)
            .optional()?
            .ok_or(StoreError::NotFound(id))?;
        raw.into_record()
    }

    fn list_all(&self, line: BusinessLine) -> Result<Vec<Record>, StoreError> {
        let sql = format!(
            "SELECT {} FROM records WHERE line=?1 ORDER BY created_at DESC, id DESC",
            COLUMNS
        );
        let mut stmt = self.prepare(&sql)?;
        let rows = stmt.query_map(params![line.as_str()], raw_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?.into_record()?);
        }
        Ok(out)
    }

    fn update(&self, id: i64, tx: &Transaction) -> Result<Record, StoreError> {
        let c = columns(tx)?;
        let n = self.execute(
            "UPDATE records SET line=?1, name=?2, driver_name=?3, mobile_number=?4, work_date=?5,
                 details=?6, total_amount=?7, received_amount=?8, advance_amount=?9,
                 old_balance=?10, old_balance_status=?11, old_balance_reason=?12
             WHERE id=?13",
            params![
                tx.line.as_str(),
                c.name,
                c.driver_name,
                tx.mobile_number,
                tx.work_date.map(|d| d.to_string()),
                c.details,
                tx.total_amount.to_string(),
                tx.received_amount.to_string(),
                tx.advance_amount.to_string(),
                c.old_balance,
                c.old_balance_status,
                c.old_balance_reason,
                id,
            ],
        )?;
        if n == 0 {
            return Err(StoreError::NotFound(id));
        }
        tracing::info!(id, total = %tx.total_amount, "record updated");
        self.get(id)
    }

    fn delete(&self, id: i64) -> Result<(), StoreError> {
        let n = self.execute("DELETE FROM records WHERE id=?1", params![id])?;
        if n == 0 {
            return Err(StoreError::NotFound(id));
        }
        tracing::info!(id, "record deleted");
        Ok(())
    }
}

pub fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    let v: Option<String> = conn
        .query_row("SELECT value FROM settings WHERE key=?1", params![key], |r| {
            r.get(0)
        })
        .optional()?;
    Ok(v)
}

pub fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, value],
    )?;
    Ok(())
}

pub fn clear_setting(conn: &Connection, key: &str) -> Result<()> {
    conn.execute("DELETE FROM settings WHERE key=?1", params![key])?;
    Ok(())
}
