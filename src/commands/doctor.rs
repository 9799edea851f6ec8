// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::billing;
use crate::db::RecordStore;
use crate::error::BillingError;
use crate::models::{BusinessLine, Record};
use crate::utils::pretty_table;

/// Problems found in stored records, as (issue, detail) pairs.
pub fn check_records(records: &[Record]) -> Vec<(String, String)> {
    let mut issues = Vec::new();
    for r in records {
        let tx = &r.transaction;
        for tag in tx.tags() {
            if !billing::is_known_tag(tx.line, tag) {
                issues.push(("unknown_equipment".into(), format!("#{} {}", r.id, tag)));
            }
        }
        if let Some(ob) = &tx.old_balance {
            if Decimal::from_str(ob.amount.trim()).is_err() {
                issues.push((
                    "old_balance_not_numeric".into(),
                    format!("#{} '{}'", r.id, ob.amount),
                ));
            }
        }
        // Unknown tags are already reported above.
        match billing::total_for(tx) {
            Ok(expected) if expected != tx.total_amount => issues.push((
                "total_mismatch".into(),
                format!("#{} stored {} expected {}", r.id, tx.total_amount, expected),
            )),
            Err(e @ BillingError::Overflow(_)) => {
                issues.push(("total_out_of_range".into(), format!("#{} {}", r.id, e)))
            }
            _ => {}
        }
    }
    issues
}

pub fn handle(conn: &Connection) -> Result<()> {
    let mut rows = Vec::new();
    for line in [BusinessLine::Rental, BusinessLine::Service] {
        let records = conn.list_all(line)?;
        for (issue, detail) in check_records(&records) {
            rows.push(vec![line.to_string(), issue, detail]);
        }
    }

    if rows.is_empty() {
        println!("doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Line", "Issue", "Detail"], rows));
    }
    Ok(())
}
