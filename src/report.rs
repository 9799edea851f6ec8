// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Figures shared by the table view, the summary cards and the exporters,
//! so every surface shows the same totals and statuses.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::billing::{self, LineItem};
use crate::models::{Detail, Record};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub records: usize,
    pub total_amount: Decimal,
    pub received_amount: Decimal,
    /// Sum of each record's pending amount, each floored at zero.
    pub pending_amount: Decimal,
}

impl Summary {
    /// Sums saturate at the bounds of `Decimal`.
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a Record>) -> Self {
        let mut s = Summary::default();
        for r in records {
            let tx = &r.transaction;
            s.records += 1;
            s.total_amount = s.total_amount.saturating_add(tx.total_amount);
            s.received_amount = s.received_amount.saturating_add(tx.received_amount);
            s.pending_amount = s
                .pending_amount
                .saturating_add(billing::pending_amount(tx.total_amount, tx.received_amount));
        }
        s
    }
}

/// One record as shown in the list view.
#[derive(Debug, Clone, Serialize)]
pub struct RecordView {
    pub id: i64,
    pub date: String,
    pub party: String,
    pub driver: String,
    pub items: String,
    pub total_amount: Decimal,
    pub received_amount: Decimal,
    pub advance_amount: Decimal,
    pub pending_amount: Decimal,
    pub status: String,
    pub old_balance: String,
    pub old_balance_status: String,
    pub old_balance_reason: String,
}

pub fn describe_detail(d: &Detail) -> String {
    let q = |v: Option<Decimal>| v.map(|d| d.normalize().to_string()).unwrap_or_default();
    if let Some(n) = d.nadai {
        format!("{} {} nadai", d.equipment_type, n)
    } else if d.hours.is_some() {
        format!("{} {} h", d.equipment_type, q(d.hours))
    } else {
        format!("{} {} x {}", d.equipment_type, q(d.acres), q(d.rounds))
    }
}

impl From<&Record> for RecordView {
    fn from(r: &Record) -> Self {
        let tx = &r.transaction;
        let (old_balance, old_balance_status, old_balance_reason) = match &tx.old_balance {
            Some(ob) => (
                ob.amount.clone(),
                ob.status.to_string(),
                ob.reason.clone().unwrap_or_default(),
            ),
            None => Default::default(),
        };
        RecordView {
            id: r.id,
            date: tx
                .work_date
                .unwrap_or_else(|| r.created_at.date())
                .to_string(),
            party: tx.party.name().to_string(),
            driver: tx.party.driver().unwrap_or_default().to_string(),
            items: tx
                .details
                .iter()
                .map(describe_detail)
                .collect::<Vec<_>>()
                .join("; "),
            total_amount: tx.total_amount,
            received_amount: tx.received_amount,
            advance_amount: tx.advance_amount,
            pending_amount: billing::pending_amount(tx.total_amount, tx.received_amount),
            status: billing::status_for(tx).to_string(),
            old_balance,
            old_balance_status,
            old_balance_reason,
        }
    }
}

/// Spreadsheet row. A record with several line items spans several rows;
/// record-level columns are filled on the first one only.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExportRow {
    pub id: String,
    pub date: String,
    pub party: String,
    pub driver: String,
    pub mobile: String,
    pub equipment: String,
    pub acres: String,
    pub rounds: String,
    pub nadai: String,
    pub hours: String,
    pub amount: String,
    pub total: String,
    pub received: String,
    pub advance: String,
    pub pending: String,
    pub status: String,
    pub old_balance: String,
    pub old_balance_status: String,
    pub old_balance_reason: String,
}

pub const EXPORT_HEADERS: [&str; 19] = [
    "id",
    "date",
    "party",
    "driver",
    "mobile",
    "equipment",
    "acres",
    "rounds",
    "nadai",
    "hours",
    "amount",
    "total",
    "received",
    "advance",
    "pending",
    "status",
    "old_balance",
    "old_balance_status",
    "old_balance_reason",
];

impl ExportRow {
    pub fn cells(&self) -> [&str; 19] {
        [
            self.id.as_str(),
            self.date.as_str(),
            self.party.as_str(),
            self.driver.as_str(),
            self.mobile.as_str(),
            self.equipment.as_str(),
            self.acres.as_str(),
            self.rounds.as_str(),
            self.nadai.as_str(),
            self.hours.as_str(),
            self.amount.as_str(),
            self.total.as_str(),
            self.received.as_str(),
            self.advance.as_str(),
            self.pending.as_str(),
            self.status.as_str(),
            self.old_balance.as_str(),
            self.old_balance_status.as_str(),
            self.old_balance_reason.as_str(),
        ]
    }
}

fn opt(v: Option<Decimal>) -> String {
    v.map(|d| d.to_string()).unwrap_or_default()
}

fn fill_detail(row: &mut ExportRow, record: &Record, d: &Detail) {
    row.equipment = d.equipment_type.clone();
    row.acres = opt(d.acres);
    row.rounds = opt(d.rounds);
    row.nadai = d.nadai.map(|n| n.to_string()).unwrap_or_default();
    row.hours = opt(d.hours);
    // Unpriced tags and out-of-range products leave the amount blank.
    row.amount = LineItem::from_detail(record.transaction.line, d)
        .and_then(|item| billing::amount_for(&item))
        .map(|amount| amount.to_string())
        .unwrap_or_default();
}

pub fn export_rows(record: &Record) -> Vec<ExportRow> {
    let view = RecordView::from(record);
    let tx = &record.transaction;
    let mut first = ExportRow {
        id: record.id.to_string(),
        date: view.date,
        party: view.party,
        driver: view.driver,
        mobile: tx.mobile_number.clone().unwrap_or_default(),
        total: view.total_amount.to_string(),
        received: view.received_amount.to_string(),
        advance: view.advance_amount.to_string(),
        pending: view.pending_amount.to_string(),
        status: view.status,
        old_balance: view.old_balance,
        old_balance_status: view.old_balance_status,
        old_balance_reason: view.old_balance_reason,
        ..Default::default()
    };
    let mut details = tx.details.iter();
    let Some(d) = details.next() else {
        return vec![first];
    };
    fill_detail(&mut first, record, d);
    let mut rows = vec![first];
    for d in details {
        let mut row = ExportRow::default();
        fill_detail(&mut row, record, d);
        rows.push(row);
    }
    rows
}
