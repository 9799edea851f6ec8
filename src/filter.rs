// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use std::str::FromStr;

use crate::billing;
use crate::models::{OldBalanceStatus, PaymentStatus, Record};

pub const OTHERS: &str = "Others";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EquipmentFilter {
    Tag(String),
    /// Any tag the record's business line does not price.
    Others,
}

impl FromStr for EquipmentFilter {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case(OTHERS) {
            Ok(EquipmentFilter::Others)
        } else {
            Ok(EquipmentFilter::Tag(s.to_string()))
        }
    }
}

/// Unset criteria are skipped; the rest are AND-ed.
#[derive(Debug, Clone, Default)]
pub struct FilterCriteria {
    pub equipment: Option<EquipmentFilter>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub party: Option<String>,
    pub status: Option<PaymentStatus>,
    pub old_balance_status: Option<OldBalanceStatus>,
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        self.equipment.is_none()
            && self.date_from.is_none()
            && self.date_to.is_none()
            && self.party.as_deref().is_none_or(|p| p.trim().is_empty())
            && self.status.is_none()
            && self.old_balance_status.is_none()
    }
}

fn equipment_matches(record: &Record, filter: &EquipmentFilter) -> bool {
    let tx = &record.transaction;
    match filter {
        EquipmentFilter::Others => tx.tags().any(|t| !billing::is_known_tag(tx.line, t)),
        EquipmentFilter::Tag(want) => tx
            .tags()
            .any(|t| t.trim().to_lowercase() == want.trim().to_lowercase()),
    }
}

pub fn matches(record: &Record, c: &FilterCriteria) -> bool {
    let tx = &record.transaction;
    let day = record.created_at.date();

    if let Some(eq) = &c.equipment {
        if !equipment_matches(record, eq) {
            return false;
        }
    }
    if c.date_from.is_some_and(|from| day < from) {
        return false;
    }
    if c.date_to.is_some_and(|to| day > to) {
        return false;
    }
    if let Some(needle) = c.party.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        if !tx.party.name().to_lowercase().contains(&needle.to_lowercase()) {
            return false;
        }
    }
    if let Some(status) = c.status {
        if billing::status_for(tx) != status {
            return false;
        }
    }
    if let Some(want) = c.old_balance_status {
        match &tx.old_balance {
            Some(ob) if ob.status == want => {}
            _ => return false,
        }
    }
    true
}

pub fn apply<'a>(records: &'a [Record], c: &FilterCriteria) -> Vec<&'a Record> {
    if c.is_empty() {
        return records.iter().collect();
    }
    let out: Vec<&Record> = records.iter().filter(|r| matches(r, c)).collect();
    tracing::debug!(total = records.len(), kept = out.len(), "applied record filter");
    out
}
