// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BusinessLine {
    /// Tractor implements billed per acre and round, or per nadai.
    Rental,
    /// JCB work billed per hour.
    Service,
}

impl BusinessLine {
    pub fn as_str(&self) -> &'static str {
        match self {
            BusinessLine::Rental => "rental",
            BusinessLine::Service => "service",
        }
    }
}

impl fmt::Display for BusinessLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BusinessLine {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "rental" => Ok(BusinessLine::Rental),
            "service" => Ok(BusinessLine::Service),
            other => Err(anyhow!("Unknown business line '{}'", other)),
        }
    }
}

/// Stored status of a carried-over balance. Independent of the status derived
/// from the current record's total and received amount.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OldBalanceStatus {
    Paid,
    #[default]
    Pending,
}

/// Derived from total vs. received, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Paid,
    Pending,
}

macro_rules! status_text {
    ($t:ty) => {
        impl $t {
            pub fn as_str(&self) -> &'static str {
                match self {
                    Self::Paid => "paid",
                    Self::Pending => "pending",
                }
            }
        }

        impl fmt::Display for $t {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $t {
            type Err = anyhow::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    "paid" => Ok(Self::Paid),
                    "pending" => Ok(Self::Pending),
                    other => Err(anyhow!("Invalid status '{}', expected paid|pending", other)),
                }
            }
        }
    };
}

status_text!(OldBalanceStatus);
status_text!(PaymentStatus);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OldBalance {
    /// Kept as entered; parsed leniently when totals are computed.
    pub amount: String,
    pub status: OldBalanceStatus,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Party {
    Customer {
        name: String,
    },
    Company {
        company_name: String,
        driver_name: String,
    },
}

impl Party {
    /// Name used for display and for the name filter.
    pub fn name(&self) -> &str {
        match self {
            Party::Customer { name } => name,
            Party::Company { company_name, .. } => company_name,
        }
    }

    pub fn driver(&self) -> Option<&str> {
        match self {
            Party::Customer { .. } => None,
            Party::Company { driver_name, .. } => Some(driver_name),
        }
    }
}

/// One stored line item. The tag is free text so rows written by older
/// versions survive loading; typed conversion happens in `billing`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detail {
    pub equipment_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acres: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rounds: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nadai: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours: Option<Decimal>,
}

/// A record as handed to storage: everything except identity and timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub line: BusinessLine,
    pub party: Party,
    pub mobile_number: Option<String>,
    pub work_date: Option<NaiveDate>,
    pub details: Vec<Detail>,
    pub total_amount: Decimal,
    pub received_amount: Decimal,
    pub advance_amount: Decimal,
    pub old_balance: Option<OldBalance>,
}

impl Transaction {
    /// A record that only logs a historical balance, with no equipment usage.
    pub fn is_old_balance_only(&self) -> bool {
        self.details.is_empty() && self.old_balance.is_some()
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.details.iter().map(|d| d.equipment_type.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: i64,
    pub created_at: NaiveDateTime,
    pub transaction: Transaction,
}
