// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Pricing and balance reconciliation.
//!
//! Everything here is a pure function of its inputs. Amounts are never
//! rounded before multiplication; the product is the billed amount.

use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::BillingError;
use crate::models::{
    BusinessLine, Detail, OldBalance, OldBalanceStatus, Party, PaymentStatus, Transaction,
};

pub const DIPPER_TAG: &str = "Dipper";
const DIPPER_RATE: u32 = 500;

/// Rental implements billed by acres x rounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AreaEquipment {
    CageWheel,
    /// Dust-wheel variant of the cage wheel, same rate.
    Puzhuthi,
    Rotavator,
    Mini,
}

impl AreaEquipment {
    pub const ALL: [AreaEquipment; 4] = [
        AreaEquipment::CageWheel,
        AreaEquipment::Puzhuthi,
        AreaEquipment::Rotavator,
        AreaEquipment::Mini,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            AreaEquipment::CageWheel => "Cage Wheel",
            AreaEquipment::Puzhuthi => "புழுதி",
            AreaEquipment::Rotavator => "Rotavator",
            AreaEquipment::Mini => "Mini",
        }
    }

    pub fn rate(self) -> Decimal {
        let per_round: u32 = match self {
            AreaEquipment::CageWheel | AreaEquipment::Puzhuthi => 350,
            AreaEquipment::Rotavator => 700,
            AreaEquipment::Mini => 600,
        };
        Decimal::from(per_round)
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.tag() == tag.trim())
    }
}

/// Heavy machinery billed per hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HourlyEquipment {
    Jcb,
}

impl HourlyEquipment {
    pub const ALL: [HourlyEquipment; 1] = [HourlyEquipment::Jcb];

    pub fn tag(self) -> &'static str {
        match self {
            HourlyEquipment::Jcb => "JCB",
        }
    }

    pub fn rate(self) -> Decimal {
        match self {
            HourlyEquipment::Jcb => Decimal::from(1000u32),
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.tag() == tag.trim())
    }
}

/// A billable entry. The quantity shape is fixed by the variant, so a
/// Dipper can never carry acres and a JCB never carries rounds.
#[derive(Debug, Clone, PartialEq)]
pub enum LineItem {
    Area {
        equipment: AreaEquipment,
        acres: Decimal,
        rounds: Decimal,
    },
    Dipper {
        nadai: u32,
    },
    Hourly {
        equipment: HourlyEquipment,
        hours: Decimal,
    },
}

impl LineItem {
    pub fn tag(&self) -> &'static str {
        match self {
            LineItem::Area { equipment, .. } => equipment.tag(),
            LineItem::Dipper { .. } => DIPPER_TAG,
            LineItem::Hourly { equipment, .. } => equipment.tag(),
        }
    }

    pub fn line(&self) -> BusinessLine {
        match self {
            LineItem::Area { .. } | LineItem::Dipper { .. } => BusinessLine::Rental,
            LineItem::Hourly { .. } => BusinessLine::Service,
        }
    }

    /// Rebuild a typed item from its stored row. Unknown tags are a data
    /// error; missing quantities count as zero.
    pub fn from_detail(line: BusinessLine, detail: &Detail) -> Result<Self, BillingError> {
        let tag = detail.equipment_type.as_str();
        match line {
            BusinessLine::Rental => {
                if tag.trim() == DIPPER_TAG {
                    return Ok(LineItem::Dipper {
                        nadai: detail.nadai.unwrap_or(0),
                    });
                }
                let equipment = AreaEquipment::from_tag(tag).ok_or_else(|| unknown(line, tag))?;
                Ok(LineItem::Area {
                    equipment,
                    acres: detail.acres.unwrap_or(Decimal::ZERO),
                    rounds: detail.rounds.unwrap_or(Decimal::ZERO),
                })
            }
            BusinessLine::Service => {
                let equipment =
                    HourlyEquipment::from_tag(tag).ok_or_else(|| unknown(line, tag))?;
                Ok(LineItem::Hourly {
                    equipment,
                    hours: detail.hours.unwrap_or(Decimal::ZERO),
                })
            }
        }
    }
}

impl From<&LineItem> for Detail {
    fn from(item: &LineItem) -> Self {
        let mut detail = Detail {
            equipment_type: item.tag().to_string(),
            acres: None,
            rounds: None,
            nadai: None,
            hours: None,
        };
        match item {
            LineItem::Area { acres, rounds, .. } => {
                detail.acres = Some(*acres);
                detail.rounds = Some(*rounds);
            }
            LineItem::Dipper { nadai } => detail.nadai = Some(*nadai),
            LineItem::Hourly { hours, .. } => detail.hours = Some(*hours),
        }
        detail
    }
}

fn unknown(line: BusinessLine, tag: &str) -> BillingError {
    BillingError::UnknownEquipment {
        tag: tag.to_string(),
        line: line.as_str(),
    }
}

/// Every tag priced by the given business line.
pub fn known_tags(line: BusinessLine) -> Vec<&'static str> {
    match line {
        BusinessLine::Rental => AreaEquipment::ALL
            .iter()
            .map(|e| e.tag())
            .chain(std::iter::once(DIPPER_TAG))
            .collect(),
        BusinessLine::Service => HourlyEquipment::ALL.iter().map(|e| e.tag()).collect(),
    }
}

pub fn is_known_tag(line: BusinessLine, tag: &str) -> bool {
    known_tags(line).contains(&tag.trim())
}

/// Price per unit for a tag in the given business line.
pub fn rate_for(line: BusinessLine, tag: &str) -> Result<Decimal, BillingError> {
    match line {
        BusinessLine::Rental if tag.trim() == DIPPER_TAG => Ok(Decimal::from(DIPPER_RATE)),
        BusinessLine::Rental => AreaEquipment::from_tag(tag)
            .map(AreaEquipment::rate)
            .ok_or_else(|| unknown(line, tag)),
        BusinessLine::Service => HourlyEquipment::from_tag(tag)
            .map(HourlyEquipment::rate)
            .ok_or_else(|| unknown(line, tag)),
    }
}

/// Billed amount for one item. Fails rather than wrapping when the product
/// leaves `Decimal`'s range.
pub fn amount_for(item: &LineItem) -> Result<Decimal, BillingError> {
    let amount = match item {
        LineItem::Area {
            equipment,
            acres,
            rounds,
        } => acres
            .checked_mul(*rounds)
            .and_then(|area| area.checked_mul(equipment.rate())),
        LineItem::Dipper { nadai } => Decimal::from(*nadai).checked_mul(Decimal::from(DIPPER_RATE)),
        LineItem::Hourly { equipment, hours } => hours.checked_mul(equipment.rate()),
    };
    amount.ok_or(BillingError::Overflow("line item amount"))
}

pub fn line_items_total(items: &[LineItem]) -> Result<Decimal, BillingError> {
    items.iter().try_fold(Decimal::ZERO, |acc, item| {
        acc.checked_add(amount_for(item)?)
            .ok_or(BillingError::Overflow("line item total"))
    })
}

/// Lenient numeric parse for stored text amounts. Anything unparseable is
/// zero; input validation is responsible for rejecting it earlier.
pub fn parse_numeric(raw: &str) -> Decimal {
    let s = raw.trim();
    if s.is_empty() {
        return Decimal::ZERO;
    }
    match Decimal::from_str(s).or_else(|_| Decimal::from_scientific(s)) {
        Ok(d) => d,
        Err(_) => {
            tracing::warn!(value = %raw, "unparseable amount treated as zero");
            Decimal::ZERO
        }
    }
}

/// What a carried-over balance adds to the current total: its value while
/// pending, nothing once paid.
pub fn old_balance_contribution(old_balance: Option<&OldBalance>) -> Decimal {
    match old_balance {
        Some(ob) if ob.status == OldBalanceStatus::Pending => parse_numeric(&ob.amount),
        _ => Decimal::ZERO,
    }
}

/// Total for a set of typed items plus an optional carried balance.
pub fn total_of(
    items: &[LineItem],
    old_balance: Option<&OldBalance>,
) -> Result<Decimal, BillingError> {
    line_items_total(items)?
        .checked_add(old_balance_contribution(old_balance))
        .ok_or(BillingError::Overflow("record total"))
}

/// Recompute a record's total from its stored rows.
///
/// An old-balance-only record totals to the balance itself, whatever its
/// status; otherwise the balance only counts while pending.
pub fn total_for(tx: &Transaction) -> Result<Decimal, BillingError> {
    if tx.is_old_balance_only() {
        return Ok(tx
            .old_balance
            .as_ref()
            .map(|ob| parse_numeric(&ob.amount))
            .unwrap_or(Decimal::ZERO));
    }
    let items = line_items(tx)?;
    total_of(&items, tx.old_balance.as_ref())
}

pub fn line_items(tx: &Transaction) -> Result<Vec<LineItem>, BillingError> {
    tx.details
        .iter()
        .map(|d| LineItem::from_detail(tx.line, d))
        .collect()
}

/// Signed difference between billed and received, saturating at the
/// bounds of `Decimal` for corrupt stored amounts.
pub fn balance_due(total: Decimal, received: Decimal) -> Decimal {
    total.saturating_sub(received)
}

/// Outstanding amount, floored at zero.
pub fn pending_amount(total: Decimal, received: Decimal) -> Decimal {
    balance_due(total, received).max(Decimal::ZERO)
}

pub fn status_from(total: Decimal, received: Decimal) -> PaymentStatus {
    if pending_amount(total, received) <= Decimal::ZERO {
        PaymentStatus::Paid
    } else {
        PaymentStatus::Pending
    }
}

/// Current-period status of a record. The stored old-balance status plays
/// no part here.
pub fn status_for(tx: &Transaction) -> PaymentStatus {
    status_from(tx.total_amount, tx.received_amount)
}

/// Build a record from validated items, deriving its total.
pub fn transaction_from_items(
    line: BusinessLine,
    party: Party,
    items: &[LineItem],
    received_amount: Decimal,
    old_balance: Option<OldBalance>,
) -> Result<Transaction, BillingError> {
    let total_amount = total_of(items, old_balance.as_ref())?;
    Ok(Transaction {
        line,
        party,
        mobile_number: None,
        work_date: None,
        details: items.iter().map(Detail::from).collect(),
        total_amount,
        received_amount,
        advance_amount: Decimal::ZERO,
        old_balance,
    })
}

/// Build a record that only logs a historical balance. A paid balance is
/// recorded as fully received; a pending one as nothing received.
pub fn old_balance_only(line: BusinessLine, party: Party, old_balance: OldBalance) -> Transaction {
    let value = parse_numeric(&old_balance.amount);
    let received_amount = match old_balance.status {
        OldBalanceStatus::Paid => value,
        OldBalanceStatus::Pending => Decimal::ZERO,
    };
    Transaction {
        line,
        party,
        mobile_number: None,
        work_date: None,
        details: Vec::new(),
        total_amount: value,
        received_amount,
        advance_amount: Decimal::ZERO,
        old_balance: Some(old_balance),
    }
}
