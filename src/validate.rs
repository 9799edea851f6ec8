// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Entry-time checks. Raw text comes in, typed records come out, and every
//! bad field is reported together so the user can fix them in one pass.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::billing::{self, AreaEquipment, HourlyEquipment, LineItem, DIPPER_TAG};
use crate::error::{BillingError, ValidationErrors};
use crate::models::{BusinessLine, OldBalance, OldBalanceStatus, Party, Transaction};

/// Upper bound for acres, rounds, hours and nadai on a single line item.
pub const MAX_QUANTITY: u32 = 10_000;
/// Upper bound for received, advance and old-balance amounts (100 crore).
pub const MAX_AMOUNT: u64 = 1_000_000_000;

static MOBILE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[6-9][0-9]{9}$").unwrap());

#[derive(Debug, Clone, Default)]
pub struct RentalItemDraft {
    pub equipment: String,
    pub acres: String,
    pub rounds: String,
    pub nadai: String,
}

#[derive(Debug, Clone, Default)]
pub struct OldBalanceDraft {
    pub amount: String,
    pub status: OldBalanceStatus,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct RentalDraft {
    pub name: String,
    pub items: Vec<RentalItemDraft>,
    pub received_amount: String,
    pub old_balance: Option<OldBalanceDraft>,
    pub old_balance_only: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ServiceDraft {
    pub company_name: String,
    pub driver_name: String,
    pub mobile_number: String,
    pub work_date: Option<NaiveDate>,
    pub hours: Vec<String>,
    pub amount_received: String,
    pub advance_amount: String,
    pub old_balance: Option<OldBalanceDraft>,
    pub old_balance_only: bool,
}

/// Empty is accepted; the number is optional.
pub fn valid_mobile(raw: &str) -> bool {
    let s = raw.trim();
    s.is_empty() || MOBILE.is_match(s)
}

fn decimal(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw.trim()).ok()
}

fn positive(errs: &mut ValidationErrors, field: String, raw: &str, what: &str) -> Option<Decimal> {
    match decimal(raw) {
        Some(d) if d > Decimal::from(MAX_QUANTITY) => {
            errs.push(field, format!("{} must be at most {}", what, MAX_QUANTITY));
            None
        }
        Some(d) if d > Decimal::ZERO => Some(d),
        _ => {
            errs.push(field, format!("Enter a valid {} greater than zero", what));
            None
        }
    }
}

fn non_negative(errs: &mut ValidationErrors, field: &str, raw: &str, what: &str) -> Option<Decimal> {
    match decimal(raw) {
        Some(d) if d > Decimal::from(MAX_AMOUNT) => {
            errs.push(field, format!("{} must be at most {}", what, MAX_AMOUNT));
            None
        }
        Some(d) if d >= Decimal::ZERO => Some(d),
        _ => {
            errs.push(field, format!("Enter a valid {}", what));
            None
        }
    }
}

fn required_text(errs: &mut ValidationErrors, field: &str, raw: &str, what: &str) -> String {
    let s = raw.trim();
    if s.is_empty() {
        errs.push(field, format!("{} is required", what));
    }
    s.to_string()
}

fn old_balance(
    errs: &mut ValidationErrors,
    draft: Option<&OldBalanceDraft>,
    required: bool,
) -> Option<OldBalance> {
    let draft = match draft {
        Some(d) if !d.amount.trim().is_empty() => d,
        _ => {
            if required {
                errs.push("old_balance", "Old balance is required");
            }
            return None;
        }
    };
    if non_negative(errs, "old_balance", &draft.amount, "old balance").is_none() {
        return None;
    }
    let reason = draft.reason.trim();
    Some(OldBalance {
        amount: draft.amount.trim().to_string(),
        status: draft.status,
        reason: (!reason.is_empty()).then(|| reason.to_string()),
    })
}

fn rental_item(errs: &mut ValidationErrors, i: usize, d: &RentalItemDraft) -> Option<LineItem> {
    let tag = d.equipment.trim();
    if tag == DIPPER_TAG {
        return match d.nadai.trim().parse::<u32>() {
            Ok(n) if n > MAX_QUANTITY => {
                errs.push(
                    format!("nadai_{}", i),
                    format!("nadai count must be at most {}", MAX_QUANTITY),
                );
                None
            }
            Ok(n) if n > 0 => Some(LineItem::Dipper { nadai: n }),
            _ => {
                errs.push(format!("nadai_{}", i), "Enter a valid nadai count");
                None
            }
        };
    }
    let Some(equipment) = AreaEquipment::from_tag(tag) else {
        errs.push(
            format!("equipment_{}", i),
            format!(
                "Unknown equipment '{}', expected one of: {}",
                tag,
                billing::known_tags(BusinessLine::Rental).join(", ")
            ),
        );
        return None;
    };
    let acres = positive(errs, format!("acres_{}", i), &d.acres, "acreage");
    let rounds = positive(errs, format!("rounds_{}", i), &d.rounds, "round count");
    Some(LineItem::Area {
        equipment,
        acres: acres?,
        rounds: rounds?,
    })
}

pub fn rental_transaction(draft: &RentalDraft) -> Result<Transaction, ValidationErrors> {
    let mut errs = ValidationErrors::default();
    let name = required_text(&mut errs, "name", &draft.name, "Name");
    let party = Party::Customer { name };

    if draft.old_balance_only {
        return match old_balance(&mut errs, draft.old_balance.as_ref(), true) {
            Some(ob) if errs.is_empty() => {
                Ok(billing::old_balance_only(BusinessLine::Rental, party, ob))
            }
            _ => Err(errs),
        };
    }

    if draft.items.is_empty() {
        errs.push("items", "Add at least one line item");
    }
    let items: Vec<Option<LineItem>> = draft
        .items
        .iter()
        .enumerate()
        .map(|(i, d)| rental_item(&mut errs, i, d))
        .collect();
    let received = if draft.received_amount.trim().is_empty() {
        errs.push("received_amount", "Enter a valid received amount");
        None
    } else {
        non_negative(&mut errs, "received_amount", &draft.received_amount, "received amount")
    };
    let ob = old_balance(&mut errs, draft.old_balance.as_ref(), false);
    errs.into_result()?;

    let items: Vec<LineItem> = items.into_iter().flatten().collect();
    billing::transaction_from_items(
        BusinessLine::Rental,
        party,
        &items,
        received.unwrap_or(Decimal::ZERO),
        ob,
    )
    .map_err(total_error)
}

fn total_error(err: BillingError) -> ValidationErrors {
    let mut errs = ValidationErrors::default();
    errs.push("items", err.to_string());
    errs
}

pub fn service_transaction(
    draft: &ServiceDraft,
    today: NaiveDate,
) -> Result<Transaction, ValidationErrors> {
    let mut errs = ValidationErrors::default();
    let company_name = required_text(&mut errs, "company_name", &draft.company_name, "Company name");
    let driver_name = required_text(&mut errs, "driver_name", &draft.driver_name, "Driver name");
    if !valid_mobile(&draft.mobile_number) {
        errs.push(
            "mobile_number",
            "Enter a valid 10 digit mobile number starting with 6, 7, 8 or 9",
        );
    }
    let mobile = draft.mobile_number.trim();
    let mobile_number = (!mobile.is_empty()).then(|| mobile.to_string());
    let work_date = Some(draft.work_date.unwrap_or(today));
    let party = Party::Company {
        company_name,
        driver_name,
    };

    if draft.old_balance_only {
        return match old_balance(&mut errs, draft.old_balance.as_ref(), true) {
            Some(ob) if errs.is_empty() => {
                let mut tx = billing::old_balance_only(BusinessLine::Service, party, ob);
                tx.mobile_number = mobile_number;
                tx.work_date = work_date;
                Ok(tx)
            }
            _ => Err(errs),
        };
    }

    if draft.hours.is_empty() {
        errs.push("items", "Add at least one line item");
    }
    let items: Vec<Option<LineItem>> = draft
        .hours
        .iter()
        .enumerate()
        .map(|(i, h)| {
            positive(&mut errs, format!("hours_{}", i), h, "number of hours (e.g. 1.30)").map(
                |hours| LineItem::Hourly {
                    equipment: HourlyEquipment::Jcb,
                    hours,
                },
            )
        })
        .collect();
    let optional = |errs: &mut ValidationErrors, field: &str, raw: &str, what: &str| {
        if raw.trim().is_empty() {
            Some(Decimal::ZERO)
        } else {
            non_negative(errs, field, raw, what)
        }
    };
    let received = optional(&mut errs, "amount_received", &draft.amount_received, "received amount");
    let advance = optional(&mut errs, "advance_amount", &draft.advance_amount, "advance amount");
    let ob = old_balance(&mut errs, draft.old_balance.as_ref(), false);
    errs.into_result()?;

    let items: Vec<LineItem> = items.into_iter().flatten().collect();
    let mut tx = billing::transaction_from_items(
        BusinessLine::Service,
        party,
        &items,
        received.unwrap_or(Decimal::ZERO),
        ob,
    )
    .map_err(total_error)?;
    tx.mobile_number = mobile_number;
    tx.work_date = work_date;
    tx.advance_amount = advance.unwrap_or(Decimal::ZERO);
    Ok(tx)
}
