// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rentbook::billing::{
    self, amount_for, pending_amount, rate_for, status_from, total_for, AreaEquipment,
    HourlyEquipment, LineItem,
};
use rentbook::error::BillingError;
use rentbook::models::{
    BusinessLine, OldBalance, OldBalanceStatus, Party, PaymentStatus, Transaction,
};
use rust_decimal::Decimal;
use std::str::FromStr;

fn d(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn customer() -> Party {
    Party::Customer {
        name: "Murugan".into(),
    }
}

fn area(equipment: AreaEquipment, acres: &str, rounds: &str) -> LineItem {
    LineItem::Area {
        equipment,
        acres: d(acres),
        rounds: d(rounds),
    }
}

fn old_balance(amount: &str, status: OldBalanceStatus) -> OldBalance {
    OldBalance {
        amount: amount.into(),
        status,
        reason: Some("last harvest".into()),
    }
}

#[test]
fn rates_per_business_line() {
    assert_eq!(rate_for(BusinessLine::Rental, "Cage Wheel").unwrap(), d("350"));
    assert_eq!(rate_for(BusinessLine::Rental, "புழுதி").unwrap(), d("350"));
    assert_eq!(rate_for(BusinessLine::Rental, "Rotavator").unwrap(), d("700"));
    assert_eq!(rate_for(BusinessLine::Rental, "Mini").unwrap(), d("600"));
    assert_eq!(rate_for(BusinessLine::Rental, "Dipper").unwrap(), d("500"));
    assert_eq!(rate_for(BusinessLine::Service, "JCB").unwrap(), d("1000"));
}

#[test]
fn unknown_tag_has_no_rate() {
    assert_eq!(
        rate_for(BusinessLine::Rental, "JCB"),
        Err(BillingError::UnknownEquipment {
            tag: "JCB".into(),
            line: "rental"
        })
    );
    assert!(rate_for(BusinessLine::Service, "Rotavator").is_err());
}

#[test]
fn area_amount_is_exact_product() {
    let item = area(AreaEquipment::CageWheel, "2.5", "3");
    assert_eq!(amount_for(&item).unwrap(), d("2625"));
    let item = area(AreaEquipment::Rotavator, "0.3", "2");
    assert_eq!(amount_for(&item).unwrap(), d("420"));
    let item = area(AreaEquipment::Puzhuthi, "1.1", "1");
    assert_eq!(amount_for(&item).unwrap(), d("385"));
}

#[test]
fn dipper_is_flat_per_nadai() {
    assert_eq!(amount_for(&LineItem::Dipper { nadai: 4 }).unwrap(), d("2000"));
    assert_eq!(amount_for(&LineItem::Dipper { nadai: 1 }).unwrap(), d("500"));
}

#[test]
fn hourly_amount_uses_decimal_hours() {
    let item = LineItem::Hourly {
        equipment: HourlyEquipment::Jcb,
        hours: d("1.30"),
    };
    assert_eq!(amount_for(&item).unwrap(), d("1300"));
    let item = LineItem::Hourly {
        equipment: HourlyEquipment::Jcb,
        hours: d("2.05"),
    };
    assert_eq!(amount_for(&item).unwrap(), d("2050"));
}

#[test]
fn pending_old_balance_is_added_paid_is_not() {
    let items = vec![
        area(AreaEquipment::Mini, "1", "2"),
        LineItem::Dipper { nadai: 2 },
    ];
    let sum = billing::line_items_total(&items).unwrap();
    assert_eq!(sum, d("2200"));

    let pending = old_balance("200", OldBalanceStatus::Pending);
    let paid = old_balance("200", OldBalanceStatus::Paid);
    assert_eq!(billing::total_of(&items, Some(&pending)).unwrap(), sum + d("200"));
    assert_eq!(billing::total_of(&items, Some(&paid)).unwrap(), sum);
    assert_eq!(billing::total_of(&items, None).unwrap(), sum);
}

#[test]
fn total_for_recomputes_from_stored_rows_and_is_idempotent() {
    let items = vec![
        area(AreaEquipment::Rotavator, "2", "2"),
        area(AreaEquipment::CageWheel, "1.5", "1"),
    ];
    let tx = billing::transaction_from_items(
        BusinessLine::Rental,
        customer(),
        &items,
        d("1000"),
        Some(old_balance("300", OldBalanceStatus::Pending)),
    )
    .unwrap();
    assert_eq!(tx.total_amount, d("3625"));
    let first = total_for(&tx).unwrap();
    let second = total_for(&tx).unwrap();
    assert_eq!(first, second);
    assert_eq!(first, tx.total_amount);
}

#[test]
fn item_order_does_not_change_total() {
    let a = vec![
        area(AreaEquipment::Mini, "1.2", "2"),
        LineItem::Dipper { nadai: 3 },
    ];
    let b: Vec<LineItem> = a.iter().rev().cloned().collect();
    assert_eq!(
        billing::line_items_total(&a).unwrap(),
        billing::line_items_total(&b).unwrap()
    );
}

#[test]
fn status_boundaries() {
    let total = d("1500");
    assert_eq!(status_from(total, total), PaymentStatus::Paid);
    assert_eq!(status_from(total, total - Decimal::ONE), PaymentStatus::Pending);
    assert_eq!(status_from(total, total + Decimal::ONE), PaymentStatus::Paid);
    assert_eq!(pending_amount(total, d("2000")), Decimal::ZERO);
    assert_eq!(billing::balance_due(total, d("2000")), d("-500"));
    assert_eq!(pending_amount(total, d("1000")), d("500"));
}

#[test]
fn old_balance_status_does_not_drive_current_status() {
    let items = vec![LineItem::Dipper { nadai: 2 }];
    let tx = billing::transaction_from_items(
        BusinessLine::Rental,
        customer(),
        &items,
        d("1000"),
        Some(old_balance("400", OldBalanceStatus::Pending)),
    )
    .unwrap();
    // 1000 billed + 400 carried, 1000 received.
    assert_eq!(billing::status_for(&tx), PaymentStatus::Pending);

    let tx = billing::transaction_from_items(
        BusinessLine::Rental,
        customer(),
        &items,
        d("900"),
        Some(old_balance("400", OldBalanceStatus::Paid)),
    )
    .unwrap();
    assert_eq!(tx.total_amount, d("1000"));
    assert_eq!(billing::status_for(&tx), PaymentStatus::Pending);
}

#[test]
fn old_balance_only_pending() {
    let tx = billing::old_balance_only(
        BusinessLine::Rental,
        customer(),
        old_balance("1500", OldBalanceStatus::Pending),
    );
    assert!(tx.details.is_empty());
    assert!(tx.is_old_balance_only());
    assert_eq!(tx.total_amount, d("1500"));
    assert_eq!(tx.received_amount, Decimal::ZERO);
    assert_eq!(billing::status_for(&tx), PaymentStatus::Pending);
    assert_eq!(total_for(&tx).unwrap(), d("1500"));
}

#[test]
fn old_balance_only_paid_counts_as_received() {
    let tx = billing::old_balance_only(
        BusinessLine::Service,
        Party::Company {
            company_name: "Sri Builders".into(),
            driver_name: "Ravi".into(),
        },
        old_balance("800", OldBalanceStatus::Paid),
    );
    assert_eq!(tx.total_amount, d("800"));
    assert_eq!(tx.received_amount, d("800"));
    assert_eq!(billing::status_for(&tx), PaymentStatus::Paid);
    // Verbatim, even though a paid balance is excluded on normal records.
    assert_eq!(total_for(&tx).unwrap(), d("800"));
}

#[test]
fn unparseable_old_balance_contributes_zero() {
    let ob = old_balance("two hundred", OldBalanceStatus::Pending);
    assert_eq!(billing::old_balance_contribution(Some(&ob)), Decimal::ZERO);
}

#[test]
fn unknown_stored_tag_fails_total() {
    let mut tx: Transaction = billing::transaction_from_items(
        BusinessLine::Rental,
        customer(),
        &[LineItem::Dipper { nadai: 1 }],
        Decimal::ZERO,
        None,
    )
    .unwrap();
    tx.details[0].equipment_type = "Plough".into();
    assert!(matches!(
        total_for(&tx),
        Err(BillingError::UnknownEquipment { .. })
    ));
}

#[test]
fn detail_round_trip_keeps_quantities() {
    let items = vec![
        area(AreaEquipment::CageWheel, "2.75", "1.5"),
        LineItem::Dipper { nadai: 3 },
    ];
    let tx = billing::transaction_from_items(
        BusinessLine::Rental,
        customer(),
        &items,
        d("10.25"),
        None,
    )
    .unwrap();
    let json = serde_json::to_string(&tx).unwrap();
    let back: Transaction = serde_json::from_str(&json).unwrap();
    assert_eq!(back, tx);
    assert_eq!(billing::line_items(&back).unwrap(), items);
    assert_eq!(back.received_amount, d("10.25"));
}

#[test]
fn out_of_range_products_and_sums_are_errors() {
    let item = area(AreaEquipment::Rotavator, "79228162514264337593543950335", "2");
    assert_eq!(
        amount_for(&item),
        Err(BillingError::Overflow("line item amount"))
    );

    let items = vec![area(AreaEquipment::Mini, "1", "1")];
    let huge = old_balance("79228162514264337593543950335", OldBalanceStatus::Pending);
    assert_eq!(
        billing::total_of(&items, Some(&huge)),
        Err(BillingError::Overflow("record total"))
    );
    assert!(billing::transaction_from_items(
        BusinessLine::Rental,
        customer(),
        &items,
        Decimal::ZERO,
        Some(huge),
    )
    .is_err());
}

#[test]
fn balance_due_saturates() {
    assert_eq!(billing::balance_due(Decimal::MAX, d("-1")), Decimal::MAX);
    assert_eq!(pending_amount(Decimal::MAX, d("-1")), Decimal::MAX);
}
