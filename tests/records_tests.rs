// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDateTime;
use rentbook::commands::{doctor, records};
use rentbook::db::{self, insert_record, RecordStore};
use rentbook::error::StoreError;
use rentbook::models::{BusinessLine, OldBalanceStatus, Party};
use rentbook::session::Session;
use rentbook::{billing, cli};
use rusqlite::Connection;
use rust_decimal::Decimal;
use std::str::FromStr;

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn
}

fn ts(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, db::TIMESTAMP_FMT).unwrap()
}

fn run(conn: &Connection, session: &Session, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["rentbook"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    match matches.subcommand() {
        Some(("rental", sub)) => records::handle(conn, session, BusinessLine::Rental, sub),
        Some(("service", sub)) => records::handle(conn, session, BusinessLine::Service, sub),
        _ => panic!("unexpected subcommand"),
    }
}

#[test]
fn store_round_trip_preserves_amounts_and_quantities() {
    let conn = setup();
    let items = vec![
        billing::LineItem::Area {
            equipment: billing::AreaEquipment::Mini,
            acres: Decimal::from_str("1.25").unwrap(),
            rounds: Decimal::from_str("2").unwrap(),
        },
        billing::LineItem::Dipper { nadai: 3 },
    ];
    let tx = billing::transaction_from_items(
        BusinessLine::Rental,
        Party::Customer {
            name: "Murugan".into(),
        },
        &items,
        Decimal::from_str("1234.56").unwrap(),
        None,
    )
    .unwrap();
    let created = conn.create(&tx).unwrap();
    let loaded = conn.get(created.id).unwrap();
    assert_eq!(loaded.transaction, tx);
    assert_eq!(loaded.transaction.total_amount, Decimal::from(3000));
    assert_eq!(billing::line_items(&loaded.transaction).unwrap(), items);
}

#[test]
fn list_is_newest_first_and_per_line() {
    let conn = setup();
    let rental = |name: &str| {
        billing::transaction_from_items(
            BusinessLine::Rental,
            Party::Customer { name: name.into() },
            &[billing::LineItem::Dipper { nadai: 1 }],
            Decimal::ZERO,
            None,
        )
        .unwrap()
    };
    insert_record(&conn, &rental("old"), ts("2025-01-01 08:00:00")).unwrap();
    insert_record(&conn, &rental("new"), ts("2025-02-01 08:00:00")).unwrap();
    let mut jcb = rental("jcb");
    jcb.line = BusinessLine::Service;
    insert_record(&conn, &jcb, ts("2025-03-01 08:00:00")).unwrap();

    let list = conn.list_all(BusinessLine::Rental).unwrap();
    let names: Vec<&str> = list.iter().map(|r| r.transaction.party.name()).collect();
    assert_eq!(names, vec!["new", "old"]);
    assert_eq!(conn.list_all(BusinessLine::Service).unwrap().len(), 1);
}

#[test]
fn update_and_delete_missing_ids_fail() {
    let conn = setup();
    let tx = billing::old_balance_only(
        BusinessLine::Rental,
        Party::Customer { name: "x".into() },
        rentbook::models::OldBalance {
            amount: "10".into(),
            status: OldBalanceStatus::Pending,
            reason: None,
        },
    );
    assert!(matches!(conn.update(42, &tx), Err(StoreError::NotFound(42))));
    assert!(matches!(conn.delete(42), Err(StoreError::NotFound(42))));
}

#[test]
fn add_requires_a_signed_in_user() {
    let conn = setup();
    let res = run(
        &conn,
        &Session::anonymous(),
        &["rental", "add", "--name", "Murugan", "--item", "Mini:1:1", "--received", "0"],
    );
    assert!(res.is_err());
    assert!(conn.list_all(BusinessLine::Rental).unwrap().is_empty());
}

#[test]
fn add_edit_delete_through_cli() {
    let conn = setup();
    let session = Session::signed_in("staff@kbs.in");
    run(
        &conn,
        &session,
        &[
            "rental",
            "add",
            "--name",
            " Murugan ",
            "--item",
            "Cage Wheel:2.5:3",
            "--item",
            "Dipper:2",
            "--received",
            "1000",
            "--old-balance",
            "200",
        ],
    )
    .unwrap();
    let list = conn.list_all(BusinessLine::Rental).unwrap();
    assert_eq!(list.len(), 1);
    let rec = &list[0];
    assert_eq!(rec.transaction.total_amount, Decimal::from(3825));
    let ob = rec.transaction.old_balance.as_ref().unwrap();
    assert_eq!(ob.status, OldBalanceStatus::Pending);
    let id = rec.id.to_string();

    run(
        &conn,
        &session,
        &[
            "rental",
            "edit",
            "--id",
            &id,
            "--name",
            "Murugan",
            "--item",
            "Rotavator:1:1",
            "--received",
            "700",
            "--old-balance",
            "200",
            "--old-balance-status",
            "paid",
        ],
    )
    .unwrap();
    let rec = conn.get(rec.id).unwrap();
    assert_eq!(rec.transaction.details.len(), 1);
    assert_eq!(rec.transaction.total_amount, Decimal::from(700));
    assert_eq!(
        billing::status_for(&rec.transaction),
        rentbook::models::PaymentStatus::Paid
    );

    assert!(run(&conn, &session, &["rental", "delete", "--id", &id]).is_err());
    run(&conn, &session, &["rental", "delete", "--id", &id, "--yes"]).unwrap();
    assert!(conn.list_all(BusinessLine::Rental).unwrap().is_empty());
}

#[test]
fn invalid_input_never_reaches_storage() {
    let conn = setup();
    let session = Session::signed_in("staff@kbs.in");
    let res = run(
        &conn,
        &session,
        &["rental", "add", "--name", "Murugan", "--item", "Harrow:1:1", "--received", "0"],
    );
    assert!(res.is_err());
    let res = run(
        &conn,
        &session,
        &[
            "service", "add", "--company", "Sri Builders", "--driver", "Ravi", "--mobile",
            "12345", "--hours", "1",
        ],
    );
    assert!(res.is_err());
    assert!(conn.list_all(BusinessLine::Rental).unwrap().is_empty());
    assert!(conn.list_all(BusinessLine::Service).unwrap().is_empty());
}

#[test]
fn service_add_and_wrong_line_access() {
    let conn = setup();
    let session = Session::signed_in("staff@kbs.in");
    run(
        &conn,
        &session,
        &[
            "service",
            "add",
            "--company",
            "Sri Builders",
            "--driver",
            "Ravi",
            "--work-date",
            "2025-05-02",
            "--hours",
            "1.30",
            "--hours",
            "0.45",
            "--received",
            "1000",
            "--advance",
            "500",
        ],
    )
    .unwrap();
    let list = conn.list_all(BusinessLine::Service).unwrap();
    let tx = &list[0].transaction;
    assert_eq!(tx.total_amount, Decimal::from(1750));
    assert_eq!(tx.advance_amount, Decimal::from(500));
    assert_eq!(tx.party.driver(), Some("Ravi"));

    let id = list[0].id.to_string();
    assert!(run(&conn, &session, &["rental", "delete", "--id", &id, "--yes"]).is_err());
    assert_eq!(conn.list_all(BusinessLine::Service).unwrap().len(), 1);
}

#[test]
fn query_records_applies_cli_filters() {
    let conn = setup();
    let session = Session::signed_in("staff@kbs.in");
    for (name, item, received) in [
        ("Murugan", "Mini:1:1", "600"),
        ("Selvi", "Mini:1:1", "0"),
        ("Murugan", "Dipper:1", "0"),
    ] {
        run(
            &conn,
            &session,
            &["rental", "add", "--name", name, "--item", item, "--received", received],
        )
        .unwrap();
    }
    let matches = cli::build_cli().get_matches_from([
        "rentbook", "rental", "list", "--equipment", "Mini", "--status", "pending",
    ]);
    let Some(("rental", rental_m)) = matches.subcommand() else {
        panic!("no rental subcommand");
    };
    let Some(("list", list_m)) = rental_m.subcommand() else {
        panic!("no list subcommand");
    };
    let rows = records::query_records(&conn, BusinessLine::Rental, list_m).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].transaction.party.name(), "Selvi");
}

#[test]
fn doctor_flags_unknown_tags_and_mismatched_totals() {
    let conn = setup();
    let mut tx = billing::transaction_from_items(
        BusinessLine::Rental,
        Party::Customer { name: "a".into() },
        &[billing::LineItem::Dipper { nadai: 1 }],
        Decimal::ZERO,
        None,
    )
    .unwrap();
    tx.total_amount = Decimal::from(900);
    conn.create(&tx).unwrap();
    tx.details[0].equipment_type = "Plough".into();
    conn.create(&tx).unwrap();

    let records = conn.list_all(BusinessLine::Rental).unwrap();
    let issues: Vec<String> = doctor::check_records(&records)
        .into_iter()
        .map(|(issue, _)| issue)
        .collect();
    assert_eq!(issues.len(), 2);
    assert!(issues.contains(&"unknown_equipment".to_string()));
    assert!(issues.contains(&"total_mismatch".to_string()));
}

#[test]
fn session_login_is_persisted() {
    let conn = setup();
    assert_eq!(Session::load(&conn).unwrap().user(), None);
    assert!(Session::login(&conn, "not-an-email").is_err());
    Session::login(&conn, " Staff@KBS.in ").unwrap();
    let s = Session::load(&conn).unwrap();
    assert_eq!(s.require_user().unwrap().email, "staff@kbs.in");
    Session::logout(&conn).unwrap();
    assert!(Session::load(&conn).unwrap().require_user().is_err());
}

#[test]
fn edit_keeps_old_balance_only_records_separate_from_priced_ones() {
    let conn = setup();
    let session = Session::signed_in("staff@kbs.in");
    run(
        &conn,
        &session,
        &["rental", "add", "--name", "Murugan", "--item", "Mini:1:1", "--received", "0"],
    )
    .unwrap();
    run(
        &conn,
        &session,
        &[
            "rental",
            "add",
            "--name",
            "Selvi",
            "--old-balance",
            "1500",
            "--old-balance-only",
        ],
    )
    .unwrap();
    let list = conn.list_all(BusinessLine::Rental).unwrap();
    let selvi = list[0].id.to_string();
    let murugan = list[1].id.to_string();

    let res = run(
        &conn,
        &session,
        &[
            "rental",
            "edit",
            "--id",
            &murugan,
            "--name",
            "Murugan",
            "--old-balance",
            "300",
            "--old-balance-only",
        ],
    );
    assert!(res.is_err());
    let kept = conn.get(list[1].id).unwrap();
    assert_eq!(kept.transaction.details.len(), 1);
    assert_eq!(kept.transaction.total_amount, Decimal::from(600));

    let res = run(
        &conn,
        &session,
        &[
            "rental", "edit", "--id", &selvi, "--name", "Selvi", "--item", "Mini:1:1",
            "--received", "0",
        ],
    );
    assert!(res.is_err());
    assert!(conn.get(list[0].id).unwrap().transaction.is_old_balance_only());

    run(
        &conn,
        &session,
        &[
            "rental",
            "edit",
            "--id",
            &selvi,
            "--name",
            "Selvi",
            "--old-balance",
            "1200",
            "--old-balance-only",
        ],
    )
    .unwrap();
    assert_eq!(
        conn.get(list[0].id).unwrap().transaction.total_amount,
        Decimal::from(1200)
    );
}

#[test]
fn doctor_reports_totals_out_of_range() {
    let conn = setup();
    let mut tx = billing::transaction_from_items(
        BusinessLine::Rental,
        Party::Customer { name: "a".into() },
        &[billing::LineItem::Dipper { nadai: 1 }],
        Decimal::ZERO,
        None,
    )
    .unwrap();
    tx.details[0].equipment_type = "Rotavator".into();
    tx.details[0].nadai = None;
    tx.details[0].acres = Some(Decimal::MAX);
    tx.details[0].rounds = Some(Decimal::from(2));
    conn.create(&tx).unwrap();

    let records = conn.list_all(BusinessLine::Rental).unwrap();
    let issues = doctor::check_records(&records);
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].0, "total_out_of_range");
}
