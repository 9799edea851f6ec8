// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{anyhow, bail, Context, Result};
use chrono::Local;
use rusqlite::Connection;

use crate::billing::DIPPER_TAG;
use crate::commands::exporter;
use crate::db::RecordStore;
use crate::filter::{self, FilterCriteria};
use crate::models::{BusinessLine, OldBalanceStatus, Record, Transaction};
use crate::report::{RecordView, Summary};
use crate::session::Session;
use crate::utils::{fmt_inr, maybe_print_json, parse_date, pretty_table};
use crate::validate::{self, OldBalanceDraft, RentalDraft, RentalItemDraft, ServiceDraft};

pub fn handle(
    conn: &Connection,
    session: &Session,
    line: BusinessLine,
    m: &clap::ArgMatches,
) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, session, line, sub)?,
        Some(("edit", sub)) => edit(conn, session, line, sub)?,
        Some(("delete", sub)) => delete(conn, session, line, sub)?,
        Some(("show", sub)) => show(conn, line, sub)?,
        Some(("list", sub)) => list(conn, line, sub)?,
        Some(("summary", sub)) => summary(conn, line, sub)?,
        Some(("export", sub)) => {
            let records = query_records(conn, line, sub)?;
            exporter::export_records(&records, sub)?
        }
        _ => {}
    }
    Ok(())
}

fn text(sub: &clap::ArgMatches, id: &str) -> String {
    sub.get_one::<String>(id)
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

fn old_balance_draft(sub: &clap::ArgMatches) -> Result<Option<OldBalanceDraft>> {
    let amount = text(sub, "old_balance");
    if amount.is_empty() {
        return Ok(None);
    }
    let status = match sub.get_one::<String>("old_balance_status") {
        Some(s) => s.parse::<OldBalanceStatus>()?,
        None => OldBalanceStatus::Pending,
    };
    Ok(Some(OldBalanceDraft {
        amount,
        status,
        reason: text(sub, "old_balance_reason"),
    }))
}

/// `Cage Wheel:2.5:3` or `Dipper:4`.
pub fn parse_item(raw: &str) -> RentalItemDraft {
    let mut parts = raw.split(':').map(str::trim);
    let equipment = parts.next().unwrap_or_default().to_string();
    let first = parts.next().unwrap_or_default().to_string();
    let second = parts.next().unwrap_or_default().to_string();
    if equipment == DIPPER_TAG {
        RentalItemDraft {
            equipment,
            nadai: first,
            ..Default::default()
        }
    } else {
        RentalItemDraft {
            equipment,
            acres: first,
            rounds: second,
            ..Default::default()
        }
    }
}

/// Turn command-line input into a validated record.
pub fn transaction_from_args(line: BusinessLine, sub: &clap::ArgMatches) -> Result<Transaction> {
    let old_balance = old_balance_draft(sub)?;
    let old_balance_only = sub.get_flag("old_balance_only");
    let tx = match line {
        BusinessLine::Rental => {
            let draft = RentalDraft {
                name: text(sub, "name"),
                items: sub
                    .get_many::<String>("item")
                    .map(|v| v.map(|s| parse_item(s)).collect())
                    .unwrap_or_default(),
                received_amount: text(sub, "received"),
                old_balance,
                old_balance_only,
            };
            validate::rental_transaction(&draft)?
        }
        BusinessLine::Service => {
            let work_date = match sub.get_one::<String>("work_date") {
                Some(s) => Some(parse_date(s)?),
                None => None,
            };
            let draft = ServiceDraft {
                company_name: text(sub, "company"),
                driver_name: text(sub, "driver"),
                mobile_number: text(sub, "mobile"),
                work_date,
                hours: sub
                    .get_many::<String>("hours")
                    .map(|v| v.cloned().collect())
                    .unwrap_or_default(),
                amount_received: text(sub, "received"),
                advance_amount: text(sub, "advance"),
                old_balance,
                old_balance_only,
            };
            validate::service_transaction(&draft, Local::now().date_naive())?
        }
    };
    Ok(tx)
}

pub fn criteria_from_args(sub: &clap::ArgMatches) -> Result<FilterCriteria> {
    let date = |id: &str| -> Result<_> {
        sub.get_one::<String>(id).map(|s| parse_date(s)).transpose()
    };
    Ok(FilterCriteria {
        equipment: sub
            .get_one::<String>("equipment")
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.parse())
            .transpose()?,
        date_from: date("from")?,
        date_to: date("to")?,
        party: sub.get_one::<String>("party").cloned(),
        status: sub
            .get_one::<String>("status")
            .map(|s| s.parse())
            .transpose()?,
        old_balance_status: sub
            .get_one::<String>("old_balance_status")
            .map(|s| s.parse())
            .transpose()?,
    })
}

/// Stored records of one business line that pass the command's filters.
pub fn query_records(
    conn: &Connection,
    line: BusinessLine,
    sub: &clap::ArgMatches,
) -> Result<Vec<Record>> {
    let criteria = criteria_from_args(sub)?;
    let all = conn
        .list_all(line)
        .inspect_err(|e| tracing::error!(error = %e, "failed to load records"))
        .context("Could not load records")?;
    Ok(filter::apply(&all, &criteria).into_iter().cloned().collect())
}

fn add(conn: &Connection, session: &Session, line: BusinessLine, sub: &clap::ArgMatches) -> Result<()> {
    let user = session.require_user()?;
    let tx = transaction_from_args(line, sub)?;
    let rec = conn
        .create(&tx)
        .inspect_err(|e| tracing::error!(error = %e, user = %user.email, "failed to save record"))
        .context("Could not save the record")?;
    println!(
        "Recorded #{} for '{}': total {}, received {}",
        rec.id,
        tx.party.name(),
        fmt_inr(&tx.total_amount),
        fmt_inr(&tx.received_amount)
    );
    Ok(())
}

fn fetch(conn: &Connection, line: BusinessLine, id: i64) -> Result<Record> {
    let rec = conn.get(id).with_context(|| format!("Could not load record {}", id))?;
    if rec.transaction.line != line {
        bail!("Record {} is a {} record, not {}", id, rec.transaction.line, line);
    }
    Ok(rec)
}

fn edit(conn: &Connection, session: &Session, line: BusinessLine, sub: &clap::ArgMatches) -> Result<()> {
    let user = session.require_user()?;
    let id = *sub.get_one::<i64>("id").ok_or_else(|| anyhow!("--id is required"))?;
    let existing = fetch(conn, line, id)?;
    match (existing.transaction.is_old_balance_only(), sub.get_flag("old_balance_only")) {
        (true, false) => {
            bail!("Record {} only logs an old balance; edit it with --old-balance-only", id)
        }
        (false, true) => bail!(
            "Record {} has line items; --old-balance-only would drop them. Delete it and add a new record instead",
            id
        ),
        _ => {}
    }
    let tx = transaction_from_args(line, sub)?;
    let rec = conn
        .update(id, &tx)
        .inspect_err(|e| tracing::error!(error = %e, user = %user.email, "failed to update record"))
        .context("Could not update the record")?;
    println!("Updated #{}: total {}", rec.id, fmt_inr(&rec.transaction.total_amount));
    Ok(())
}

fn delete(conn: &Connection, session: &Session, line: BusinessLine, sub: &clap::ArgMatches) -> Result<()> {
    session.require_user()?;
    let id = *sub.get_one::<i64>("id").ok_or_else(|| anyhow!("--id is required"))?;
    let rec = fetch(conn, line, id)?;
    if !sub.get_flag("yes") {
        bail!(
            "Refusing to delete #{} ('{}') without --yes",
            id,
            rec.transaction.party.name()
        );
    }
    conn.delete(id)
        .inspect_err(|e| tracing::error!(error = %e, "failed to delete record"))
        .context("Could not delete the record")?;
    println!("Deleted #{}", id);
    Ok(())
}

fn show(conn: &Connection, line: BusinessLine, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").ok_or_else(|| anyhow!("--id is required"))?;
    let rec = fetch(conn, line, id)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &rec)? {
        return Ok(());
    }
    let view = RecordView::from(&rec);
    let mut rows = vec![
        vec!["Date".to_string(), view.date.clone()],
        vec!["Name".to_string(), view.party.clone()],
    ];
    if !view.driver.is_empty() {
        rows.push(vec!["Driver".into(), view.driver.clone()]);
    }
    if let Some(m) = &rec.transaction.mobile_number {
        rows.push(vec!["Mobile".into(), m.clone()]);
    }
    for d in &rec.transaction.details {
        rows.push(vec!["Item".into(), crate::report::describe_detail(d)]);
    }
    rows.push(vec!["Total".into(), fmt_inr(&view.total_amount)]);
    rows.push(vec!["Received".into(), fmt_inr(&view.received_amount)]);
    if line == BusinessLine::Service {
        rows.push(vec!["Advance".into(), fmt_inr(&view.advance_amount)]);
    }
    rows.push(vec!["Pending".into(), fmt_inr(&view.pending_amount)]);
    rows.push(vec!["Status".into(), view.status.clone()]);
    if !view.old_balance.is_empty() {
        rows.push(vec![
            "Old balance".into(),
            format!("{} ({})", view.old_balance, view.old_balance_status),
        ]);
        if !view.old_balance_reason.is_empty() {
            rows.push(vec!["Reason".into(), view.old_balance_reason.clone()]);
        }
    }
    println!("{}", pretty_table(&["Field", "Value"], rows));
    Ok(())
}

fn list(conn: &Connection, line: BusinessLine, sub: &clap::ArgMatches) -> Result<()> {
    let mut records = query_records(conn, line, sub)?;
    if let Some(limit) = sub.get_one::<usize>("limit") {
        records.truncate(*limit);
    }
    let views: Vec<RecordView> = records.iter().map(RecordView::from).collect();
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &views)? {
        return Ok(());
    }
    let rows: Vec<Vec<String>> = views
        .iter()
        .map(|v| {
            vec![
                v.id.to_string(),
                v.date.clone(),
                v.party.clone(),
                v.items.clone(),
                fmt_inr(&v.total_amount),
                fmt_inr(&v.received_amount),
                fmt_inr(&v.pending_amount),
                v.status.clone(),
                if v.old_balance.is_empty() {
                    String::new()
                } else {
                    format!("{} ({})", v.old_balance, v.old_balance_status)
                },
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["ID", "Date", "Name", "Items", "Total", "Received", "Pending", "Status", "Old balance"],
            rows,
        )
    );
    Ok(())
}

fn summary(conn: &Connection, line: BusinessLine, sub: &clap::ArgMatches) -> Result<()> {
    let records = query_records(conn, line, sub)?;
    let s = Summary::from_records(&records);
    if maybe_print_json(sub.get_flag("json"), false, &s)? {
        return Ok(());
    }
    println!(
        "{}",
        pretty_table(
            &["Records", "Total", "Received", "Pending"],
            vec![vec![
                s.records.to_string(),
                fmt_inr(&s.total_amount),
                fmt_inr(&s.received_amount),
                fmt_inr(&s.pending_amount),
            ]],
        )
    );
    Ok(())
}
