// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{arg, crate_version, value_parser, Arg, ArgAction, Command};

fn filter_args(cmd: Command) -> Command {
    cmd.arg(arg!(--equipment <TAG> "Equipment tag, or Others for unlisted tags").required(false))
        .arg(arg!(--from <DATE> "Created on or after YYYY-MM-DD").required(false))
        .arg(arg!(--to <DATE> "Created on or before YYYY-MM-DD").required(false))
        .arg(arg!(--party <TEXT> "Name contains (case-insensitive)").required(false))
        .arg(arg!(--status <STATUS> "paid|pending").required(false))
        .arg(
            Arg::new("old_balance_status")
                .long("old-balance-status")
                .value_name("STATUS")
                .help("Old balance paid|pending")
                .required(false),
        )
}

fn output_args(cmd: Command) -> Command {
    cmd.arg(arg!(--json "Print JSON"))
        .arg(arg!(--jsonl "Print JSON lines"))
}

fn old_balance_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("old_balance")
            .long("old-balance")
            .value_name("AMOUNT")
            .help("Carried-over balance")
            .required(false),
    )
    .arg(
        Arg::new("old_balance_status")
            .long("old-balance-status")
            .value_name("STATUS")
            .help("paid|pending (default pending)")
            .required(false),
    )
    .arg(
        Arg::new("old_balance_reason")
            .long("old-balance-reason")
            .value_name("TEXT")
            .required(false),
    )
    .arg(
        Arg::new("old_balance_only")
            .long("old-balance-only")
            .help("Log only a historical balance, no equipment usage")
            .action(ArgAction::SetTrue),
    )
}

fn rental_entry_args(cmd: Command) -> Command {
    old_balance_args(
        cmd.arg(arg!(--name <NAME> "Customer name").required(true))
            .arg(
                arg!(--item <ITEM> "EQUIPMENT:ACRES:ROUNDS, or Dipper:NADAI")
                    .required(false)
                    .action(ArgAction::Append),
            )
            .arg(arg!(--received <AMOUNT> "Amount received").required(false)),
    )
}

fn service_entry_args(cmd: Command) -> Command {
    old_balance_args(
        cmd.arg(arg!(--company <NAME> "Company name").required(true))
            .arg(arg!(--driver <NAME> "Driver name").required(true))
            .arg(arg!(--mobile <NUMBER> "10 digit mobile number").required(false))
            .arg(
                Arg::new("work_date")
                    .long("work-date")
                    .value_name("DATE")
                    .help("YYYY-MM-DD, defaults to today")
                    .required(false),
            )
            .arg(
                arg!(--hours <HOURS> "Hours worked, e.g. 1.30")
                    .required(false)
                    .action(ArgAction::Append),
            )
            .arg(arg!(--received <AMOUNT> "Amount received").required(false))
            .arg(arg!(--advance <AMOUNT> "Advance paid").required(false)),
    )
}

fn id_arg() -> Arg {
    arg!(--id <ID> "Record id")
        .required(true)
        .value_parser(value_parser!(i64))
}

fn line_command(name: &'static str, about: &'static str, entry: fn(Command) -> Command) -> Command {
    Command::new(name)
        .about(about)
        .subcommand(entry(Command::new("add").about("Record a new visit")))
        .subcommand(entry(
            Command::new("edit")
                .about("Replace every field of a record")
                .arg(id_arg()),
        ))
        .subcommand(
            Command::new("delete")
                .about("Delete a record")
                .arg(id_arg())
                .arg(arg!(--yes "Confirm deletion")),
        )
        .subcommand(output_args(
            Command::new("show").about("Show one record").arg(id_arg()),
        ))
        .subcommand(output_args(filter_args(
            Command::new("list").about("List records, newest first").arg(
                arg!(--limit <N> "Show at most N records")
                    .required(false)
                    .value_parser(value_parser!(usize)),
            ),
        )))
        .subcommand(filter_args(
            Command::new("summary")
                .about("Totals, received and pending")
                .arg(arg!(--json "Print JSON")),
        ))
        .subcommand(filter_args(
            Command::new("export")
                .about("Export records for spreadsheets")
                .arg(arg!(--format <FMT> "csv|json").required(true))
                .arg(arg!(--out <PATH> "Output file").required(true)),
        ))
}

pub fn build_cli() -> Command {
    Command::new("rentbook")
        .about("Rental and JCB service billing ledger")
        .version(crate_version!())
        .arg(
            arg!(--db <PATH> "SQLite database file")
                .required(false)
                .global(true)
                .env("RENTBOOK_DB"),
        )
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(
            Command::new("login")
                .about("Sign in as a staff user")
                .arg(arg!(--email <EMAIL>).required(true)),
        )
        .subcommand(Command::new("logout").about("Sign out"))
        .subcommand(Command::new("whoami").about("Show the signed-in user"))
        .subcommand(line_command(
            "rental",
            "Tractor implement rentals",
            rental_entry_args,
        ))
        .subcommand(line_command(
            "service",
            "JCB hourly service",
            service_entry_args,
        ))
        .subcommand(Command::new("doctor").about("Check stored records for inconsistencies"))
}
