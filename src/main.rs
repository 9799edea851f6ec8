// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use rentbook::models::BusinessLine;
use rentbook::session::Session;
use rentbook::{cli, commands, db};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("RENTBOOK_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let db_override = matches.get_one::<String>("db").map(PathBuf::from);
    let conn = db::open_or_init(db_override.as_deref())?;
    let session = Session::load(&conn)?;

    match matches.subcommand() {
        Some(("init", _)) => match &db_override {
            Some(p) => println!("Database initialized at {}", p.display()),
            None => println!("Database initialized at {}", db::db_path()?.display()),
        },
        Some(("login", sub)) => {
            commands::auth::login(&conn, sub)?;
        }
        Some(("logout", _)) => {
            commands::auth::logout(&conn)?;
        }
        Some(("whoami", _)) => commands::auth::whoami(&session),
        Some(("rental", sub)) => {
            commands::records::handle(&conn, &session, BusinessLine::Rental, sub)?
        }
        Some(("service", sub)) => {
            commands::records::handle(&conn, &session, BusinessLine::Service, sub)?
        }
        Some(("doctor", _)) => commands::doctor::handle(&conn)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
