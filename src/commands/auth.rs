// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::session::Session;

pub fn login(conn: &Connection, sub: &clap::ArgMatches) -> Result<Session> {
    let email = sub.get_one::<String>("email").context("--email is required")?;
    let session = Session::login(conn, email)?;
    if let Some(u) = session.user() {
        println!("Signed in as {}", u.email);
    }
    Ok(session)
}

pub fn logout(conn: &Connection) -> Result<Session> {
    let session = Session::logout(conn)?;
    println!("Signed out");
    Ok(session)
}

pub fn whoami(session: &Session) {
    match session.user() {
        Some(u) => println!("{}", u.email),
        None => println!("Not signed in"),
    }
}
