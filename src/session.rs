// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Who is operating the ledger. The session is loaded once in `main` and
//! handed to every command that needs it.

use anyhow::{Result, bail};
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::Connection;
use serde::Serialize;

use crate::db;

const CURRENT_USER: &str = "current_user";

static EMAIL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    user: Option<User>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn signed_in(email: impl Into<String>) -> Self {
        Self {
            user: Some(User {
                email: email.into(),
            }),
        }
    }

    pub fn load(conn: &Connection) -> Result<Self> {
        Ok(Self {
            user: db::get_setting(conn, CURRENT_USER)?.map(|email| User { email }),
        })
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn require_user(&self) -> Result<&User> {
        match &self.user {
            Some(u) => Ok(u),
            None => bail!("Not logged in; run `rentbook login --email <EMAIL>` first"),
        }
    }

    pub fn login(conn: &Connection, email: &str) -> Result<Self> {
        let email = email.trim().to_lowercase();
        if !EMAIL.is_match(&email) {
            bail!("Invalid email '{}'", email);
        }
        db::set_setting(conn, CURRENT_USER, &email)?;
        tracing::info!(%email, "signed in");
        Ok(Self::signed_in(email))
    }

    pub fn logout(conn: &Connection) -> Result<Self> {
        db::clear_setting(conn, CURRENT_USER)?;
        tracing::info!("signed out");
        Ok(Self::anonymous())
    }
}
