// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod billing;
pub mod cli;
pub mod db;
pub mod error;
pub mod filter;
pub mod models;
pub mod report;
pub mod session;
pub mod utils;
pub mod validate;
pub mod commands;
