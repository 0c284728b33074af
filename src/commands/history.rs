// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger::Ledger;
use crate::models::Loan;
use crate::utils::{loan_table, maybe_print_json};
use anyhow::{Context, Result};

pub fn handle(ledger: &Ledger, sub: &clap::ArgMatches) -> Result<()> {
    let data = query_rows(ledger, sub)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        println!("{}", loan_table(&data));
    }
    Ok(())
}

/// Only as many rows as `--limit` asks for are read from the store.
pub fn query_rows(ledger: &Ledger, sub: &clap::ArgMatches) -> Result<Vec<Loan>> {
    let username = sub.get_one::<String>("username").unwrap();
    let limit = sub.get_one::<usize>("limit").copied().unwrap_or(usize::MAX);
    let rows = ledger
        .history(username)?
        .take(limit)
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("History for {}", username))?;
    Ok(rows)
}
