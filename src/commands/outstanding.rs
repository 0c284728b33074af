// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger::Ledger;
use crate::utils::{loan_table, maybe_print_json};
use anyhow::Result;

pub fn handle(ledger: &Ledger, sub: &clap::ArgMatches) -> Result<()> {
    let data = ledger.outstanding()?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        if data.is_empty() {
            println!("No outstanding loans");
        } else {
            println!("{}", loan_table(&data));
        }
    }
    Ok(())
}
