// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger::Ledger;
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::Result;

pub fn handle(ledger: &Ledger, sub: &clap::ArgMatches) -> Result<()> {
    let username = sub.get_one::<String>("username").unwrap();
    let s = ledger.user_stats(username)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &s)? {
        let rows = vec![
            vec!["Loans as borrower".into(), s.loans_as_borrower.to_string()],
            vec!["Amount borrowed (all currencies)".into(), format!("{:.2}", s.amount_borrowed)],
            vec!["Amount repaid (all currencies)".into(), format!("{:.2}", s.amount_repaid)],
            vec!["Unpaid loans".into(), s.unpaid_loans.to_string()],
            vec!["Unpaid amount (all currencies)".into(), format!("{:.2}", s.unpaid_amount)],
            vec!["Loans as lender".into(), s.loans_as_lender.to_string()],
            vec!["Amount lent (all currencies)".into(), format!("{:.2}", s.amount_lent)],
            vec!["Last updated".into(), s.last_updated.to_rfc3339()],
        ];
        println!("{}", pretty_table(&[s.username.as_str(), ""], rows));
    }
    Ok(())
}
