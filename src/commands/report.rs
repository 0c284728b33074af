// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::LedgerError;
use crate::ledger::Ledger;
use crate::report::{user_report, CurrencyTotals};
use crate::utils::{fmt_money, loan_table, maybe_print_json};
use anyhow::Result;
use rust_decimal::Decimal;

pub fn handle(ledger: &Ledger, sub: &clap::ArgMatches) -> Result<()> {
    let username = sub.get_one::<String>("username").unwrap();
    let limit = *sub.get_one::<usize>("limit").unwrap_or(&5);

    let report = match user_report(ledger, username, limit) {
        Ok(r) => r,
        Err(LedgerError::UserNotFound(u)) => {
            println!("{} has no loan history.", u);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &report)? {
        return Ok(());
    }

    let s = &report.stats;
    let per_ccy = |pick: fn(&CurrencyTotals) -> Decimal| -> String {
        let parts: Vec<String> = report
            .by_currency
            .iter()
            .filter(|(_, t)| !pick(t).is_zero())
            .map(|(ccy, t)| fmt_money(&pick(t), ccy))
            .collect();
        if parts.is_empty() {
            "nothing".to_string()
        } else {
            parts.join(", ")
        }
    };
    println!(
        "{} has borrowed {} times for {} and lent {} times for {}",
        s.username,
        s.loans_as_borrower,
        per_ccy(|t| t.borrowed),
        s.loans_as_lender,
        per_ccy(|t| t.lent)
    );
    if report.unpaid_as_borrower == 0 {
        println!("{} has no loans currently unpaid as borrower", s.username);
    } else {
        println!(
            "{} has {} unpaid loans as borrower ({} outstanding)",
            s.username,
            report.unpaid_as_borrower,
            per_ccy(|t| t.unpaid)
        );
    }
    if report.in_progress_as_lender > 0 {
        let owed: Vec<String> = report
            .owed_to_user
            .iter()
            .map(|(ccy, amt)| fmt_money(amt, ccy))
            .collect();
        print!(
            "In-progress loans with {} as lender ({} loans, {} owed)",
            s.username,
            report.in_progress_as_lender,
            owed.join(", ")
        );
        if report.omitted_lending > 0 {
            print!(" ({} omitted from the table)", report.omitted_lending);
        }
        println!(":");
        println!("{}", loan_table(&report.recent_lending));
    }
    Ok(())
}
