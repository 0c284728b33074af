// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger::Ledger;
use crate::utils::ts_to_sql;
use anyhow::{bail, Context, Result};

pub fn handle(ledger: &Ledger, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("loans", sub)) => export_loans(ledger, sub),
        _ => Ok(()),
    }
}

fn export_loans(ledger: &Ledger, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().trim().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap();
    if fmt != "csv" && fmt != "json" {
        bail!("Unknown format: {} (use csv|json)", fmt);
    }

    let loans = ledger.loans()?;
    match fmt.as_str() {
        "csv" => {
            let mut wtr =
                csv::Writer::from_path(out).with_context(|| format!("Create {}", out))?;
            wtr.write_record([
                "loan_id",
                "lender",
                "borrower",
                "amount",
                "currency",
                "date_created",
                "original_thread",
                "status",
                "amount_repaid",
                "last_updated",
            ])?;
            for l in &loans {
                wtr.write_record([
                    l.loan_id.clone(),
                    l.lender.clone(),
                    l.borrower.clone(),
                    l.amount.to_string(),
                    l.currency.clone(),
                    ts_to_sql(&l.date_created),
                    l.original_thread.clone(),
                    l.status.to_string(),
                    l.amount_repaid.to_string(),
                    ts_to_sql(&l.last_updated),
                ])?;
            }
            wtr.flush()?;
        }
        _ => {
            std::fs::write(out, serde_json::to_string_pretty(&loans)?)
                .with_context(|| format!("Write {}", out))?;
        }
    }
    log::info!("exported {} loans to {}", loans.len(), out);
    println!("Exported {} loans to {}", loans.len(), out);
    Ok(())
}
