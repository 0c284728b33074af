// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger::Ledger;
use crate::models::{Loan, LoanStatus};
use crate::utils::{fmt_money, loan_table, maybe_print_json, parse_decimal};
use anyhow::{anyhow, Context, Result};

pub fn handle(ledger: &mut Ledger, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("create", sub)) => create(ledger, sub).map(drop),
        Some(("repay", sub)) => repay(ledger, sub).map(drop),
        Some(("confirm", sub)) => confirm(ledger, sub).map(drop),
        Some(("refund", sub)) => refund(ledger, sub).map(drop),
        Some(("show", sub)) => show(ledger, sub),
        _ => Ok(()),
    }
}

fn arg<'a>(sub: &'a clap::ArgMatches, name: &str) -> Result<&'a str> {
    sub.get_one::<String>(name)
        .map(|s| s.trim())
        .ok_or_else(|| anyhow!("--{} is required", name))
}

fn create(ledger: &mut Ledger, sub: &clap::ArgMatches) -> Result<Loan> {
    let lender = arg(sub, "lender")?;
    let borrower = arg(sub, "borrower")?;
    let amount = parse_decimal(arg(sub, "amount")?)?;
    let currency = arg(sub, "currency")?;
    let thread = arg(sub, "thread")?;
    let loan_id = match sub.get_one::<String>("id") {
        Some(id) => id.trim().to_string(),
        None => ledger.next_loan_id()?,
    };

    let loan = ledger
        .create_loan(&loan_id, lender, borrower, amount, currency, thread)
        .with_context(|| format!("Create loan {}", loan_id))?;
    println!(
        "Recorded loan {}: {} lent {} to {}",
        loan.loan_id,
        loan.lender,
        fmt_money(&loan.amount, &loan.currency),
        loan.borrower
    );
    Ok(loan)
}

fn repay(ledger: &mut Ledger, sub: &clap::ArgMatches) -> Result<Loan> {
    let loan_id = arg(sub, "id")?;
    let paid = parse_decimal(arg(sub, "amount")?)?;
    let loan = match sub.get_one::<String>("currency") {
        Some(ccy) => ledger.record_repayment_in(loan_id, paid, ccy),
        None => ledger.record_repayment(loan_id, paid),
    }
    .with_context(|| format!("Repay loan {}", loan_id))?;
    println!(
        "{} repaid {} to {}; remaining {} ({})",
        loan.borrower,
        fmt_money(&paid, &loan.currency),
        loan.lender,
        fmt_money(&loan.remaining(), &loan.currency),
        loan.status
    );
    Ok(loan)
}

fn confirm(ledger: &mut Ledger, sub: &clap::ArgMatches) -> Result<Loan> {
    let loan_id = arg(sub, "id")?;
    let loan = ledger
        .set_status(loan_id, LoanStatus::Confirmed)
        .with_context(|| format!("Confirm loan {}", loan_id))?;
    println!("Loan {} confirmed by {}", loan.loan_id, loan.borrower);
    Ok(loan)
}

fn refund(ledger: &mut Ledger, sub: &clap::ArgMatches) -> Result<Loan> {
    let loan_id = match sub.get_one::<String>("id") {
        Some(id) => id.trim().to_string(),
        None => {
            let lender = arg(sub, "lender")?;
            let borrower = arg(sub, "borrower")?;
            let amount = parse_decimal(arg(sub, "amount")?)?;
            let currency = arg(sub, "currency")?;
            ledger
                .find_latest_loan(lender, borrower, amount, currency)?
                .map(|l| l.loan_id)
                .ok_or_else(|| {
                    anyhow!(
                        "No open loan from {} to {} for {} {}",
                        lender,
                        borrower,
                        amount,
                        currency
                    )
                })?
        }
    };
    let loan = ledger
        .set_status(&loan_id, LoanStatus::Refunded)
        .with_context(|| format!("Refund loan {}", loan_id))?;
    println!(
        "Loan {} from {} to {} for {} marked refunded",
        loan.loan_id,
        loan.lender,
        loan.borrower,
        fmt_money(&loan.amount, &loan.currency)
    );
    Ok(loan)
}

fn show(ledger: &Ledger, sub: &clap::ArgMatches) -> Result<()> {
    let loan = ledger.loan(arg(sub, "id")?)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &loan)? {
        println!("{}", loan_table(std::slice::from_ref(&loan)));
    }
    Ok(())
}
