// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::{LedgerError, LedgerResult};
use crate::ledger::Ledger;
use crate::models::{Loan, UserStats};

/// One currency's share of a user's aggregate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CurrencyTotals {
    pub borrowed: Decimal,
    pub lent: Decimal,
    pub unpaid: Decimal,
}

/// What a lender or borrower looks like to someone deciding whether to deal
/// with them: their aggregate plus what is still open on each side.
#[derive(Debug, Clone, Serialize)]
pub struct UserReport {
    pub stats: UserStats,
    /// The stats amounts split by currency; the stored aggregate mixes them.
    pub by_currency: BTreeMap<String, CurrencyTotals>,
    pub unpaid_as_borrower: usize,
    pub in_progress_as_lender: usize,
    /// Still owed to the user, per currency.
    pub owed_to_user: BTreeMap<String, Decimal>,
    /// Most recent open loans the user made, newest first.
    pub recent_lending: Vec<Loan>,
    pub omitted_lending: usize,
}

pub fn user_report(ledger: &Ledger, username: &str, limit: usize) -> LedgerResult<UserReport> {
    let stats = ledger.user_stats(username)?;
    let open = ledger.outstanding_for(&stats.username)?;

    let mut by_currency: BTreeMap<String, CurrencyTotals> = BTreeMap::new();
    for loan in ledger.history(&stats.username)? {
        let loan = loan?;
        let t = by_currency.entry(loan.currency.clone()).or_default();
        if loan.lender == stats.username {
            t.lent = add(t.lent, loan.amount)?;
        } else {
            t.borrowed = add(t.borrowed, loan.amount)?;
            if loan.status.is_outstanding() {
                t.unpaid = add(t.unpaid, loan.remaining())?;
            }
        }
    }

    let (lending, borrowing): (Vec<Loan>, Vec<Loan>) =
        open.into_iter().partition(|l| l.lender == stats.username);

    let mut owed_to_user = BTreeMap::new();
    for l in &lending {
        let owed = owed_to_user.entry(l.currency.clone()).or_insert(Decimal::ZERO);
        *owed = add(*owed, l.remaining())?;
    }
    let in_progress_as_lender = lending.len();
    let recent_lending: Vec<Loan> = lending.into_iter().take(limit).collect();

    Ok(UserReport {
        unpaid_as_borrower: borrowing.len(),
        in_progress_as_lender,
        omitted_lending: in_progress_as_lender - recent_lending.len(),
        owed_to_user,
        recent_lending,
        by_currency,
        stats,
    })
}

fn add(total: Decimal, amount: Decimal) -> LedgerResult<Decimal> {
    total
        .checked_add(amount)
        .ok_or_else(|| LedgerError::Validation(format!("total past {} overflows", total)))
}
