// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Per-user aggregates, derived from the loan set and nothing else.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{Loan, UserStats};

/// Rebuild `username`'s aggregate from scratch. Loans that do not mention the
/// user are skipped, so callers may pass any superset of the user's loans.
///
/// `last_updated` is the newest `last_updated` among the user's loans, which
/// keeps the result a function of its inputs alone.
///
/// Fails with [`LedgerError::Validation`] when a sum leaves the range of
/// `Decimal`.
pub fn recompute<'a, I>(username: &str, loans: I) -> LedgerResult<UserStats>
where
    I: IntoIterator<Item = &'a Loan>,
{
    let mut stats = UserStats {
        username: username.to_string(),
        loans_as_borrower: 0,
        loans_as_lender: 0,
        amount_borrowed: Decimal::ZERO,
        amount_lent: Decimal::ZERO,
        amount_repaid: Decimal::ZERO,
        unpaid_loans: 0,
        unpaid_amount: Decimal::ZERO,
        last_updated: DateTime::<Utc>::UNIX_EPOCH,
    };

    for loan in loans.into_iter().filter(|l| l.involves(username)) {
        if loan.lender == username {
            stats.loans_as_lender += 1;
            stats.amount_lent = sum(username, "amount_lent", stats.amount_lent, loan.amount)?;
        }
        if loan.borrower == username {
            stats.loans_as_borrower += 1;
            stats.amount_borrowed =
                sum(username, "amount_borrowed", stats.amount_borrowed, loan.amount)?;
            stats.amount_repaid =
                sum(username, "amount_repaid", stats.amount_repaid, loan.amount_repaid)?;
            if loan.status.is_outstanding() {
                stats.unpaid_loans += 1;
                let remaining = loan.amount.checked_sub(loan.amount_repaid).ok_or_else(|| {
                    LedgerError::Validation(format!(
                        "remaining balance of loan '{}' is out of range",
                        loan.loan_id
                    ))
                })?;
                stats.unpaid_amount =
                    sum(username, "unpaid_amount", stats.unpaid_amount, remaining)?;
            }
        }
        if loan.last_updated > stats.last_updated {
            stats.last_updated = loan.last_updated;
        }
    }
    Ok(stats)
}

fn sum(username: &str, field: &str, total: Decimal, add: Decimal) -> LedgerResult<Decimal> {
    total.checked_add(add).ok_or_else(|| {
        LedgerError::Validation(format!("{} for '{}' would overflow", field, username))
    })
}
