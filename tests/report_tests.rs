// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use common::{dec, ledger};
use loanledger::report::{user_report, CurrencyTotals};
use loanledger::LedgerError;

#[test]
fn report_splits_open_loans_by_role() {
    let mut l = ledger();
    l.create_loan("L1", "alice", "bob", dec("100"), "USD", "t").unwrap();
    l.create_loan("L2", "alice", "carol", dec("50"), "EUR", "t").unwrap();
    l.create_loan("L3", "dave", "alice", dec("20"), "USD", "t").unwrap();
    l.create_loan("L4", "alice", "erin", dec("5"), "USD", "t").unwrap();
    l.record_repayment("L1", dec("40")).unwrap();
    l.record_repayment("L4", dec("5")).unwrap();

    let r = user_report(&l, "Alice", 1).unwrap();
    assert_eq!(r.stats.username, "alice");
    assert_eq!(r.unpaid_as_borrower, 1);
    assert_eq!(r.in_progress_as_lender, 2);
    assert_eq!(r.owed_to_user.get("USD"), Some(&dec("60")));
    assert_eq!(r.owed_to_user.get("EUR"), Some(&dec("50")));
    assert_eq!(r.recent_lending.len(), 1);
    assert_eq!(r.recent_lending[0].loan_id, "L2");
    assert_eq!(r.omitted_lending, 1);
}

#[test]
fn report_keeps_currencies_apart() {
    let mut l = ledger();
    l.create_loan("L1", "alice", "bob", dec("100"), "USD", "t").unwrap();
    l.create_loan("L2", "alice", "carol", dec("50"), "EUR", "t").unwrap();
    l.create_loan("L3", "dave", "alice", dec("20"), "USD", "t").unwrap();
    l.create_loan("L4", "erin", "alice", dec("7"), "JPY", "t").unwrap();
    l.record_repayment("L3", dec("5")).unwrap();
    l.set_status("L4", loanledger::LoanStatus::Refunded).unwrap();

    let r = user_report(&l, "alice", 5).unwrap();
    assert_eq!(r.stats.amount_borrowed, dec("27"));
    assert_eq!(r.stats.amount_lent, dec("150"));
    assert_eq!(
        r.by_currency.get("USD"),
        Some(&CurrencyTotals {
            borrowed: dec("20"),
            lent: dec("100"),
            unpaid: dec("15"),
        })
    );
    assert_eq!(
        r.by_currency.get("EUR"),
        Some(&CurrencyTotals {
            borrowed: dec("0"),
            lent: dec("50"),
            unpaid: dec("0"),
        })
    );
    assert_eq!(
        r.by_currency.get("JPY"),
        Some(&CurrencyTotals {
            borrowed: dec("7"),
            lent: dec("0"),
            unpaid: dec("0"),
        })
    );
    assert_eq!(r.by_currency.len(), 3);
}

#[test]
fn report_for_unknown_user_is_not_found() {
    let l = ledger();
    assert!(matches!(
        user_report(&l, "nobody", 5),
        Err(LedgerError::UserNotFound(_))
    ));
}
