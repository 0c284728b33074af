// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use common::{dec, frozen_ledger, ledger};
use loanledger::{cli, commands::history, Ledger};

fn ids(l: &Ledger, user: &str, page: usize) -> Vec<String> {
    l.history_paged(user, page)
        .unwrap()
        .map(|r| r.unwrap().loan_id)
        .collect()
}

fn seed(l: &mut Ledger) {
    l.create_loan("L1", "alice", "bob", dec("10"), "USD", "t").unwrap();
    l.create_loan("L2", "carol", "alice", dec("20"), "USD", "t").unwrap();
    l.create_loan("L3", "bob", "carol", dec("30"), "USD", "t").unwrap();
    l.create_loan("L4", "alice", "dave", dec("40"), "USD", "t").unwrap();
    l.create_loan("L5", "erin", "alice", dec("50"), "USD", "t").unwrap();
}

#[test]
fn history_is_newest_first_in_both_roles() {
    let mut l = ledger();
    seed(&mut l);
    assert_eq!(ids(&l, "alice", 50), vec!["L5", "L4", "L2", "L1"]);
    assert_eq!(ids(&l, "bob", 50), vec!["L3", "L1"]);
    assert!(ids(&l, "nobody", 50).is_empty());
}

#[test]
fn paging_does_not_skip_or_repeat() {
    let mut l = ledger();
    seed(&mut l);
    let whole = ids(&l, "alice", 50);
    for page in [1, 2, 3, 4, 5] {
        assert_eq!(ids(&l, "alice", page), whole, "page size {page}");
    }
}

#[test]
fn same_timestamp_falls_back_to_insertion_order() {
    let mut l = frozen_ledger();
    seed(&mut l);
    assert_eq!(ids(&l, "alice", 1), vec!["L5", "L4", "L2", "L1"]);
}

#[test]
fn history_is_lazy_and_restartable() {
    let mut l = ledger();
    seed(&mut l);
    let mut it = l.history_paged("alice", 2).unwrap();
    assert_eq!(it.next().unwrap().unwrap().loan_id, "L5");
    drop(it);

    l.create_loan("L6", "alice", "frank", dec("60"), "USD", "t").unwrap();
    assert_eq!(ids(&l, "alice", 2), vec!["L6", "L5", "L4", "L2", "L1"]);
}

#[test]
fn history_reflects_updates() {
    let mut l = ledger();
    seed(&mut l);
    l.record_repayment("L1", dec("10")).unwrap();
    let first = l.history("bob").unwrap().last().unwrap().unwrap();
    assert_eq!(first.loan_id, "L1");
    assert!(first.status.is_terminal());
}

#[test]
fn history_command_respects_limit() {
    let mut l = ledger();
    seed(&mut l);
    let cli = cli::build_cli();
    let matches = cli.get_matches_from(["loanledger", "history", "Alice", "--limit", "2"]);
    if let Some(("history", sub)) = matches.subcommand() {
        let rows = history::query_rows(&l, sub).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].loan_id, "L5");
        assert_eq!(rows[1].loan_id, "L4");
    } else {
        panic!("no history subcommand");
    }
}
