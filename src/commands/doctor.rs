// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger::{AuditIssue, Ledger};
use crate::utils::pretty_table;
use anyhow::Result;

pub fn handle(ledger: &mut Ledger, sub: &clap::ArgMatches) -> Result<()> {
    let issues = run(ledger, sub.get_flag("fix"))?;
    if issues.is_empty() {
        println!("doctor: no issues found");
    } else {
        let rows = issues
            .into_iter()
            .map(|i| vec![i.kind.to_string(), i.subject, i.detail])
            .collect();
        println!("{}", pretty_table(&["Issue", "Subject", "Detail"], rows));
    }
    Ok(())
}

/// Audit the ledger, optionally rebuilding every aggregate first. Returns the
/// issues that remain.
pub fn run(ledger: &mut Ledger, fix: bool) -> Result<Vec<AuditIssue>> {
    if fix {
        let before = ledger.audit()?;
        if before.iter().any(|i| i.kind.fixed_by_rebuild()) {
            let n = ledger.rebuild_stats()?;
            println!("Rebuilt stats for {} users", n);
        }
    }
    Ok(ledger.audit()?)
}
