// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use comfy_table::{presets::UTF8_FULL, Cell, Table};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;

use crate::error::{LedgerError, LedgerResult};
use crate::models::Loan;

static CURRENCY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z]{3}$").unwrap());

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.trim()
        .parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

pub fn fmt_money(d: &Decimal, ccy: &str) -> String {
    format!("{:.2} {}", d.round_dp(2), ccy)
}

/// Usernames are case-insensitive; the ledger keys them trimmed and lowercased.
pub fn normalize_username(raw: &str) -> LedgerResult<String> {
    let name = raw.trim().to_lowercase();
    if name.is_empty() {
        return Err(LedgerError::Validation("username must not be empty".into()));
    }
    Ok(name)
}

pub fn normalize_currency(raw: &str) -> LedgerResult<String> {
    let code = raw.trim();
    if !CURRENCY_RE.is_match(code) {
        return Err(LedgerError::Validation(format!(
            "currency '{}' must be a three-letter code",
            raw
        )));
    }
    Ok(code.to_ascii_uppercase())
}

pub fn require_positive(what: &str, amount: Decimal) -> LedgerResult<()> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::Validation(format!(
            "{} must be positive, got {}",
            what, amount
        )));
    }
    Ok(())
}

/// Loan ids handed out when the caller has none: unix seconds, with a `-N`
/// suffix when that second is already taken.
pub fn generate_loan_id(now: DateTime<Utc>, attempt: u32) -> String {
    if attempt == 0 {
        now.timestamp().to_string()
    } else {
        format!("{}-{}", now.timestamp(), attempt)
    }
}

/// Fixed-width UTC text, so column order matches time order.
pub fn ts_to_sql(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn ts_from_sql(s: &str) -> std::result::Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(s).map(|dt| dt.with_timezone(&Utc))
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn loan_table(loans: &[Loan]) -> Table {
    let rows = loans
        .iter()
        .map(|l| {
            vec![
                l.loan_id.clone(),
                l.date_created.format("%Y-%m-%d %H:%M").to_string(),
                l.lender.clone(),
                l.borrower.clone(),
                fmt_money(&l.amount, &l.currency),
                fmt_money(&l.amount_repaid, &l.currency),
                l.status.to_string(),
                l.original_thread.clone(),
            ]
        })
        .collect();
    pretty_table(
        &[
            "Loan", "Created", "Lender", "Borrower", "Amount", "Repaid", "Status", "Thread",
        ],
        rows,
    )
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn currency_codes_are_uppercased() {
        assert_eq!(normalize_currency(" usd ").unwrap(), "USD");
        assert!(matches!(normalize_currency("US"), Err(LedgerError::Validation(_))));
        assert!(matches!(normalize_currency("U$D"), Err(LedgerError::Validation(_))));
    }

    #[test]
    fn usernames_fold_case() {
        assert_eq!(normalize_username("  Alice ").unwrap(), "alice");
        assert!(normalize_username("   ").is_err());
    }

    #[test]
    fn timestamps_sort_as_text() {
        let a = Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap();
        let b = a + chrono::Duration::microseconds(1500);
        assert!(ts_to_sql(&a) < ts_to_sql(&b));
        assert_eq!(ts_from_sql(&ts_to_sql(&b)).unwrap(), b);
    }

    #[test]
    fn generated_ids_get_suffix_on_retry() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        assert_eq!(generate_loan_id(now, 0), "1700000000");
        assert_eq!(generate_loan_id(now, 2), "1700000000-2");
    }
}
