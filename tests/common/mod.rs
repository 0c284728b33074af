// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

// Helpers shared by test files that are compiled separately
#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use loanledger::Ledger;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

pub fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
}

/// In-memory ledger whose clock advances one second per reading.
pub fn ledger() -> Ledger {
    let tick = Arc::new(AtomicI64::new(0));
    Ledger::open_in_memory()
        .unwrap()
        .with_clock(move || start() + Duration::seconds(tick.fetch_add(1, Ordering::SeqCst)))
}

/// In-memory ledger whose clock never moves.
pub fn frozen_ledger() -> Ledger {
    Ledger::open_in_memory().unwrap().with_clock(start)
}

pub fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}
