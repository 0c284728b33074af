// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle state of a loan. The set is closed; the text form is what lands
/// in the `loans.status` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    Active,
    Confirmed,
    PartiallyRepaid,
    Repaid,
    Refunded,
}

impl LoanStatus {
    pub const ALL: [LoanStatus; 5] = [
        LoanStatus::Active,
        LoanStatus::Confirmed,
        LoanStatus::PartiallyRepaid,
        LoanStatus::Repaid,
        LoanStatus::Refunded,
    ];

    pub const OUTSTANDING: [LoanStatus; 3] = [
        LoanStatus::Active,
        LoanStatus::Confirmed,
        LoanStatus::PartiallyRepaid,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LoanStatus::Active => "active",
            LoanStatus::Confirmed => "confirmed",
            LoanStatus::PartiallyRepaid => "partially_repaid",
            LoanStatus::Repaid => "repaid",
            LoanStatus::Refunded => "refunded",
        }
    }

    /// `repaid` and `refunded` accept no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, LoanStatus::Repaid | LoanStatus::Refunded)
    }

    pub fn is_outstanding(self) -> bool {
        !self.is_terminal()
    }

    /// Transitions a caller may request directly. Moves into
    /// `partially_repaid` and `repaid` only happen by recording a repayment.
    pub fn allows_explicit(self, next: LoanStatus) -> bool {
        match (self, next) {
            (LoanStatus::Active, LoanStatus::Confirmed) => true,
            (from, LoanStatus::Refunded) => !from.is_terminal(),
            _ => false,
        }
    }

    /// Status a loan takes after repayments bring it to `repaid` of `amount`.
    pub fn after_repayment(repaid: Decimal, amount: Decimal) -> LoanStatus {
        if repaid >= amount {
            LoanStatus::Repaid
        } else {
            LoanStatus::PartiallyRepaid
        }
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown loan status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for LoanStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        LoanStatus::ALL
            .into_iter()
            .find(|st| st.as_str() == wanted)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    pub id: i64,
    pub loan_id: String,
    pub lender: String,
    pub borrower: String,
    pub amount: Decimal,
    pub currency: String,
    pub date_created: DateTime<Utc>,
    pub original_thread: String,
    pub status: LoanStatus,
    pub amount_repaid: Decimal,
    pub last_updated: DateTime<Utc>,
}

impl Loan {
    /// What the borrower still owes. Zero once the loan is settled either way.
    pub fn remaining(&self) -> Decimal {
        if self.status.is_terminal() {
            Decimal::ZERO
        } else {
            self.amount - self.amount_repaid
        }
    }

    pub fn involves(&self, username: &str) -> bool {
        self.lender == username || self.borrower == username
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    pub username: String,
    pub loans_as_borrower: i64,
    pub loans_as_lender: i64,
    pub amount_borrowed: Decimal,
    pub amount_lent: Decimal,
    pub amount_repaid: Decimal, // as borrower
    pub unpaid_loans: i64,
    pub unpaid_amount: Decimal,
    pub last_updated: DateTime<Utc>,
}
