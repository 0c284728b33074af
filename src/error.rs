// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use rusqlite::ErrorCode;
use thiserror::Error;

use crate::models::LoanStatus;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Loan '{0}' already exists")]
    DuplicateLoan(String),

    #[error("Loan '{0}' not found")]
    LoanNotFound(String),

    #[error("User '{0}' has no loan history")]
    UserNotFound(String),

    #[error(
        "Repayment of {paid} on loan '{loan_id}' exceeds the amount owed \
         (amount {amount}, already repaid {already_repaid})"
    )]
    Overpayment {
        loan_id: String,
        amount: Decimal,
        already_repaid: Decimal,
        paid: Decimal,
    },

    #[error("Loan '{loan_id}' cannot move from {from} to {to}")]
    InvalidTransition {
        loan_id: String,
        from: LoanStatus,
        to: LoanStatus,
    },

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Database error: {0}")]
    Storage(rusqlite::Error),

    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

impl LedgerError {
    /// Only store connectivity failures are worth retrying unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, LedgerError::StoreUnavailable(_))
    }
}

impl From<rusqlite::Error> for LedgerError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _)
                if matches!(
                    e.code,
                    ErrorCode::DatabaseBusy
                        | ErrorCode::DatabaseLocked
                        | ErrorCode::CannotOpen
                        | ErrorCode::NotADatabase
                        | ErrorCode::SystemIoFailure
                ) =>
            {
                LedgerError::StoreUnavailable(err.to_string())
            }
            rusqlite::Error::FromSqlConversionFailure(..)
            | rusqlite::Error::InvalidColumnType(..) => LedgerError::Corrupt(err.to_string()),
            _ => LedgerError::Storage(err),
        }
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;
