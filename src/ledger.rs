// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! The loan ledger store.
//!
//! Every mutation runs in a single IMMEDIATE transaction: the loan row and the
//! aggregates of both users it names commit together or not at all. Aggregates
//! are always rebuilt from the loan set via [`stats::recompute`], never patched.

use chrono::{DateTime, SubsecRound, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::fmt;
use std::path::Path;

use crate::db;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Loan, LoanStatus, UserStats};
use crate::stats;
use crate::utils::{
    generate_loan_id, normalize_currency, normalize_username, require_positive, ts_from_sql,
    ts_to_sql,
};

const LOAN_COLUMNS: &str = "id, loan_id, lender, borrower, amount, currency, date_created, \
     original_thread, status, amount_repaid, last_updated";

const USER_COLUMNS: &str = "username, loans_as_borrower, loans_as_lender, amount_borrowed, \
     amount_lent, amount_repaid, unpaid_loans, unpaid_amount, last_updated";

pub const DEFAULT_PAGE_SIZE: usize = 50;

type Clock = Box<dyn Fn() -> DateTime<Utc> + Send>;

pub struct Ledger {
    conn: Connection,
    clock: Clock,
}

impl Ledger {
    /// Open (or create) a file-backed ledger.
    pub fn open(path: &Path) -> LedgerResult<Self> {
        let conn = Connection::open(path)?;
        db::configure(&conn)?;
        db::init_schema(&conn)?;
        log::debug!("ledger opened at {}", path.display());
        Ok(Self::with_connection(conn))
    }

    /// Open an in-memory ledger (used in tests).
    pub fn open_in_memory() -> LedgerResult<Self> {
        let conn = Connection::open_in_memory()?;
        db::init_schema(&conn)?;
        Ok(Self::with_connection(conn))
    }

    fn with_connection(conn: Connection) -> Self {
        Self {
            conn,
            clock: Box::new(Utc::now),
        }
    }

    /// Replace the time source used to stamp mutations.
    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> DateTime<Utc> + Send + 'static,
    {
        self.clock = Box::new(clock);
        self
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    // Stored timestamps keep microseconds; trimming here keeps returned loans
    // equal to what a later read yields.
    fn now(&self) -> DateTime<Utc> {
        (self.clock)().trunc_subsecs(6)
    }

    // ── Mutations ──────────────────────────────────────────────

    pub fn create_loan(
        &mut self,
        loan_id: &str,
        lender: &str,
        borrower: &str,
        amount: Decimal,
        currency: &str,
        original_thread: &str,
    ) -> LedgerResult<Loan> {
        let result = self.insert_loan(loan_id, lender, borrower, amount, currency, original_thread);
        match &result {
            Ok(loan) => log::info!(
                "loan {} created: {} lent {} {} to {}",
                loan.loan_id,
                loan.lender,
                loan.amount,
                loan.currency,
                loan.borrower
            ),
            Err(e) => log::warn!("loan {} rejected: {}", loan_id, e),
        }
        result
    }

    fn insert_loan(
        &mut self,
        loan_id: &str,
        lender: &str,
        borrower: &str,
        amount: Decimal,
        currency: &str,
        original_thread: &str,
    ) -> LedgerResult<Loan> {
        let loan_id = require_loan_id(loan_id)?;
        let lender = normalize_username(lender)?;
        let borrower = normalize_username(borrower)?;
        if lender == borrower {
            return Err(LedgerError::Validation(format!(
                "lender and borrower must differ (both '{}')",
                lender
            )));
        }
        require_positive("loan amount", amount)?;
        let currency = normalize_currency(currency)?;
        let now = self.now();

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        if fetch_loan(&tx, &loan_id)?.is_some() {
            return Err(LedgerError::DuplicateLoan(loan_id));
        }
        tx.execute(
            "INSERT INTO loans(loan_id, lender, borrower, amount, currency, date_created,
                               original_thread, status, amount_repaid, last_updated)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                loan_id,
                lender,
                borrower,
                amount.to_string(),
                currency,
                ts_to_sql(&now),
                original_thread,
                LoanStatus::Active.as_str(),
                Decimal::ZERO.to_string(),
                ts_to_sql(&now),
            ],
        )?;
        let loan = Loan {
            id: tx.last_insert_rowid(),
            loan_id,
            lender,
            borrower,
            amount,
            currency,
            date_created: now,
            original_thread: original_thread.to_string(),
            status: LoanStatus::Active,
            amount_repaid: Decimal::ZERO,
            last_updated: now,
        };
        refresh_user(&tx, &loan.lender)?;
        refresh_user(&tx, &loan.borrower)?;
        tx.commit()?;
        Ok(loan)
    }

    pub fn record_repayment(&mut self, loan_id: &str, paid: Decimal) -> LedgerResult<Loan> {
        self.logged_repayment(loan_id, paid, None)
    }

    /// As [`Ledger::record_repayment`], but refuses a repayment quoted in a
    /// currency other than the loan's.
    pub fn record_repayment_in(
        &mut self,
        loan_id: &str,
        paid: Decimal,
        currency: &str,
    ) -> LedgerResult<Loan> {
        self.logged_repayment(loan_id, paid, Some(currency))
    }

    fn logged_repayment(
        &mut self,
        loan_id: &str,
        paid: Decimal,
        currency: Option<&str>,
    ) -> LedgerResult<Loan> {
        let result = self.apply_repayment(loan_id, paid, currency);
        match &result {
            Ok(loan) => log::info!(
                "loan {} repayment of {} {}: {}/{} repaid, now {}",
                loan.loan_id,
                paid,
                loan.currency,
                loan.amount_repaid,
                loan.amount,
                loan.status
            ),
            Err(e) => log::warn!("repayment on loan {} rejected: {}", loan_id, e),
        }
        result
    }

    fn apply_repayment(
        &mut self,
        loan_id: &str,
        paid: Decimal,
        currency: Option<&str>,
    ) -> LedgerResult<Loan> {
        require_positive("repayment", paid)?;
        let currency = currency.map(normalize_currency).transpose()?;
        let now = self.now();

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let mut loan = fetch_loan(&tx, loan_id)?
            .ok_or_else(|| LedgerError::LoanNotFound(loan_id.to_string()))?;

        if let Some(ccy) = currency {
            if ccy != loan.currency {
                return Err(LedgerError::Validation(format!(
                    "loan '{}' is in {}, repayment given in {}",
                    loan.loan_id, loan.currency, ccy
                )));
            }
        }
        let total = loan
            .amount_repaid
            .checked_add(paid)
            .ok_or_else(|| LedgerError::Validation(format!("repayment {} out of range", paid)))?;
        let next = LoanStatus::after_repayment(total, loan.amount);
        if loan.status == LoanStatus::Refunded {
            return Err(LedgerError::InvalidTransition {
                loan_id: loan.loan_id,
                from: loan.status,
                to: next,
            });
        }
        if total > loan.amount {
            return Err(LedgerError::Overpayment {
                loan_id: loan.loan_id,
                amount: loan.amount,
                already_repaid: loan.amount_repaid,
                paid,
            });
        }

        loan.amount_repaid = total;
        loan.status = next;
        loan.last_updated = now.max(loan.date_created);
        write_progress(&tx, &loan)?;
        refresh_user(&tx, &loan.lender)?;
        refresh_user(&tx, &loan.borrower)?;
        tx.commit()?;
        Ok(loan)
    }

    /// Apply a caller-requested transition: `active -> confirmed`, or any
    /// non-terminal status to `refunded`. A refund keeps `amount_repaid`.
    pub fn set_status(&mut self, loan_id: &str, new_status: LoanStatus) -> LedgerResult<Loan> {
        let result = self.apply_status(loan_id, new_status);
        match &result {
            Ok(loan) => log::info!("loan {} is now {}", loan.loan_id, loan.status),
            Err(e) => log::warn!("status change on loan {} rejected: {}", loan_id, e),
        }
        result
    }

    fn apply_status(&mut self, loan_id: &str, new_status: LoanStatus) -> LedgerResult<Loan> {
        let now = self.now();
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let mut loan = fetch_loan(&tx, loan_id)?
            .ok_or_else(|| LedgerError::LoanNotFound(loan_id.to_string()))?;
        if !loan.status.allows_explicit(new_status) {
            return Err(LedgerError::InvalidTransition {
                loan_id: loan.loan_id,
                from: loan.status,
                to: new_status,
            });
        }
        loan.status = new_status;
        loan.last_updated = now.max(loan.date_created);
        write_progress(&tx, &loan)?;
        refresh_user(&tx, &loan.lender)?;
        refresh_user(&tx, &loan.borrower)?;
        tx.commit()?;
        Ok(loan)
    }

    /// Recompute and store every user's aggregate, dropping rows for users no
    /// loan mentions any more. Returns the number of aggregates written.
    pub fn rebuild_stats(&mut self) -> LedgerResult<usize> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let users = usernames_in_loans(&tx)?;
        for u in &users {
            refresh_user(&tx, u)?;
        }
        let mut dropped = 0;
        for u in stored_usernames(&tx)? {
            if !users.contains(&u) {
                dropped += tx.execute("DELETE FROM users WHERE username=?1", params![u])?;
            }
        }
        tx.commit()?;
        log::info!(
            "rebuilt stats for {} users ({} stale rows dropped)",
            users.len(),
            dropped
        );
        Ok(users.len())
    }

    // ── Queries ────────────────────────────────────────────────

    pub fn loan(&self, loan_id: &str) -> LedgerResult<Loan> {
        fetch_loan(&self.conn, loan_id)?
            .ok_or_else(|| LedgerError::LoanNotFound(loan_id.to_string()))
    }

    /// Every loan naming `username`, newest first. Rows are pulled a page at a
    /// time; calling again starts over against the current state.
    pub fn history(&self, username: &str) -> LedgerResult<History<'_>> {
        self.history_paged(username, DEFAULT_PAGE_SIZE)
    }

    pub fn history_paged(&self, username: &str, page_size: usize) -> LedgerResult<History<'_>> {
        Ok(History {
            conn: &self.conn,
            username: normalize_username(username)?,
            page_size: page_size.max(1),
            cursor: None,
            buffer: VecDeque::new(),
            exhausted: false,
        })
    }

    /// Loans still owed, oldest first.
    pub fn outstanding(&self) -> LedgerResult<Vec<Loan>> {
        let sql = format!(
            "SELECT {} FROM loans WHERE status IN ({}) ORDER BY date_created ASC, id ASC",
            LOAN_COLUMNS,
            outstanding_in_list()
        );
        query_loans(&self.conn, &sql, [])
    }

    /// Outstanding loans naming `username` in either role, newest first.
    pub fn outstanding_for(&self, username: &str) -> LedgerResult<Vec<Loan>> {
        let username = normalize_username(username)?;
        let sql = format!(
            "SELECT {} FROM loans WHERE (lender=?1 OR borrower=?1) AND status IN ({})
             ORDER BY date_created DESC, id DESC",
            LOAN_COLUMNS,
            outstanding_in_list()
        );
        query_loans(&self.conn, &sql, params![username])
    }

    pub fn user_stats(&self, username: &str) -> LedgerResult<UserStats> {
        let username = normalize_username(username)?;
        let sql = format!("SELECT {} FROM users WHERE username=?1", USER_COLUMNS);
        self.conn
            .query_row(&sql, params![username], stats_from_row)
            .optional()?
            .ok_or(LedgerError::UserNotFound(username))
    }

    /// The user's aggregate as the loan set implies it right now, without
    /// touching the stored row.
    pub fn recompute_stats(&self, username: &str) -> LedgerResult<UserStats> {
        let username = normalize_username(username)?;
        let loans = loans_for_user(&self.conn, &username)?;
        if loans.is_empty() {
            return Err(LedgerError::UserNotFound(username));
        }
        stats::recompute(&username, &loans)
    }

    /// All loans in creation order.
    pub fn loans(&self) -> LedgerResult<Vec<Loan>> {
        let sql = format!(
            "SELECT {} FROM loans ORDER BY date_created ASC, id ASC",
            LOAN_COLUMNS
        );
        query_loans(&self.conn, &sql, [])
    }

    /// Most recent outstanding loan with exactly these terms, for callers that
    /// know a loan by what was lent rather than by id.
    pub fn find_latest_loan(
        &self,
        lender: &str,
        borrower: &str,
        amount: Decimal,
        currency: &str,
    ) -> LedgerResult<Option<Loan>> {
        let lender = normalize_username(lender)?;
        let borrower = normalize_username(borrower)?;
        let currency = normalize_currency(currency)?;
        let sql = format!(
            "SELECT {} FROM loans WHERE lender=?1 AND borrower=?2 AND currency=?3
             AND status IN ({}) ORDER BY date_created DESC, id DESC",
            LOAN_COLUMNS,
            outstanding_in_list()
        );
        // Amounts are compared as decimals; "25" and "25.00" are the same loan.
        let loans = query_loans(&self.conn, &sql, params![lender, borrower, currency])?;
        Ok(loans.into_iter().find(|l| l.amount == amount))
    }

    pub fn next_loan_id(&self) -> LedgerResult<String> {
        let now = self.now();
        let mut attempt = 0u32;
        loop {
            let candidate = generate_loan_id(now, attempt);
            if fetch_loan(&self.conn, &candidate)?.is_none() {
                return Ok(candidate);
            }
            attempt += 1;
        }
    }

    /// Check stored aggregates against the loan set and each loan against its
    /// own invariants. Runs inside one read transaction.
    pub fn audit(&self) -> LedgerResult<Vec<AuditIssue>> {
        let tx = self.conn.unchecked_transaction()?;
        let loans = {
            let sql = format!(
                "SELECT {} FROM loans ORDER BY date_created ASC, id ASC",
                LOAN_COLUMNS
            );
            query_loans(&tx, &sql, [])?
        };
        let stored: HashMap<String, UserStats> = {
            let sql = format!("SELECT {} FROM users", USER_COLUMNS);
            let mut stmt = tx.prepare(&sql)?;
            let rows = stmt.query_map([], stats_from_row)?;
            let mut m = HashMap::new();
            for r in rows {
                let s = r?;
                m.insert(s.username.clone(), s);
            }
            m
        };
        drop(tx);

        let mut issues = Vec::new();
        for loan in &loans {
            issues.extend(loan_issues(loan));
        }

        let users: BTreeSet<&str> = loans
            .iter()
            .flat_map(|l| [l.lender.as_str(), l.borrower.as_str()])
            .collect();
        for u in &users {
            let expected = stats::recompute(u, &loans)?;
            match stored.get(*u) {
                None => issues.push(AuditIssue::new(
                    IssueKind::MissingStats,
                    u,
                    "user appears on loans but has no stats row",
                )),
                Some(actual) if actual != &expected => issues.push(AuditIssue::new(
                    IssueKind::StatsDrift,
                    u,
                    describe_drift(actual, &expected),
                )),
                Some(_) => {}
            }
        }
        let mut orphans: Vec<&String> = stored
            .keys()
            .filter(|u| !users.contains(u.as_str()))
            .collect();
        orphans.sort();
        for u in orphans {
            issues.push(AuditIssue::new(
                IssueKind::OrphanStats,
                u,
                "stats row without any loan",
            ));
        }
        Ok(issues)
    }
}

/// Lazily paged history of one user's loans, newest first.
pub struct History<'a> {
    conn: &'a Connection,
    username: String,
    page_size: usize,
    cursor: Option<(String, i64)>,
    buffer: VecDeque<Loan>,
    exhausted: bool,
}

impl History<'_> {
    fn fetch_page(&mut self) -> LedgerResult<()> {
        let limit = self.page_size as i64;
        let page = match &self.cursor {
            None => {
                let sql = format!(
                    "SELECT {} FROM loans WHERE (lender=?1 OR borrower=?1)
                     ORDER BY date_created DESC, id DESC LIMIT ?2",
                    LOAN_COLUMNS
                );
                query_loans(self.conn, &sql, params![self.username, limit])?
            }
            Some((created, id)) => {
                let sql = format!(
                    "SELECT {} FROM loans WHERE (lender=?1 OR borrower=?1)
                     AND (date_created < ?2 OR (date_created = ?2 AND id < ?3))
                     ORDER BY date_created DESC, id DESC LIMIT ?4",
                    LOAN_COLUMNS
                );
                query_loans(self.conn, &sql, params![self.username, created, id, limit])?
            }
        };
        if page.len() < self.page_size {
            self.exhausted = true;
        }
        self.buffer.extend(page);
        Ok(())
    }
}

impl Iterator for History<'_> {
    type Item = LedgerResult<Loan>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.buffer.is_empty() && !self.exhausted {
            if let Err(e) = self.fetch_page() {
                self.exhausted = true;
                return Some(Err(e));
            }
        }
        let loan = self.buffer.pop_front()?;
        self.cursor = Some((ts_to_sql(&loan.date_created), loan.id));
        Some(Ok(loan))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    StatsDrift,
    MissingStats,
    OrphanStats,
    RepaidOutOfBounds,
    StatusMismatch,
    TimestampOrder,
    SelfLoan,
}

impl IssueKind {
    pub fn as_str(self) -> &'static str {
        match self {
            IssueKind::StatsDrift => "stats_drift",
            IssueKind::MissingStats => "missing_stats",
            IssueKind::OrphanStats => "orphan_stats",
            IssueKind::RepaidOutOfBounds => "repaid_out_of_bounds",
            IssueKind::StatusMismatch => "status_mismatch",
            IssueKind::TimestampOrder => "timestamp_order",
            IssueKind::SelfLoan => "self_loan",
        }
    }

    /// Whether rebuilding aggregates clears this kind of issue.
    pub fn fixed_by_rebuild(self) -> bool {
        matches!(
            self,
            IssueKind::StatsDrift | IssueKind::MissingStats | IssueKind::OrphanStats
        )
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditIssue {
    pub kind: IssueKind,
    pub subject: String,
    pub detail: String,
}

impl AuditIssue {
    fn new(kind: IssueKind, subject: &str, detail: impl Into<String>) -> Self {
        Self {
            kind,
            subject: subject.to_string(),
            detail: detail.into(),
        }
    }
}

fn loan_issues(loan: &Loan) -> Vec<AuditIssue> {
    let mut out = Vec::new();
    let id = loan.loan_id.as_str();
    if loan.amount_repaid < Decimal::ZERO || loan.amount_repaid > loan.amount {
        out.push(AuditIssue::new(
            IssueKind::RepaidOutOfBounds,
            id,
            format!("repaid {} of {}", loan.amount_repaid, loan.amount),
        ));
    }
    if (loan.amount_repaid == loan.amount) != (loan.status == LoanStatus::Repaid) {
        out.push(AuditIssue::new(
            IssueKind::StatusMismatch,
            id,
            format!(
                "status {} with {} of {} repaid",
                loan.status, loan.amount_repaid, loan.amount
            ),
        ));
    }
    if loan.last_updated < loan.date_created {
        out.push(AuditIssue::new(
            IssueKind::TimestampOrder,
            id,
            "last_updated precedes date_created",
        ));
    }
    if loan.lender == loan.borrower {
        out.push(AuditIssue::new(
            IssueKind::SelfLoan,
            id,
            format!("{} lends to themselves", loan.lender),
        ));
    }
    out
}

fn describe_drift(actual: &UserStats, expected: &UserStats) -> String {
    let mut parts = Vec::new();
    macro_rules! cmp {
        ($field:ident) => {
            if actual.$field != expected.$field {
                parts.push(format!(
                    "{} stored {} expected {}",
                    stringify!($field),
                    actual.$field,
                    expected.$field
                ));
            }
        };
    }
    cmp!(loans_as_borrower);
    cmp!(loans_as_lender);
    cmp!(amount_borrowed);
    cmp!(amount_lent);
    cmp!(amount_repaid);
    cmp!(unpaid_loans);
    cmp!(unpaid_amount);
    cmp!(last_updated);
    parts.join("; ")
}

fn require_loan_id(raw: &str) -> LedgerResult<String> {
    let id = raw.trim();
    if id.is_empty() {
        return Err(LedgerError::Validation("loan id must not be empty".into()));
    }
    Ok(id.to_string())
}

fn outstanding_in_list() -> String {
    LoanStatus::OUTSTANDING
        .iter()
        .map(|s| format!("'{}'", s.as_str()))
        .collect::<Vec<_>>()
        .join(",")
}

fn fetch_loan(conn: &Connection, loan_id: &str) -> LedgerResult<Option<Loan>> {
    let sql = format!("SELECT {} FROM loans WHERE loan_id=?1", LOAN_COLUMNS);
    Ok(conn
        .query_row(&sql, params![loan_id.trim()], loan_from_row)
        .optional()?)
}

fn loans_for_user(conn: &Connection, username: &str) -> LedgerResult<Vec<Loan>> {
    let sql = format!(
        "SELECT {} FROM loans WHERE lender=?1 OR borrower=?1 ORDER BY id",
        LOAN_COLUMNS
    );
    query_loans(conn, &sql, params![username])
}

fn query_loans<P: rusqlite::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> LedgerResult<Vec<Loan>> {
    let mut stmt = conn.prepare_cached(sql)?;
    let rows = stmt.query_map(params, loan_from_row)?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

fn write_progress(conn: &Connection, loan: &Loan) -> LedgerResult<()> {
    conn.execute(
        "UPDATE loans SET status=?1, amount_repaid=?2, last_updated=?3 WHERE id=?4",
        params![
            loan.status.as_str(),
            loan.amount_repaid.to_string(),
            ts_to_sql(&loan.last_updated),
            loan.id
        ],
    )?;
    Ok(())
}

/// Rebuild `username`'s stats row from every loan that names it.
fn refresh_user(conn: &Connection, username: &str) -> LedgerResult<UserStats> {
    let loans = loans_for_user(conn, username)?;
    let s = stats::recompute(username, &loans)?;
    conn.execute(
        "INSERT INTO users(username, loans_as_borrower, loans_as_lender, amount_borrowed,
                           amount_lent, amount_repaid, unpaid_loans, unpaid_amount, last_updated)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
         ON CONFLICT(username) DO UPDATE SET
            loans_as_borrower=excluded.loans_as_borrower,
            loans_as_lender=excluded.loans_as_lender,
            amount_borrowed=excluded.amount_borrowed,
            amount_lent=excluded.amount_lent,
            amount_repaid=excluded.amount_repaid,
            unpaid_loans=excluded.unpaid_loans,
            unpaid_amount=excluded.unpaid_amount,
            last_updated=excluded.last_updated",
        params![
            s.username,
            s.loans_as_borrower,
            s.loans_as_lender,
            s.amount_borrowed.to_string(),
            s.amount_lent.to_string(),
            s.amount_repaid.to_string(),
            s.unpaid_loans,
            s.unpaid_amount.to_string(),
            ts_to_sql(&s.last_updated),
        ],
    )?;
    log::debug!(
        "stats for {}: {} lent, {} borrowed, {} unpaid",
        s.username,
        s.amount_lent,
        s.amount_borrowed,
        s.unpaid_amount
    );
    Ok(s)
}

fn usernames_in_loans(conn: &Connection) -> LedgerResult<BTreeSet<String>> {
    let mut stmt = conn.prepare("SELECT lender FROM loans UNION SELECT borrower FROM loans")?;
    let rows = stmt.query_map([], |r| r.get::<_, String>(0))?;
    let mut out = BTreeSet::new();
    for r in rows {
        out.insert(r?);
    }
    Ok(out)
}

fn stored_usernames(conn: &Connection) -> LedgerResult<Vec<String>> {
    let mut stmt = conn.prepare("SELECT username FROM users ORDER BY username")?;
    let rows = stmt.query_map([], |r| r.get::<_, String>(0))?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

fn conversion<E>(idx: usize, e: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
}

fn decimal_at(r: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let s: String = r.get(idx)?;
    s.parse::<Decimal>().map_err(|e| conversion(idx, e))
}

fn ts_at(r: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let s: String = r.get(idx)?;
    ts_from_sql(&s).map_err(|e| conversion(idx, e))
}

fn loan_from_row(r: &Row<'_>) -> rusqlite::Result<Loan> {
    let status: String = r.get(8)?;
    Ok(Loan {
        id: r.get(0)?,
        loan_id: r.get(1)?,
        lender: r.get(2)?,
        borrower: r.get(3)?,
        amount: decimal_at(r, 4)?,
        currency: r.get(5)?,
        date_created: ts_at(r, 6)?,
        original_thread: r.get(7)?,
        status: status
            .parse::<LoanStatus>()
            .map_err(|e| conversion(8, e))?,
        amount_repaid: decimal_at(r, 9)?,
        last_updated: ts_at(r, 10)?,
    })
}

fn stats_from_row(r: &Row<'_>) -> rusqlite::Result<UserStats> {
    Ok(UserStats {
        username: r.get(0)?,
        loans_as_borrower: r.get(1)?,
        loans_as_lender: r.get(2)?,
        amount_borrowed: decimal_at(r, 3)?,
        amount_lent: decimal_at(r, 4)?,
        amount_repaid: decimal_at(r, 5)?,
        unpaid_loans: r.get(6)?,
        unpaid_amount: decimal_at(r, 7)?,
        last_updated: ts_at(r, 8)?,
    })
}
