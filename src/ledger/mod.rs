//! Donation/request ledger.
//!
//! Every mutating operation checks the actor's role and ownership first, then
//! runs inside a single transaction. Guards on ledger state are expressed as
//! compare-and-set updates (`... WHERE status = ?`) so a concurrent writer can
//! never slip between the check and the write. Request transactions open with
//! `BEGIN IMMEDIATE`, so concurrent writers queue on the busy timeout instead
//! of failing a lock upgrade. Any early return drops the transaction, which
//! rolls it back.

use sqlx::SqlitePool;

pub mod donations;
pub mod reports;
pub mod requests;

#[derive(Debug, Clone, Copy, Default)]
pub struct LedgerPolicy {
    /// Block NGOs that an admin has not approved yet from requesting donations.
    pub require_ngo_approval: bool,
}

#[derive(Debug, Clone)]
pub struct Ledger {
    pool: SqlitePool,
    policy: LedgerPolicy,
}

impl Ledger {
    pub fn new(pool: SqlitePool, policy: LedgerPolicy) -> Self {
        Self { pool, policy }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
