// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod codec;
mod data_models;
mod error;
mod mutations;
mod queries;

#[cfg(test)]
mod tests;

use rusqlite::Connection;
use tracing::info;

use proserve::{State, TransitionResult};
use proserve_domain::{Draft, Order, OrderStatus};

pub use data_models::{ActionData, ActorData, CauseData, StateSnapshotData};
pub use error::PersistenceError;
pub use queries::{OrderSort, StoredAuditEvent};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS drafts (
    draft_id INTEGER PRIMARY KEY AUTOINCREMENT,
    tenant_id INTEGER NOT NULL,
    customer_id INTEGER NOT NULL,
    edit_seq INTEGER NOT NULL DEFAULT 0,
    order_json TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS orders (
    order_id INTEGER PRIMARY KEY AUTOINCREMENT,
    tenant_id INTEGER NOT NULL,
    customer_id INTEGER NOT NULL,
    order_number TEXT NOT NULL UNIQUE,
    case_number TEXT NOT NULL,
    jurisdiction TEXT NOT NULL,
    document_type TEXT NOT NULL,
    deadline TEXT NOT NULL,
    special_instructions TEXT,
    status TEXT NOT NULL,
    created_at TEXT NOT NULL,
    completed_at TEXT
);

CREATE TABLE IF NOT EXISTS recipients (
    recipient_id INTEGER PRIMARY KEY AUTOINCREMENT,
    order_id INTEGER NOT NULL REFERENCES orders (order_id),
    position INTEGER NOT NULL,
    client_ref TEXT,
    name TEXT NOT NULL,
    street_address TEXT NOT NULL,
    city TEXT NOT NULL,
    state_code TEXT NOT NULL,
    zip_code TEXT NOT NULL,
    process_service INTEGER NOT NULL,
    certified_mail INTEGER NOT NULL,
    rush_service INTEGER NOT NULL,
    remote_location INTEGER NOT NULL,
    assignment_json TEXT NOT NULL,
    price_status TEXT NOT NULL,
    final_agreed_price TEXT,
    status TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS bids (
    bid_id INTEGER PRIMARY KEY AUTOINCREMENT,
    order_id INTEGER NOT NULL REFERENCES orders (order_id),
    recipient_id INTEGER NOT NULL REFERENCES recipients (recipient_id),
    process_server_id INTEGER NOT NULL,
    amount TEXT NOT NULL,
    comment TEXT,
    status TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS audit_events (
    event_id INTEGER PRIMARY KEY AUTOINCREMENT,
    tenant_id INTEGER NOT NULL,
    subject TEXT NOT NULL,
    actor_json TEXT NOT NULL,
    cause_json TEXT NOT NULL,
    action_json TEXT NOT NULL,
    before_snapshot_json TEXT NOT NULL,
    after_snapshot_json TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_drafts_tenant ON drafts (tenant_id);
CREATE INDEX IF NOT EXISTS idx_orders_tenant_status ON orders (tenant_id, status);
CREATE INDEX IF NOT EXISTS idx_recipients_order ON recipients (order_id);
CREATE INDEX IF NOT EXISTS idx_bids_recipient ON bids (recipient_id);
CREATE INDEX IF NOT EXISTS idx_audit_events_tenant ON audit_events (tenant_id);
";

/// The ids assigned by the database while persisting a transition.
///
/// At most one draft, one order, and one bid can be created per
/// transition, so a simple receipt is sufficient for callers to learn
/// the canonical ids of what they just created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistReceipt {
    /// The id of the persisted audit event.
    pub event_id: i64,
    /// The id assigned to a newly created draft, if any.
    pub draft_id: Option<i64>,
    /// The id assigned to a newly created order, if any.
    pub order_id: Option<i64>,
    /// The id assigned to a newly created bid, if any.
    pub bid_id: Option<i64>,
}

/// SQLite-backed persistence for drafts, orders, bids, and the audit
/// trail.
///
/// All mutations run in a single transaction per transition: the audit
/// event and the canonical state sync commit together or not at all.
#[derive(Debug)]
pub struct SqlitePersistence {
    conn: Connection,
}

impl SqlitePersistence {
    /// Opens (or creates) a database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be opened or the schema
    /// cannot be initialized.
    pub fn new(path: &str) -> Result<Self, PersistenceError> {
        let conn: Connection = Connection::open(path)
            .map_err(|e| PersistenceError::DatabaseConnectionFailed(e.to_string()))?;
        Self::initialize(conn)
    }

    /// Opens an in-memory database. Used by tests and ephemeral servers.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be opened or the schema
    /// cannot be initialized.
    pub fn in_memory() -> Result<Self, PersistenceError> {
        let conn: Connection = Connection::open_in_memory()
            .map_err(|e| PersistenceError::DatabaseConnectionFailed(e.to_string()))?;
        Self::initialize(conn)
    }

    fn initialize(conn: Connection) -> Result<Self, PersistenceError> {
        conn.pragma_update(None, "foreign_keys", true)
            .map_err(|e| PersistenceError::InitializationError(e.to_string()))?;
        let enabled: i64 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .map_err(|e| PersistenceError::InitializationError(e.to_string()))?;
        if enabled != 1 {
            return Err(PersistenceError::ForeignKeyEnforcementNotEnabled);
        }

        conn.execute_batch(SCHEMA)
            .map_err(|e| PersistenceError::InitializationError(e.to_string()))?;
        info!("Initialized persistence schema");
        Ok(Self { conn })
    }

    /// Persists a transition: the audit event plus the synced canonical
    /// tables, atomically.
    ///
    /// # Errors
    ///
    /// Returns an error if any write fails; nothing is committed in that
    /// case.
    pub fn persist_transition(
        &mut self,
        result: &TransitionResult,
    ) -> Result<PersistReceipt, PersistenceError> {
        let tx = self.conn.transaction()?;

        let event_id: i64 = mutations::persist_audit_event(&tx, &result.audit_event)?;
        let draft_id: Option<i64> = mutations::sync_drafts(&tx, &result.new_state)?;
        let order_id: Option<i64> = mutations::sync_orders(&tx, &result.new_state)?;
        let bid_id: Option<i64> = mutations::sync_bids(&tx, &result.new_state)?;

        tx.commit()?;
        info!(event_id, "Persisted transition");

        Ok(PersistReceipt {
            event_id,
            draft_id,
            order_id,
            bid_id,
        })
    }

    /// Loads the full coordination state for a tenant.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails or a stored value cannot be
    /// reconstructed.
    pub fn load_state(&self, tenant_id: i64) -> Result<State, PersistenceError> {
        queries::load_state(&self.conn, tenant_id)
    }

    /// Loads a draft by id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the draft does not exist.
    pub fn draft_by_id(&self, draft_id: i64) -> Result<Draft, PersistenceError> {
        queries::draft_by_id(&self.conn, draft_id)
    }

    /// Loads an order (with recipients) by id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the order does not exist.
    pub fn order_by_id(&self, order_id: i64) -> Result<Order, PersistenceError> {
        queries::order_by_id(&self.conn, order_id)
    }

    /// Lists a tenant's orders with an optional status filter and an
    /// explicit sort.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub fn list_orders(
        &self,
        tenant_id: i64,
        status: Option<OrderStatus>,
        sort: OrderSort,
    ) -> Result<Vec<Order>, PersistenceError> {
        queries::list_orders(&self.conn, tenant_id, status, sort)
    }

    /// Returns true if an order number is already taken.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn order_number_exists(&self, order_number: &str) -> Result<bool, PersistenceError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM orders WHERE order_number = ?1",
            rusqlite::params![order_number],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Returns the most recent audit events for a tenant, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails or a stored event cannot be
    /// deserialized.
    pub fn audit_timeline(
        &self,
        tenant_id: i64,
        limit: u32,
    ) -> Result<Vec<StoredAuditEvent>, PersistenceError> {
        queries::audit_timeline(&self.conn, tenant_id, limit)
    }
}
