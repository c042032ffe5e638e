// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use proserve_audit::{AuditEvent, StateSnapshot};
use proserve_domain::{Bid, BidStatus, Draft, Order};

/// The complete coordination state scoped to a single tenant.
///
/// The state is immutable from the caller's point of view: transitions
/// consume a reference and produce a fresh state, so a failed operation
/// leaves no partial mutation behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State {
    /// The tenant this state is scoped to.
    pub tenant_id: i64,
    /// All live drafts for this tenant.
    pub drafts: Vec<Draft>,
    /// All submitted orders for this tenant.
    pub orders: Vec<Order>,
    /// All bids across the tenant's orders. Bids are never removed.
    pub bids: Vec<Bid>,
}

impl State {
    /// Creates a new empty state for a tenant.
    #[must_use]
    pub const fn new(tenant_id: i64) -> Self {
        Self {
            tenant_id,
            drafts: Vec::new(),
            orders: Vec::new(),
            bids: Vec::new(),
        }
    }

    /// Looks up a draft by its persisted id.
    #[must_use]
    pub fn draft_by_id(&self, draft_id: i64) -> Option<&Draft> {
        self.drafts.iter().find(|d| d.draft_id == Some(draft_id))
    }

    /// Looks up an order by its persisted id.
    #[must_use]
    pub fn order_by_id(&self, order_id: i64) -> Option<&Order> {
        self.orders.iter().find(|o| o.order_id == Some(order_id))
    }

    /// Looks up a bid by its persisted id.
    #[must_use]
    pub fn bid_by_id(&self, bid_id: i64) -> Option<&Bid> {
        self.bids.iter().find(|b| b.bid_id == Some(bid_id))
    }

    /// Returns all bids targeting a recipient, in submission order.
    #[must_use]
    pub fn bids_for_recipient(&self, recipient_id: i64) -> Vec<&Bid> {
        self.bids
            .iter()
            .filter(|b| b.recipient_id == recipient_id)
            .collect()
    }

    /// Returns true if a process server already has a pending bid on the
    /// recipient.
    #[must_use]
    pub fn has_pending_bid(&self, recipient_id: i64, process_server_id: i64) -> bool {
        self.bids.iter().any(|b| {
            b.recipient_id == recipient_id
                && b.process_server_id == process_server_id
                && b.status == BidStatus::Pending
        })
    }

    /// Converts the state to a snapshot for audit purposes.
    #[must_use]
    pub fn to_snapshot(&self) -> StateSnapshot {
        StateSnapshot::new(format!(
            "tenant={},drafts={},orders={},bids={}",
            self.tenant_id,
            self.drafts.len(),
            self.orders.len(),
            self.bids.len()
        ))
    }
}

/// The result of a successful state transition.
///
/// Transitions are atomic: they either succeed completely or fail
/// without side effects. No intermediate state is observable where, for
/// example, a bid is accepted but its recipient is not yet bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    /// The new state after the transition.
    pub new_state: State,
    /// The audit event recording this transition.
    pub audit_event: AuditEvent,
}
