// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Order lifecycle states and the derived-status aggregation.
//!
//! Between submission and the first delivery attempt, the order-level
//! status is a pure function of the recipient statuses. It is recomputed
//! on every recipient change and never stored independently of the
//! derivation.

use crate::error::DomainError;
use crate::recipient::{Recipient, RecipientStatus};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Lifecycle states of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Not yet submitted. No order number; fully mutable.
    #[default]
    Draft,
    /// Submitted; no recipient has a bound server yet.
    Open,
    /// At least one automated recipient has received a bid.
    Bidding,
    /// Some, but not all, recipients have a bound server.
    PartiallyAssigned,
    /// Every recipient has a bound server.
    Assigned,
    /// At least one delivery attempt has been recorded.
    InProgress,
    /// Every recipient was successfully served.
    Completed,
    /// Delivery attempts were exhausted on at least one recipient.
    Failed,
    /// Explicitly cancelled by the customer or an admin.
    Cancelled,
}

impl OrderStatus {
    /// Returns the string representation of the status.
    ///
    /// This is used for persistence and API serialization.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Open => "open",
            Self::Bidding => "bidding",
            Self::PartiallyAssigned => "partially_assigned",
            Self::Assigned => "assigned",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }

    fn parse_str(s: &str) -> Result<Self, DomainError> {
        match s {
            "draft" => Ok(Self::Draft),
            "open" => Ok(Self::Open),
            "bidding" => Ok(Self::Bidding),
            "partially_assigned" => Ok(Self::PartiallyAssigned),
            "assigned" => Ok(Self::Assigned),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(DomainError::InvalidStatus {
                status: s.to_string(),
            }),
        }
    }

    /// Returns true if this status is terminal (no further transitions).
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    /// Checks if a transition from this state to another is valid.
    ///
    /// `Cancelled` is reachable from every non-terminal state. The
    /// remaining transitions follow the submission → assignment →
    /// delivery progression.
    #[must_use]
    pub const fn can_transition_to(&self, target: Self) -> bool {
        if matches!(target, Self::Cancelled) {
            return !self.is_terminal();
        }
        matches!(
            (self, target),
            (Self::Draft, Self::Open)
                | (
                    Self::Open,
                    Self::Bidding | Self::PartiallyAssigned | Self::Assigned
                )
                | (Self::Bidding, Self::PartiallyAssigned | Self::Assigned)
                | (Self::PartiallyAssigned, Self::Assigned | Self::InProgress)
                | (Self::Assigned, Self::InProgress)
                | (Self::InProgress, Self::Completed | Self::Failed)
        )
    }

    /// Validates a transition, returning a descriptive error when refused.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidStatusTransition` if the transition is
    /// not permitted by the lifecycle rules.
    pub fn validate_transition(&self, target: Self) -> Result<(), DomainError> {
        if self.is_terminal() {
            return Err(DomainError::InvalidStatusTransition {
                from: self.as_str().to_string(),
                to: target.as_str().to_string(),
                reason: "cannot transition from terminal state".to_string(),
            });
        }
        if self.can_transition_to(target) {
            Ok(())
        } else {
            Err(DomainError::InvalidStatusTransition {
                from: self.as_str().to_string(),
                to: target.as_str().to_string(),
                reason: "transition not permitted by order lifecycle rules".to_string(),
            })
        }
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Derives the order-level status from the recipient statuses.
///
/// This is the single aggregation point: every surface that needs to know
/// whether an order is assigned, partially assigned, in progress, or done
/// calls this function instead of re-deriving the answer locally.
///
/// The derivation only applies to submitted orders; `Draft` and
/// `Cancelled` are decided by explicit operations, never by aggregation.
#[must_use]
pub fn derive_order_status(recipients: &[Recipient]) -> OrderStatus {
    if recipients.is_empty() {
        return OrderStatus::Open;
    }

    let all_completed = recipients
        .iter()
        .all(|r| r.status == RecipientStatus::Completed);
    if all_completed {
        return OrderStatus::Completed;
    }

    let all_terminal = recipients.iter().all(|r| r.status.is_terminal());
    if all_terminal {
        // Mixed terminal outcomes with at least one failure.
        return OrderStatus::Failed;
    }

    let any_started = recipients
        .iter()
        .any(|r| matches!(r.status, RecipientStatus::InProgress) || r.status.is_terminal());
    if any_started {
        return OrderStatus::InProgress;
    }

    let assigned_count = recipients
        .iter()
        .filter(|r| r.status == RecipientStatus::Assigned)
        .count();
    if assigned_count == recipients.len() {
        return OrderStatus::Assigned;
    }
    if assigned_count > 0 {
        return OrderStatus::PartiallyAssigned;
    }

    if recipients
        .iter()
        .any(|r| r.status == RecipientStatus::Bidding)
    {
        return OrderStatus::Bidding;
    }

    OrderStatus::Open
}
