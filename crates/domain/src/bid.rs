// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Bids submitted by process servers against automated recipients.
//!
//! Bids are never deleted; accepted and rejected bids remain as the
//! audit trail of the competitive assignment.

use crate::error::DomainError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::OffsetDateTime;

/// Lifecycle states of a bid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BidStatus {
    /// Awaiting a customer decision.
    #[default]
    Pending,
    /// Accepted; the bidder is bound to the recipient.
    Accepted,
    /// Rejected, explicitly or by another bid's acceptance.
    Rejected,
}

impl BidStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }

    fn parse_str(s: &str) -> Result<Self, DomainError> {
        match s {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            _ => Err(DomainError::InvalidStatus {
                status: s.to_string(),
            }),
        }
    }

    /// Returns true if this status is terminal.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Accepted | Self::Rejected)
    }
}

impl FromStr for BidStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl std::fmt::Display for BidStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A price offer from a process server for one automated recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bid {
    /// Canonical numeric identifier assigned by the persistence layer.
    pub bid_id: Option<i64>,
    /// The order the target recipient belongs to.
    pub order_id: i64,
    /// The recipient this bid is for.
    pub recipient_id: i64,
    /// The bidding process server.
    pub process_server_id: i64,
    /// The offered delivery price.
    pub amount: Decimal,
    /// Optional note from the server to the customer.
    pub comment: Option<String>,
    /// Lifecycle status.
    pub status: BidStatus,
    /// When the bid was submitted.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Bid {
    /// Creates a new pending bid.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidBidAmount` if the amount is not
    /// positive.
    pub fn new(
        order_id: i64,
        recipient_id: i64,
        process_server_id: i64,
        amount: Decimal,
        comment: Option<String>,
        created_at: OffsetDateTime,
    ) -> Result<Self, DomainError> {
        validate_bid_amount(amount)?;
        Ok(Self {
            bid_id: None,
            order_id,
            recipient_id,
            process_server_id,
            amount,
            comment,
            status: BidStatus::Pending,
            created_at,
        })
    }
}

/// Validates that a bid amount is positive.
///
/// # Errors
///
/// Returns `DomainError::InvalidBidAmount` if the amount is zero or
/// negative.
pub fn validate_bid_amount(amount: Decimal) -> Result<(), DomainError> {
    if amount > Decimal::ZERO {
        Ok(())
    } else {
        Err(DomainError::InvalidBidAmount { amount })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn created_at() -> OffsetDateTime {
        OffsetDateTime::UNIX_EPOCH
    }

    #[test]
    fn test_status_string_round_trip() {
        let statuses = vec![BidStatus::Pending, BidStatus::Accepted, BidStatus::Rejected];

        for status in statuses {
            let s = status.as_str();
            match BidStatus::parse_str(s) {
                Ok(parsed) => assert_eq!(status, parsed),
                Err(e) => panic!("Failed to parse status string: {s}: {e}"),
            }
        }
    }

    #[test]
    fn test_terminal_states() {
        assert!(!BidStatus::Pending.is_terminal());
        assert!(BidStatus::Accepted.is_terminal());
        assert!(BidStatus::Rejected.is_terminal());
    }

    #[test]
    fn test_new_bid_is_pending() {
        let bid = Bid::new(1, 2, 3, dec!(85.00), None, created_at());
        match bid {
            Ok(bid) => {
                assert_eq!(bid.status, BidStatus::Pending);
                assert_eq!(bid.bid_id, None);
            }
            Err(e) => panic!("Expected valid bid: {e}"),
        }
    }

    #[test]
    fn test_zero_amount_refused() {
        let result = Bid::new(1, 2, 3, Decimal::ZERO, None, created_at());
        assert!(result.is_err());
    }

    #[test]
    fn test_negative_amount_refused() {
        let result = validate_bid_amount(dec!(-10.00));
        assert!(result.is_err());
    }
}
