// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The pricing engine.
//!
//! Pure and deterministic: the same computation serves live UI previews
//! and server-side validation of submitted totals, so the two can never
//! diverge. Pricing never fails for business-rule reasons; it reports a
//! breakdown for whatever state it is given.

use crate::order::Order;
use crate::recipient::{Assignment, Recipient, ServiceOptions};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Standard rate for personal process service.
pub const PROCESS_SERVICE_RATE: Decimal = dec!(75.00);
/// Standard rate for certified mail service.
pub const CERTIFIED_MAIL_RATE: Decimal = dec!(25.00);
/// Surcharge for rush handling.
pub const RUSH_SERVICE_RATE: Decimal = dec!(50.00);
/// Surcharge for remote locations.
pub const REMOTE_LOCATION_RATE: Decimal = dec!(40.00);
/// Processing fee applied to the order subtotal.
pub const PROCESSING_FEE_RATE: Decimal = dec!(0.03);

/// The price computation for a single recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    /// The base delivery charge. `None` while an automated recipient is
    /// awaiting bid acceptance.
    pub base: Option<Decimal>,
    /// Rush and remote-location surcharges, due immediately regardless of
    /// assignment mode.
    pub add_ons: Decimal,
    /// The amount currently due: base (when resolved) plus add-ons.
    pub due_now: Decimal,
    /// True while the base amount is pending a bid acceptance.
    pub pending_base: bool,
}

/// Order-level payment totals, always recomputed from the recipients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotals {
    /// Sum of every recipient's `due_now`.
    pub subtotal: Decimal,
    /// 3% processing fee on the subtotal, rounded half-up to cents.
    pub processing_fee: Decimal,
    /// Subtotal plus processing fee.
    pub total: Decimal,
    /// True if any recipient's base amount is still pending.
    pub has_pending_base: bool,
}

/// What an edit changed about a recipient's price.
///
/// Pending automated recipients report only the add-on delta, because the
/// base amount is not yet known; recipients with a resolved price report
/// the full before/after totals. The distinction changes what the user is
/// shown as "the change".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PriceChange {
    /// Only the due-now add-on charges moved; the base is still pending.
    AddOnDelta {
        /// Updated due-now minus previous due-now.
        delta: Decimal,
    },
    /// The full recipient charge changed.
    FullTotal {
        /// The previous due-now amount.
        previous: Decimal,
        /// The updated due-now amount.
        updated: Decimal,
    },
}

/// Sums the rush/remote surcharges for a set of service flags.
#[must_use]
pub fn add_on_charges(service: &ServiceOptions) -> Decimal {
    let mut total: Decimal = Decimal::ZERO;
    if service.rush_service {
        total += RUSH_SERVICE_RATE;
    }
    if service.remote_location {
        total += REMOTE_LOCATION_RATE;
    }
    total
}

/// Sums the standard per-flag service method rates.
#[must_use]
pub fn standard_service_charges(service: &ServiceOptions) -> Decimal {
    let mut total: Decimal = Decimal::ZERO;
    if service.process_service {
        total += PROCESS_SERVICE_RATE;
    }
    if service.certified_mail {
        total += CERTIFIED_MAIL_RATE;
    }
    total
}

/// Computes the price breakdown for one recipient.
///
/// - Automated without an accepted bid: the base is pending; only the
///   rush/remote add-ons are due now.
/// - Automated with an accepted bid: the accepted amount is the base.
/// - Guided with a negotiated (or else quoted) price: that price is the
///   authoritative base; the per-flag service rates are not re-derived.
/// - Guided with no server-set price: the base is the sum of the standard
///   per-flag rates.
#[must_use]
pub fn compute_price(recipient: &Recipient) -> PriceBreakdown {
    let add_ons: Decimal = add_on_charges(&recipient.service);

    let base: Option<Decimal> = match &recipient.assignment {
        Assignment::Automated {
            accepted_amount, ..
        } => *accepted_amount,
        Assignment::Guided { .. } => Some(
            recipient
                .assignment
                .guided_price()
                .unwrap_or_else(|| standard_service_charges(&recipient.service)),
        ),
    };

    match base {
        Some(base_amount) => PriceBreakdown {
            base: Some(base_amount),
            add_ons,
            due_now: base_amount + add_ons,
            pending_base: false,
        },
        None => PriceBreakdown {
            base: None,
            add_ons,
            due_now: add_ons,
            pending_base: true,
        },
    }
}

/// Rounds an amount to cents with half-up rounding.
#[must_use]
pub fn round_to_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Computes payment totals for a set of recipients.
///
/// Used directly for draft previews, where no order aggregate exists
/// yet.
#[must_use]
pub fn totals_for(recipients: &[Recipient]) -> OrderTotals {
    let mut subtotal: Decimal = Decimal::ZERO;
    let mut has_pending_base: bool = false;

    for recipient in recipients {
        let breakdown: PriceBreakdown = compute_price(recipient);
        subtotal += breakdown.due_now;
        has_pending_base = has_pending_base || breakdown.pending_base;
    }

    let processing_fee: Decimal = round_to_cents(subtotal * PROCESSING_FEE_RATE);

    OrderTotals {
        subtotal,
        processing_fee,
        total: subtotal + processing_fee,
        has_pending_base,
    }
}

/// Computes the order-level payment totals from its recipients.
#[must_use]
pub fn order_totals(order: &Order) -> OrderTotals {
    totals_for(&order.recipients)
}

/// Describes how an edit moved a recipient's price.
///
/// Recipients whose base is still pending (automated, no accepted bid)
/// report only the add-on fee delta. Recipients that are assigned or
/// further along report the full previous/updated totals.
#[must_use]
pub fn price_change(before: &Recipient, after: &Recipient) -> PriceChange {
    let previous: PriceBreakdown = compute_price(before);
    let updated: PriceBreakdown = compute_price(after);

    if updated.pending_base && after.status.allows_price_edits() {
        PriceChange::AddOnDelta {
            delta: updated.due_now - previous.due_now,
        }
    } else {
        PriceChange::FullTotal {
            previous: previous.due_now,
            updated: updated.due_now,
        }
    }
}
