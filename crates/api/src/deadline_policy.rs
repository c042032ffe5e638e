// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Service deadline policy.
//!
//! Enforced at submission time, not while drafting: a draft may carry
//! any deadline, but an order cannot be submitted with one the servers
//! cannot meet.

use thiserror::Error;
use time::{Duration, OffsetDateTime};

/// Deadline policy errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeadlinePolicyError {
    /// The deadline has already passed.
    #[error("Deadline is in the past")]
    InPast,

    /// The deadline is too close to now.
    #[error("Deadline must be at least {min_hours} hours from submission")]
    TooSoon {
        /// The minimum lead time in hours.
        min_hours: i64,
    },
}

/// Deadline policy configuration.
pub struct DeadlinePolicy {
    /// Minimum lead time between submission and the deadline.
    pub min_lead: Duration,
}

impl Default for DeadlinePolicy {
    fn default() -> Self {
        Self {
            min_lead: Duration::hours(4),
        }
    }
}

impl DeadlinePolicy {
    /// Validates a deadline against the policy at a given instant.
    ///
    /// # Errors
    ///
    /// Returns an error if the deadline is in the past or closer than
    /// the minimum lead time.
    pub fn validate(
        &self,
        deadline: OffsetDateTime,
        now: OffsetDateTime,
    ) -> Result<(), DeadlinePolicyError> {
        if deadline <= now {
            return Err(DeadlinePolicyError::InPast);
        }
        if deadline - now < self.min_lead {
            return Err(DeadlinePolicyError::TooSoon {
                min_hours: self.min_lead.whole_hours(),
            });
        }
        Ok(())
    }
}
