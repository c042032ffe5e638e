// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Conversions between domain values and their stored representations.
//!
//! Timestamps are stored as RFC 3339 strings, money as decimal strings.

use rust_decimal::Decimal;
use std::str::FromStr;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::error::PersistenceError;

/// Formats a timestamp for storage.
///
/// # Errors
///
/// Returns a `SerializationError` if formatting fails.
pub fn format_timestamp(timestamp: OffsetDateTime) -> Result<String, PersistenceError> {
    timestamp
        .format(&Rfc3339)
        .map_err(|e| PersistenceError::SerializationError(e.to_string()))
}

/// Parses a stored timestamp.
///
/// # Errors
///
/// Returns a `ReconstructionError` if the stored string is not a valid
/// RFC 3339 timestamp.
pub fn parse_timestamp(stored: &str) -> Result<OffsetDateTime, PersistenceError> {
    OffsetDateTime::parse(stored, &Rfc3339).map_err(|e| {
        PersistenceError::ReconstructionError(format!("invalid timestamp '{stored}': {e}"))
    })
}

/// Parses a stored decimal amount.
///
/// # Errors
///
/// Returns a `ReconstructionError` if the stored string is not a valid
/// decimal.
pub fn parse_decimal(stored: &str) -> Result<Decimal, PersistenceError> {
    Decimal::from_str(stored).map_err(|e| {
        PersistenceError::ReconstructionError(format!("invalid amount '{stored}': {e}"))
    })
}
