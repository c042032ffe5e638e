// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use crate::deadline_policy::DeadlinePolicyError;
use proserve::CoreError;
use proserve_domain::DomainError;
use proserve_persistence::PersistenceError;

/// Authentication and authorization errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// Why the actor may not perform it.
        reason: String,
    },
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized { action, reason } => {
                write!(f, "Unauthorized: '{action}': {reason}")
            }
        }
    }
}

impl std::error::Error for AuthError {}

/// API-level errors.
///
/// These are distinct from domain/core errors and represent the API
/// contract: validation failures, conflicts, missing resources, and
/// authorization denials, never leaked internals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed - the actor does not have permission.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// Why the actor may not perform it.
        reason: String,
    },
    /// A domain rule was violated.
    ValidationFailed {
        /// The rule that was violated.
        rule: String,
        /// A human-readable description of the violation.
        message: String,
    },
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// The state changed concurrently and the operation was refused.
    Conflict {
        /// A human-readable description of the conflict.
        message: String,
    },
    /// A requested resource was not found.
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized { action, reason } => {
                write!(f, "Unauthorized: '{action}': {reason}")
            }
            Self::ValidationFailed { rule, message } => {
                write!(f, "Validation failed ({rule}): {message}")
            }
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::Conflict { message } => write!(f, "Conflict: {message}"),
            Self::ResourceNotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::Internal { message } => write!(f, "Internal error: {message}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationFailed { reason } => Self::AuthenticationFailed { reason },
            AuthError::Unauthorized { action, reason } => Self::Unauthorized { action, reason },
        }
    }
}

impl From<DeadlinePolicyError> for ApiError {
    fn from(err: DeadlinePolicyError) -> Self {
        Self::InvalidInput {
            field: String::from("deadline"),
            message: err.to_string(),
        }
    }
}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked
/// directly.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    match err {
        DomainError::MissingServiceMethod { .. } => ApiError::ValidationFailed {
            rule: String::from("service_method_required"),
            message: err.to_string(),
        },
        DomainError::MissingAssignedServer { .. } => ApiError::ValidationFailed {
            rule: String::from("guided_server_required"),
            message: err.to_string(),
        },
        DomainError::ServerBoundOutsideBidding { .. } => ApiError::ValidationFailed {
            rule: String::from("automated_unbound_until_acceptance"),
            message: err.to_string(),
        },
        DomainError::ServerSelectionRequiresGuidedMode { .. } => ApiError::ValidationFailed {
            rule: String::from("guided_only_fields"),
            message: err.to_string(),
        },
        DomainError::EmptyRecipients => ApiError::ValidationFailed {
            rule: String::from("recipients_required"),
            message: err.to_string(),
        },
        DomainError::OrderNumberAlreadyAssigned { .. } => ApiError::ValidationFailed {
            rule: String::from("draft_unnumbered"),
            message: err.to_string(),
        },
        DomainError::InvalidCaseNumber(msg) => ApiError::InvalidInput {
            field: String::from("case_number"),
            message: msg,
        },
        DomainError::InvalidRecipientName(msg) => ApiError::InvalidInput {
            field: String::from("name"),
            message: msg,
        },
        DomainError::InvalidBidAmount { .. } => ApiError::InvalidInput {
            field: String::from("amount"),
            message: err.to_string(),
        },
        DomainError::RecipientPatchMissingId => ApiError::InvalidInput {
            field: String::from("recipient_id"),
            message: err.to_string(),
        },
        DomainError::InvalidStatus { .. } => ApiError::InvalidInput {
            field: String::from("status"),
            message: err.to_string(),
        },
        DomainError::InvalidAssignmentMode { .. } => ApiError::InvalidInput {
            field: String::from("assignment_mode"),
            message: err.to_string(),
        },
        DomainError::RecipientNotFound { recipient_id } => ApiError::ResourceNotFound {
            resource_type: String::from("Recipient"),
            message: format!("Recipient {recipient_id} does not exist on the order"),
        },
        DomainError::InvalidStatusTransition { .. }
        | DomainError::NotADraft { .. }
        | DomainError::DuplicatePendingBid { .. } => ApiError::Conflict {
            message: err.to_string(),
        },
    }
}

/// Translates a core error into an API error.
///
/// This translation is explicit and ensures core errors are not leaked
/// directly.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
        CoreError::Conflict { reason } => ApiError::Conflict { message: reason },
        CoreError::NotFound { resource } => ApiError::ResourceNotFound {
            resource_type: String::from("Resource"),
            message: resource,
        },
    }
}

/// Translates a persistence error into an API error.
///
/// Storage internals are collapsed into `Internal`; only not-found and
/// uniqueness violations surface with their own shape.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError) -> ApiError {
    match err {
        PersistenceError::NotFound(msg) => ApiError::ResourceNotFound {
            resource_type: String::from("Resource"),
            message: msg,
        },
        PersistenceError::UniqueViolation(msg) => ApiError::Conflict { message: msg },
        other => ApiError::Internal {
            message: other.to_string(),
        },
    }
}
