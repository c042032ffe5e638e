// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Authorization types and services.
//!
//! Identity itself is resolved by the external auth collaborator; the
//! API layer receives a pre-validated `AuthenticatedActor` and never
//! parses tokens. This module decides what that actor may do.

use proserve_audit::Actor;

use crate::error::AuthError;

/// Actor roles for authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// A customer: creates drafts, submits orders, decides bids, and
    /// edits their own orders.
    Customer,
    /// A process server: bids on automated recipients and records
    /// delivery attempts on recipients bound to them.
    ProcessServer,
    /// A tenant admin: full authority over the tenant's orders.
    Admin,
}

impl Role {
    /// Returns the string representation of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::ProcessServer => "process_server",
            Self::Admin => "admin",
        }
    }

    /// Parses a role from its string representation.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::AuthenticationFailed` if the string is not a
    /// known role.
    pub fn parse(s: &str) -> Result<Self, AuthError> {
        match s {
            "customer" => Ok(Self::Customer),
            "process_server" => Ok(Self::ProcessServer),
            "admin" => Ok(Self::Admin),
            _ => Err(AuthError::AuthenticationFailed {
                reason: format!("unknown role '{s}'"),
            }),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A pre-validated identity: who is acting, in which tenant, and as
/// what role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedActor {
    /// The acting customer, server, or admin id.
    pub subject_id: i64,
    /// The tenant the actor belongs to.
    pub tenant_id: i64,
    /// The actor's role.
    pub role: Role,
}

impl AuthenticatedActor {
    /// Creates a new authenticated actor.
    #[must_use]
    pub const fn new(subject_id: i64, tenant_id: i64, role: Role) -> Self {
        Self {
            subject_id,
            tenant_id,
            role,
        }
    }

    /// Converts this authenticated actor into an audit Actor.
    #[must_use]
    pub fn to_audit_actor(&self) -> Actor {
        Actor::new(self.subject_id.to_string(), self.role.as_str().to_string())
    }
}

/// Authorization service for enforcing role-based access control.
///
/// One function per protected action, so every edit surface consults the
/// same rules.
pub struct AuthorizationService;

impl AuthorizationService {
    /// Checks if an actor may create a draft.
    ///
    /// Customers and admins may create drafts.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is a process server.
    pub fn authorize_create_draft(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        match actor.role {
            Role::Customer | Role::Admin => Ok(()),
            Role::ProcessServer => Err(AuthError::Unauthorized {
                action: String::from("create_draft"),
                reason: String::from("requires Customer or Admin role"),
            }),
        }
    }

    /// Checks if an actor may save, discard, or submit a draft.
    ///
    /// Admins may manage any draft in their tenant; customers only their
    /// own.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is a process server or a customer
    /// who does not own the draft.
    pub fn authorize_manage_draft(
        actor: &AuthenticatedActor,
        action: &str,
        owner_customer_id: i64,
    ) -> Result<(), AuthError> {
        match actor.role {
            Role::Admin => Ok(()),
            Role::Customer => {
                if actor.subject_id == owner_customer_id {
                    Ok(())
                } else {
                    Err(AuthError::Unauthorized {
                        action: action.to_string(),
                        reason: String::from("draft belongs to another customer"),
                    })
                }
            }
            Role::ProcessServer => Err(AuthError::Unauthorized {
                action: action.to_string(),
                reason: String::from("requires Customer or Admin role"),
            }),
        }
    }

    /// Checks if an actor may update or cancel an order.
    ///
    /// Admins may act on any order in their tenant; customers only on
    /// their own.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor lacks authority over the order.
    pub fn authorize_modify_order(
        actor: &AuthenticatedActor,
        action: &str,
        owner_customer_id: i64,
    ) -> Result<(), AuthError> {
        match actor.role {
            Role::Admin => Ok(()),
            Role::Customer => {
                if actor.subject_id == owner_customer_id {
                    Ok(())
                } else {
                    Err(AuthError::Unauthorized {
                        action: action.to_string(),
                        reason: String::from("order belongs to another customer"),
                    })
                }
            }
            Role::ProcessServer => Err(AuthError::Unauthorized {
                action: action.to_string(),
                reason: String::from("requires Customer or Admin role"),
            }),
        }
    }

    /// Checks if an actor may accept or reject a bid.
    ///
    /// The decision belongs to the ordering customer (or an admin); the
    /// bidding server cannot decide its own bid.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor lacks authority over the order.
    pub fn authorize_decide_bid(
        actor: &AuthenticatedActor,
        action: &str,
        owner_customer_id: i64,
    ) -> Result<(), AuthError> {
        Self::authorize_modify_order(actor, action, owner_customer_id)
    }

    /// Checks if an actor may submit a bid.
    ///
    /// Only process servers bid.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is not a process server.
    pub fn authorize_submit_bid(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        match actor.role {
            Role::ProcessServer => Ok(()),
            Role::Customer | Role::Admin => Err(AuthError::Unauthorized {
                action: String::from("submit_bid"),
                reason: String::from("requires ProcessServer role"),
            }),
        }
    }

    /// Checks if an actor may confirm a guided assignment.
    ///
    /// Admins may confirm any; a process server only an assignment that
    /// selects them.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor lacks authority over the
    /// assignment.
    pub fn authorize_confirm_assignment(
        actor: &AuthenticatedActor,
        selected_server_id: Option<i64>,
    ) -> Result<(), AuthError> {
        match actor.role {
            Role::Admin => Ok(()),
            Role::ProcessServer => {
                if selected_server_id == Some(actor.subject_id) {
                    Ok(())
                } else {
                    Err(AuthError::Unauthorized {
                        action: String::from("confirm_assignment"),
                        reason: String::from("assignment selects a different server"),
                    })
                }
            }
            Role::Customer => Err(AuthError::Unauthorized {
                action: String::from("confirm_assignment"),
                reason: String::from("requires ProcessServer or Admin role"),
            }),
        }
    }

    /// Checks if an actor may record a delivery attempt.
    ///
    /// Admins may record attempts on any recipient; a process server
    /// only on recipients bound to them.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor lacks authority over the recipient.
    pub fn authorize_record_attempt(
        actor: &AuthenticatedActor,
        bound_server_id: Option<i64>,
    ) -> Result<(), AuthError> {
        match actor.role {
            Role::Admin => Ok(()),
            Role::ProcessServer => {
                if bound_server_id == Some(actor.subject_id) {
                    Ok(())
                } else {
                    Err(AuthError::Unauthorized {
                        action: String::from("record_delivery_attempt"),
                        reason: String::from("recipient is bound to a different server"),
                    })
                }
            }
            Role::Customer => Err(AuthError::Unauthorized {
                action: String::from("record_delivery_attempt"),
                reason: String::from("requires ProcessServer or Admin role"),
            }),
        }
    }
}
