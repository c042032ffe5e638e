// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Recipients: the per-destination service configuration within an order.

use crate::error::DomainError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Lifecycle states of a single recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RecipientStatus {
    /// Awaiting assignment; no bids received.
    #[default]
    Open,
    /// Automated recipient with at least one pending bid.
    Bidding,
    /// A process server is bound to this recipient.
    Assigned,
    /// At least one delivery attempt has been recorded.
    InProgress,
    /// Successfully served.
    Completed,
    /// Delivery attempts exhausted.
    Failed,
}

impl RecipientStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Bidding => "bidding",
            Self::Assigned => "assigned",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    fn parse_str(s: &str) -> Result<Self, DomainError> {
        match s {
            "open" => Ok(Self::Open),
            "bidding" => Ok(Self::Bidding),
            "assigned" => Ok(Self::Assigned),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            _ => Err(DomainError::InvalidStatus {
                status: s.to_string(),
            }),
        }
    }

    /// Returns true if this status is terminal.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Returns true while price-affecting fields may still be edited.
    ///
    /// Once a server is bound (or delivery has begun), the agreed price is
    /// settled and service or assignment changes are refused.
    #[must_use]
    pub const fn allows_price_edits(&self) -> bool {
        matches!(self, Self::Open | Self::Bidding)
    }
}

impl FromStr for RecipientStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl std::fmt::Display for RecipientStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Service add-on and method flags for a recipient.
///
/// `process_service` and `certified_mail` are independent service methods;
/// at least one must be selected for a recipient to be submittable. Both
/// may be selected and both are billed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServiceOptions {
    /// Personal process service.
    pub process_service: bool,
    /// Service by certified mail.
    pub certified_mail: bool,
    /// Expedited handling surcharge.
    pub rush_service: bool,
    /// Remote location surcharge.
    pub remote_location: bool,
}

impl ServiceOptions {
    /// Returns true if at least one service method is selected.
    #[must_use]
    pub const fn has_service_method(&self) -> bool {
        self.process_service || self.certified_mail
    }
}

/// How a recipient gets its process server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentMode {
    /// Open bidding; the server is chosen via competitive bid acceptance.
    Automated,
    /// Direct assignment; the customer selects a specific server up front.
    Guided,
}

impl AssignmentMode {
    /// Returns the string representation of the mode.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Automated => "automated",
            Self::Guided => "guided",
        }
    }

    /// Parses a mode from its string representation.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidAssignmentMode` if the string is not a
    /// valid mode.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s {
            "automated" => Ok(Self::Automated),
            "guided" => Ok(Self::Guided),
            _ => Err(DomainError::InvalidAssignmentMode {
                mode: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for AssignmentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Assignment state for a recipient.
///
/// The two modes carry different fields: an automated recipient holds the
/// accepted-bid outcome (empty until a bid is accepted), a guided
/// recipient holds the customer's server selection and any server-set
/// price. Mode-specific required fields are enforced by this shape rather
/// than by ad hoc validation of optional columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Assignment {
    /// Open bidding.
    Automated {
        /// The winning process server, set only by bid acceptance.
        accepted_server_id: Option<i64>,
        /// The accepted bid amount, set only by bid acceptance.
        accepted_amount: Option<Decimal>,
    },
    /// Direct assignment.
    Guided {
        /// The process server chosen by the customer.
        assigned_server_id: Option<i64>,
        /// A price quoted by the server, if any.
        quoted_price: Option<Decimal>,
        /// A price negotiated with the server; takes precedence over the
        /// quoted price.
        negotiated_price: Option<Decimal>,
    },
}

impl Assignment {
    /// Creates a fresh automated assignment with no accepted bid.
    #[must_use]
    pub const fn new_automated() -> Self {
        Self::Automated {
            accepted_server_id: None,
            accepted_amount: None,
        }
    }

    /// Creates a fresh guided assignment with no server selected.
    #[must_use]
    pub const fn new_guided() -> Self {
        Self::Guided {
            assigned_server_id: None,
            quoted_price: None,
            negotiated_price: None,
        }
    }

    /// Returns the assignment mode.
    #[must_use]
    pub const fn mode(&self) -> AssignmentMode {
        match self {
            Self::Automated { .. } => AssignmentMode::Automated,
            Self::Guided { .. } => AssignmentMode::Guided,
        }
    }

    /// Returns the bound server id, regardless of mode.
    #[must_use]
    pub const fn assigned_server_id(&self) -> Option<i64> {
        match self {
            Self::Automated {
                accepted_server_id, ..
            } => *accepted_server_id,
            Self::Guided {
                assigned_server_id, ..
            } => *assigned_server_id,
        }
    }

    /// Returns the server-set price for a guided assignment: the
    /// negotiated price when present, otherwise the quoted price.
    #[must_use]
    pub const fn guided_price(&self) -> Option<Decimal> {
        match self {
            Self::Automated { .. } => None,
            Self::Guided {
                quoted_price,
                negotiated_price,
                ..
            } => match negotiated_price {
                Some(p) => Some(*p),
                None => *quoted_price,
            },
        }
    }
}

impl Default for Assignment {
    fn default() -> Self {
        Self::new_automated()
    }
}

/// Pricing agreement state for a recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PriceStatus {
    /// No price has been quoted or agreed.
    #[default]
    Unset,
    /// A server has quoted a price.
    Quoted,
    /// The customer and server are negotiating.
    Negotiating,
    /// A price has been agreed and is final.
    Accepted,
}

impl PriceStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unset => "unset",
            Self::Quoted => "quoted",
            Self::Negotiating => "negotiating",
            Self::Accepted => "accepted",
        }
    }

    fn parse_str(s: &str) -> Result<Self, DomainError> {
        match s {
            "unset" => Ok(Self::Unset),
            "quoted" => Ok(Self::Quoted),
            "negotiating" => Ok(Self::Negotiating),
            "accepted" => Ok(Self::Accepted),
            _ => Err(DomainError::InvalidStatus {
                status: s.to_string(),
            }),
        }
    }
}

impl FromStr for PriceStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl std::fmt::Display for PriceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single delivery/service destination within an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    /// Canonical numeric identifier assigned by the persistence layer.
    /// `None` for recipients that only exist in a draft.
    pub recipient_id: Option<i64>,
    /// Client-held temporary correlation id for not-yet-persisted
    /// recipients.
    pub client_ref: Option<String>,
    /// The person or entity to be served.
    pub name: String,
    /// Street address.
    pub street_address: String,
    /// City.
    pub city: String,
    /// Two-letter state code.
    pub state_code: String,
    /// ZIP code.
    pub zip_code: String,
    /// Service method and add-on flags.
    pub service: ServiceOptions,
    /// Assignment mode and mode-specific state.
    pub assignment: Assignment,
    /// Pricing agreement state.
    pub price_status: PriceStatus,
    /// The final agreed charge for this recipient, resolved at assignment.
    pub final_agreed_price: Option<Decimal>,
    /// Lifecycle status.
    pub status: RecipientStatus,
}

impl Recipient {
    /// Creates a new empty recipient with the defaults used when a
    /// recipient is added to a draft: automated assignment, all service
    /// flags off, no price.
    #[must_use]
    pub fn new(client_ref: Option<String>) -> Self {
        Self {
            recipient_id: None,
            client_ref,
            name: String::new(),
            street_address: String::new(),
            city: String::new(),
            state_code: String::new(),
            zip_code: String::new(),
            service: ServiceOptions::default(),
            assignment: Assignment::new_automated(),
            price_status: PriceStatus::Unset,
            final_agreed_price: None,
            status: RecipientStatus::Open,
        }
    }

    /// A human-readable reference for error messages: the name when set,
    /// otherwise the client ref, otherwise the persisted id.
    #[must_use]
    pub fn display_ref(&self) -> String {
        if !self.name.is_empty() {
            return self.name.clone();
        }
        if let Some(client_ref) = &self.client_ref {
            return client_ref.clone();
        }
        self.recipient_id
            .map_or_else(|| String::from("<unnamed>"), |id| format!("recipient {id}"))
    }

    /// Validates the service method invariant.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::MissingServiceMethod` if neither process
    /// service nor certified mail is selected.
    pub fn validate_service_method(&self) -> Result<(), DomainError> {
        if self.service.has_service_method() {
            Ok(())
        } else {
            Err(DomainError::MissingServiceMethod {
                recipient: self.display_ref(),
            })
        }
    }

    /// Validates everything required for this recipient to leave draft:
    /// the service method invariant, a non-empty name, a selected server
    /// for guided mode, and no bound server for automated mode.
    ///
    /// # Errors
    ///
    /// Returns the first violated rule as a `DomainError`.
    pub fn validate_for_submission(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::InvalidRecipientName(String::from(
                "recipient name must not be empty",
            )));
        }
        self.validate_service_method()?;
        match &self.assignment {
            Assignment::Guided {
                assigned_server_id, ..
            } => {
                if assigned_server_id.is_none() {
                    return Err(DomainError::MissingAssignedServer {
                        recipient: self.display_ref(),
                    });
                }
            }
            Assignment::Automated {
                accepted_server_id, ..
            } => {
                if accepted_server_id.is_some() {
                    return Err(DomainError::ServerBoundOutsideBidding {
                        recipient: self.display_ref(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Switches the assignment mode, clearing mode-specific state.
    ///
    /// Switching to guided discards any automated bid outcome; switching
    /// to automated discards the selected server and any quoted or
    /// negotiated price. Switching to the current mode is a no-op.
    pub fn set_assignment_mode(&mut self, mode: AssignmentMode) {
        if self.assignment.mode() == mode {
            return;
        }
        self.assignment = match mode {
            AssignmentMode::Automated => Assignment::new_automated(),
            AssignmentMode::Guided => Assignment::new_guided(),
        };
        self.price_status = PriceStatus::Unset;
        self.final_agreed_price = None;
    }

    /// Records the customer's server choice on a guided recipient.
    ///
    /// No bid is created; guided assignment bypasses bidding entirely.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ServerSelectionRequiresGuidedMode` if the
    /// recipient is not in guided mode.
    pub fn select_server(&mut self, server_id: i64) -> Result<(), DomainError> {
        match &mut self.assignment {
            Assignment::Guided {
                assigned_server_id, ..
            } => {
                *assigned_server_id = Some(server_id);
                Ok(())
            }
            Assignment::Automated { .. } => Err(DomainError::ServerSelectionRequiresGuidedMode {
                recipient: self.display_ref(),
            }),
        }
    }
}

/// A partial update to a recipient.
///
/// Unset fields are left unchanged. Assignment-related fields interact:
/// a mode switch is applied first (with its clearing semantics), then any
/// server selection or price fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientPatch {
    /// The persisted recipient this patch targets.
    pub recipient_id: Option<i64>,
    /// New name.
    pub name: Option<String>,
    /// New street address.
    pub street_address: Option<String>,
    /// New city.
    pub city: Option<String>,
    /// New state code.
    pub state_code: Option<String>,
    /// New ZIP code.
    pub zip_code: Option<String>,
    /// Replacement service flags.
    pub service: Option<ServiceOptions>,
    /// Assignment mode switch.
    pub assignment_mode: Option<AssignmentMode>,
    /// Server selection (guided mode only).
    pub assigned_server_id: Option<i64>,
    /// Quoted price (guided mode only).
    pub quoted_price: Option<Decimal>,
    /// Negotiated price (guided mode only).
    pub negotiated_price: Option<Decimal>,
}

impl RecipientPatch {
    /// Returns true if this patch touches any price-affecting field:
    /// service flags, assignment mode, server selection, or prices.
    #[must_use]
    pub const fn is_price_affecting(&self) -> bool {
        self.service.is_some()
            || self.assignment_mode.is_some()
            || self.assigned_server_id.is_some()
            || self.quoted_price.is_some()
            || self.negotiated_price.is_some()
    }

    /// Applies this patch to a recipient, producing the updated recipient.
    ///
    /// The service method invariant is re-validated after the merge; a
    /// patch that would violate it fails and nothing is applied.
    ///
    /// # Errors
    ///
    /// Returns a `DomainError` if the merged recipient violates the
    /// service method invariant or if guided-only fields are patched onto
    /// an automated recipient.
    pub fn apply_to(&self, recipient: &Recipient) -> Result<Recipient, DomainError> {
        let mut updated: Recipient = recipient.clone();

        if let Some(name) = &self.name {
            updated.name.clone_from(name);
        }
        if let Some(street_address) = &self.street_address {
            updated.street_address.clone_from(street_address);
        }
        if let Some(city) = &self.city {
            updated.city.clone_from(city);
        }
        if let Some(state_code) = &self.state_code {
            updated.state_code.clone_from(state_code);
        }
        if let Some(zip_code) = &self.zip_code {
            updated.zip_code.clone_from(zip_code);
        }
        if let Some(service) = self.service {
            updated.service = service;
        }
        if let Some(mode) = self.assignment_mode {
            updated.set_assignment_mode(mode);
        }
        if let Some(server_id) = self.assigned_server_id {
            updated.select_server(server_id)?;
        }
        if self.quoted_price.is_some() || self.negotiated_price.is_some() {
            match &mut updated.assignment {
                Assignment::Guided {
                    quoted_price,
                    negotiated_price,
                    ..
                } => {
                    if let Some(price) = self.quoted_price {
                        *quoted_price = Some(price);
                        if updated.price_status == PriceStatus::Unset {
                            updated.price_status = PriceStatus::Quoted;
                        }
                    }
                    if let Some(price) = self.negotiated_price {
                        *negotiated_price = Some(price);
                        updated.price_status = PriceStatus::Negotiating;
                    }
                }
                Assignment::Automated { .. } => {
                    return Err(DomainError::ServerSelectionRequiresGuidedMode {
                        recipient: updated.display_ref(),
                    });
                }
            }
        }

        updated.validate_service_method()?;
        Ok(updated)
    }
}
