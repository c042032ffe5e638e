// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Interfaces to external collaborators.
//!
//! Geography lookup and document storage are separate systems; the core
//! only consumes these narrow interfaces and never implements them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ApiError;

/// Errors reported by an external collaborator.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CollaboratorError {
    /// The collaborator could not be reached.
    #[error("Collaborator unavailable: {0}")]
    Unavailable(String),

    /// The collaborator rejected or failed the request.
    #[error("Collaborator request failed: {0}")]
    RequestFailed(String),
}

impl From<CollaboratorError> for ApiError {
    fn from(err: CollaboratorError) -> Self {
        Self::Internal {
            message: err.to_string(),
        }
    }
}

/// A state as returned by the geography service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateInfo {
    /// The state's canonical identifier.
    pub state_id: i64,
    /// The two-letter state code.
    pub code: String,
    /// The state's display name.
    pub name: String,
}

/// A city as returned by the geography service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityInfo {
    /// The city's canonical identifier.
    pub city_id: i64,
    /// The city's display name.
    pub name: String,
}

/// A document stored by the document store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredDocument {
    /// Where the stored document can be retrieved.
    pub url: String,
    /// The number of pages counted during ingestion.
    pub page_count: u32,
}

/// State and city lookup for address entry.
pub trait GeographyService {
    /// Returns the list of known states.
    ///
    /// # Errors
    ///
    /// Returns a `CollaboratorError` if the lookup fails.
    fn states_list(&self) -> Result<Vec<StateInfo>, CollaboratorError>;

    /// Returns the cities of a state.
    ///
    /// # Errors
    ///
    /// Returns a `CollaboratorError` if the lookup fails.
    fn cities_by_state(&self, state_id: i64) -> Result<Vec<CityInfo>, CollaboratorError>;
}

/// Storage for served-document uploads.
pub trait DocumentStore {
    /// Stores a document for an owner and returns its location and page
    /// count.
    ///
    /// # Errors
    ///
    /// Returns a `CollaboratorError` if storage fails.
    fn upload_document(
        &self,
        owner_id: i64,
        file_name: &str,
        content: &[u8],
    ) -> Result<StoredDocument, CollaboratorError>;
}
