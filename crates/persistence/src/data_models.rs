// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Serializable storage shapes for audit event components.

use serde::{Deserialize, Serialize};

/// Serializable actor data for audit event storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorData {
    /// The actor's unique identifier.
    pub id: String,
    /// The type of actor.
    pub actor_type: String,
}

/// Serializable cause data for audit event storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CauseData {
    /// The cause's unique identifier.
    pub id: String,
    /// A description of the cause.
    pub description: String,
}

/// Serializable action data for audit event storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionData {
    /// The name of the action.
    pub name: String,
    /// Optional additional details.
    pub details: Option<String>,
}

/// Serializable state snapshot data for audit event storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateSnapshotData {
    /// The snapshot payload.
    pub data: String,
}
