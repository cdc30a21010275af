/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Serializable types for graph persistence.

use serde::{Deserialize, Serialize};

/// Persisted card node.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PersistedNode {
    /// Stable node identity.
    pub node_id: String,
    pub title: String,
    pub content: String,
    pub position_x: f32,
    pub position_y: f32,
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub pinned: bool,
    pub tags: Vec<String>,
    pub created_at_secs: u64,
    pub updated_at_secs: u64,
    /// First ancestor in a duplication chain, when this card is a copy.
    pub copy_ref: Option<String>,
    pub original_created_at_secs: Option<u64>,
}

/// Persisted synapse. Orientation is preserved even though traversal treats
/// synapses as undirected.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PersistedSynapse {
    pub source_id: String,
    pub target_id: String,
    pub similarity: Option<f32>,
}

/// Full-graph snapshot shape handed to external stores.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct PersistedGraph {
    pub nodes: Vec<PersistedNode>,
    pub synapses: Vec<PersistedSynapse>,
    pub timestamp_secs: u64,
}
