/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Graph data structures for the spatial card canvas.
//!
//! Core structures:
//! - `Graph`: canonical node map + synapse list
//! - `Node`: a placeable card with position, pin/selection flags, and tags
//! - `Synapse`: a directed associative edge, treated as undirected by traversal
//!
//! Boundary: `selected` and `scope_degree` on `Node` are derived caches owned
//! by the app layer. Callers outside `CanvasApp` treat them as read-only.

use euclid::default::Point2D;
use std::collections::HashMap;
use std::time::SystemTime;
use uuid::Uuid;

use crate::persistence::types::{PersistedGraph, PersistedNode, PersistedSynapse};

/// Stable node identity.
pub type NodeId = Uuid;

/// Default card width when a node carries no explicit width.
pub const DEFAULT_CARD_WIDTH: f32 = 250.0;

/// Default card height when a node carries no explicit height.
pub const DEFAULT_CARD_HEIGHT: f32 = 120.0;

/// A card node on the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Stable node identity.
    pub id: NodeId,

    /// Card title (opaque payload to the graph engine).
    pub title: String,

    /// Card body content (opaque payload to the graph engine).
    pub content: String,

    /// Position in world space.
    pub position: Point2D<f32>,

    /// Explicit card width; `extent()` applies the default when absent.
    pub width: Option<f32>,

    /// Explicit card height; `extent()` applies the default when absent.
    pub height: Option<f32>,

    /// Whether this node is excluded from group-drag translation.
    pub pinned: bool,

    /// Derived selection flag; the selection set is the source of truth.
    pub selected: bool,

    /// Transient scope annotation (shortest distance >= 1 from the base
    /// selection). Cleared and reassigned on every scope computation.
    pub scope_degree: Option<u32>,

    /// Insertion-ordered tags, no duplicates per node.
    pub tags: Vec<String>,

    /// Creation timestamp.
    pub created_at: SystemTime,

    /// Last mutation timestamp.
    pub updated_at: SystemTime,

    /// First ancestor in a duplication chain (chains collapse to one hop).
    pub copy_ref: Option<NodeId>,

    /// Creation timestamp of the first ancestor, threaded through copies.
    pub original_created_at: Option<SystemTime>,
}

impl Node {
    /// Create a new card at a position with fresh identity and timestamps.
    pub fn new(title: String, content: String, position: Point2D<f32>) -> Self {
        let now = SystemTime::now();
        Self {
            id: Uuid::new_v4(),
            title,
            content,
            position,
            width: None,
            height: None,
            pinned: false,
            selected: false,
            scope_degree: None,
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
            copy_ref: None,
            original_created_at: None,
        }
    }

    /// Effective card extent with defaults applied.
    pub fn extent(&self) -> (f32, f32) {
        (
            self.width.unwrap_or(DEFAULT_CARD_WIDTH),
            self.height.unwrap_or(DEFAULT_CARD_HEIGHT),
        )
    }

    /// Add a tag, preserving insertion order. Tags are trimmed; empty tags
    /// and duplicates are rejected. Returns whether the tag was added.
    pub fn add_tag(&mut self, tag: &str) -> bool {
        let tag = tag.trim();
        if tag.is_empty() || self.tags.iter().any(|existing| existing == tag) {
            return false;
        }
        self.tags.push(tag.to_string());
        true
    }

    /// Remove a tag. Returns whether the tag was present.
    pub fn remove_tag(&mut self, tag: &str) -> bool {
        let tag = tag.trim();
        let before = self.tags.len();
        self.tags.retain(|existing| existing != tag);
        self.tags.len() != before
    }
}

/// A directed associative edge between two cards.
///
/// The source/target orientation is payload for display subsystems; scope
/// traversal treats every synapse as undirected. Endpoints are not validated
/// against the node map: dangling synapses are legal and simply connect to
/// nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct Synapse {
    pub source_id: NodeId,
    pub target_id: NodeId,

    /// Optional association strength in `[0, 1]`; absent means full strength.
    pub similarity: Option<f32>,
}

impl Synapse {
    pub fn new(source_id: NodeId, target_id: NodeId) -> Self {
        Self {
            source_id,
            target_id,
            similarity: None,
        }
    }

    /// Effective strength used by the visibility threshold filter.
    pub fn strength(&self) -> f32 {
        self.similarity.unwrap_or(1.0)
    }

    /// Whether either endpoint references the given node.
    pub fn touches(&self, id: NodeId) -> bool {
        self.source_id == id || self.target_id == id
    }
}

/// Canonical graph store: node map + synapse list.
///
/// Point-in-time capture is `Graph::clone()`; the clone is structurally
/// independent of all later mutation, which is the guarantee the history
/// engine snapshots depend on.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: HashMap<NodeId, Node>,
    synapses: Vec<Synapse>,
}

impl Graph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a new card and return its id.
    pub fn add_node(&mut self, title: String, content: String, position: Point2D<f32>) -> NodeId {
        let node = Node::new(title, content, position);
        let id = node.id;
        self.nodes.insert(id, node);
        id
    }

    /// Insert a fully-formed node (duplication, paste, import). The node's
    /// own id keys the map; an existing node under that id is replaced.
    pub fn insert_node(&mut self, node: Node) -> NodeId {
        let id = node.id;
        self.nodes.insert(id, node);
        id
    }

    /// Remove a node and every synapse touching it.
    pub fn remove_node(&mut self, id: NodeId) -> bool {
        if self.nodes.remove(&id).is_none() {
            return false;
        }
        self.synapses.retain(|synapse| !synapse.touches(id));
        true
    }

    /// Get a node by id.
    pub fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Get a mutable node by id.
    pub fn get_node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    /// Apply a merge-style update to a node, refreshing `updated_at`.
    /// Unknown ids are a no-op; returns whether the node existed.
    pub fn update_node(&mut self, id: NodeId, apply: impl FnOnce(&mut Node)) -> bool {
        let Some(node) = self.nodes.get_mut(&id) else {
            return false;
        };
        apply(node);
        node.updated_at = SystemTime::now();
        true
    }

    /// Whether a node exists.
    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Iterate over all nodes.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Iterate mutably over all nodes.
    pub(crate) fn nodes_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.nodes.values_mut()
    }

    /// All node ids.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// Add a synapse. Duplicate pairs and self-edges are legal; dangling
    /// endpoints are legal and ignored by traversal.
    pub fn add_synapse(&mut self, synapse: Synapse) {
        self.synapses.push(synapse);
    }

    /// Remove every synapse between two nodes, in either orientation.
    /// Returns how many were removed.
    pub fn remove_synapses_between(&mut self, a: NodeId, b: NodeId) -> usize {
        let before = self.synapses.len();
        self.synapses.retain(|synapse| {
            !((synapse.source_id == a && synapse.target_id == b)
                || (synapse.source_id == b && synapse.target_id == a))
        });
        before - self.synapses.len()
    }

    /// All synapses, in insertion order.
    pub fn synapses(&self) -> &[Synapse] {
        &self.synapses
    }

    /// Synapses whose strength meets the visibility threshold. Scope
    /// traversal consumes this view so hidden synapses never contribute
    /// connectivity.
    pub fn visible_synapses(&self, threshold: f32) -> Vec<Synapse> {
        self.synapses
            .iter()
            .filter(|synapse| synapse.strength() >= threshold)
            .cloned()
            .collect()
    }

    /// Count of nodes in the graph.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Count of synapses in the graph.
    pub fn synapse_count(&self) -> usize {
        self.synapses.len()
    }

    /// Serialize the graph to the persistable shape.
    pub fn to_persisted(&self) -> PersistedGraph {
        let nodes = self
            .nodes()
            .map(|node| PersistedNode {
                node_id: node.id.to_string(),
                title: node.title.clone(),
                content: node.content.clone(),
                position_x: node.position.x,
                position_y: node.position.y,
                width: node.width,
                height: node.height,
                pinned: node.pinned,
                tags: node.tags.clone(),
                created_at_secs: unix_secs(node.created_at),
                updated_at_secs: unix_secs(node.updated_at),
                copy_ref: node.copy_ref.map(|id| id.to_string()),
                original_created_at_secs: node.original_created_at.map(unix_secs),
            })
            .collect();

        let synapses = self
            .synapses
            .iter()
            .map(|synapse| PersistedSynapse {
                source_id: synapse.source_id.to_string(),
                target_id: synapse.target_id.to_string(),
                similarity: synapse.similarity,
            })
            .collect();

        let timestamp_secs = unix_secs(SystemTime::now());

        PersistedGraph {
            nodes,
            synapses,
            timestamp_secs,
        }
    }

    /// Rebuild a graph from a persisted shape. Nodes with unparseable ids and
    /// synapses with unparseable endpoints are dropped; synapses referencing
    /// nodes absent from the snapshot are kept (dangling is legal).
    pub fn from_persisted(persisted: &PersistedGraph) -> Self {
        let mut graph = Graph::new();

        for pnode in &persisted.nodes {
            let Ok(id) = Uuid::parse_str(&pnode.node_id) else {
                log::warn!("dropping persisted node with unparseable id");
                continue;
            };
            let mut node = Node::new(
                pnode.title.clone(),
                pnode.content.clone(),
                Point2D::new(pnode.position_x, pnode.position_y),
            );
            node.id = id;
            node.width = pnode.width;
            node.height = pnode.height;
            node.pinned = pnode.pinned;
            for tag in &pnode.tags {
                node.add_tag(tag);
            }
            node.created_at = from_unix_secs(pnode.created_at_secs);
            node.updated_at = from_unix_secs(pnode.updated_at_secs);
            node.copy_ref = pnode
                .copy_ref
                .as_deref()
                .and_then(|raw| Uuid::parse_str(raw).ok());
            node.original_created_at = pnode.original_created_at_secs.map(from_unix_secs);
            graph.insert_node(node);
        }

        for psynapse in &persisted.synapses {
            let source = Uuid::parse_str(&psynapse.source_id).ok();
            let target = Uuid::parse_str(&psynapse.target_id).ok();
            if let (Some(source_id), Some(target_id)) = (source, target) {
                graph.add_synapse(Synapse {
                    source_id,
                    target_id,
                    similarity: psynapse.similarity,
                });
            }
        }

        graph
    }
}

fn unix_secs(when: SystemTime) -> u64 {
    when.duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

fn from_unix_secs(secs: u64) -> SystemTime {
    std::time::UNIX_EPOCH + std::time::Duration::from_secs(secs)
}
