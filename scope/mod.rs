/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Selection scope traversal: bounded-degree connectivity over the synapse list.
//!
//! Core structures:
//! - `AdjacencyIndex`: undirected id -> neighbor-set view of the synapse list
//! - `connections_by_degree`: multi-source BFS producing shortest distances
//! - `ScopePanel`: UI session state for the scope expansion overlay
//!
//! The index is rebuilt on demand, not incrementally maintained. Callers that
//! traverse repeatedly against an unchanged synapse list build once and reuse;
//! callers that mutated synapses must rebuild.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::graph::{NodeId, Synapse};

/// Default traversal bound, matching the degree control's upper limit.
pub const DEFAULT_MAX_DEGREE: u32 = 6;

/// Undirected adjacency view over a synapse list.
///
/// Both directions are inserted for every synapse, so traversal never
/// consults orientation. Endpoints that appear only in synapses (dangling)
/// still get entries; the neighbor sets deduplicate parallel synapses.
#[derive(Debug, Clone, Default)]
pub struct AdjacencyIndex {
    neighbors: HashMap<NodeId, HashSet<NodeId>>,
}

impl AdjacencyIndex {
    /// Build the index in one pass over the synapse list. O(E).
    pub fn build(synapses: &[Synapse]) -> Self {
        let mut neighbors: HashMap<NodeId, HashSet<NodeId>> = HashMap::new();
        for synapse in synapses {
            neighbors
                .entry(synapse.source_id)
                .or_default()
                .insert(synapse.target_id);
            neighbors
                .entry(synapse.target_id)
                .or_default()
                .insert(synapse.source_id);
        }
        Self { neighbors }
    }

    /// Neighbors of a node, if the node touches any synapse.
    pub fn neighbors(&self, id: NodeId) -> Option<&HashSet<NodeId>> {
        self.neighbors.get(&id)
    }

    /// Number of nodes that touch at least one synapse.
    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }
}

/// Shortest edge-distance from a base set for every reachable node, bounded
/// by `max_degree`.
///
/// Multi-source BFS: distances are assigned at first visit, so each node's
/// degree is its true shortest distance regardless of synapse insertion
/// order. Base-set members never appear in the result; traversal halts early
/// once a frontier step yields nothing new.
pub fn connections_by_degree(
    base: &HashSet<NodeId>,
    adjacency: &AdjacencyIndex,
    max_degree: u32,
) -> HashMap<NodeId, u32> {
    let mut result: HashMap<NodeId, u32> = HashMap::new();
    if base.is_empty() {
        return result;
    }

    let mut frontier: Vec<NodeId> = base.iter().copied().collect();
    for degree in 1..=max_degree {
        let mut next_frontier: Vec<NodeId> = Vec::new();

        for node_id in &frontier {
            let Some(connected) = adjacency.neighbors(*node_id) else {
                continue;
            };
            for connected_id in connected {
                // Base nodes and already-assigned nodes keep their first
                // (shortest) degree; skipping them also terminates cycles.
                if base.contains(connected_id) || result.contains_key(connected_id) {
                    continue;
                }
                result.insert(*connected_id, degree);
                next_frontier.push(*connected_id);
            }
        }

        if next_frontier.is_empty() {
            break;
        }
        frontier = next_frontier;
    }

    result
}

/// Grouped view of `connections_by_degree`, degree -> node ids.
///
/// Ids within a degree are sorted so the grouped view is stable for UI lists.
pub fn connections_grouped_by_degree(
    base: &HashSet<NodeId>,
    adjacency: &AdjacencyIndex,
    max_degree: u32,
) -> BTreeMap<u32, Vec<NodeId>> {
    let mut grouped: BTreeMap<u32, Vec<NodeId>> = BTreeMap::new();
    for (node_id, degree) in connections_by_degree(base, adjacency, max_degree) {
        grouped.entry(degree).or_default().push(node_id);
    }
    for ids in grouped.values_mut() {
        ids.sort_unstable();
    }
    grouped
}

/// Whether any synapse touches the base set at all. Short-circuits on the
/// first hit; used to decide if the scope panel has anything to offer.
pub fn has_any_connections(base: &HashSet<NodeId>, synapses: &[Synapse]) -> bool {
    if base.is_empty() {
        return false;
    }
    synapses
        .iter()
        .any(|synapse| base.contains(&synapse.source_id) || base.contains(&synapse.target_id))
}

/// Largest degree present in a full bounded traversal; sizes the degree
/// control. Zero when the base set reaches nothing.
pub fn max_available_degree(
    base: &HashSet<NodeId>,
    adjacency: &AdjacencyIndex,
    max_search: u32,
) -> u32 {
    connections_by_degree(base, adjacency, max_search)
        .values()
        .copied()
        .max()
        .unwrap_or(0)
}

/// Scope computation results for one degree setting.
#[derive(Debug, Clone, Default)]
pub struct ScopeData {
    /// degree -> node ids at exactly that degree.
    pub by_degree: BTreeMap<u32, Vec<NodeId>>,
    /// node id -> shortest degree from the base set.
    pub all_scoped: HashMap<NodeId, u32>,
    pub total: usize,
}

impl ScopeData {
    pub fn compute(base: &HashSet<NodeId>, adjacency: &AdjacencyIndex, degree: u32) -> Self {
        if base.is_empty() || degree == 0 {
            return Self::default();
        }
        let all_scoped = connections_by_degree(base, adjacency, degree);
        let by_degree = connections_grouped_by_degree(base, adjacency, degree);
        let total = all_scoped.len();
        Self {
            by_degree,
            all_scoped,
            total,
        }
    }
}

/// Per-degree card counts for the scope degree control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DegreeCount {
    pub degree: u32,
    pub count: usize,
    pub cumulative: usize,
}

/// UI session state for the scope expansion overlay.
///
/// The panel itself holds no graph data; `CanvasApp` drives it and applies
/// the resulting degree annotations through `set_scope_degrees`.
#[derive(Debug, Clone, Default)]
pub struct ScopePanel {
    visible: bool,
    current_degree: u32,
    preview_degree: Option<u32>,
    include_in_selection: bool,
}

impl ScopePanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn toggle_visibility(&mut self) {
        self.visible = !self.visible;
    }

    /// Currently applied expansion degree; zero means no expansion.
    pub fn current_degree(&self) -> u32 {
        self.current_degree
    }

    pub(crate) fn set_current_degree(&mut self, degree: u32) {
        self.current_degree = degree;
    }

    /// Hover-preview degree, independent of the applied degree.
    pub fn preview_degree(&self) -> Option<u32> {
        self.preview_degree
    }

    pub fn set_preview_degree(&mut self, degree: Option<u32>) {
        self.preview_degree = degree;
    }

    /// When set, scoped nodes are also added to the selection on expansion.
    pub fn include_in_selection(&self) -> bool {
        self.include_in_selection
    }

    pub(crate) fn set_include_in_selection(&mut self, include: bool) {
        self.include_in_selection = include;
    }

    /// Reset to the closed state. The caller clears degree annotations.
    pub(crate) fn reset(&mut self) {
        self.visible = false;
        self.current_degree = 0;
        self.preview_degree = None;
    }

    /// Counts per degree up to the available maximum, with cumulative totals.
    pub fn degree_counts(
        &self,
        base: &HashSet<NodeId>,
        adjacency: &AdjacencyIndex,
    ) -> Vec<DegreeCount> {
        let grouped = connections_grouped_by_degree(base, adjacency, DEFAULT_MAX_DEGREE);
        let max_available = grouped.keys().max().copied().unwrap_or(0);

        let mut counts = Vec::new();
        let mut cumulative = 0;
        for degree in 1..=max_available.max(1) {
            let at_degree = grouped.get(&degree).map_or(0, Vec::len);
            cumulative += at_degree;
            if at_degree > 0 || degree <= self.current_degree {
                counts.push(DegreeCount {
                    degree,
                    count: at_degree,
                    cumulative,
                });
            }
        }
        counts
    }
}
