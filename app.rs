/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Canvas application state: selection, transforms, and snapshot history.
//!
//! Core structures:
//! - `SelectionState`: canonical selected-node set with ordering metadata
//! - `CanvasIntent`: deterministic mutation intent boundary
//! - `CanvasApp`: the single-threaded reducer owning graph, selection,
//!   scope panel, clipboard, and the undo/redo stacks
//!
//! All mutation is synchronous. Callers that want a mutation to be undoable
//! go through the public operations here; each one captures its own
//! checkpoint, so intermediate drag moves stay cheap and only the net
//! gesture is history-visible.

use euclid::default::{Point2D, Vector2D};
use std::collections::{HashMap, HashSet};
use std::ops::Deref;
use std::time::SystemTime;
use uuid::Uuid;

use crate::graph::{Graph, Node, NodeId, Synapse};
use crate::scope::{AdjacencyIndex, DEFAULT_MAX_DEGREE, ScopeData, ScopePanel};

/// Tunable limits for the canvas reducer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settings {
    /// Undo/redo stack depth; oldest snapshots are evicted first.
    pub max_undo_steps: usize,
    /// Upper bound for scope expansion traversal.
    pub max_scope_degree: u32,
    /// Minimum synapse strength for a synapse to contribute connectivity.
    pub synapse_visibility_threshold: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_undo_steps: 50,
            max_scope_degree: DEFAULT_MAX_DEGREE,
            synapse_visibility_threshold: 0.0,
        }
    }
}

/// Canonical node-selection state.
///
/// Wraps the selected-id set with ordering metadata so batch operations
/// (duplicate, copy) are deterministic and consumers can observe changes
/// through the revision counter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionState {
    nodes: HashSet<NodeId>,
    order: Vec<NodeId>,
    primary: Option<NodeId>,
    revision: u64,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Monotonic revision incremented whenever the selection changes.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Primary selected node (most recently selected).
    pub fn primary(&self) -> Option<NodeId> {
        self.primary
    }

    /// Selected ids in selection order.
    pub fn ordered(&self) -> &[NodeId] {
        &self.order
    }

    /// Single-click selection. Without `multi_select` the selection becomes
    /// exactly `{id}`; with it, membership of `id` toggles and nothing else
    /// changes.
    pub fn select(&mut self, id: NodeId, multi_select: bool) {
        if multi_select {
            if self.nodes.remove(&id) {
                self.order.retain(|existing| *existing != id);
                self.primary = self.order.last().copied();
            } else {
                self.nodes.insert(id);
                self.order.push(id);
                self.primary = Some(id);
            }
            self.revision = self.revision.saturating_add(1);
            return;
        }

        if self.nodes.len() == 1 && self.nodes.contains(&id) {
            return;
        }
        self.nodes.clear();
        self.order.clear();
        self.nodes.insert(id);
        self.order.push(id);
        self.primary = Some(id);
        self.revision = self.revision.saturating_add(1);
    }

    /// Additive batch selection; never removes existing members.
    pub fn extend(&mut self, ids: impl IntoIterator<Item = NodeId>) {
        let mut changed = false;
        for id in ids {
            if self.nodes.insert(id) {
                self.order.push(id);
                self.primary = Some(id);
                changed = true;
            }
        }
        if changed {
            self.revision = self.revision.saturating_add(1);
        }
    }

    pub fn clear(&mut self) {
        if self.nodes.is_empty() && self.primary.is_none() {
            return;
        }
        self.nodes.clear();
        self.order.clear();
        self.primary = None;
        self.revision = self.revision.saturating_add(1);
    }

    /// Drop ids that no longer exist in the graph.
    fn retain(&mut self, keep: impl Fn(&NodeId) -> bool) {
        let before = self.nodes.len();
        self.nodes.retain(&keep);
        self.order.retain(&keep);
        self.primary = self.order.last().copied();
        if self.nodes.len() != before {
            self.revision = self.revision.saturating_add(1);
        }
    }
}

impl Deref for SelectionState {
    type Target = HashSet<NodeId>;

    fn deref(&self) -> &Self::Target {
        &self.nodes
    }
}

#[derive(Clone)]
struct UndoRedoSnapshot {
    graph: Graph,
    selected_nodes: SelectionState,
}

/// Live drag gesture state: pre-gesture positions plus the running net
/// displacement, used for the sub-pixel cancel decision at release.
/// `checkpoint_depth` is the undo depth right after the gesture's own
/// checkpoint, so a cancel never discards a checkpoint pushed mid-gesture.
struct DragGesture {
    starts: HashMap<NodeId, Point2D<f32>>,
    accumulated: Vector2D<f32>,
    checkpoint_depth: usize,
}

/// Deterministic mutation intent boundary for canvas state updates.
#[derive(Debug, Clone)]
pub enum CanvasIntent {
    SelectNode { id: NodeId, multi_select: bool },
    SelectNodes { ids: Vec<NodeId> },
    SelectAll,
    ClearSelection,
    AddCard {
        title: String,
        content: String,
        position: Point2D<f32>,
    },
    RemoveSelectedCards,
    BeginDrag,
    UpdateDrag { delta: Vector2D<f32> },
    EndDrag,
    DuplicateSelected,
    AddTagToSelected { tag: String },
    RemoveTagFromSelected { tag: String },
    TogglePin { id: NodeId },
    PinSelected,
    UnpinSelected,
    CreateSynapse { source: NodeId, target: NodeId },
    RemoveSynapsesBetween { a: NodeId, b: NodeId },
    Undo,
    Redo,
    CopySelected,
    Paste { center: Point2D<f32> },
    ToggleScopePanel,
    ApplyScopeDegree { degree: u32 },
    PreviewScopeDegree { degree: Option<u32> },
    SetScopeInclusion { include: bool },
    CloseScopePanel,
}

/// The canvas reducer: one instance per canvas, driven synchronously by the
/// embedding shell. Every public operation is total over its input domain;
/// unknown ids and empty selections are silent no-ops.
#[derive(Default)]
pub struct CanvasApp {
    graph: Graph,
    selected_nodes: SelectionState,
    scope_panel: ScopePanel,
    undo_stack: Vec<UndoRedoSnapshot>,
    redo_stack: Vec<UndoRedoSnapshot>,
    clipboard: Vec<Node>,
    drag: Option<DragGesture>,
    settings: Settings,
}

impl CanvasApp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: Settings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    // --- queries ---

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.graph.get_node(id)
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selected_nodes
    }

    pub fn scope_panel(&self) -> &ScopePanel {
        &self.scope_panel
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn clipboard_len(&self) -> usize {
        self.clipboard.len()
    }

    /// Replace the whole graph (persistence load). Selection, scope state,
    /// and history are reset; a loaded graph starts a fresh session.
    pub fn load_graph(&mut self, graph: Graph) {
        self.graph = graph;
        self.selected_nodes = SelectionState::new();
        self.scope_panel = ScopePanel::new();
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.drag = None;
        self.sync_selected_flags();
    }

    /// Apply a batch of intents deterministically in insertion order.
    pub fn apply_intents<I>(&mut self, intents: I)
    where
        I: IntoIterator<Item = CanvasIntent>,
    {
        for intent in intents {
            self.apply_intent(intent);
        }
    }

    fn apply_intent(&mut self, intent: CanvasIntent) {
        match intent {
            CanvasIntent::SelectNode { id, multi_select } => {
                self.toggle_selection(id, multi_select);
            },
            CanvasIntent::SelectNodes { ids } => self.select_nodes(&ids),
            CanvasIntent::SelectAll => self.select_all(),
            CanvasIntent::ClearSelection => self.clear_selection(),
            CanvasIntent::AddCard {
                title,
                content,
                position,
            } => {
                let _ = self.add_card(title, content, position);
            },
            CanvasIntent::RemoveSelectedCards => self.remove_selected_cards(),
            CanvasIntent::BeginDrag => self.begin_drag(),
            CanvasIntent::UpdateDrag { delta } => self.update_drag(delta),
            CanvasIntent::EndDrag => self.end_drag(),
            CanvasIntent::DuplicateSelected => self.duplicate_selected_nodes(),
            CanvasIntent::AddTagToSelected { tag } => self.add_tag_to_selected(&tag),
            CanvasIntent::RemoveTagFromSelected { tag } => self.remove_tag_from_selected(&tag),
            CanvasIntent::TogglePin { id } => self.toggle_pin(id),
            CanvasIntent::PinSelected => self.pin_selected(),
            CanvasIntent::UnpinSelected => self.unpin_selected(),
            CanvasIntent::CreateSynapse { source, target } => self.create_synapse(source, target),
            CanvasIntent::RemoveSynapsesBetween { a, b } => {
                self.remove_synapses_between(a, b);
            },
            CanvasIntent::Undo => {
                let _ = self.undo();
            },
            CanvasIntent::Redo => {
                let _ = self.redo();
            },
            CanvasIntent::CopySelected => self.copy_selected_nodes(),
            CanvasIntent::Paste { center } => self.paste_nodes(center),
            CanvasIntent::ToggleScopePanel => self.toggle_scope_panel(),
            CanvasIntent::ApplyScopeDegree { degree } => self.apply_scope_degree(degree),
            CanvasIntent::PreviewScopeDegree { degree } => {
                self.scope_panel.set_preview_degree(degree);
            },
            CanvasIntent::SetScopeInclusion { include } => self.set_scope_inclusion(include),
            CanvasIntent::CloseScopePanel => self.close_scope_panel(),
        }
    }

    // --- selection ---

    /// Click selection. Unknown ids are a no-op.
    pub fn toggle_selection(&mut self, id: NodeId, multi_select: bool) {
        if !self.graph.contains_node(id) {
            return;
        }
        self.selected_nodes.select(id, multi_select);
        self.sync_selected_flags();
    }

    /// Additive batch selection; ids absent from the graph are skipped.
    pub fn select_nodes(&mut self, ids: &[NodeId]) {
        let present: Vec<NodeId> = ids
            .iter()
            .copied()
            .filter(|id| self.graph.contains_node(*id))
            .collect();
        if present.is_empty() {
            return;
        }
        self.selected_nodes.extend(present);
        self.sync_selected_flags();
    }

    pub fn select_all(&mut self) {
        let all: Vec<NodeId> = self.graph.node_ids().collect();
        self.selected_nodes.extend(all);
        self.sync_selected_flags();
    }

    pub fn clear_selection(&mut self) {
        self.selected_nodes.clear();
        self.sync_selected_flags();
    }

    /// Write-through of the derived per-node flag. The selection set is the
    /// source of truth; the flag and the set change in the same operation,
    /// never independently.
    fn sync_selected_flags(&mut self) {
        let selected: HashSet<NodeId> = self.selected_nodes.iter().copied().collect();
        for node in self.graph.nodes_mut() {
            node.selected = selected.contains(&node.id);
        }
    }

    // --- transforms ---

    /// Create a card and return its id.
    pub fn add_card(&mut self, title: String, content: String, position: Point2D<f32>) -> NodeId {
        self.save_state_for_undo();
        self.graph.add_node(title, content, position)
    }

    /// Remove every selected card and its incident synapses.
    pub fn remove_selected_cards(&mut self) {
        if self.selected_nodes.is_empty() {
            return;
        }
        self.save_state_for_undo();
        let doomed: Vec<NodeId> = self.selected_nodes.iter().copied().collect();
        for id in doomed {
            self.graph.remove_node(id);
        }
        self.selected_nodes.clear();
    }

    /// Translate every selected, non-pinned node. Pinned nodes never move,
    /// selected or not. Does not checkpoint; gesture-level callers do.
    pub fn drag_selected_nodes(&mut self, delta: Vector2D<f32>) {
        let selected: HashSet<NodeId> = self.selected_nodes.iter().copied().collect();
        for node in self.graph.nodes_mut() {
            if selected.contains(&node.id) && !node.pinned {
                node.position += delta;
            }
        }
    }

    /// Start a drag gesture: checkpoint once, remember pre-gesture positions.
    /// A no-op when nothing movable is selected.
    pub fn begin_drag(&mut self) {
        if self.drag.is_some() {
            return;
        }
        let starts: HashMap<NodeId, Point2D<f32>> = self
            .selected_nodes
            .iter()
            .filter_map(|id| self.graph.get_node(*id))
            .filter(|node| !node.pinned)
            .map(|node| (node.id, node.position))
            .collect();
        if starts.is_empty() {
            return;
        }
        self.save_state_for_undo();
        self.drag = Some(DragGesture {
            starts,
            accumulated: Vector2D::zero(),
            checkpoint_depth: self.undo_stack.len(),
        });
    }

    /// Pointer-move update within a gesture. Mutates live positions without
    /// touching history; may fire at pointer-move rate.
    pub fn update_drag(&mut self, delta: Vector2D<f32>) {
        let Some(gesture) = self.drag.as_mut() else {
            return;
        };
        gesture.accumulated += delta;
        self.drag_selected_nodes(delta);
    }

    /// Release the gesture. A net sub-pixel displacement on both axes is a
    /// cancel: positions revert and the gesture's checkpoint is discarded so
    /// undo history carries no no-op entry.
    pub fn end_drag(&mut self) {
        let Some(gesture) = self.drag.take() else {
            return;
        };
        if gesture.accumulated.x.abs() < 1.0 && gesture.accumulated.y.abs() < 1.0 {
            for (id, position) in gesture.starts {
                if let Some(node) = self.graph.get_node_mut(id) {
                    node.position = position;
                }
            }
            // Drop the gesture's own checkpoint, but only while it is still
            // the top of the stack.
            if self.undo_stack.len() == gesture.checkpoint_depth {
                self.undo_stack.pop();
            }
            return;
        }
        let now = SystemTime::now();
        for id in gesture.starts.keys() {
            if let Some(node) = self.graph.get_node_mut(*id) {
                node.updated_at = now;
            }
        }
    }

    /// Duplicate every selected card. Copies land offset from their sources,
    /// carry a date-stamped copy tag, and become the new selection. Copy
    /// provenance collapses to the first ancestor: duplicating a copy points
    /// `copy_ref` at the original, not the intermediate.
    pub fn duplicate_selected_nodes(&mut self) {
        if self.selected_nodes.is_empty() {
            return;
        }
        self.save_state_for_undo();

        let stamp = date_stamp();
        let now = SystemTime::now();
        let mut copies = Vec::new();
        for id in self.selected_nodes.ordered() {
            let Some(source) = self.graph.get_node(*id) else {
                continue;
            };
            let mut copy = source.clone();
            copy.copy_ref = Some(source.copy_ref.unwrap_or(source.id));
            copy.original_created_at = Some(source.original_created_at.unwrap_or(source.created_at));
            copy.id = Uuid::new_v4();
            copy.position += Vector2D::new(DUPLICATE_OFFSET, DUPLICATE_OFFSET);
            copy.selected = false;
            copy.scope_degree = None;
            copy.created_at = now;
            copy.updated_at = now;
            copy.add_tag(&format!("card_copy_{stamp}"));
            copies.push(copy);
        }
        if copies.is_empty() {
            self.undo_stack.pop();
            return;
        }

        let copy_ids: Vec<NodeId> = copies.iter().map(|copy| copy.id).collect();
        for copy in copies {
            self.graph.insert_node(copy);
        }
        self.selected_nodes.clear();
        self.selected_nodes.extend(copy_ids);
        self.sync_selected_flags();
    }

    /// Add a tag to every selected card. Already-tagged cards are untouched;
    /// a tag that trims to empty is rejected outright.
    pub fn add_tag_to_selected(&mut self, tag: &str) {
        if self.selected_nodes.is_empty() || tag.trim().is_empty() {
            return;
        }
        self.save_state_for_undo();
        let ids: Vec<NodeId> = self.selected_nodes.iter().copied().collect();
        let mut changed = false;
        for id in ids {
            if self.graph.update_node(id, |node| {
                node.add_tag(tag);
            }) {
                changed = true;
            }
        }
        if !changed {
            self.undo_stack.pop();
        }
    }

    /// Remove a tag from every selected card that carries it.
    pub fn remove_tag_from_selected(&mut self, tag: &str) {
        if self.selected_nodes.is_empty() || tag.trim().is_empty() {
            return;
        }
        self.save_state_for_undo();
        let ids: Vec<NodeId> = self.selected_nodes.iter().copied().collect();
        for id in ids {
            self.graph.update_node(id, |node| {
                node.remove_tag(tag);
            });
        }
    }

    /// Flip the pin state of one card. Unknown ids are a no-op.
    pub fn toggle_pin(&mut self, id: NodeId) {
        if !self.graph.contains_node(id) {
            return;
        }
        self.save_state_for_undo();
        self.graph.update_node(id, |node| node.pinned = !node.pinned);
    }

    pub fn pin_selected(&mut self) {
        self.set_pin_on_selected(true);
    }

    pub fn unpin_selected(&mut self) {
        self.set_pin_on_selected(false);
    }

    fn set_pin_on_selected(&mut self, pinned: bool) {
        if self.selected_nodes.is_empty() {
            return;
        }
        self.save_state_for_undo();
        let ids: Vec<NodeId> = self.selected_nodes.iter().copied().collect();
        for id in ids {
            self.graph.update_node(id, |node| node.pinned = pinned);
        }
    }

    /// Create a synapse between two cards. Dangling endpoints are legal, so
    /// no existence check is made here.
    pub fn create_synapse(&mut self, source: NodeId, target: NodeId) {
        self.save_state_for_undo();
        self.graph.add_synapse(Synapse::new(source, target));
    }

    /// Remove every synapse between two cards, either orientation. Returns
    /// how many were removed; zero means no checkpoint was kept.
    pub fn remove_synapses_between(&mut self, a: NodeId, b: NodeId) -> usize {
        // Exact pair match; `touches` on both endpoints would also accept any
        // edge incident to `a` when `a == b`.
        let any = self.graph.synapses().iter().any(|synapse| {
            (synapse.source_id == a && synapse.target_id == b)
                || (synapse.source_id == b && synapse.target_id == a)
        });
        if !any {
            return 0;
        }
        self.save_state_for_undo();
        self.graph.remove_synapses_between(a, b)
    }

    // --- scope ---

    /// Base set for scope traversal: the raw selection minus nodes already
    /// carrying a scope annotation (scoped nodes expand from, not into).
    pub fn scope_base(&self) -> HashSet<NodeId> {
        self.selected_nodes
            .iter()
            .copied()
            .filter(|id| {
                self.graph
                    .get_node(*id)
                    .is_some_and(|node| node.scope_degree.is_none())
            })
            .collect()
    }

    /// Adjacency over currently visible synapses; hidden synapses never
    /// contribute connectivity.
    pub fn scope_adjacency(&self) -> AdjacencyIndex {
        AdjacencyIndex::build(
            &self
                .graph
                .visible_synapses(self.settings.synapse_visibility_threshold),
        )
    }

    /// Scope computation for the panel's applied degree.
    pub fn scope_data(&self) -> ScopeData {
        ScopeData::compute(
            &self.scope_base(),
            &self.scope_adjacency(),
            self.scope_panel.current_degree(),
        )
    }

    /// Clear `scope_degree` on all nodes, then apply the given map. Clearing
    /// first is what keeps annotations from going stale across computations.
    pub fn set_scope_degrees(&mut self, degrees: &HashMap<NodeId, u32>) {
        for node in self.graph.nodes_mut() {
            node.scope_degree = degrees.get(&node.id).copied();
        }
    }

    pub fn toggle_scope_panel(&mut self) {
        if self.scope_panel.visible() {
            self.close_scope_panel();
        } else {
            self.scope_panel.toggle_visibility();
        }
    }

    /// Apply a scope expansion at the given degree: traverse, annotate, and
    /// optionally fold the scoped nodes into the selection. Degree zero
    /// clears the expansion.
    pub fn apply_scope_degree(&mut self, degree: u32) {
        let degree = degree.min(self.settings.max_scope_degree);
        if degree == 0 {
            self.set_scope_degrees(&HashMap::new());
            self.scope_panel.set_current_degree(0);
            return;
        }

        let base = self.scope_base();
        if base.is_empty() {
            return;
        }
        let data = ScopeData::compute(&base, &self.scope_adjacency(), degree);
        self.set_scope_degrees(&data.all_scoped);
        self.scope_panel.set_current_degree(degree);

        if self.scope_panel.include_in_selection() {
            let scoped: Vec<NodeId> = data.all_scoped.keys().copied().collect();
            self.select_nodes(&scoped);
        }
    }

    /// Toggle whether scoped nodes also join the selection. Turning it on
    /// with an active expansion folds the current scoped set in immediately.
    pub fn set_scope_inclusion(&mut self, include: bool) {
        self.scope_panel.set_include_in_selection(include);
        if include && self.scope_panel.current_degree() > 0 {
            let data = self.scope_data();
            let scoped: Vec<NodeId> = data.all_scoped.keys().copied().collect();
            self.select_nodes(&scoped);
        }
    }

    /// Close the panel and drop every scope annotation.
    pub fn close_scope_panel(&mut self) {
        self.set_scope_degrees(&HashMap::new());
        self.scope_panel.reset();
    }

    // --- history ---

    /// Capture current state as an undo checkpoint. Called by every mutating
    /// operation immediately before it changes the graph; any new checkpoint
    /// invalidates the redo stack (linear history).
    pub fn save_state_for_undo(&mut self) {
        self.undo_stack.push(UndoRedoSnapshot {
            graph: self.graph.clone(),
            selected_nodes: self.selected_nodes.clone(),
        });
        self.redo_stack.clear();
        cap_stack(&mut self.undo_stack, self.settings.max_undo_steps);
    }

    /// Restore the most recent checkpoint. Empty stack is a silent no-op.
    pub fn undo(&mut self) -> bool {
        let Some(prev) = self.undo_stack.pop() else {
            return false;
        };
        self.redo_stack.push(UndoRedoSnapshot {
            graph: self.graph.clone(),
            selected_nodes: self.selected_nodes.clone(),
        });
        cap_stack(&mut self.redo_stack, self.settings.max_undo_steps);
        self.graph = prev.graph;
        self.selected_nodes = prev.selected_nodes;
        self.drag = None;
        log::debug!("undo: {} checkpoints remain", self.undo_stack.len());
        true
    }

    /// Mirror of `undo`, moving forward through linear history.
    pub fn redo(&mut self) -> bool {
        let Some(next) = self.redo_stack.pop() else {
            return false;
        };
        self.undo_stack.push(UndoRedoSnapshot {
            graph: self.graph.clone(),
            selected_nodes: self.selected_nodes.clone(),
        });
        cap_stack(&mut self.undo_stack, self.settings.max_undo_steps);
        self.graph = next.graph;
        self.selected_nodes = next.selected_nodes;
        self.drag = None;
        log::debug!("redo: {} checkpoints remain", self.redo_stack.len());
        true
    }

    // --- clipboard ---

    /// Capture value-copies of the selected cards, in selection order. An
    /// empty selection leaves the clipboard untouched.
    pub fn copy_selected_nodes(&mut self) {
        if self.selected_nodes.is_empty() {
            return;
        }
        self.clipboard = self
            .selected_nodes
            .ordered()
            .iter()
            .filter_map(|id| self.graph.get_node(*id))
            .cloned()
            .collect();
    }

    /// Paste the clipboard recentered at `center`: the clipboard group's
    /// bounding-box center lands on the target while relative layout is
    /// preserved. Pasted cards get fresh ids and timestamps, a date-stamped
    /// paste tag, ancestor-collapsed provenance, and replace the selection.
    pub fn paste_nodes(&mut self, center: Point2D<f32>) {
        if self.clipboard.is_empty() {
            return;
        }
        self.save_state_for_undo();

        let offset = center - clipboard_center(&self.clipboard);
        let stamp = date_stamp();
        let now = SystemTime::now();

        let mut pasted_ids = Vec::with_capacity(self.clipboard.len());
        for source in self.clipboard.clone() {
            let mut pasted = source.clone();
            pasted.copy_ref = Some(source.copy_ref.unwrap_or(source.id));
            pasted.original_created_at = Some(source.original_created_at.unwrap_or(source.created_at));
            pasted.id = Uuid::new_v4();
            pasted.position += offset;
            pasted.selected = false;
            pasted.scope_degree = None;
            pasted.created_at = now;
            pasted.updated_at = now;
            pasted.add_tag(&format!("pasted_{stamp}"));
            pasted_ids.push(pasted.id);
            self.graph.insert_node(pasted);
        }

        self.selected_nodes.clear();
        self.selected_nodes.extend(pasted_ids);
        self.sync_selected_flags();
    }

    /// Drop selection entries whose nodes are gone (external removal paths).
    pub fn prune_selection(&mut self) {
        let graph = &self.graph;
        self.selected_nodes.retain(|id| graph.contains_node(*id));
    }
}

const DUPLICATE_OFFSET: f32 = 20.0;

fn cap_stack(stack: &mut Vec<UndoRedoSnapshot>, max: usize) {
    if stack.len() > max {
        let excess = stack.len() - max;
        stack.drain(0..excess);
    }
}

/// Bounding-box center of the clipboard group, from node positions.
fn clipboard_center(nodes: &[Node]) -> Point2D<f32> {
    let mut min_x = f32::MAX;
    let mut min_y = f32::MAX;
    let mut max_x = f32::MIN;
    let mut max_y = f32::MIN;
    for node in nodes {
        min_x = min_x.min(node.position.x);
        min_y = min_y.min(node.position.y);
        max_x = max_x.max(node.position.x);
        max_y = max_y.max(node.position.y);
    }
    Point2D::new((min_x + max_x) / 2.0, (min_y + max_y) / 2.0)
}

/// Six-digit YYMMDD stamp for copy/paste tags.
fn date_stamp() -> String {
    time::OffsetDateTime::now_utc()
        .format(time::macros::format_description!(
            "[year repr:last_two][month][day]"
        ))
        .unwrap_or_default()
}
