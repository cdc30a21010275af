/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Graph state engine for a spatial card canvas.
//!
//! Core subsystems:
//! - `graph`: canonical node/synapse store (cards, undirected associative edges)
//! - `scope`: adjacency index + bounded-degree BFS for selection scope expansion
//! - `app`: selection/transform reducer and snapshot-based undo/redo history
//! - `cache`: bounded LRU support caches for render-side measurement
//! - `persistence`: serializable snapshot shape consumed by external stores
//!
//! All mutation is single-threaded and synchronous; the embedding shell owns
//! the event loop and calls into `CanvasApp` per user gesture.

pub mod app;
pub mod cache;
pub mod graph;
pub mod persistence;
pub mod scope;

pub use app::{CanvasApp, CanvasIntent, SelectionState, Settings};
pub use graph::{Graph, Node, NodeId, Synapse};
pub use scope::{AdjacencyIndex, ScopeData, ScopePanel};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
