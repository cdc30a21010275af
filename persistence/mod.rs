/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Serializable graph snapshot shape.
//!
//! The canvas core defines WHAT gets persisted (the shape below), not HOW:
//! storage engines, file formats, and network sync live in the embedding
//! shell, which consumes `Graph::to_persisted` / `Graph::from_persisted`.

pub mod types;
