/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Bounded support caches for render-side measurement.
//!
//! Repeated work on the render path (text measurement per card, per wrap
//! width) is amortized through a fixed-capacity cache keyed by a
//! canonicalized descriptor, so memory stays bounded no matter how many
//! distinct cards pass through a session.

use std::hash::{Hash, Hasher};

use moka::sync::Cache;

/// A fixed-capacity cache with oldest-entry eviction.
///
/// Thin wrapper over `moka::sync::Cache` so call sites state capacity once
/// at construction and never grow unbounded.
pub struct BoundedCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    inner: Cache<K, V>,
}

impl<K, V> BoundedCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(capacity: u64) -> Self {
        Self {
            inner: Cache::new(capacity),
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.inner.get(key)
    }

    /// Look up or compute-and-insert in one step.
    pub fn get_with(&self, key: K, compute: impl FnOnce() -> V) -> V {
        self.inner.get_with(key, compute)
    }

    pub fn insert(&self, key: K, value: V) {
        self.inner.insert(key, value);
    }

    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }

    /// Entry count after pending maintenance has been applied.
    pub fn len(&self) -> u64 {
        self.inner.run_pending_tasks();
        self.inner.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Default capacity for the text measurement cache.
pub const TEXT_MEASURE_CAPACITY: u64 = 2048;

/// Canonicalized key for one text measurement.
///
/// The content is reduced to a hash and the wrap width is bucketed to whole
/// pixels, so sub-pixel layout jitter does not defeat the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextMeasureKey {
    content_hash: u64,
    wrap_width_px: u32,
}

impl TextMeasureKey {
    pub fn new(content: &str, wrap_width: f32) -> Self {
        let mut hasher = std::hash::DefaultHasher::new();
        content.hash(&mut hasher);
        Self {
            content_hash: hasher.finish(),
            wrap_width_px: wrap_width.max(0.0).round() as u32,
        }
    }
}

/// Measured text extent in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextExtent {
    pub width: f32,
    pub height: f32,
}

/// Bounded cache of text measurements, keyed by content + wrap width.
pub struct TextMeasureCache {
    cache: BoundedCache<TextMeasureKey, TextExtent>,
}

impl TextMeasureCache {
    pub fn new() -> Self {
        Self {
            cache: BoundedCache::new(TEXT_MEASURE_CAPACITY),
        }
    }

    /// Return the cached extent or measure and remember it.
    pub fn measure(
        &self,
        content: &str,
        wrap_width: f32,
        measure: impl FnOnce() -> TextExtent,
    ) -> TextExtent {
        self.cache
            .get_with(TextMeasureKey::new(content, wrap_width), measure)
    }

    pub fn clear(&self) {
        self.cache.invalidate_all();
    }

    pub fn len(&self) -> u64 {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

impl Default for TextMeasureCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Effective card extent for rendering: an explicit size wins; otherwise the
/// default width is paired with a measured (and cached) content height,
/// floored at the default card height.
pub fn card_extent(
    node: &crate::graph::Node,
    cache: &TextMeasureCache,
    measure: impl FnOnce() -> TextExtent,
) -> (f32, f32) {
    let (width, height) = node.extent();
    if node.height.is_some() {
        return (width, height);
    }
    // `height` is the default here; measured content may exceed it.
    let measured = cache.measure(&node.content, width, measure);
    (width, measured.height.max(height))
}
