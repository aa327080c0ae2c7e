//! # Attention Masks
//!
//! The causal ("no-peek") mask is an additive bias: position `i` may attend
//! to `j` when `j <= i`. Blocked entries hold a large, finite negative value
//! rather than `-inf`, which keeps downstream softmax rows NaN-free.

use std::sync::Arc;

use ndarray::Array2;
use parking_lot::RwLock;

use crate::types::NTHashMap;

/// The additive mask value for allowed positions.
pub const CAUSAL_ALLOW_VALUE: f32 = 0.0;

/// The additive mask value for blocked (future) positions.
pub const CAUSAL_BLOCK_VALUE: f32 = -1.0e9;

/// Build the `length x length` causal mask.
pub fn causal_mask(length: usize) -> Array2<f32> {
    Array2::from_shape_fn((length, length), |(i, j)| {
        if j <= i {
            CAUSAL_ALLOW_VALUE
        } else {
            CAUSAL_BLOCK_VALUE
        }
    })
}

/// Interior-mutable cache of causal masks, keyed by length.
///
/// Masks are pure functions of their length, so one instance per length
/// is shared by every caller.
#[derive(Debug, Default, Clone)]
pub struct CausalMaskCache {
    masks: Arc<RwLock<NTHashMap<usize, Arc<Array2<f32>>>>>,
}

impl CausalMaskCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get (building if needed) the mask for `length`.
    pub fn get(
        &self,
        length: usize,
    ) -> Arc<Array2<f32>> {
        if let Some(mask) = self.masks.read().get(&length) {
            return mask.clone();
        }

        self.masks
            .write()
            .entry(length)
            .or_insert_with(|| Arc::new(causal_mask(length)))
            .clone()
    }

    /// The number of cached masks.
    pub fn len(&self) -> usize {
        self.masks.read().len()
    }

    /// Is the cache empty?
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every cached mask.
    pub fn clear(&self) {
        self.masks.write().clear();
    }
}
