//! # Batch Preparation
//!
//! * [`PaddedBatch`] - pads variable-length index sequences, with lengths and a pad mask.
//! * [`causal_mask`] / [`CausalMaskCache`] - the decoder's no-peek mask.

pub mod masks;
pub mod padded_batch;

#[doc(inline)]
pub use masks::{CAUSAL_ALLOW_VALUE, CAUSAL_BLOCK_VALUE, CausalMaskCache, causal_mask};
#[doc(inline)]
pub use padded_batch::PaddedBatch;
