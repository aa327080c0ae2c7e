//! # Sequence Decoding
//!
//! Autoregressive search over a [`crate::oracle::ScoringOracle`].
//!
//! * [`BeamSearchDecoder`] - width-`K` beam search with a backpointer arena.
//! * [`GreedyDecoder`] - the `K = 1` fast path; identical results.
//! * [`SequenceDecoder`] - whichever of the two [`DecoderOptions`] selects.
//!
//! ## Example
//!
//! ```rust
//! use nettrans::{
//!     decoding::DecoderOptions,
//!     oracle::FnOracle,
//!     vocab::{SpecialSymbols, SymbolTable},
//! };
//!
//! // pad=0 eos=1 sos=2 a=3
//! let table = SymbolTable::<u32>::from_symbols(SpecialSymbols::default(), ["a"]).unwrap();
//! let oracle = FnOracle::probabilities(|_: &[u32], prefix: &[u32]| {
//!     if prefix.len() < 3 {
//!         vec![0.0, 0.2, 0.0, 0.8]
//!     } else {
//!         vec![0.0, 1.0, 0.0, 0.0]
//!     }
//! });
//!
//! let decoder = DecoderOptions::default().with_beam_size(2).build();
//! let outcome = decoder.decode(&oracle, &vec![], &table).unwrap();
//!
//! let best = outcome.best().unwrap();
//! assert_eq!(best.tokens, vec![3, 3, 1]);
//! ```

pub mod beam;
pub mod beam_decoder;
pub mod decoder_options;
pub mod greedy_decoder;
pub mod hypothesis;

use std::sync::atomic::AtomicBool;

#[doc(inline)]
pub use beam_decoder::BeamSearchDecoder;
#[doc(inline)]
pub use decoder_options::{DecodeStrategy, DecoderOptions};
#[doc(inline)]
pub use greedy_decoder::GreedyDecoder;
#[doc(inline)]
pub use hypothesis::{DecodeOutcome, Hypothesis, ProbabilityMode, StopReason};

use crate::{
    NTResult,
    batching::CausalMaskCache,
    oracle::ScoringOracle,
    types::TokenType,
    vocab::SymbolTable,
};

/// A decoder, with its strategy fixed at construction.
#[derive(Debug, Clone)]
pub enum SequenceDecoder {
    /// Beam search.
    Beam(BeamSearchDecoder),

    /// Greedy search.
    Greedy(GreedyDecoder),
}

impl Default for SequenceDecoder {
    fn default() -> Self {
        DecoderOptions::default().build()
    }
}

impl SequenceDecoder {
    /// The selected strategy.
    pub fn strategy(&self) -> DecodeStrategy {
        match self {
            Self::Beam(_) => DecodeStrategy::Beam,
            Self::Greedy(_) => DecodeStrategy::Greedy,
        }
    }

    /// The decoder options.
    pub fn options(&self) -> &DecoderOptions {
        match self {
            Self::Beam(d) => d.options(),
            Self::Greedy(d) => d.options(),
        }
    }

    /// The shared causal mask cache.
    pub fn masks(&self) -> &CausalMaskCache {
        match self {
            Self::Beam(d) => d.masks(),
            Self::Greedy(d) => d.masks(),
        }
    }

    /// A decoder with different options, sharing this one's mask cache.
    pub fn with_options(
        &self,
        options: DecoderOptions,
    ) -> Self {
        options.build_with_masks(self.masks().clone())
    }

    /// Decode to completion.
    pub fn decode<T, O>(
        &self,
        oracle: &O,
        source: &O::Source,
        table: &SymbolTable<T>,
    ) -> NTResult<DecodeOutcome<T>>
    where
        T: TokenType,
        O: ScoringOracle<T> + ?Sized,
    {
        self.decode_with_cancel(oracle, source, table, &AtomicBool::new(false))
    }

    /// Decode, polling `cancel` between steps.
    pub fn decode_with_cancel<T, O>(
        &self,
        oracle: &O,
        source: &O::Source,
        table: &SymbolTable<T>,
        cancel: &AtomicBool,
    ) -> NTResult<DecodeOutcome<T>>
    where
        T: TokenType,
        O: ScoringOracle<T> + ?Sized,
    {
        match self {
            Self::Beam(d) => d.decode_with_cancel(oracle, source, table, cancel),
            Self::Greedy(d) => d.decode_with_cancel(oracle, source, table, cancel),
        }
    }
}
