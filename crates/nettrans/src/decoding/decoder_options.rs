//! Decoder Options
//!
//! Options for building a [`SequenceDecoder`].

use serde::{Deserialize, Serialize};

use crate::{
    NTResult,
    NetTransError,
    batching::CausalMaskCache,
    decoding::{BeamSearchDecoder, GreedyDecoder, SequenceDecoder},
};

/// The default beam width.
pub const DEFAULT_BEAM_SIZE: usize = 5;

/// The default bound on expansion steps.
pub const DEFAULT_MAX_PRED_LEN: usize = 32;

/// Which search a [`SequenceDecoder`] runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodeStrategy {
    /// Beam search of width `beam_size`.
    Beam,

    /// Single-path argmax search.
    Greedy,
}

/// Options for configuring a [`SequenceDecoder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderOptions {
    /// The number of hypotheses kept per step; must be `>= 1`.
    pub beam_size: usize,

    /// The maximum number of expansion steps; must be `>= 1`.
    pub max_pred_len: usize,

    /// Use the greedy decoder when `beam_size == 1`.
    ///
    /// Both produce identical results; greedy skips the candidate heap.
    pub greedy_fast_path: bool,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self {
            beam_size: DEFAULT_BEAM_SIZE,
            max_pred_len: DEFAULT_MAX_PRED_LEN,
            greedy_fast_path: true,
        }
    }
}

impl DecoderOptions {
    /// Gets the configured beam size.
    pub fn beam_size(&self) -> usize {
        self.beam_size
    }

    /// Sets the configured beam size.
    pub fn set_beam_size(
        &mut self,
        beam_size: usize,
    ) {
        self.beam_size = beam_size;
    }

    /// Sets the configured beam size.
    pub fn with_beam_size(
        mut self,
        beam_size: usize,
    ) -> Self {
        self.set_beam_size(beam_size);
        self
    }

    /// Gets the configured max prediction length.
    pub fn max_pred_len(&self) -> usize {
        self.max_pred_len
    }

    /// Sets the configured max prediction length.
    pub fn set_max_pred_len(
        &mut self,
        max_pred_len: usize,
    ) {
        self.max_pred_len = max_pred_len;
    }

    /// Sets the configured max prediction length.
    pub fn with_max_pred_len(
        mut self,
        max_pred_len: usize,
    ) -> Self {
        self.set_max_pred_len(max_pred_len);
        self
    }

    /// Gets the configured greedy fast-path flag.
    pub fn greedy_fast_path(&self) -> bool {
        self.greedy_fast_path
    }

    /// Sets the configured greedy fast-path flag.
    pub fn set_greedy_fast_path(
        &mut self,
        greedy_fast_path: bool,
    ) {
        self.greedy_fast_path = greedy_fast_path;
    }

    /// Sets the configured greedy fast-path flag.
    pub fn with_greedy_fast_path(
        mut self,
        greedy_fast_path: bool,
    ) -> Self {
        self.set_greedy_fast_path(greedy_fast_path);
        self
    }

    /// The strategy these options select.
    pub fn strategy(&self) -> DecodeStrategy {
        if self.greedy_fast_path && self.beam_size == 1 {
            DecodeStrategy::Greedy
        } else {
            DecodeStrategy::Beam
        }
    }

    /// Check the options' ranges.
    ///
    /// Fails with [`NetTransError::InvalidArgument`] when `beam_size` or
    /// `max_pred_len` is zero.
    pub fn validate(&self) -> NTResult<()> {
        if self.beam_size == 0 {
            return Err(NetTransError::invalid_argument("beam_size must be >= 1"));
        }
        if self.max_pred_len == 0 {
            return Err(NetTransError::invalid_argument("max_pred_len must be >= 1"));
        }
        Ok(())
    }

    /// Build a [`SequenceDecoder`] for these options.
    pub fn build(&self) -> SequenceDecoder {
        self.build_with_masks(CausalMaskCache::new())
    }

    /// Build a [`SequenceDecoder`] sharing an existing mask cache.
    pub fn build_with_masks(
        &self,
        masks: CausalMaskCache,
    ) -> SequenceDecoder {
        match self.strategy() {
            DecodeStrategy::Beam => SequenceDecoder::Beam(BeamSearchDecoder::new(*self, masks)),
            DecodeStrategy::Greedy => SequenceDecoder::Greedy(GreedyDecoder::new(*self, masks)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = DecoderOptions::default();
        assert_eq!(options.beam_size(), DEFAULT_BEAM_SIZE);
        assert_eq!(options.max_pred_len(), DEFAULT_MAX_PRED_LEN);
        assert!(options.greedy_fast_path());
        assert_eq!(options.strategy(), DecodeStrategy::Beam);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_strategy() {
        let options = DecoderOptions::default().with_beam_size(1);
        assert_eq!(options.strategy(), DecodeStrategy::Greedy);
        assert_eq!(options.build().strategy(), DecodeStrategy::Greedy);

        let options = options.with_greedy_fast_path(false);
        assert_eq!(options.strategy(), DecodeStrategy::Beam);
        assert_eq!(options.build().strategy(), DecodeStrategy::Beam);
    }

    #[test]
    fn test_validate() {
        let err = DecoderOptions::default()
            .with_beam_size(0)
            .validate()
            .unwrap_err();
        assert!(err.is_invalid_argument());

        let err = DecoderOptions::default()
            .with_max_pred_len(0)
            .validate()
            .unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_serde() {
        let options: DecoderOptions = serde_json::from_str(r#"{"beam_size": 3}"#).unwrap();
        assert_eq!(options.beam_size(), 3);
        assert_eq!(options.max_pred_len(), DEFAULT_MAX_PRED_LEN);
    }
}
