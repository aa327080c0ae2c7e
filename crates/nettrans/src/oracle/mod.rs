//! # Scoring Oracles
//!
//! A [`ScoringOracle`] is the trained sequence model, seen from the decoder:
//! a deterministic function from `(source, target prefixes)` to one
//! next-token distribution per prefix.
//!
//! The backend is chosen once, when a decoder or transliterator is built;
//! the decoder never branches on the backend kind.
//!
//! * [`FnOracle`] - wraps a closure; for embedding a foreign model, and for tests.
//! * [`BigramOracle`] - a smoothed target-side bigram baseline.

pub mod bigram;
pub mod fn_oracle;

use std::sync::Arc;

#[doc(inline)]
pub use bigram::{BigramOracle, BigramOracleOptions};
#[doc(inline)]
pub use fn_oracle::FnOracle;

use ndarray::{Array2, ShapeError};

use crate::{NTResult, NetTransError, batching::PaddedBatch, types::TokenType};

/// How the entries of a [`NextTokenScores`] row should be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreSpace {
    /// Rows are probabilities in `[0, 1]`.
    Probabilities,

    /// Rows are natural-log probabilities.
    LogProbabilities,
}

/// A `batch x vocab` block of next-token scores.
#[derive(Debug, Clone, PartialEq)]
pub struct NextTokenScores {
    space: ScoreSpace,
    rows: Array2<f32>,
}

impl NextTokenScores {
    /// Wrap a matrix of scores in `space`.
    pub fn new(
        space: ScoreSpace,
        rows: Array2<f32>,
    ) -> Self {
        Self { space, rows }
    }

    /// Stack per-prefix score rows into a block.
    ///
    /// Fails with [`NetTransError::Oracle`] unless every row has exactly
    /// `vocab` entries.
    pub fn try_from_rows<R>(
        space: ScoreSpace,
        vocab: usize,
        rows: &[R],
    ) -> NTResult<Self>
    where
        R: AsRef<[f32]>,
    {
        if let Some((idx, row)) = rows
            .iter()
            .map(|r| r.as_ref())
            .enumerate()
            .find(|(_, row)| row.len() != vocab)
        {
            return Err(NetTransError::oracle(format!(
                "score row {idx} has {} entries, expected {vocab}",
                row.len()
            )));
        }

        let flat: Vec<f32> = rows
            .iter()
            .flat_map(|r| r.as_ref().iter().copied())
            .collect();
        let rows = Array2::from_shape_vec((rows.len(), vocab), flat).map_err(|e: ShapeError| {
            NetTransError::oracle(format!("malformed score block: {e}"))
        })?;
        Ok(Self::new(space, rows))
    }

    /// Wrap a matrix of probabilities.
    pub fn probabilities(rows: Array2<f32>) -> Self {
        Self {
            space: ScoreSpace::Probabilities,
            rows,
        }
    }

    /// Wrap a matrix of log-probabilities.
    pub fn log_probabilities(rows: Array2<f32>) -> Self {
        Self {
            space: ScoreSpace::LogProbabilities,
            rows,
        }
    }

    /// The score space.
    pub fn space(&self) -> ScoreSpace {
        self.space
    }

    /// The raw rows.
    pub fn rows(&self) -> &Array2<f32> {
        &self.rows
    }

    /// The log-probability of `token` following prefix `row`.
    ///
    /// Probabilities are converted with `ln`; a zero probability gives `-inf`.
    ///
    /// ## Panics
    /// Panics if `(row, token)` is out of bounds.
    pub fn log_prob(
        &self,
        row: usize,
        token: usize,
    ) -> f64 {
        let value = self.rows[(row, token)] as f64;
        match self.space {
            ScoreSpace::Probabilities => value.ln(),
            ScoreSpace::LogProbabilities => value,
        }
    }

    /// Check that the block is `batch x vocab`.
    pub fn check_shape(
        &self,
        batch: usize,
        vocab: usize,
    ) -> NTResult<()> {
        let (rows, cols) = self.rows.dim();
        if rows != batch {
            return Err(NetTransError::oracle(format!(
                "expected {batch} score rows, got {rows}"
            )));
        }
        if batch > 0 && cols != vocab {
            return Err(NetTransError::oracle(format!(
                "expected {vocab} scores per row, got {cols}"
            )));
        }
        Ok(())
    }
}

/// The next-token scoring capability of a sequence model.
///
/// Implementations must be deterministic: the same inputs must produce the
/// same scores.
pub trait ScoringOracle<T: TokenType>: Send + Sync {
    /// The oracle's encoded source representation.
    type Source: Send + Sync;

    /// Encode a source index sequence (already wrapped in `sos`/`eos`).
    fn encode_source(
        &self,
        source: &[T],
    ) -> NTResult<Self::Source>;

    /// Score the next token for every prefix in the batch.
    ///
    /// ## Arguments
    /// * `source` - the encoded source.
    /// * `prefixes` - the target prefixes, padded; each starts with `sos`.
    /// * `causal_mask` - the `max_len x max_len` no-peek mask.
    ///
    /// ## Returns
    /// A `prefixes.batch_size() x vocab_size` block of scores.
    fn score(
        &self,
        source: &Self::Source,
        prefixes: &PaddedBatch<T>,
        causal_mask: &Array2<f32>,
    ) -> NTResult<NextTokenScores>;
}

impl<T, O> ScoringOracle<T> for Arc<O>
where
    T: TokenType,
    O: ScoringOracle<T> + ?Sized,
{
    type Source = O::Source;

    fn encode_source(
        &self,
        source: &[T],
    ) -> NTResult<Self::Source> {
        (**self).encode_source(source)
    }

    fn score(
        &self,
        source: &Self::Source,
        prefixes: &PaddedBatch<T>,
        causal_mask: &Array2<f32>,
    ) -> NTResult<NextTokenScores> {
        (**self).score(source, prefixes, causal_mask)
    }
}
