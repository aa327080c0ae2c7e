//! # Closure Oracle

use std::{
    fmt,
    sync::atomic::{AtomicUsize, Ordering},
};

use ndarray::Array2;

use crate::{
    NTResult,
    batching::PaddedBatch,
    oracle::{NextTokenScores, ScoreSpace, ScoringOracle},
    types::TokenType,
};

/// A [`ScoringOracle`] backed by a closure.
///
/// The closure maps `(source, prefix)` to one row of `vocab_size` scores;
/// `prefix` has its padding removed and starts with `sos`.
///
/// The oracle counts its [`ScoringOracle::score`] calls.
pub struct FnOracle<F> {
    space: ScoreSpace,
    f: F,
    calls: AtomicUsize,
}

impl<F> fmt::Debug for FnOracle<F> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("FnOracle")
            .field("space", &self.space)
            .field("calls", &self.calls())
            .finish()
    }
}

impl<F> FnOracle<F> {
    /// Wrap a closure returning probabilities.
    pub fn probabilities(f: F) -> Self {
        Self::new(ScoreSpace::Probabilities, f)
    }

    /// Wrap a closure returning log-probabilities.
    pub fn log_probabilities(f: F) -> Self {
        Self::new(ScoreSpace::LogProbabilities, f)
    }

    /// Wrap a closure returning scores in `space`.
    pub fn new(
        space: ScoreSpace,
        f: F,
    ) -> Self {
        Self {
            space,
            f,
            calls: AtomicUsize::new(0),
        }
    }

    /// The number of `score` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    /// Reset the call counter.
    pub fn reset_calls(&self) {
        self.calls.store(0, Ordering::Relaxed);
    }
}

impl<T, F> ScoringOracle<T> for FnOracle<F>
where
    T: TokenType,
    F: Fn(&[T], &[T]) -> Vec<f32> + Send + Sync,
{
    type Source = Vec<T>;

    fn encode_source(
        &self,
        source: &[T],
    ) -> NTResult<Self::Source> {
        Ok(source.to_vec())
    }

    fn score(
        &self,
        source: &Self::Source,
        prefixes: &PaddedBatch<T>,
        _causal_mask: &Array2<f32>,
    ) -> NTResult<NextTokenScores> {
        self.calls.fetch_add(1, Ordering::Relaxed);

        let rows: Vec<Vec<f32>> = (0..prefixes.batch_size())
            .map(|i| (self.f)(source, &prefixes.sequence(i)))
            .collect();

        let vocab = rows.first().map(Vec::len).unwrap_or(0);
        NextTokenScores::try_from_rows(self.space, vocab, &rows)
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;
    use crate::{NetTransError, batching::causal_mask};

    type T = u16;

    #[test]
    fn test_fn_oracle() {
        let oracle = FnOracle::probabilities(|source: &[T], prefix: &[T]| {
            vec![source.len() as f32, prefix.len() as f32]
        });

        let source = oracle.encode_source(&[2 as T, 5, 1]).unwrap();
        let batch = PaddedBatch::pad(&[vec![2 as T], vec![2, 3, 4]], 0);
        let scores = oracle
            .score(&source, &batch, &causal_mask(batch.max_len()))
            .unwrap();

        assert_eq!(scores.space(), ScoreSpace::Probabilities);
        assert_eq!(scores.rows(), &array![[3.0, 1.0], [3.0, 3.0]]);
        assert_eq!(oracle.calls(), 1);

        oracle.reset_calls();
        assert_eq!(oracle.calls(), 0);
    }

    #[test]
    fn test_ragged_rows() {
        let oracle = FnOracle::log_probabilities(|_: &[T], prefix: &[T]| vec![0.0f32; prefix.len()]);
        let batch = PaddedBatch::pad(&[vec![2 as T], vec![2, 3]], 0);
        let res = oracle.score(&vec![], &batch, &causal_mask(2));
        assert!(matches!(res, Err(NetTransError::Oracle(_))));
    }
}
