//! # Padded Batches

use ndarray::Array2;

use crate::types::TokenType;

/// A batch of variable-length index sequences, padded to a common width.
///
/// For `N` sequences with `max_len = max(lengths)`:
/// * `padded` is `max_len x N` (position-major); entry `(j, i)` is
///   token `j` of sequence `i`, or `pad_index` when `j >= lengths[i]`.
/// * `lengths` holds each sequence's true length.
/// * `pad_mask` is `N x max_len`; entry `(i, j)` is `j >= lengths[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct PaddedBatch<T: TokenType> {
    padded: Array2<T>,
    lengths: Vec<usize>,
    pad_mask: Array2<bool>,
    pad_index: T,
}

impl<T: TokenType> PaddedBatch<T> {
    /// Pad a list of sequences.
    ///
    /// Sequence order is preserved. An empty list yields an empty batch
    /// with `max_len = 0`; zero-length sequences are allowed.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(sequences)))]
    pub fn pad<S>(
        sequences: &[S],
        pad_index: T,
    ) -> Self
    where
        S: AsRef<[T]>,
    {
        let lengths: Vec<usize> = sequences.iter().map(|s| s.as_ref().len()).collect();
        let max_len = lengths.iter().copied().max().unwrap_or(0);
        let batch_size = sequences.len();

        let padded = Array2::from_shape_fn((max_len, batch_size), |(pos, seq)| {
            sequences[seq]
                .as_ref()
                .get(pos)
                .copied()
                .unwrap_or(pad_index)
        });
        let pad_mask = Array2::from_shape_fn((batch_size, max_len), |(seq, pos)| {
            pos >= lengths[seq]
        });

        Self {
            padded,
            lengths,
            pad_mask,
            pad_index,
        }
    }

    /// The `max_len x N` padded matrix.
    pub fn padded(&self) -> &Array2<T> {
        &self.padded
    }

    /// The true length of each sequence.
    pub fn lengths(&self) -> &[usize] {
        &self.lengths
    }

    /// The `N x max_len` mask; `true` at padded positions.
    pub fn pad_mask(&self) -> &Array2<bool> {
        &self.pad_mask
    }

    /// The pad index used to fill the batch.
    pub fn pad_index(&self) -> T {
        self.pad_index
    }

    /// The padded width.
    pub fn max_len(&self) -> usize {
        self.padded.nrows()
    }

    /// The number of sequences.
    pub fn batch_size(&self) -> usize {
        self.lengths.len()
    }

    /// Does the batch hold no sequences?
    pub fn is_empty(&self) -> bool {
        self.lengths.is_empty()
    }

    /// Token `pos` of sequence `seq`; `pad_index` past the sequence's end.
    ///
    /// ## Panics
    /// Panics if `seq >= batch_size()` or `pos >= max_len()`.
    pub fn token(
        &self,
        seq: usize,
        pos: usize,
    ) -> T {
        self.padded[(pos, seq)]
    }

    /// Sequence `seq`, with padding removed.
    pub fn sequence(
        &self,
        seq: usize,
    ) -> Vec<T> {
        (0..self.lengths[seq])
            .map(|pos| self.token(seq, pos))
            .collect()
    }
}
