//! # Greedy Decoder

use core::cmp::Ordering as CmpOrdering;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::{
    NTResult,
    batching::{CausalMaskCache, PaddedBatch},
    decoding::{
        DecoderOptions,
        hypothesis::{DecodeOutcome, Hypothesis, StopReason, score_cmp},
    },
    oracle::ScoringOracle,
    types::{TokenType, try_index},
    vocab::SymbolTable,
};

/// Single-path argmax decoding.
///
/// Produces the same tokens and score as [`super::BeamSearchDecoder`] with
/// `beam_size = 1`: ties go to the lowest index, NaN never wins over a
/// number. `beam_size` is ignored.
#[derive(Debug, Clone, Default)]
pub struct GreedyDecoder {
    options: DecoderOptions,
    masks: CausalMaskCache,
}

impl GreedyDecoder {
    /// Create a new decoder.
    pub fn new(
        options: DecoderOptions,
        masks: CausalMaskCache,
    ) -> Self {
        Self { options, masks }
    }

    /// The decoder options.
    pub fn options(&self) -> &DecoderOptions {
        &self.options
    }

    /// The causal mask cache.
    pub fn masks(&self) -> &CausalMaskCache {
        &self.masks
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
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(skip(self, oracle, source, table, cancel))
    )]
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
        self.options.validate()?;

        let vocab_size = table.len();
        let eos = table.eos_index();

        let mut prefix = vec![table.sos_index()];
        let mut score = 0.0f64;
        let mut steps = 0;

        let stop_reason = loop {
            if prefix.last() == Some(&eos) {
                break StopReason::AllFinished;
            }
            if steps >= self.options.max_pred_len() {
                break StopReason::MaxLength;
            }
            if cancel.load(Ordering::Relaxed) {
                break StopReason::Cancelled;
            }

            let batch = PaddedBatch::pad(core::slice::from_ref(&prefix), table.pad_index());
            let mask = self.masks.get(batch.max_len());

            let scores = oracle.score(source, &batch, &mask)?;
            steps += 1;
            scores.check_shape(1, vocab_size)?;

            let mut best = (0, score + scores.log_prob(0, 0));
            for v in 1..vocab_size {
                let candidate = score + scores.log_prob(0, v);
                if score_cmp(candidate, best.1) == CmpOrdering::Greater {
                    best = (v, candidate);
                }
            }

            prefix.push(try_index(best.0)?);
            score = best.1;
        };

        prefix.remove(0);
        let is_finished = prefix.last() == Some(&eos);

        Ok(DecodeOutcome {
            hypotheses: vec![Hypothesis {
                tokens: prefix,
                score,
                is_finished,
            }],
            stop_reason,
            steps,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        decoding::BeamSearchDecoder,
        oracle::FnOracle,
        testing::{hashed_oracle, scripted_table},
    };

    type T = u16;

    fn options(max_pred_len: usize) -> DecoderOptions {
        DecoderOptions::default()
            .with_beam_size(1)
            .with_max_pred_len(max_pred_len)
    }

    #[test]
    fn test_greedy_scripted() {
        let table = scripted_table::<T>(&["a", "b"]);
        let a = table.lookup_index("a").unwrap();
        let oracle = FnOracle::probabilities(move |_: &[T], prefix: &[T]| {
            if prefix.last() == Some(&a) {
                vec![0.0, 0.8, 0.0, 0.1, 0.1]
            } else {
                vec![0.0, 0.1, 0.0, 0.7, 0.2]
            }
        });

        let outcome = GreedyDecoder::new(options(5), CausalMaskCache::new())
            .decode(&oracle, &vec![], &table)
            .unwrap();
        assert_eq!(outcome.stop_reason, StopReason::AllFinished);
        assert_eq!(outcome.steps, 2);
        assert_eq!(
            outcome.best().unwrap().tokens,
            vec![a, table.eos_index()]
        );
    }

    #[test]
    fn test_ties_to_lowest_index() {
        let table = scripted_table::<T>(&["a", "b"]);
        let oracle = FnOracle::probabilities(|_: &[T], _: &[T]| vec![0.0, 0.0, 0.0, 0.5, 0.5]);

        let outcome = GreedyDecoder::new(options(3), CausalMaskCache::new())
            .decode(&oracle, &vec![], &table)
            .unwrap();
        assert_eq!(outcome.stop_reason, StopReason::MaxLength);
        assert_eq!(outcome.best().unwrap().tokens, vec![3, 3, 3]);
        assert!(!outcome.best().unwrap().is_finished);
    }

    #[test]
    fn test_matches_beam_of_one() {
        for symbols in [&["a"][..], &["a", "b", "c"][..], &["x", "y", "z", "w"][..]] {
            let table = scripted_table::<T>(symbols);
            let oracle = hashed_oracle::<T>(table.len());

            for max_pred_len in 1..=6 {
                for source in [vec![3 as T], vec![4, 5, 3]] {
                    let opts = options(max_pred_len).with_greedy_fast_path(false);
                    let masks = CausalMaskCache::new();

                    let greedy = GreedyDecoder::new(opts, masks.clone())
                        .decode(&oracle, &source, &table)
                        .unwrap();
                    let beam = BeamSearchDecoder::new(opts, masks)
                        .decode(&oracle, &source, &table)
                        .unwrap();

                    assert_eq!(greedy.hypotheses, beam.hypotheses);
                    assert_eq!(greedy.steps, beam.steps);
                    assert_eq!(greedy.stop_reason, beam.stop_reason);
                }
            }
        }
    }
}
