//! # Beam Search Decoder

use std::sync::atomic::{AtomicBool, Ordering};

use crate::{
    NTResult,
    batching::{CausalMaskCache, PaddedBatch},
    decoding::{
        DecoderOptions,
        beam::{Beam, Candidate, TopK},
        hypothesis::{DecodeOutcome, StopReason, sort_descending},
    },
    oracle::ScoringOracle,
    types::{TokenType, try_index},
    vocab::SymbolTable,
};

/// Beam search over a [`ScoringOracle`].
///
/// Each step queries the oracle once, with every unfinished hypothesis as
/// one padded batch, and keeps the `K = min(beam_size, vocab_size)` best
/// extensions. Finished hypotheses ride along with their score unchanged.
#[derive(Debug, Clone, Default)]
pub struct BeamSearchDecoder {
    options: DecoderOptions,
    masks: CausalMaskCache,
}

impl BeamSearchDecoder {
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
    ///
    /// See [`Self::decode_with_cancel`].
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
    ///
    /// ## Arguments
    /// * `oracle` - the scoring oracle.
    /// * `source` - the oracle's encoded source.
    /// * `table` - the target table; supplies `sos`, `eos`, `pad` and the vocab size.
    /// * `cancel` - when set, the decode stops before its next step.
    ///
    /// ## Returns
    /// Up to `K` hypotheses, best first. Fails with `InvalidArgument` before
    /// any oracle call when the options are out of range, and with `Oracle`
    /// when the oracle fails or returns a malformed score block.
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
        let k = self.options.beam_size().min(vocab_size);

        let mut beam = Beam::new(table.sos_index(), table.eos_index());
        let mut steps = 0;

        let stop_reason = loop {
            if beam.all_finished() {
                break StopReason::AllFinished;
            }
            if beam.depth() >= self.options.max_pred_len() {
                break StopReason::MaxLength;
            }
            if cancel.load(Ordering::Relaxed) {
                log::debug!("beam decode cancelled after {steps} steps");
                break StopReason::Cancelled;
            }

            let active = beam.active_slots();
            let prefixes: Vec<Vec<T>> = active.iter().map(|&slot| beam.path(slot)).collect();
            let batch = PaddedBatch::pad(&prefixes, table.pad_index());
            let mask = self.masks.get(batch.max_len());

            let scores = oracle.score(source, &batch, &mask)?;
            steps += 1;
            scores.check_shape(active.len(), vocab_size)?;

            let mut top = TopK::new(k);
            let mut row = 0;
            for (slot, state) in beam.slots().iter().enumerate() {
                if state.finished {
                    top.push(beam.carry_over(slot));
                    continue;
                }
                for v in 0..vocab_size {
                    let token: T = try_index(v)?;
                    top.push(Candidate {
                        slot,
                        token,
                        score: state.score + scores.log_prob(row, v),
                        finished: token == table.eos_index(),
                    });
                }
                row += 1;
            }

            beam.advance(top.into_sorted());
        };

        let mut hypotheses = beam.hypotheses();
        sort_descending(&mut hypotheses);

        log::debug!(
            "beam decode: {} hypotheses, {steps} steps, {stop_reason:?}",
            hypotheses.len()
        );

        Ok(DecodeOutcome {
            hypotheses,
            stop_reason,
            steps,
        })
    }
}
