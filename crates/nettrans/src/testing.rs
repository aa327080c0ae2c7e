//! # Test Utilities
//!
//! Fixture tables, corpora, and deterministic oracles.

use crate::{
    batching::{PaddedBatch, causal_mask},
    decoding::{Hypothesis, hypothesis::score_cmp},
    oracle::{FnOracle, ScoringOracle},
    types::{TokenType, index_to_usize},
    vocab::{
        SpecialSymbols,
        SymbolTable,
        corpus::{CorpusRecord, read_corpus},
    },
};

/// A small romanized-name to Hangul corpus.
pub const FIXTURE_CORPUS: &str = "\
kim 김
park 박
lee 이
choi 최
jung 정
kang 강
cho 조
yoon 윤
jang 장
lim 임
han 한
shin 신
";

/// Parse [`FIXTURE_CORPUS`].
pub fn fixture_records() -> Vec<CorpusRecord> {
    read_corpus(FIXTURE_CORPUS.as_bytes()).unwrap()
}

/// Build a table over the default specials plus `symbols`.
///
/// Layout: `pad = 0, eos = 1, sos = 2`, then `symbols` sorted.
pub fn scripted_table<T: TokenType>(symbols: &[&str]) -> SymbolTable<T> {
    SymbolTable::from_symbols(SpecialSymbols::default(), symbols.iter().copied()).unwrap()
}

fn fnv1a(values: impl Iterator<Item = u64>) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for v in values {
        for byte in v.to_le_bytes() {
            hash ^= byte as u64;
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
    }
    hash
}

/// A deterministic oracle with pseudo-random, prefix-dependent distributions.
///
/// Every row is a normalized probability distribution over `vocab_size` tokens.
pub fn hashed_oracle<T: TokenType>(
    vocab_size: usize
) -> FnOracle<impl Fn(&[T], &[T]) -> Vec<f32> + Send + Sync> {
    FnOracle::probabilities(move |source: &[T], prefix: &[T]| {
        let key: Vec<u64> = source
            .iter()
            .chain(prefix)
            .map(|&t| index_to_usize(t) as u64)
            .chain([source.len() as u64])
            .collect();

        let weights: Vec<f32> = (0..vocab_size)
            .map(|v| {
                let h = fnv1a(key.iter().copied().chain([v as u64 + 0x9e37]));
                1.0 + (h % 997) as f32
            })
            .collect();
        let total: f32 = weights.iter().sum();
        weights.into_iter().map(|w| w / total).collect()
    })
}

/// Brute-force one beam step.
///
/// Expands every hypothesis of `previous` against every token (finished
/// hypotheses carry over unchanged) and returns the `k` best cumulative
/// scores, best first.
pub fn brute_force_step<T, O>(
    oracle: &O,
    source: &O::Source,
    table: &SymbolTable<T>,
    previous: &[Hypothesis<T>],
    k: usize,
) -> Vec<f64>
where
    T: TokenType,
    O: ScoringOracle<T>,
{
    let mut scores = Vec::new();
    for hyp in previous {
        if hyp.is_finished {
            scores.push(hyp.score);
            continue;
        }
        let prefix: Vec<T> = core::iter::once(table.sos_index())
            .chain(hyp.tokens.iter().copied())
            .collect();
        let batch = PaddedBatch::pad(&[prefix], table.pad_index());
        let rows = oracle
            .score(source, &batch, &causal_mask(batch.max_len()))
            .unwrap();
        for v in 0..table.len() {
            scores.push(hyp.score + rows.log_prob(0, v));
        }
    }
    scores.sort_by(|a, b| score_cmp(*b, *a));
    scores.truncate(k);
    scores
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_records() {
        let records = fixture_records();
        assert_eq!(records.len(), 12);
        assert_eq!(records[0].source_word(), "kim");
        assert_eq!(records[0].target_text(), "김");
    }

    #[test]
    fn test_hashed_oracle_is_normalized() {
        let oracle = hashed_oracle::<u16>(6);
        let batch = PaddedBatch::pad(&[vec![2u16], vec![2, 3, 4]], 0);
        let scores = oracle
            .score(&vec![5, 6], &batch, &causal_mask(3))
            .unwrap();

        for row in scores.rows().outer_iter() {
            let total: f32 = row.iter().sum();
            assert!((total - 1.0).abs() < 1e-5);
            assert!(row.iter().all(|&p| p > 0.0));
        }
        assert_ne!(scores.rows().row(0), scores.rows().row(1));
    }
}
