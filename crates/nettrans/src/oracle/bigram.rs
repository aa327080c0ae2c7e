//! # Bigram Baseline Oracle
//!
//! An add-k smoothed bigram model over target symbols. It ignores the source
//! entirely, so it only ranks plausible target spellings; it exists to run
//! the decode and evaluation pipeline without a neural backend.
//!
//! Transitions are counted over `sos t1 .. tn eos`. The pad and sos symbols
//! are never predicted.

use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::{
    NTResult,
    NetTransError,
    batching::PaddedBatch,
    oracle::{NextTokenScores, ScoringOracle},
    types::{NTHashMap, TokenType, index_to_usize},
    vocab::{SymbolTable, corpus::CorpusRecord},
};

/// The largest target vocabulary a [`BigramOracle`] accepts.
///
/// The oracle holds a dense `vocab x vocab` table.
pub const MAX_BIGRAM_VOCAB_SIZE: usize = 1 << 13;

/// Options for training a [`BigramOracle`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BigramOracleOptions {
    /// The add-k smoothing constant; must be finite and `> 0`.
    pub smoothing: f32,
}

impl Default for BigramOracleOptions {
    fn default() -> Self {
        Self { smoothing: 0.1 }
    }
}

impl BigramOracleOptions {
    /// Gets the configured smoothing constant.
    pub fn smoothing(&self) -> f32 {
        self.smoothing
    }

    /// Sets the configured smoothing constant.
    pub fn set_smoothing(
        &mut self,
        smoothing: f32,
    ) {
        self.smoothing = smoothing;
    }

    /// Sets the configured smoothing constant.
    pub fn with_smoothing(
        mut self,
        smoothing: f32,
    ) -> Self {
        self.set_smoothing(smoothing);
        self
    }

    /// Train a [`BigramOracle`] on the target side of a corpus.
    ///
    /// ## Arguments
    /// * `records` - the training corpus.
    /// * `target` - the target table; records with symbols it lacks are skipped.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, records, target)))]
    pub fn train<T: TokenType>(
        &self,
        records: &[CorpusRecord],
        target: &SymbolTable<T>,
    ) -> NTResult<BigramOracle> {
        let mut counts: BTreeMap<(usize, usize), u32> = BTreeMap::new();
        let mut skipped = 0;

        for record in records {
            let Some(symbols) = record
                .target
                .iter()
                .map(|s| target.lookup_index(s))
                .collect::<Option<Vec<T>>>()
            else {
                skipped += 1;
                continue;
            };

            let path = std::iter::once(target.sos_index())
                .chain(symbols)
                .chain(std::iter::once(target.eos_index()))
                .map(index_to_usize)
                .collect::<Vec<_>>();

            for pair in path.windows(2) {
                *counts.entry((pair[0], pair[1])).or_default() += 1;
            }
        }

        if skipped > 0 {
            log::warn!("skipped {skipped} records with symbols outside the target table");
        }

        let record = BigramRecord {
            smoothing: self.smoothing,
            vocab_size: target.len(),
            blocked: vec![
                index_to_usize(target.pad_index()) as u64,
                index_to_usize(target.sos_index()) as u64,
            ],
            counts: counts
                .into_iter()
                .map(|((prev, next), count)| BigramCount {
                    prev: prev as u64,
                    next: next as u64,
                    count,
                })
                .collect(),
        };

        let oracle = record.try_into_oracle()?;
        log::info!(
            "trained bigram oracle: {} symbols, {} transitions",
            oracle.vocab_size(),
            oracle.record.counts.len()
        );
        Ok(oracle)
    }
}

/// One observed `prev -> next` transition count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BigramCount {
    /// The preceding symbol's index.
    pub prev: u64,

    /// The following symbol's index.
    pub next: u64,

    /// How often `next` followed `prev`.
    pub count: u32,
}

/// The persisted form of a [`BigramOracle`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BigramRecord {
    /// The add-k smoothing constant.
    pub smoothing: f32,

    /// The target vocabulary size.
    pub vocab_size: usize,

    /// Indices which are never predicted.
    pub blocked: Vec<u64>,

    /// Sparse transition counts.
    pub counts: Vec<BigramCount>,
}

impl BigramRecord {
    /// Validate the record and build the oracle's log-probability table.
    pub fn try_into_oracle(self) -> NTResult<BigramOracle> {
        if !(self.smoothing.is_finite() && self.smoothing > 0.0) {
            return Err(NetTransError::invalid_argument(format!(
                "bigram smoothing must be finite and > 0, got {}",
                self.smoothing
            )));
        }

        let vocab = self.vocab_size;
        if vocab > MAX_BIGRAM_VOCAB_SIZE {
            return Err(NetTransError::invalid_argument(format!(
                "bigram vocab size {vocab} exceeds the limit of {MAX_BIGRAM_VOCAB_SIZE}"
            )));
        }

        let check = |idx: u64| -> NTResult<usize> {
            usize::try_from(idx)
                .ok()
                .filter(|&i| i < vocab)
                .ok_or_else(|| {
                    NetTransError::invalid_argument(format!(
                        "bigram index {idx} out of range for vocab size {vocab}"
                    ))
                })
        };

        let mut allowed = vec![true; vocab];
        for &idx in &self.blocked {
            allowed[check(idx)?] = false;
        }
        let allowed_count = allowed.iter().filter(|&&a| a).count();

        let mut counts: NTHashMap<(usize, usize), u64> = NTHashMap::default();
        for c in &self.counts {
            let (prev, next) = (check(c.prev)?, check(c.next)?);
            *counts.entry((prev, next)).or_default() += c.count as u64;
        }
        let mut row_totals = vec![0u64; vocab];
        for (&(prev, next), &count) in &counts {
            if allowed[next] {
                row_totals[prev] += count;
            }
        }

        let k = self.smoothing as f64;
        let log_probs = Array2::from_shape_fn((vocab, vocab), |(prev, next)| {
            if !allowed[next] {
                return f32::NEG_INFINITY;
            }
            let count = counts.get(&(prev, next)).copied().unwrap_or(0);
            let numerator = count as f64 + k;
            let denominator = row_totals[prev] as f64 + k * allowed_count as f64;
            (numerator / denominator).ln() as f32
        });

        Ok(BigramOracle {
            record: self,
            log_probs,
        })
    }
}

/// An add-k smoothed target-side bigram [`ScoringOracle`].
#[derive(Debug, Clone, PartialEq)]
pub struct BigramOracle {
    record: BigramRecord,
    log_probs: Array2<f32>,
}

impl BigramOracle {
    /// The target vocabulary size.
    pub fn vocab_size(&self) -> usize {
        self.record.vocab_size
    }

    /// The smoothing constant this oracle was trained with.
    pub fn smoothing(&self) -> f32 {
        self.record.smoothing
    }

    /// The persisted form.
    pub fn record(&self) -> &BigramRecord {
        &self.record
    }

    /// The `ln P(next | prev)` table.
    pub fn log_probs(&self) -> &Array2<f32> {
        &self.log_probs
    }

    /// Write the oracle as JSON.
    pub fn write_json<W: Write>(
        &self,
        writer: W,
    ) -> NTResult<()> {
        serde_json::to_writer(writer, &self.record)?;
        Ok(())
    }

    /// Save the oracle as a JSON file.
    pub fn save_json_path<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> NTResult<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_json(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Read an oracle from JSON.
    pub fn read_json<R: Read>(reader: R) -> NTResult<Self> {
        let record: BigramRecord = serde_json::from_reader(reader)?;
        record.try_into_oracle()
    }

    /// Load an oracle from a JSON file.
    pub fn load_json_path<P: AsRef<Path>>(path: P) -> NTResult<Self> {
        let oracle = Self::read_json(BufReader::new(File::open(path.as_ref())?))?;
        log::debug!(
            "loaded bigram oracle ({} symbols) from {}",
            oracle.vocab_size(),
            path.as_ref().display()
        );
        Ok(oracle)
    }
}

impl<T: TokenType> ScoringOracle<T> for BigramOracle {
    type Source = ();

    fn encode_source(
        &self,
        _source: &[T],
    ) -> NTResult<Self::Source> {
        Ok(())
    }

    fn score(
        &self,
        _source: &Self::Source,
        prefixes: &PaddedBatch<T>,
        _causal_mask: &Array2<f32>,
    ) -> NTResult<NextTokenScores> {
        let vocab = self.vocab_size();
        let mut lasts = Vec::with_capacity(prefixes.batch_size());
        for (seq, &len) in prefixes.lengths().iter().enumerate() {
            if len == 0 {
                return Err(NetTransError::oracle("empty target prefix"));
            }
            let last = index_to_usize(prefixes.token(seq, len - 1));
            if last >= vocab {
                return Err(NetTransError::oracle(format!(
                    "prefix token {last} out of range for vocab size {vocab}"
                )));
            }
            lasts.push(last);
        }

        Ok(NextTokenScores::log_probabilities(
            self.log_probs.select(Axis(0), &lasts),
        ))
    }
}

#[cfg(test)]
mod tests {
    use tempdir::TempDir;

    use super::*;
    use crate::{batching::causal_mask, vocab::corpus::read_corpus};

    type T = u16;

    fn fixture() -> (Vec<CorpusRecord>, SymbolTable<T>) {
        let records = read_corpus("ab a b\nac a c\nab a b\n".as_bytes()).unwrap();
        let (_, target) = SymbolTable::build_pair(&records).unwrap();
        (records, target)
    }

    #[test]
    fn test_train_distribution() {
        let (records, target) = fixture();
        let oracle = BigramOracleOptions::default()
            .with_smoothing(0.5)
            .train(&records, &target)
            .unwrap();

        assert_eq!(oracle.vocab_size(), target.len());

        let a = index_to_usize(target.lookup_index("a").unwrap());
        let b = index_to_usize(target.lookup_index("b").unwrap());
        let c = index_to_usize(target.lookup_index("c").unwrap());
        let pad = index_to_usize(target.pad_index());
        let sos = index_to_usize(target.sos_index());

        let row = oracle.log_probs().row(a);
        assert_eq!(row[pad], f32::NEG_INFINITY);
        assert_eq!(row[sos], f32::NEG_INFINITY);
        assert!(row[b] > row[c]);

        let total: f64 = row.iter().map(|&lp| (lp as f64).exp()).sum();
        assert!((total - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_score_uses_last_token() {
        let (records, target) = fixture();
        let oracle = BigramOracleOptions::default()
            .train(&records, &target)
            .unwrap();

        let sos = target.sos_index();
        let a = target.lookup_index("a").unwrap();
        let batch = PaddedBatch::pad(&[vec![sos], vec![sos, a]], target.pad_index());
        let scores = ScoringOracle::<T>::score(&oracle, &(), &batch, &causal_mask(2)).unwrap();

        assert_eq!(scores.rows().dim(), (2, target.len()));
        assert_eq!(scores.rows().row(0), oracle.log_probs().row(index_to_usize(sos)));
        assert_eq!(scores.rows().row(1), oracle.log_probs().row(index_to_usize(a)));
    }

    #[test]
    fn test_rejects_bad_smoothing() {
        let (records, target) = fixture();
        let res = BigramOracleOptions::default()
            .with_smoothing(0.0)
            .train(&records, &target);
        assert!(matches!(res, Err(NetTransError::InvalidArgument(_))));
    }

    #[test]
    fn test_json_roundtrip() {
        let (records, target) = fixture();
        let oracle = BigramOracleOptions::default()
            .train(&records, &target)
            .unwrap();

        let dir = TempDir::new("nettrans_bigram").unwrap();
        let path = dir.path().join("bigram.json");
        oracle.save_json_path(&path).unwrap();

        let loaded = BigramOracle::load_json_path(&path).unwrap();
        assert_eq!(loaded, oracle);
    }

    #[test]
    fn test_rejects_oversized_vocab() {
        let json = r#"{"smoothing":0.1,"vocab_size":4294967297,"blocked":[],"counts":[]}"#;
        let res = BigramOracle::read_json(json.as_bytes());
        assert!(matches!(res, Err(NetTransError::InvalidArgument(_))));

        let record = BigramRecord {
            smoothing: 0.1,
            vocab_size: MAX_BIGRAM_VOCAB_SIZE + 1,
            blocked: vec![],
            counts: vec![],
        };
        assert!(record.try_into_oracle().unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_rejects_out_of_range_counts() {
        let json = r#"{"smoothing":0.1,"vocab_size":3,"blocked":[],"counts":[{"prev":0,"next":7,"count":1}]}"#;
        let res = BigramOracle::read_json(json.as_bytes());
        assert!(matches!(res, Err(NetTransError::InvalidArgument(_))));
    }
}
