//! # Transliterator
//!
//! The front door: cleans and vectorizes a source string, wraps it in
//! `sos`/`eos`, decodes against a [`ScoringOracle`], and textualizes the
//! ranked hypotheses.
//!
//! Backends are configured once and used through the object-safe
//! [`Transliterate`] trait, e.g. from a [`TransliteratorRegistry`].
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use nettrans::{
//!     oracle::BigramOracleOptions,
//!     transliterator::{Transliterate, TransliteratorOptions},
//!     vocab::{SymbolTable, corpus::read_corpus},
//! };
//!
//! let records = read_corpus("kim 김\npark 박\nkim 김\n".as_bytes()).unwrap();
//! let (source, target) = SymbolTable::<u32>::build_pair(&records).unwrap();
//! let oracle = BigramOracleOptions::default().train(&records, &target).unwrap();
//!
//! let model = TransliteratorOptions::default().build(Arc::new(source), Arc::new(target), oracle);
//! let predictions = model.transliterate("Kim", 2, 8).unwrap();
//!
//! assert_eq!(predictions[0].rank, 1);
//! assert_eq!(predictions[0].text, "김");
//! ```

pub mod registry;
pub mod transliterator_options;

use std::sync::{Arc, atomic::AtomicBool};

use serde::{Deserialize, Serialize};

#[doc(inline)]
pub use registry::TransliteratorRegistry;
#[doc(inline)]
pub use transliterator_options::{DEFAULT_MAX_INPUT_LEN, TransliteratorOptions};

use crate::{
    NTResult,
    NetTransError,
    decoding::{DecodeOutcome, DecoderOptions, SequenceDecoder},
    oracle::ScoringOracle,
    types::TokenType,
    vocab::{SymbolTable, Vectorizer, VectorizerOptions},
};

/// One ranked transliteration.
///
/// A transliteration returns `min(beam_size, vocab_size)` predictions even
/// when the oracle rules some continuations out entirely. Those predictions
/// rank last with probability `0.0`, and their text may hold symbols the
/// oracle never emits (such as `<pad>`); see [`Prediction::is_possible`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// 1-based rank.
    pub rank: usize,

    /// The target text, control symbols removed.
    pub text: String,

    /// The reported probability; see [`crate::decoding::ProbabilityMode`].
    pub probability: f64,
}

impl Prediction {
    /// Did the oracle give this prediction a non-zero probability?
    pub fn is_possible(&self) -> bool {
        self.probability > 0.0
    }

    /// The display label, `"No.{rank}"`.
    pub fn label(&self) -> String {
        format!("No.{}", self.rank)
    }
}

/// Object-safe transliteration.
pub trait Transliterate: Send + Sync {
    /// Transliterate one source string.
    ///
    /// ## Arguments
    /// * `text` - the raw source text.
    /// * `beam_size` - the beam width; must be `>= 1`.
    /// * `max_pred_len` - the maximum output length; must be `>= 1`.
    ///
    /// ## Returns
    /// Up to `beam_size` predictions, best first.
    fn transliterate(
        &self,
        text: &str,
        beam_size: usize,
        max_pred_len: usize,
    ) -> NTResult<Vec<Prediction>>;

    /// Transliterate a batch; each item succeeds or fails on its own.
    fn transliterate_batch(
        &self,
        texts: &[&str],
        beam_size: usize,
        max_pred_len: usize,
    ) -> Vec<NTResult<Vec<Prediction>>> {
        let results: Vec<_> = texts
            .iter()
            .map(|text| self.transliterate(text, beam_size, max_pred_len))
            .collect();
        log_batch_failures(&results);
        results
    }
}

impl<X: Transliterate + ?Sized> Transliterate for Arc<X> {
    fn transliterate(
        &self,
        text: &str,
        beam_size: usize,
        max_pred_len: usize,
    ) -> NTResult<Vec<Prediction>> {
        (**self).transliterate(text, beam_size, max_pred_len)
    }

    fn transliterate_batch(
        &self,
        texts: &[&str],
        beam_size: usize,
        max_pred_len: usize,
    ) -> Vec<NTResult<Vec<Prediction>>> {
        (**self).transliterate_batch(texts, beam_size, max_pred_len)
    }
}

/// Log the number of failed items in a batch.
pub(crate) fn log_batch_failures<V>(results: &[NTResult<V>]) {
    let failed = results.iter().filter(|r| r.is_err()).count();
    if failed > 0 {
        log::warn!("{failed} of {} batch items failed", results.len());
    }
}

/// A transliteration pipeline over one `(source, target, oracle)` triple.
#[derive(Debug)]
pub struct Transliterator<T: TokenType, O> {
    options: TransliteratorOptions,
    source: Vectorizer<T>,
    target: Vectorizer<T>,
    oracle: O,
    decoder: SequenceDecoder,
}

impl<T, O> Transliterator<T, O>
where
    T: TokenType,
    O: ScoringOracle<T>,
{
    /// Create a new transliterator.
    pub fn new(
        options: TransliteratorOptions,
        source: Arc<SymbolTable<T>>,
        target: Arc<SymbolTable<T>>,
        oracle: O,
    ) -> Self {
        Self {
            source: options.vectorizer.build(source),
            target: VectorizerOptions::default().build(target),
            decoder: options.decoder.build(),
            options,
            oracle,
        }
    }

    /// The configured options.
    pub fn options(&self) -> &TransliteratorOptions {
        &self.options
    }

    /// The source vectorizer.
    pub fn source(&self) -> &Vectorizer<T> {
        &self.source
    }

    /// The target table.
    pub fn target_table(&self) -> &Arc<SymbolTable<T>> {
        self.target.table()
    }

    /// The scoring oracle.
    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Normalize raw input: lowercase and whitespace removal, per the options.
    pub fn clean_input(
        &self,
        text: &str,
    ) -> String {
        let text = if self.options.lowercase {
            text.to_lowercase()
        } else {
            text.to_string()
        };
        if self.options.strip_whitespace {
            text.chars().filter(|c| !c.is_whitespace()).collect()
        } else {
            text
        }
    }

    /// Clean, check and vectorize a source string, wrapped in `sos`/`eos`.
    ///
    /// Fails with `InvalidArgument` when the cleaned text is empty or
    /// longer than `max_input_len` characters.
    pub fn prepare_source(
        &self,
        text: &str,
    ) -> NTResult<Vec<T>> {
        let cleaned = self.clean_input(text);
        let len = cleaned.chars().count();
        if len == 0 {
            return Err(NetTransError::invalid_argument("source text is empty"));
        }
        if len > self.options.max_input_len {
            return Err(NetTransError::invalid_argument(format!(
                "source text has {len} characters, max is {}",
                self.options.max_input_len
            )));
        }

        let table = self.source.table();
        let mut indices = Vec::with_capacity(len + 2);
        indices.push(table.sos_index());
        indices.extend(self.source.vectorize_chars(&cleaned)?);
        indices.push(table.eos_index());
        Ok(indices)
    }

    /// Decode a source string with the given options.
    ///
    /// Options are validated before the oracle is touched.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, cancel)))]
    pub fn decode_with(
        &self,
        text: &str,
        options: DecoderOptions,
        cancel: &AtomicBool,
    ) -> NTResult<DecodeOutcome<T>> {
        options.validate()?;
        let indices = self.prepare_source(text)?;
        let source = self.oracle.encode_source(&indices)?;

        let adjusted;
        let decoder = if &options == self.decoder.options() {
            &self.decoder
        } else {
            adjusted = self.decoder.with_options(options);
            &adjusted
        };
        decoder.decode_with_cancel(&self.oracle, &source, self.target.table(), cancel)
    }

    /// Convert a decode outcome into ranked predictions.
    pub fn predictions(
        &self,
        outcome: &DecodeOutcome<T>,
    ) -> NTResult<Vec<Prediction>> {
        let probabilities = outcome.probabilities(self.options.probability_mode);
        outcome
            .hypotheses
            .iter()
            .zip(probabilities)
            .enumerate()
            .map(|(idx, (hyp, probability))| {
                Ok(Prediction {
                    rank: idx + 1,
                    text: self.target.textualize_to_string(&hyp.tokens, true)?,
                    probability,
                })
            })
            .collect()
    }

    /// Transliterate with the configured decoder options.
    pub fn transliterate_default(
        &self,
        text: &str,
    ) -> NTResult<Vec<Prediction>> {
        let outcome = self.decode_with(text, *self.decoder.options(), &AtomicBool::new(false))?;
        self.predictions(&outcome)
    }

    /// Transliterate, polling `cancel` between decode steps.
    ///
    /// A cancelled decode still returns its current ranked hypotheses.
    pub fn transliterate_with_cancel(
        &self,
        text: &str,
        beam_size: usize,
        max_pred_len: usize,
        cancel: &AtomicBool,
    ) -> NTResult<Vec<Prediction>> {
        let options = self
            .options
            .decoder
            .with_beam_size(beam_size)
            .with_max_pred_len(max_pred_len);
        let outcome = self.decode_with(text, options, cancel)?;
        self.predictions(&outcome)
    }
}

impl<T, O> Transliterate for Transliterator<T, O>
where
    T: TokenType,
    O: ScoringOracle<T>,
{
    fn transliterate(
        &self,
        text: &str,
        beam_size: usize,
        max_pred_len: usize,
    ) -> NTResult<Vec<Prediction>> {
        self.transliterate_with_cancel(text, beam_size, max_pred_len, &AtomicBool::new(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        decoding::ProbabilityMode,
        oracle::{BigramOracle, BigramOracleOptions, FnOracle},
        testing::fixture_records,
        vocab::{UnknownSymbolPolicy, corpus::read_corpus},
    };

    type T = u32;

    fn fixture(options: TransliteratorOptions) -> Transliterator<T, BigramOracle> {
        let records = fixture_records();
        let (source, target) = SymbolTable::build_pair(&records).unwrap();
        let oracle = BigramOracleOptions::default()
            .train(&records, &target)
            .unwrap();
        options.build(Arc::new(source), Arc::new(target), oracle)
    }

    #[test]
    fn test_clean_and_prepare() {
        let model = fixture(TransliteratorOptions::default());
        assert_eq!(model.clean_input(" Kim  Jung "), "kimjung");

        let indices = model.prepare_source("KIM").unwrap();
        let table = model.source().table();
        assert_eq!(indices.first(), Some(&table.sos_index()));
        assert_eq!(indices.last(), Some(&table.eos_index()));
        assert_eq!(
            model.source().textualize_to_string(&indices, true).unwrap(),
            "kim"
        );

        let raw = fixture(
            TransliteratorOptions::default()
                .with_lowercase(false)
                .with_strip_whitespace(false),
        );
        assert_eq!(raw.clean_input(" Kim "), " Kim ");
    }

    #[test]
    fn test_input_errors() {
        let model = fixture(TransliteratorOptions::default().with_max_input_len(4));

        for text in ["", "   ", "parkpark"] {
            let err = model.transliterate(text, 3, 8).unwrap_err();
            assert!(err.is_invalid_argument(), "{text:?}: {err}");
        }
        assert!(model.transliterate("park", 0, 8).unwrap_err().is_invalid_argument());
        assert!(model.transliterate("park", 3, 0).unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_invalid_options_skip_oracle() {
        let records = fixture_records();
        let (source, target) = SymbolTable::<T>::build_pair(&records).unwrap();
        let vocab = target.len();
        let oracle = FnOracle::probabilities(move |_: &[T], _: &[T]| vec![1.0 / vocab as f32; vocab]);
        let model = TransliteratorOptions::default().build(Arc::new(source), Arc::new(target), oracle);

        assert!(model.transliterate("kim", 0, 5).is_err());
        assert!(model.transliterate("", 2, 5).is_err());
        assert_eq!(model.oracle().calls(), 0);
    }

    #[test]
    fn test_strict_unknown_symbols() {
        let model = fixture(TransliteratorOptions::default().with_vectorizer(
            VectorizerOptions::default().with_unknown_symbols(UnknownSymbolPolicy::Strict),
        ));
        assert!(matches!(
            model.transliterate("kim!", 2, 8),
            Err(NetTransError::UnknownSymbol(_))
        ));

        let lenient = fixture(TransliteratorOptions::default());
        assert!(lenient.transliterate("kim!", 2, 8).is_ok());
        assert_eq!(lenient.source().dropped_symbols(), 1);
    }

    #[test]
    fn test_predictions() {
        let model = fixture(TransliteratorOptions::default());
        let predictions = model.transliterate("kim", 3, 8).unwrap();

        assert_eq!(predictions.len(), 3);
        for (idx, p) in predictions.iter().enumerate() {
            assert_eq!(p.rank, idx + 1);
            assert_eq!(p.label(), format!("No.{}", idx + 1));
            assert!(!p.text.contains("<eos>"));
            assert!(p.probability > 0.0 && p.probability <= 1.0);
        }
        assert!(
            predictions
                .windows(2)
                .all(|w| w[0].probability >= w[1].probability)
        );
    }

    #[test]
    fn test_impossible_predictions_rank_last() {
        // Target table: pad eos sos x y; the bigram oracle never emits pad or sos.
        let records = read_corpus("ab x y\n".as_bytes()).unwrap();
        let (source, target) = SymbolTable::<T>::build_pair(&records).unwrap();
        let oracle = BigramOracleOptions::default()
            .train(&records, &target)
            .unwrap();
        let model =
            TransliteratorOptions::default().build(Arc::new(source), Arc::new(target), oracle);

        let predictions = model.transliterate("ab", 5, 1).unwrap();
        assert_eq!(predictions.len(), 5);
        assert!(predictions[..3].iter().all(Prediction::is_possible));
        assert!(predictions[3..].iter().all(|p| !p.is_possible()));
        assert!(predictions.iter().any(|p| p.text == "<pad>"));
    }

    #[test]
    fn test_normalized_probabilities() {
        let model = fixture(
            TransliteratorOptions::default().with_probability_mode(ProbabilityMode::Normalized),
        );
        let predictions = model.transliterate("lee", 4, 8).unwrap();
        let total: f64 = predictions.iter().map(|p| p.probability).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_batch() {
        let model = fixture(TransliteratorOptions::default());
        let results = model.transliterate_batch(&["kim", "", "park"], 2, 8);
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(results[1].as_ref().unwrap_err().is_invalid_argument());
        assert!(results[2].is_ok());
    }

    #[test]
    fn test_default_options() {
        let model = fixture(
            TransliteratorOptions::default()
                .with_decoder(DecoderOptions::default().with_beam_size(2)),
        );
        assert_eq!(model.transliterate_default("han").unwrap().len(), 2);
    }

    #[test]
    fn test_cancel_returns_partial() {
        let model = fixture(TransliteratorOptions::default());
        let cancel = AtomicBool::new(true);
        let predictions = model
            .transliterate_with_cancel("kim", 2, 8, &cancel)
            .unwrap();
        assert_eq!(predictions.len(), 1);
        assert_eq!(predictions[0].text, "");
    }
}
