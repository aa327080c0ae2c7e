//! Transliterator Options
//!
//! Options for building a [`Transliterator`].

use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
    sync::Arc,
};

use serde::{Deserialize, Serialize};

use crate::{
    NTResult,
    decoding::{DecoderOptions, ProbabilityMode},
    oracle::ScoringOracle,
    transliterator::Transliterator,
    types::TokenType,
    vocab::{SymbolTable, VectorizerOptions},
};

/// The default bound on cleaned input length, in characters.
pub const DEFAULT_MAX_INPUT_LEN: usize = 36;

/// Options for configuring a [`Transliterator`].
///
/// Loadable from JSON; missing fields take their defaults:
/// ```json
/// {"max_input_len": 36, "decoder": {"beam_size": 3}}
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransliteratorOptions {
    /// The maximum cleaned input length, in characters.
    pub max_input_len: usize,

    /// Lowercase input before vectorizing.
    pub lowercase: bool,

    /// Remove all whitespace from input before vectorizing.
    pub strip_whitespace: bool,

    /// How hypothesis scores are reported.
    pub probability_mode: ProbabilityMode,

    /// Source vectorization options.
    pub vectorizer: VectorizerOptions,

    /// Default decoder options.
    pub decoder: DecoderOptions,
}

impl Default for TransliteratorOptions {
    fn default() -> Self {
        Self {
            max_input_len: DEFAULT_MAX_INPUT_LEN,
            lowercase: true,
            strip_whitespace: true,
            probability_mode: ProbabilityMode::default(),
            vectorizer: VectorizerOptions::default(),
            decoder: DecoderOptions::default(),
        }
    }
}

impl TransliteratorOptions {
    /// Gets the configured max input length.
    pub fn max_input_len(&self) -> usize {
        self.max_input_len
    }

    /// Sets the configured max input length.
    pub fn set_max_input_len(
        &mut self,
        max_input_len: usize,
    ) {
        self.max_input_len = max_input_len;
    }

    /// Sets the configured max input length.
    pub fn with_max_input_len(
        mut self,
        max_input_len: usize,
    ) -> Self {
        self.set_max_input_len(max_input_len);
        self
    }

    /// Gets the configured lowercase flag.
    pub fn lowercase(&self) -> bool {
        self.lowercase
    }

    /// Sets the configured lowercase flag.
    pub fn set_lowercase(
        &mut self,
        lowercase: bool,
    ) {
        self.lowercase = lowercase;
    }

    /// Sets the configured lowercase flag.
    pub fn with_lowercase(
        mut self,
        lowercase: bool,
    ) -> Self {
        self.set_lowercase(lowercase);
        self
    }

    /// Gets the configured whitespace stripping flag.
    pub fn strip_whitespace(&self) -> bool {
        self.strip_whitespace
    }

    /// Sets the configured whitespace stripping flag.
    pub fn set_strip_whitespace(
        &mut self,
        strip_whitespace: bool,
    ) {
        self.strip_whitespace = strip_whitespace;
    }

    /// Sets the configured whitespace stripping flag.
    pub fn with_strip_whitespace(
        mut self,
        strip_whitespace: bool,
    ) -> Self {
        self.set_strip_whitespace(strip_whitespace);
        self
    }

    /// Gets the configured probability mode.
    pub fn probability_mode(&self) -> ProbabilityMode {
        self.probability_mode
    }

    /// Sets the configured probability mode.
    pub fn set_probability_mode(
        &mut self,
        probability_mode: ProbabilityMode,
    ) {
        self.probability_mode = probability_mode;
    }

    /// Sets the configured probability mode.
    pub fn with_probability_mode(
        mut self,
        probability_mode: ProbabilityMode,
    ) -> Self {
        self.set_probability_mode(probability_mode);
        self
    }

    /// Gets the configured vectorizer options.
    pub fn vectorizer(&self) -> &VectorizerOptions {
        &self.vectorizer
    }

    /// Sets the configured vectorizer options.
    pub fn set_vectorizer(
        &mut self,
        vectorizer: VectorizerOptions,
    ) {
        self.vectorizer = vectorizer;
    }

    /// Sets the configured vectorizer options.
    pub fn with_vectorizer(
        mut self,
        vectorizer: VectorizerOptions,
    ) -> Self {
        self.set_vectorizer(vectorizer);
        self
    }

    /// Gets the configured decoder options.
    pub fn decoder(&self) -> &DecoderOptions {
        &self.decoder
    }

    /// Sets the configured decoder options.
    pub fn set_decoder(
        &mut self,
        decoder: DecoderOptions,
    ) {
        self.decoder = decoder;
    }

    /// Sets the configured decoder options.
    pub fn with_decoder(
        mut self,
        decoder: DecoderOptions,
    ) -> Self {
        self.set_decoder(decoder);
        self
    }

    /// Read options from JSON.
    pub fn read_json<R: Read>(reader: R) -> NTResult<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Load options from a JSON file.
    pub fn load_json_path<P: AsRef<Path>>(path: P) -> NTResult<Self> {
        let options = Self::read_json(BufReader::new(File::open(path.as_ref())?))?;
        log::debug!("loaded transliterator options from {}", path.as_ref().display());
        Ok(options)
    }

    /// Build a [`Transliterator`].
    ///
    /// ## Arguments
    /// * `source` - the source table; input characters are looked up here.
    /// * `target` - the target table; the decoder's vocabulary.
    /// * `oracle` - the scoring oracle.
    pub fn build<T, O>(
        &self,
        source: Arc<SymbolTable<T>>,
        target: Arc<SymbolTable<T>>,
        oracle: O,
    ) -> Transliterator<T, O>
    where
        T: TokenType,
        O: ScoringOracle<T>,
    {
        Transliterator::new(*self, source, target, oracle)
    }
}

#[cfg(test)]
mod tests {
    use tempdir::TempDir;

    use super::*;
    use crate::vocab::UnknownSymbolPolicy;

    #[test]
    fn test_defaults() {
        let options = TransliteratorOptions::default();
        assert_eq!(options.max_input_len(), 36);
        assert!(options.lowercase());
        assert!(options.strip_whitespace());
        assert_eq!(options.probability_mode(), ProbabilityMode::Sequence);
        assert_eq!(options.decoder(), &DecoderOptions::default());
    }

    #[test]
    fn test_partial_json() {
        let json = r#"{
            "max_input_len": 20,
            "probability_mode": "normalized",
            "vectorizer": {"unknown_symbols": "strict"},
            "decoder": {"beam_size": 3}
        }"#;
        let options = TransliteratorOptions::read_json(json.as_bytes()).unwrap();
        assert_eq!(options.max_input_len(), 20);
        assert!(options.lowercase());
        assert_eq!(options.probability_mode(), ProbabilityMode::Normalized);
        assert_eq!(
            options.vectorizer().unknown_symbols(),
            UnknownSymbolPolicy::Strict
        );
        assert_eq!(options.decoder().beam_size(), 3);
        assert_eq!(
            options.decoder().max_pred_len(),
            DecoderOptions::default().max_pred_len()
        );
    }

    #[test]
    fn test_load_json_path() {
        let dir = TempDir::new("nettrans_options").unwrap();
        let path = dir.path().join("options.json");

        let options = TransliteratorOptions::default()
            .with_lowercase(false)
            .with_decoder(DecoderOptions::default().with_max_pred_len(12));
        std::fs::write(&path, serde_json::to_string(&options).unwrap()).unwrap();

        assert_eq!(TransliteratorOptions::load_json_path(&path).unwrap(), options);
    }
}
