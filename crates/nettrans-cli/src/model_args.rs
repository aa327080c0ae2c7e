use std::sync::Arc;

use nettrans::{
    decoding::ProbabilityMode,
    oracle::BigramOracle,
    rayon::ParallelRayonTransliterator,
    transliterator::{Transliterator, TransliteratorOptions},
    vocab::{SymbolTable, UnknownSymbolPolicy},
};

/// The CLI's concrete model type.
pub type CliTransliterator = ParallelRayonTransliterator<Transliterator<u32, BigramOracle>>;

/// Model loading arg group.
#[derive(clap::Args, Debug)]
pub struct ModelArgs {
    /// Source symbol table (JSON).
    #[arg(long)]
    source_vocab: String,

    /// Target symbol table (JSON).
    #[arg(long)]
    target_vocab: String,

    /// Bigram model (JSON), as written by `train-bigram`.
    #[arg(long)]
    model: String,

    /// Transliterator options (JSON); the flags below override it.
    #[arg(long, default_value = None)]
    config: Option<String>,

    /// Beam width.
    #[arg(long, default_value = None)]
    beam_size: Option<usize>,

    /// Maximum output length.
    #[arg(long, default_value = None)]
    max_pred_len: Option<usize>,

    /// Maximum input length, in characters.
    #[arg(long, default_value = None)]
    max_input_len: Option<usize>,

    /// Report probabilities normalized over the returned beam.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    normalized: bool,

    /// Reject inputs with unknown source characters, instead of dropping them.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    strict: bool,

    /// Size of the rayon thread pool; defaults to one per core.
    #[arg(long, default_value = None)]
    threads: Option<usize>,
}

impl ModelArgs {
    /// Resolve the options: the config file first, then flag overrides.
    pub fn options(&self) -> Result<TransliteratorOptions, Box<dyn std::error::Error>> {
        let mut options = match &self.config {
            Some(path) => TransliteratorOptions::load_json_path(path)?,
            None => TransliteratorOptions::default(),
        };

        let mut decoder = *options.decoder();
        if let Some(beam_size) = self.beam_size {
            decoder.set_beam_size(beam_size);
        }
        if let Some(max_pred_len) = self.max_pred_len {
            decoder.set_max_pred_len(max_pred_len);
        }
        decoder.validate()?;
        options.set_decoder(decoder);

        if let Some(max_input_len) = self.max_input_len {
            options.set_max_input_len(max_input_len);
        }
        if self.normalized {
            options.set_probability_mode(ProbabilityMode::Normalized);
        }
        if self.strict {
            let vectorizer = options
                .vectorizer()
                .with_unknown_symbols(UnknownSymbolPolicy::Strict);
            options.set_vectorizer(vectorizer);
        }

        Ok(options)
    }

    /// Load the tables and model, and build the transliterator.
    pub fn load_transliterator(
        &self
    ) -> Result<(TransliteratorOptions, CliTransliterator), Box<dyn std::error::Error>> {
        if let Some(threads) = self.threads {
            rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build_global()?;
        }

        let options = self.options()?;

        let source: SymbolTable<u32> = SymbolTable::load_json_path(&self.source_vocab)?;
        let target: SymbolTable<u32> = SymbolTable::load_json_path(&self.target_vocab)?;
        let oracle = BigramOracle::load_json_path(&self.model)?;
        if oracle.vocab_size() != target.len() {
            return Err(format!(
                "model vocab size {} does not match target table size {}",
                oracle.vocab_size(),
                target.len()
            )
            .into());
        }

        log::info!(
            "loaded model: {} source symbols, {} target symbols",
            source.len(),
            target.len()
        );

        let model = options.build(Arc::new(source), Arc::new(target), oracle);
        Ok((options, ParallelRayonTransliterator::new(model)))
    }
}
