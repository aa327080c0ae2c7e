use std::io::Write;

use nettrans::{oracle::BigramOracleOptions, vocab::SymbolTable};

use crate::{
    input_output::{OutputArgs, load_corpus_files},
    logging::{BaseVerbosity, LogArgs},
};

/// Args for the train-bigram command.
#[derive(clap::Args, Debug)]
pub struct TrainBigramArgs {
    /// Corpus files.
    #[arg(required = true)]
    files: Vec<String>,

    #[clap(flatten)]
    pub logging: LogArgs,

    /// Target symbol table (JSON), as written by `vocab`.
    #[arg(long)]
    target_vocab: String,

    /// Add-k smoothing constant.
    #[arg(long, default_value_t = BigramOracleOptions::default().smoothing())]
    smoothing: f32,

    #[command(flatten)]
    output: OutputArgs,
}

impl TrainBigramArgs {
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.logging.init(BaseVerbosity::Progress)?;

        let target: SymbolTable<u32> = SymbolTable::load_json_path(&self.target_vocab)?;

        let records = load_corpus_files(&self.files)?;

        log::info!("Training bigram model...");
        let oracle = BigramOracleOptions::default()
            .with_smoothing(self.smoothing)
            .train(&records, &target)?;

        if let Some(path) = &self.output.output {
            log::info!("output: {}", path);
        }
        let mut writer = self.output.open_writer()?;
        oracle.write_json(&mut writer)?;
        writer.flush()?;

        Ok(())
    }
}
