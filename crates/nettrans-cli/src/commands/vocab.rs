use nettrans::vocab::SymbolTable;

use crate::{
    input_output::load_corpus_files,
    logging::{BaseVerbosity, LogArgs},
};

/// Args for the vocab command.
#[derive(clap::Args, Debug)]
pub struct VocabArgs {
    /// Corpus files.
    #[arg(required = true)]
    files: Vec<String>,

    #[clap(flatten)]
    pub logging: LogArgs,

    /// Where to write the source table.
    #[arg(long)]
    source_out: String,

    /// Where to write the target table.
    #[arg(long)]
    target_out: String,
}

impl VocabArgs {
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.logging.init(BaseVerbosity::Progress)?;

        let records = load_corpus_files(&self.files)?;

        let (source, target) = SymbolTable::<u32>::build_pair(&records)?;

        log::info!("source table: {}", self.source_out);
        source.save_json_path(&self.source_out)?;
        log::info!("target table: {}", self.target_out);
        target.save_json_path(&self.target_out)?;

        Ok(())
    }
}
