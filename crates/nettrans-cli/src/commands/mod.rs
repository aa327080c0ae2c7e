mod decode;
mod evaluate;
mod train_bigram;
mod vocab;

/// Subcommands for nettrans.
#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Build and save source/target symbol tables from a corpus.
    Vocab(vocab::VocabArgs),

    /// Train the baseline bigram model.
    TrainBigram(train_bigram::TrainBigramArgs),

    /// Transliterate lines of input into ranked predictions.
    Decode(decode::DecodeArgs),

    /// Measure n-best accuracy over a test corpus.
    Evaluate(evaluate::EvaluateArgs),
}

impl Commands {
    /// Run the subcommand.
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        match self {
            Commands::Vocab(cmd) => cmd.run(),
            Commands::TrainBigram(cmd) => cmd.run(),
            Commands::Decode(cmd) => cmd.run(),
            Commands::Evaluate(cmd) => cmd.run(),
        }
    }
}
