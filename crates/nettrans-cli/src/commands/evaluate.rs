use std::{
    fs::File,
    io::{BufWriter, Write},
};

use nettrans::evaluation::{EvaluationSample, NBestAccuracy, evaluate};

use crate::{
    input_output::{OutputArgs, load_corpus_files},
    logging::{BaseVerbosity, LogArgs},
    model_args::ModelArgs,
};

/// Args for the evaluate command.
#[derive(clap::Args, Debug)]
pub struct EvaluateArgs {
    /// Test corpus files.
    #[arg(required = true)]
    files: Vec<String>,

    #[command(flatten)]
    model: ModelArgs,

    #[clap(flatten)]
    pub logging: LogArgs,

    /// Write the accuracy report as JSON.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    json: bool,

    /// Optional file for per-sample results, as JSON lines.
    #[arg(long, default_value = None)]
    samples: Option<String>,

    #[command(flatten)]
    output: OutputArgs,
}

impl EvaluateArgs {
    /// Run the evaluate command.
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.logging.init(BaseVerbosity::Progress)?;

        let (options, model) = self.model.load_transliterator()?;
        let records = load_corpus_files(&self.files)?;

        let (accuracy, samples) = evaluate(
            &model,
            &records,
            options.decoder().beam_size(),
            options.decoder().max_pred_len(),
        )?;
        if accuracy.failed > 0 {
            log::warn!("{} samples failed to transliterate", accuracy.failed);
        }

        if let Some(path) = &self.samples {
            log::info!("samples: {path}");
            let mut writer = BufWriter::new(File::create(path)?);
            write_samples(&mut writer, &samples)?;
            writer.flush()?;
        }

        let mut writer = self.output.open_writer()?;
        if self.json {
            serde_json::to_writer_pretty(&mut writer, &report(&accuracy))?;
            writeln!(writer)?;
        } else {
            for (name, value) in accuracy.to_named() {
                writeln!(writer, "{name}\t{value:.4}")?;
            }
        }
        writer.flush()?;

        Ok(())
    }
}

fn report(accuracy: &NBestAccuracy) -> serde_json::Value {
    serde_json::json!({
        "total": accuracy.total,
        "failed": accuracy.failed,
        "accuracy": accuracy.ranks(),
    })
}

fn write_samples(
    writer: &mut dyn Write,
    samples: &[EvaluationSample],
) -> Result<(), Box<dyn std::error::Error>> {
    for sample in samples {
        serde_json::to_writer(&mut *writer, sample)?;
        writeln!(writer)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report() {
        let accuracy = NBestAccuracy {
            total: 4,
            first_hits: vec![2, 1],
            failed: 1,
        };
        let value = report(&accuracy);
        assert_eq!(value["total"], 4);
        assert_eq!(value["failed"], 1);
        assert_eq!(value["accuracy"][0]["name"], "1best");
        assert_eq!(value["accuracy"][0]["accuracy"], 0.5);
        assert_eq!(value["accuracy"][1]["k"], 2);
        assert_eq!(value["accuracy"][1]["accuracy"], 0.75);
    }

    #[test]
    fn test_write_samples() {
        let samples = vec![EvaluationSample {
            source: "kim".to_string(),
            truth: "김".to_string(),
            predictions: vec!["김".to_string()],
            hit_rank: Some(1),
        }];
        let mut buf: Vec<u8> = Vec::new();
        write_samples(&mut buf, &samples).unwrap();

        let text = String::from_utf8(buf).unwrap();
        let back: EvaluationSample = serde_json::from_str(text.trim_end()).unwrap();
        assert_eq!(back, samples[0]);
    }
}
