use std::io::{BufRead, Write};

use nettrans::{
    NTResult,
    transliterator::{Prediction, Transliterate},
};

use crate::{
    input_output::{InputArgs, OutputArgs},
    logging::{BaseVerbosity, LogArgs},
    model_args::ModelArgs,
};

/// Args for the decode command.
#[derive(clap::Args, Debug)]
pub struct DecodeArgs {
    #[command(flatten)]
    model: ModelArgs,

    #[clap(flatten)]
    pub logging: LogArgs,

    #[command(flatten)]
    input: InputArgs,

    #[command(flatten)]
    output: OutputArgs,

    /// Emit one JSON object per input line.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    json: bool,

    /// Number of input lines decoded per parallel batch.
    #[arg(long, default_value = "256")]
    batch_size: usize,
}

impl DecodeArgs {
    /// Run the decode command.
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.logging.init(BaseVerbosity::Warnings)?;

        let (options, model) = self.model.load_transliterator()?;
        let beam_size = options.decoder().beam_size();
        let max_pred_len = options.decoder().max_pred_len();

        let reader = self.input.open_reader()?;
        let mut writer = self.output.open_writer()?;

        let mut batch: Vec<String> = Vec::with_capacity(self.batch_size);
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            batch.push(line);
            if batch.len() >= self.batch_size.max(1) {
                self.flush_batch(&model, &batch, beam_size, max_pred_len, &mut writer)?;
                batch.clear();
            }
        }
        if !batch.is_empty() {
            self.flush_batch(&model, &batch, beam_size, max_pred_len, &mut writer)?;
        }

        writer.flush()?;
        Ok(())
    }

    fn flush_batch(
        &self,
        model: &dyn Transliterate,
        batch: &[String],
        beam_size: usize,
        max_pred_len: usize,
        writer: &mut dyn Write,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let texts: Vec<&str> = batch.iter().map(String::as_str).collect();
        let results = model.transliterate_batch(&texts, beam_size, max_pred_len);

        for (text, result) in texts.iter().zip(results) {
            if self.json {
                write_json_line(writer, text, &result)?;
            } else {
                write_text_lines(writer, text, &result)?;
            }
        }
        writer.flush()?;
        Ok(())
    }
}

fn write_text_lines(
    writer: &mut dyn Write,
    text: &str,
    result: &NTResult<Vec<Prediction>>,
) -> std::io::Result<()> {
    match result {
        Ok(predictions) => {
            for p in predictions.iter().filter(|p| p.is_possible()) {
                writeln!(
                    writer,
                    "{text}\t{}\t{}\t{:.6}",
                    p.label(),
                    p.text,
                    p.probability
                )?;
            }
        }
        Err(err) => log::warn!("{text:?}: {err}"),
    }
    Ok(())
}

fn write_json_line(
    writer: &mut dyn Write,
    text: &str,
    result: &NTResult<Vec<Prediction>>,
) -> Result<(), Box<dyn std::error::Error>> {
    let value = match result {
        Ok(predictions) => {
            let predictions: Vec<&Prediction> =
                predictions.iter().filter(|p| p.is_possible()).collect();
            serde_json::json!({
                "source": text,
                "predictions": predictions,
            })
        }
        Err(err) => serde_json::json!({
            "source": text,
            "error": err.to_string(),
        }),
    };
    serde_json::to_writer(&mut *writer, &value)?;
    writeln!(writer)?;
    Ok(())
}
