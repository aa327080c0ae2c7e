//! # Transliteration Corpus Records
//!
//! Corpus files hold one record per line, with whitespace separated fields:
//! ```terminaloutput
//! {SOURCE WORD} {TARGET SYMBOL} {TARGET SYMBOL} ...
//! ```
//! Each character of the first field is one source symbol;
//! each following field is one target symbol.

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use crate::{NTResult, NetTransError};

/// One `(source, target)` corpus record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusRecord {
    /// Source symbols; one per character of the source word.
    pub source: Vec<String>,

    /// Target symbols.
    pub target: Vec<String>,
}

impl CorpusRecord {
    /// Parse a single corpus line.
    ///
    /// ## Arguments
    /// * `line` - the raw line.
    /// * `line_no` - the 1-based line number, used in errors.
    ///
    /// ## Returns
    /// `Ok(None)` for blank lines; otherwise the parsed record.
    pub fn parse_line(
        line: &str,
        line_no: usize,
    ) -> NTResult<Option<Self>> {
        let mut fields = line.split_whitespace();
        let Some(word) = fields.next() else {
            return Ok(None);
        };

        let target: Vec<String> = fields.map(str::to_string).collect();
        if target.is_empty() {
            return Err(NetTransError::CorpusFormat {
                line: line_no,
                message: format!("record {word:?} has no target symbols"),
            });
        }

        Ok(Some(Self {
            source: word.chars().map(String::from).collect(),
            target,
        }))
    }

    /// The source symbols joined back into a word.
    pub fn source_word(&self) -> String {
        self.source.concat()
    }

    /// The target symbols joined into a single string.
    pub fn target_text(&self) -> String {
        self.target.concat()
    }
}

/// Read corpus records from a line reader.
///
/// Blank lines are skipped; malformed records fail the whole read.
pub fn read_corpus<R: BufRead>(reader: R) -> NTResult<Vec<CorpusRecord>> {
    let mut records = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if let Some(record) = CorpusRecord::parse_line(&line, idx + 1)? {
            records.push(record);
        }
    }
    log::debug!("read {} corpus records", records.len());
    Ok(records)
}

/// Load corpus records from a file.
pub fn load_corpus_path<P: AsRef<Path>>(path: P) -> NTResult<Vec<CorpusRecord>> {
    let reader = BufReader::new(File::open(path)?);
    read_corpus(reader)
}
