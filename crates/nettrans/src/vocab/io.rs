//! # Symbol Table IO
//!
//! Tables persist as JSON, holding both inverse mappings:
//! ```json
//! {"stoi": {"<pad>": 0, "<eos>": 1, "<sos>": 2, "a": 3},
//!  "itos": {"0": "<pad>", "1": "<eos>", "2": "<sos>", "3": "a"}}
//! ```
//! An optional `"specials"` object records non-default reserved names;
//! files without it load with the default `<pad>`, `<sos>`, `<eos>` names.

use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use serde::{Deserialize, Serialize};

use crate::{
    NTResult,
    NetTransError,
    types::{TokenType, index_to_usize},
    vocab::{SpecialSymbols, SymbolTable},
};

/// The persisted form of a [`SymbolTable`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolTableRecord {
    /// `{ symbol -> index }`.
    pub stoi: BTreeMap<String, u64>,

    /// `{ "index" -> symbol }`; keys are decimal strings.
    pub itos: BTreeMap<String, String>,

    /// Reserved symbol names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specials: Option<SpecialSymbols>,
}

impl<T: TokenType> From<&SymbolTable<T>> for SymbolTableRecord {
    fn from(table: &SymbolTable<T>) -> Self {
        let stoi = table
            .stoi()
            .iter()
            .map(|(s, &t)| (s.clone(), index_to_usize(t) as u64))
            .collect();
        let itos = table
            .symbols()
            .iter()
            .enumerate()
            .map(|(idx, s)| (idx.to_string(), s.clone()))
            .collect();
        let specials = (table.specials() != &SpecialSymbols::default())
            .then(|| table.specials().clone());
        Self {
            stoi,
            itos,
            specials,
        }
    }
}

impl SymbolTableRecord {
    /// Validate the record and convert it into a [`SymbolTable`].
    ///
    /// Fails with [`NetTransError::CorruptTable`] unless `stoi` and `itos`
    /// are exact inverses over the dense index range `0..len`.
    pub fn try_into_table<T: TokenType>(self) -> NTResult<SymbolTable<T>> {
        if self.stoi.len() != self.itos.len() {
            return Err(NetTransError::corrupt_table(format!(
                "stoi has {} entries, itos has {}",
                self.stoi.len(),
                self.itos.len()
            )));
        }

        let mut slots: Vec<Option<String>> = vec![None; self.itos.len()];
        for (key, symbol) in self.itos {
            let idx: usize = key.parse().map_err(|_| {
                NetTransError::corrupt_table(format!("itos key {key:?} is not an index"))
            })?;
            let slot = slots.get_mut(idx).ok_or_else(|| {
                NetTransError::corrupt_table(format!("itos index {idx} is not dense"))
            })?;
            if slot.replace(symbol).is_some() {
                return Err(NetTransError::corrupt_table(format!(
                    "itos index {idx} appears twice"
                )));
            }
        }

        // Every slot is filled: the keys were distinct and in range.
        let itos: Vec<String> = slots.into_iter().flatten().collect();

        for (symbol, &idx) in &self.stoi {
            let inverse = usize::try_from(idx).ok().and_then(|i| itos.get(i));
            if inverse != Some(symbol) {
                return Err(NetTransError::corrupt_table(format!(
                    "stoi[{symbol:?}] = {idx} is not the inverse of itos"
                )));
            }
        }

        SymbolTable::try_from_itos(self.specials.unwrap_or_default(), itos)
    }
}

impl<T: TokenType> SymbolTable<T> {
    /// Write the table as JSON.
    pub fn write_json<W: Write>(
        &self,
        writer: W,
    ) -> NTResult<()> {
        serde_json::to_writer(writer, &SymbolTableRecord::from(self))?;
        Ok(())
    }

    /// Save the table as a JSON file.
    pub fn save_json_path<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> NTResult<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_json(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Read a table from JSON.
    pub fn read_json<R: Read>(reader: R) -> NTResult<Self> {
        let record: SymbolTableRecord = serde_json::from_reader(reader)?;
        record.try_into_table()
    }

    /// Load a table from a JSON file.
    pub fn load_json_path<P: AsRef<Path>>(path: P) -> NTResult<Self> {
        let table = Self::read_json(BufReader::new(File::open(path.as_ref())?))?;
        log::debug!(
            "loaded symbol table ({} entries) from {}",
            table.len(),
            path.as_ref().display()
        );
        Ok(table)
    }
}
