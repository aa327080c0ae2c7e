//! # Symbol Table
//!
//! A bidirectional `{ symbol <-> index }` mapping with three reserved
//! control symbols: pad, start-of-sequence (sos), and end-of-sequence (eos).

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{
    NTResult,
    NetTransError,
    types::{NTHashMap, TokenType, index_to_usize, try_index},
    vocab::corpus::CorpusRecord,
};

/// The names of the reserved control symbols.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialSymbols {
    /// The padding symbol.
    pub pad: String,

    /// The start-of-sequence symbol.
    pub sos: String,

    /// The end-of-sequence symbol.
    pub eos: String,
}

impl Default for SpecialSymbols {
    fn default() -> Self {
        Self {
            pad: "<pad>".to_string(),
            sos: "<sos>".to_string(),
            eos: "<eos>".to_string(),
        }
    }
}

impl SpecialSymbols {
    /// The reserved symbols, in build-time index order: `[pad, eos, sos]`.
    pub fn build_order(&self) -> [&str; 3] {
        [self.pad.as_str(), self.eos.as_str(), self.sos.as_str()]
    }

    /// Is `symbol` one of the reserved names?
    pub fn is_reserved(
        &self,
        symbol: &str,
    ) -> bool {
        symbol == self.pad || symbol == self.sos || symbol == self.eos
    }
}

/// Bidirectional symbol/index table.
///
/// Indices are dense: `0..len()`.
/// The reserved symbols are resolved once, at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolTable<T: TokenType> {
    stoi: NTHashMap<String, T>,
    itos: Vec<String>,
    specials: SpecialSymbols,
    pad: T,
    sos: T,
    eos: T,
}

impl<T: TokenType> SymbolTable<T> {
    /// Build a table from an iterator of symbols.
    ///
    /// The reserved symbols take indices `pad = 0, eos = 1, sos = 2`;
    /// the remaining distinct symbols follow in sorted order.
    /// Symbols which collide with a reserved name are folded into it.
    pub fn from_symbols<I, S>(
        specials: SpecialSymbols,
        symbols: I,
    ) -> NTResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let distinct: BTreeSet<String> = symbols
            .into_iter()
            .filter(|s| !specials.is_reserved(s.as_ref()))
            .map(|s| s.as_ref().to_string())
            .collect();

        let itos: Vec<String> = specials
            .build_order()
            .into_iter()
            .map(str::to_string)
            .chain(distinct)
            .collect();

        Self::try_from_itos(specials, itos)
    }

    /// Build a joint table over every source character and target symbol in a corpus.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(records)))]
    pub fn build(records: &[CorpusRecord]) -> NTResult<Self> {
        Self::build_with_specials(records, SpecialSymbols::default())
    }

    /// Build a joint table, with custom reserved symbol names.
    pub fn build_with_specials(
        records: &[CorpusRecord],
        specials: SpecialSymbols,
    ) -> NTResult<Self> {
        let table = Self::from_symbols(
            specials,
            records
                .iter()
                .flat_map(|r| r.source.iter().chain(r.target.iter())),
        )?;
        log::info!("built joint symbol table with {} entries", table.len());
        Ok(table)
    }

    /// Build separate `(source, target)` tables from a corpus.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(records)))]
    pub fn build_pair(records: &[CorpusRecord]) -> NTResult<(Self, Self)> {
        let specials = SpecialSymbols::default();
        let source = Self::from_symbols(
            specials.clone(),
            records.iter().flat_map(|r| r.source.iter()),
        )?;
        let target = Self::from_symbols(specials, records.iter().flat_map(|r| r.target.iter()))?;
        log::info!(
            "built source table ({} entries) and target table ({} entries)",
            source.len(),
            target.len()
        );
        Ok((source, target))
    }

    /// Build a table from a dense `index -> symbol` list.
    ///
    /// Fails with [`NetTransError::CorruptTable`] on duplicate symbols
    /// or missing reserved symbols.
    pub fn try_from_itos(
        specials: SpecialSymbols,
        itos: Vec<String>,
    ) -> NTResult<Self> {
        if !itos.is_empty() {
            try_index::<T>(itos.len() - 1)?;
        }

        let mut stoi: NTHashMap<String, T> = NTHashMap::default();
        for (idx, symbol) in itos.iter().enumerate() {
            if stoi.insert(symbol.clone(), try_index(idx)?).is_some() {
                return Err(NetTransError::corrupt_table(format!(
                    "duplicate symbol {symbol:?}"
                )));
            }
        }

        let resolve = |name: &str| -> NTResult<T> {
            stoi.get(name).copied().ok_or_else(|| {
                NetTransError::corrupt_table(format!("missing reserved symbol {name:?}"))
            })
        };
        let pad = resolve(&specials.pad)?;
        let sos = resolve(&specials.sos)?;
        let eos = resolve(&specials.eos)?;

        Ok(Self {
            stoi,
            itos,
            specials,
            pad,
            sos,
            eos,
        })
    }

    /// The number of entries; including the reserved symbols.
    pub fn len(&self) -> usize {
        self.itos.len()
    }

    /// Is the table empty?
    ///
    /// Tables always hold the reserved symbols, so this is never true
    /// for a successfully constructed table.
    pub fn is_empty(&self) -> bool {
        self.itos.is_empty()
    }

    /// Does the table contain `symbol`?
    pub fn contains(
        &self,
        symbol: &str,
    ) -> bool {
        self.stoi.contains_key(symbol)
    }

    /// Look up the index of a symbol.
    pub fn lookup_index(
        &self,
        symbol: &str,
    ) -> Option<T> {
        self.stoi.get(symbol).copied()
    }

    /// Look up the symbol for an index.
    pub fn lookup_symbol(
        &self,
        index: T,
    ) -> Option<&str> {
        self.itos.get(index_to_usize(index)).map(String::as_str)
    }

    /// The reserved symbol names.
    pub fn specials(&self) -> &SpecialSymbols {
        &self.specials
    }

    /// The pad index.
    pub fn pad_index(&self) -> T {
        self.pad
    }

    /// The start-of-sequence index.
    pub fn sos_index(&self) -> T {
        self.sos
    }

    /// The end-of-sequence index.
    pub fn eos_index(&self) -> T {
        self.eos
    }

    /// Is `index` one of the sequence control symbols (sos/eos)?
    ///
    /// Pad is not a control symbol.
    pub fn is_control(
        &self,
        index: T,
    ) -> bool {
        index == self.sos || index == self.eos
    }

    /// The symbols, in index order.
    pub fn symbols(&self) -> &[String] {
        &self.itos
    }

    /// The `symbol -> index` map.
    pub fn stoi(&self) -> &NTHashMap<String, T> {
        &self.stoi
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::corpus::read_corpus;

    fn corpus() -> Vec<CorpusRecord> {
        read_corpus("ba b a\nab a b\ncab c a b\n".as_bytes()).unwrap()
    }

    #[test]
    fn test_build_reserved_order() {
        type T = u16;
        let table: SymbolTable<T> = SymbolTable::build(&corpus()).unwrap();

        assert_eq!(table.pad_index(), 0);
        assert_eq!(table.eos_index(), 1);
        assert_eq!(table.sos_index(), 2);
        assert_eq!(
            table.symbols(),
            &["<pad>", "<eos>", "<sos>", "a", "b", "c"]
        );
        assert_eq!(table.len(), 6);
        assert!(table.contains("c"));
        assert!(!table.contains("z"));
        assert!(table.is_control(1));
        assert!(table.is_control(2));
        assert!(!table.is_control(0));
    }

    #[test]
    fn test_inverse_maps() {
        type T = u32;
        let table: SymbolTable<T> = SymbolTable::build(&corpus()).unwrap();
        for (symbol, &index) in table.stoi() {
            assert_eq!(table.lookup_symbol(index), Some(symbol.as_str()));
        }
        assert_eq!(table.lookup_symbol(99), None);
    }

    #[test]
    fn test_build_pair() {
        type T = u16;
        let records = read_corpus("ab X Y\nb Z\n".as_bytes()).unwrap();
        let (src, trg) = SymbolTable::<T>::build_pair(&records).unwrap();

        assert_eq!(&src.symbols()[3..], &["a", "b"]);
        assert_eq!(&trg.symbols()[3..], &["X", "Y", "Z"]);
    }

    #[test]
    fn test_deterministic_build() {
        type T = u16;
        let a: SymbolTable<T> = SymbolTable::build(&corpus()).unwrap();
        let mut reversed = corpus();
        reversed.reverse();
        let b: SymbolTable<T> = SymbolTable::build(&reversed).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_custom_specials() {
        type T = u16;
        let specials = SpecialSymbols {
            pad: "_".to_string(),
            sos: "^".to_string(),
            eos: "$".to_string(),
        };
        let table: SymbolTable<T> =
            SymbolTable::from_symbols(specials, ["q", "^", "p"]).unwrap();
        assert_eq!(table.symbols(), &["_", "$", "^", "p", "q"]);
        assert_eq!(table.sos_index(), 2);
    }

    #[test]
    fn test_try_from_itos_errors() {
        type T = u16;
        let dup = vec!["<pad>", "<eos>", "<sos>", "a", "a"]
            .into_iter()
            .map(String::from)
            .collect();
        assert!(matches!(
            SymbolTable::<T>::try_from_itos(SpecialSymbols::default(), dup),
            Err(NetTransError::CorruptTable(_))
        ));

        let missing = vec!["<pad>", "<eos>", "a"]
            .into_iter()
            .map(String::from)
            .collect();
        assert!(matches!(
            SymbolTable::<T>::try_from_itos(SpecialSymbols::default(), missing),
            Err(NetTransError::CorruptTable(_))
        ));
    }

    #[test]
    fn test_index_overflow() {
        let symbols: Vec<String> = (0..300).map(|i| format!("s{i}")).collect();
        assert!(matches!(
            SymbolTable::<u8>::from_symbols(SpecialSymbols::default(), &symbols),
            Err(NetTransError::IndexOutOfRange(_))
        ));
    }
}
