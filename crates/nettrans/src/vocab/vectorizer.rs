//! # Vectorizer
//!
//! Symbol sequences to index sequences, and back.

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use serde::{Deserialize, Serialize};

use crate::{
    NTResult,
    NetTransError,
    types::{TokenType, index_to_usize},
    vocab::SymbolTable,
};

/// What to do with symbols that have no table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownSymbolPolicy {
    /// Drop the symbol; logged and counted.
    #[default]
    Drop,

    /// Fail with [`NetTransError::UnknownSymbol`].
    Strict,
}

/// Options for configuring a [`Vectorizer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorizerOptions {
    /// Unknown symbol policy.
    pub unknown_symbols: UnknownSymbolPolicy,
}

impl VectorizerOptions {
    /// Gets the configured unknown symbol policy.
    pub fn unknown_symbols(&self) -> UnknownSymbolPolicy {
        self.unknown_symbols
    }

    /// Sets the configured unknown symbol policy.
    pub fn set_unknown_symbols(
        &mut self,
        policy: UnknownSymbolPolicy,
    ) {
        self.unknown_symbols = policy;
    }

    /// Sets the configured unknown symbol policy.
    pub fn with_unknown_symbols(
        mut self,
        policy: UnknownSymbolPolicy,
    ) -> Self {
        self.set_unknown_symbols(policy);
        self
    }

    /// Build a [`Vectorizer`] over the given table.
    pub fn build<T: TokenType>(
        &self,
        table: Arc<SymbolTable<T>>,
    ) -> Vectorizer<T> {
        Vectorizer::new(table, *self)
    }
}

/// Converts symbol sequences to index sequences and back.
#[derive(Debug)]
pub struct Vectorizer<T: TokenType> {
    table: Arc<SymbolTable<T>>,
    options: VectorizerOptions,
    dropped: AtomicUsize,
}

impl<T: TokenType> Vectorizer<T> {
    /// Create a new vectorizer.
    pub fn new(
        table: Arc<SymbolTable<T>>,
        options: VectorizerOptions,
    ) -> Self {
        Self {
            table,
            options,
            dropped: AtomicUsize::new(0),
        }
    }

    /// The underlying table.
    pub fn table(&self) -> &Arc<SymbolTable<T>> {
        &self.table
    }

    /// The configured options.
    pub fn options(&self) -> &VectorizerOptions {
        &self.options
    }

    /// The total number of unknown symbols dropped by this vectorizer.
    pub fn dropped_symbols(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Map symbols to indices.
    ///
    /// Under [`UnknownSymbolPolicy::Drop`] the output may be shorter than the input.
    pub fn vectorize<S: AsRef<str>>(
        &self,
        symbols: &[S],
    ) -> NTResult<Vec<T>> {
        let mut out = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            let symbol = symbol.as_ref();
            match self.table.lookup_index(symbol) {
                Some(index) => out.push(index),
                None => match self.options.unknown_symbols {
                    UnknownSymbolPolicy::Drop => {
                        self.dropped.fetch_add(1, Ordering::Relaxed);
                        log::debug!("dropping unknown symbol {symbol:?}");
                    }
                    UnknownSymbolPolicy::Strict => {
                        return Err(NetTransError::UnknownSymbol(symbol.to_string()));
                    }
                },
            }
        }
        Ok(out)
    }

    /// Map each character of `text` to an index.
    pub fn vectorize_chars(
        &self,
        text: &str,
    ) -> NTResult<Vec<T>> {
        let symbols: Vec<String> = text.chars().map(String::from).collect();
        self.vectorize(&symbols)
    }

    /// Map indices back to symbols.
    ///
    /// ## Arguments
    /// * `indices` - the indices to map.
    /// * `strip_control` - remove sos/eos from the output; pad is kept.
    pub fn textualize(
        &self,
        indices: &[T],
        strip_control: bool,
    ) -> NTResult<Vec<&str>> {
        let mut out = Vec::with_capacity(indices.len());
        for &index in indices {
            if strip_control && self.table.is_control(index) {
                continue;
            }
            let symbol = self
                .table
                .lookup_symbol(index)
                .ok_or(NetTransError::UnknownIndex(index_to_usize(index) as u64))?;
            out.push(symbol);
        }
        Ok(out)
    }

    /// Map indices back to symbols, concatenated into a string.
    pub fn textualize_to_string(
        &self,
        indices: &[T],
        strip_control: bool,
    ) -> NTResult<String> {
        Ok(self.textualize(indices, strip_control)?.concat())
    }
}
