//! # Vocabulary
//!
//! This module provides symbol tables, corpus records, vectorization,
//! and table io.
//!
//! * [`SymbolTable`] - the `{ symbol <-> index }` table, with reserved pad/sos/eos.
//! * [`Vectorizer`] - symbol sequences to index sequences, and back.
//! * [`corpus`] - reading `(source, target)` corpus records.
//! * [`io`] - JSON persistence of tables.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use nettrans::vocab::{SymbolTable, VectorizerOptions, corpus::read_corpus};
//!
//! let records = read_corpus("kim 김\npark 박\n".as_bytes()).unwrap();
//! let (source, _target) = SymbolTable::<u32>::build_pair(&records).unwrap();
//!
//! let vectorizer = VectorizerOptions::default().build(Arc::new(source));
//! let indices = vectorizer.vectorize_chars("kix").unwrap();
//! assert_eq!(vectorizer.textualize_to_string(&indices, true).unwrap(), "ki");
//! ```

pub mod corpus;
pub mod io;
pub mod symbol_table;
pub mod vectorizer;

#[doc(inline)]
pub use symbol_table::{SpecialSymbols, SymbolTable};
#[doc(inline)]
pub use vectorizer::{UnknownSymbolPolicy, Vectorizer, VectorizerOptions};
