//! # `nettrans` Named-Entity Transliteration Decoding
//!
//! This is the decoding core of a named-entity transliteration system:
//! it turns a trained sequence model's next-token distributions into
//! ranked output spellings.
//!
//! The trained model is opaque: it is any [`oracle::ScoringOracle`].
//!
//! See:
//! * [`vocab`] for symbol tables, corpus records and vectorization.
//! * [`batching`] for padded batches and causal masks.
//! * [`oracle`] for the scoring oracle interface, and baseline oracles.
//! * [`decoding`] for beam and greedy search.
//! * [`transliterator`] for the text-in, predictions-out front door.
//! * [`evaluation`] for n-best accuracy over a test corpus.
//!
//! ## Crate Features
#![doc = document_features::document_features!()]
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use nettrans::{
//!     oracle::BigramOracleOptions,
//!     transliterator::{Transliterate, TransliteratorOptions, TransliteratorRegistry},
//!     vocab::{SymbolTable, corpus::read_corpus},
//! };
//!
//! type T = u32;
//!
//! let records = read_corpus("kim 김\npark 박\nlee 이\n".as_bytes()).unwrap();
//! let (source, target) = SymbolTable::<T>::build_pair(&records).unwrap();
//! let oracle = BigramOracleOptions::default().train(&records, &target).unwrap();
//!
//! let kor = TransliteratorOptions::default().build(Arc::new(source), Arc::new(target), oracle);
//! let registry = TransliteratorRegistry::new().with_backend("kor", Arc::new(kor));
//!
//! for p in registry.transliterate("kor", "Park", 3, 8).unwrap() {
//!     println!("{} {} {:.4}", p.label(), p.text, p.probability);
//! }
//! ```
#![warn(missing_docs, unused)]

#[cfg(feature = "rayon")]
pub mod rayon;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub mod batching;
pub mod decoding;
pub mod errors;
pub mod evaluation;
pub mod oracle;
pub mod transliterator;
pub mod types;
pub mod vocab;

pub use ndarray;

#[doc(inline)]
pub use errors::{NTResult, NetTransError};
#[doc(inline)]
pub use types::TokenType;
