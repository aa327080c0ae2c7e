//! # Rayon Utilities
//!
//! [`rayon`] powered wrappers for parallel batch transliteration.

mod rayon_transliterator;

pub use rayon_transliterator::ParallelRayonTransliterator;
