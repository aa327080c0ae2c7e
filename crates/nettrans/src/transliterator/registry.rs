//! # Transliterator Registry
//!
//! Independently configured transliterators, keyed by language code.

use std::{collections::BTreeMap, sync::Arc};

use crate::{
    NTResult,
    NetTransError,
    transliterator::{Prediction, Transliterate},
};

/// A `{ language -> transliterator }` registry.
#[derive(Clone, Default)]
pub struct TransliteratorRegistry {
    backends: BTreeMap<String, Arc<dyn Transliterate>>,
}

impl core::fmt::Debug for TransliteratorRegistry {
    fn fmt(
        &self,
        f: &mut core::fmt::Formatter<'_>,
    ) -> core::fmt::Result {
        f.debug_struct("TransliteratorRegistry")
            .field("languages", &self.languages().collect::<Vec<_>>())
            .finish()
    }
}

impl TransliteratorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a backend for `language`, returning any backend it replaces.
    pub fn register<S: Into<String>>(
        &mut self,
        language: S,
        backend: Arc<dyn Transliterate>,
    ) -> Option<Arc<dyn Transliterate>> {
        let language = language.into();
        log::info!("registering transliterator for {language:?}");
        self.backends.insert(language, backend)
    }

    /// Register a backend for `language`.
    pub fn with_backend<S: Into<String>>(
        mut self,
        language: S,
        backend: Arc<dyn Transliterate>,
    ) -> Self {
        self.register(language, backend);
        self
    }

    /// Remove the backend for `language`.
    pub fn unregister(
        &mut self,
        language: &str,
    ) -> Option<Arc<dyn Transliterate>> {
        self.backends.remove(language)
    }

    /// The registered languages, sorted.
    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.backends.keys().map(String::as_str)
    }

    /// The number of registered languages.
    pub fn len(&self) -> usize {
        self.backends.len()
    }

    /// Is the registry empty?
    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    /// Look up the backend for `language`.
    ///
    /// Fails with [`NetTransError::UnknownLanguage`] when none is registered.
    pub fn get(
        &self,
        language: &str,
    ) -> NTResult<&Arc<dyn Transliterate>> {
        self.backends
            .get(language)
            .ok_or_else(|| NetTransError::UnknownLanguage(language.to_string()))
    }

    /// Transliterate with the backend for `language`.
    pub fn transliterate(
        &self,
        language: &str,
        text: &str,
        beam_size: usize,
        max_pred_len: usize,
    ) -> NTResult<Vec<Prediction>> {
        self.get(language)?
            .transliterate(text, beam_size, max_pred_len)
    }
}
