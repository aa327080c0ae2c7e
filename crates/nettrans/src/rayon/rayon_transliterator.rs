//! # Parallel Transliterator

use crate::{
    NTResult,
    transliterator::{Prediction, Transliterate, log_batch_failures},
};

/// Batch-Level Parallel Transliterator Wrapper.
///
/// Spreads independent batch items over the ``rayon`` pool;
/// each item is still decoded sequentially.
#[derive(Debug, Clone)]
pub struct ParallelRayonTransliterator<X: Transliterate> {
    /// Wrapped transliterator.
    pub inner: X,
}

impl<X: Transliterate> ParallelRayonTransliterator<X> {
    /// Create a new parallel transliterator.
    ///
    /// ## Arguments
    /// * `inner` - The transliterator to wrap.
    pub fn new(inner: X) -> Self {
        Self { inner }
    }
}

impl<X: Transliterate> Transliterate for ParallelRayonTransliterator<X> {
    fn transliterate(
        &self,
        text: &str,
        beam_size: usize,
        max_pred_len: usize,
    ) -> NTResult<Vec<Prediction>> {
        self.inner.transliterate(text, beam_size, max_pred_len)
    }

    fn transliterate_batch(
        &self,
        texts: &[&str],
        beam_size: usize,
        max_pred_len: usize,
    ) -> Vec<NTResult<Vec<Prediction>>> {
        use rayon::prelude::*;

        let results: Vec<_> = texts
            .par_iter()
            .map(|text| self.inner.transliterate(text, beam_size, max_pred_len))
            .collect();
        log_batch_failures(&results);
        results
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        oracle::BigramOracleOptions,
        testing::fixture_records,
        transliterator::TransliteratorOptions,
        vocab::SymbolTable,
    };

    fn check_is_send_sync<S: Send + Sync>(_: &S) {}

    #[test]
    fn test_parallel_matches_sequential() {
        type T = u16;

        let records = fixture_records();
        let (source, target) = SymbolTable::<T>::build_pair(&records).unwrap();
        let oracle = BigramOracleOptions::default()
            .train(&records, &target)
            .unwrap();
        let model = Arc::new(TransliteratorOptions::default().build(
            Arc::new(source),
            Arc::new(target),
            oracle,
        ));

        let parallel = ParallelRayonTransliterator::new(model.clone());
        check_is_send_sync(&parallel);

        let texts: Vec<String> = records.iter().map(|r| r.source_word()).collect();
        let mut texts: Vec<&str> = texts.iter().map(String::as_str).collect();
        texts.push("");

        let expected = model.transliterate_batch(&texts, 3, 8);
        let actual = parallel.transliterate_batch(&texts, 3, 8);

        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(&expected) {
            match (a, e) {
                (Ok(a), Ok(e)) => assert_eq!(a, e),
                (Err(a), Err(e)) => assert_eq!(a.to_string(), e.to_string()),
                _ => panic!("parallel and sequential results disagree"),
            }
        }
        assert!(actual.last().unwrap().is_err());

        assert_eq!(
            parallel.transliterate("kim", 2, 8).unwrap(),
            model.transliterate("kim", 2, 8).unwrap()
        );
    }
}
