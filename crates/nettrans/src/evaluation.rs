//! # N-Best Evaluation
//!
//! Cumulative n-best accuracy over a test corpus: the `k`-best accuracy is
//! the fraction of samples whose reference appears among the top `k`
//! predictions.

use serde::{Deserialize, Serialize};

use crate::{
    NTResult,
    NetTransError,
    transliterator::{Prediction, Transliterate},
    types::NTHashSet,
    vocab::corpus::CorpusRecord,
};

/// One evaluated sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSample {
    /// The source word.
    pub source: String,

    /// The reference target text.
    pub truth: String,

    /// The predicted texts, best first; empty if the item failed.
    pub predictions: Vec<String>,

    /// The 1-based rank of the first correct prediction.
    pub hit_rank: Option<usize>,
}

/// One row of an n-best accuracy report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankAccuracy {
    /// The rank cutoff.
    pub k: usize,

    /// The display name, `"{k}best"`.
    pub name: String,

    /// The `k`-best accuracy.
    pub accuracy: f64,
}

/// Cumulative n-best accuracy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NBestAccuracy {
    /// The number of distinct samples evaluated.
    pub total: usize,

    /// `first_hits[k - 1]` counts samples first matched at rank `k`.
    pub first_hits: Vec<usize>,

    /// The number of samples whose transliteration failed.
    pub failed: usize,
}

impl NBestAccuracy {
    /// Tally accuracy from evaluated samples.
    pub fn from_samples(
        samples: &[EvaluationSample],
        beam_size: usize,
        failed: usize,
    ) -> Self {
        let mut first_hits = vec![0; beam_size];
        for rank in samples.iter().filter_map(|s| s.hit_rank) {
            if rank >= 1 && rank <= beam_size {
                first_hits[rank - 1] += 1;
            }
        }
        Self {
            total: samples.len(),
            first_hits,
            failed,
        }
    }

    /// The beam size evaluated.
    pub fn beam_size(&self) -> usize {
        self.first_hits.len()
    }

    /// The `k`-best accuracy; `0.0` for an empty set.
    ///
    /// `k` beyond the beam size is clamped.
    pub fn accuracy(
        &self,
        k: usize,
    ) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let hits: usize = self.first_hits.iter().take(k).sum();
        hits as f64 / self.total as f64
    }

    /// One report row per `k`, in increasing `k`.
    pub fn ranks(&self) -> Vec<RankAccuracy> {
        (1..=self.beam_size())
            .map(|k| RankAccuracy {
                k,
                name: format!("{k}best"),
                accuracy: self.accuracy(k),
            })
            .collect()
    }

    /// `[("1best", ..), ("2best", ..), ..]`, in rank order.
    pub fn to_named(&self) -> Vec<(String, f64)> {
        self.ranks()
            .into_iter()
            .map(|r| (r.name, r.accuracy))
            .collect()
    }
}

/// Keep the first record for each distinct source word.
pub fn dedup_by_source(records: &[CorpusRecord]) -> Vec<&CorpusRecord> {
    let mut seen = NTHashSet::default();
    records
        .iter()
        .filter(|r| seen.insert(r.source_word()))
        .collect()
}

/// Score one sample's predictions against its reference.
pub fn evaluate_sample(
    record: &CorpusRecord,
    predictions: &[Prediction],
) -> EvaluationSample {
    let truth = record.target_text();
    let predictions: Vec<String> = predictions.iter().map(|p| p.text.clone()).collect();
    let hit_rank = predictions
        .iter()
        .position(|p| *p == truth)
        .map(|idx| idx + 1);
    EvaluationSample {
        source: record.source_word(),
        truth,
        predictions,
        hit_rank,
    }
}

/// Evaluate a transliterator over a test corpus.
///
/// Repeated source words are evaluated once. Items whose transliteration
/// fails count as misses and are tallied in [`NBestAccuracy::failed`].
///
/// ## Returns
/// The accuracy, and every evaluated sample in corpus order.
#[cfg_attr(feature = "tracing", tracing::instrument(skip(model, records)))]
pub fn evaluate<X: Transliterate + ?Sized>(
    model: &X,
    records: &[CorpusRecord],
    beam_size: usize,
    max_pred_len: usize,
) -> NTResult<(NBestAccuracy, Vec<EvaluationSample>)> {
    if beam_size == 0 {
        return Err(NetTransError::invalid_argument("beam_size must be >= 1"));
    }

    let records = dedup_by_source(records);
    log::info!("evaluating {} distinct samples", records.len());

    let sources: Vec<String> = records.iter().map(|r| r.source_word()).collect();
    let texts: Vec<&str> = sources.iter().map(String::as_str).collect();
    let results = model.transliterate_batch(&texts, beam_size, max_pred_len);

    let mut failed = 0;
    let samples: Vec<EvaluationSample> = records
        .iter()
        .zip(results)
        .map(|(record, result)| match result {
            Ok(predictions) => evaluate_sample(record, &predictions),
            Err(err) => {
                failed += 1;
                log::debug!("failed to transliterate {:?}: {err}", record.source_word());
                evaluate_sample(record, &[])
            }
        })
        .collect();

    Ok((
        NBestAccuracy::from_samples(&samples, beam_size, failed),
        samples,
    ))
}
