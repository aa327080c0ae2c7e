//! # Hypotheses and Decode Outcomes

use core::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::types::TokenType;

/// A complete (or length-bounded) output sequence with its score.
#[derive(Debug, Clone, PartialEq)]
pub struct Hypothesis<T: TokenType> {
    /// The generated tokens; `sos` removed, truncated after the first `eos`.
    pub tokens: Vec<T>,

    /// Cumulative natural-log probability.
    pub score: f64,

    /// Did the sequence end with `eos`?
    pub is_finished: bool,
}

impl<T: TokenType> Hypothesis<T> {
    /// The sequence probability, `exp(score)`.
    pub fn probability(&self) -> f64 {
        self.score.exp()
    }
}

/// Why a decode stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Every hypothesis emitted `eos`.
    AllFinished,

    /// `max_pred_len` expansion steps were run.
    MaxLength,

    /// The caller's cancellation flag was observed between steps.
    Cancelled,
}

/// How hypothesis scores are presented as probabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbabilityMode {
    /// `exp(score)` per hypothesis.
    #[default]
    Sequence,

    /// `exp(score)` normalized over the returned hypotheses.
    ///
    /// A zero total yields all zeros.
    Normalized,
}

/// The result of a decode.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeOutcome<T: TokenType> {
    /// Hypotheses in descending score order.
    pub hypotheses: Vec<Hypothesis<T>>,

    /// Why the decode stopped.
    pub stop_reason: StopReason,

    /// The number of oracle calls made.
    pub steps: usize,
}

impl<T: TokenType> DecodeOutcome<T> {
    /// The best hypothesis.
    pub fn best(&self) -> Option<&Hypothesis<T>> {
        self.hypotheses.first()
    }

    /// Present the hypotheses' scores as probabilities.
    pub fn probabilities(
        &self,
        mode: ProbabilityMode,
    ) -> Vec<f64> {
        let scores: Vec<f64> = self.hypotheses.iter().map(|h| h.score).collect();
        probabilities(&scores, mode)
    }
}

/// Convert log-space scores to probabilities.
pub fn probabilities(
    scores: &[f64],
    mode: ProbabilityMode,
) -> Vec<f64> {
    let probs = scores.iter().map(|s| s.exp());
    match mode {
        ProbabilityMode::Sequence => probs.collect(),
        ProbabilityMode::Normalized => {
            let probs: Vec<f64> = probs.collect();
            let total: f64 = probs.iter().sum();
            if total > 0.0 {
                probs.iter().map(|p| p / total).collect()
            } else {
                vec![0.0; probs.len()]
            }
        }
    }
}

/// Total order over scores, best last; NaN ranks below every other score.
pub fn score_cmp(
    a: f64,
    b: f64,
) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

/// Stable sort, descending by score.
pub fn sort_descending<T: TokenType>(hypotheses: &mut [Hypothesis<T>]) {
    hypotheses.sort_by(|a, b| score_cmp(b.score, a.score));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_cmp() {
        assert_eq!(score_cmp(-1.0, -2.0), Ordering::Greater);
        assert_eq!(score_cmp(f64::NAN, f64::NEG_INFINITY), Ordering::Less);
        assert_eq!(score_cmp(f64::NEG_INFINITY, f64::NAN), Ordering::Greater);
        assert_eq!(score_cmp(f64::NAN, f64::NAN), Ordering::Equal);
        assert_eq!(
            score_cmp(f64::NEG_INFINITY, f64::NEG_INFINITY),
            Ordering::Equal
        );
    }

    #[test]
    fn test_probabilities() {
        let scores = [0.5f64.ln(), 0.25f64.ln()];

        let seq = probabilities(&scores, ProbabilityMode::Sequence);
        assert!((seq[0] - 0.5).abs() < 1e-12);
        assert!((seq[1] - 0.25).abs() < 1e-12);

        let norm = probabilities(&scores, ProbabilityMode::Normalized);
        assert!((norm[0] - 2.0 / 3.0).abs() < 1e-12);
        assert!((norm[1] - 1.0 / 3.0).abs() < 1e-12);

        let zero = probabilities(
            &[f64::NEG_INFINITY, f64::NEG_INFINITY],
            ProbabilityMode::Normalized,
        );
        assert_eq!(zero, vec![0.0, 0.0]);
    }

    #[test]
    fn test_sort_descending_is_stable() {
        let hyp = |token: u16, score: f64| Hypothesis {
            tokens: vec![token],
            score,
            is_finished: true,
        };
        let mut hyps = vec![hyp(1, -2.0), hyp(2, f64::NAN), hyp(3, -1.0), hyp(4, -2.0)];
        sort_descending(&mut hyps);

        let order: Vec<u16> = hyps.iter().map(|h| h.tokens[0]).collect();
        assert_eq!(order, vec![3, 1, 4, 2]);
        assert_eq!(hyps[0].probability(), (-1.0f64).exp());
    }
}
