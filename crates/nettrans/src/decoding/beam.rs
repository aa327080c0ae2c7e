//! # Beam State
//!
//! The beam is stored as an arena of per-step backpointer records:
//! entry `(step, slot)` holds `(parent_slot, token)`, where `parent_slot`
//! indexes step `step - 1`. Step 0 holds the lone `sos` root.
//! Sequences are rebuilt by chasing parents back to the root.

use core::cmp::{Ordering, Reverse};

use dary_heap::OctonaryHeap;

use crate::{
    decoding::hypothesis::{Hypothesis, score_cmp},
    types::TokenType,
};

/// A backpointer record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BeamEntry<T: TokenType> {
    /// The slot this entry extends, in the previous step.
    pub parent: usize,

    /// The token appended at this step.
    pub token: T,
}

/// A live beam slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeamSlot {
    /// Cumulative log-probability.
    pub score: f64,

    /// Has this slot emitted `eos`?
    pub finished: bool,
}

/// One expansion of a beam slot.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<T: TokenType> {
    /// The slot being extended.
    pub slot: usize,

    /// The token appended.
    pub token: T,

    /// The extended cumulative score.
    pub score: f64,

    /// Does the extended sequence end with `eos`?
    pub finished: bool,
}

impl<T: TokenType> Candidate<T> {
    /// Ordering key; greater is better.
    ///
    /// Higher score first; ties go to the lowest `(slot, token)`.
    fn rank_cmp(
        &self,
        other: &Self,
    ) -> Ordering {
        score_cmp(self.score, other.score)
            .then_with(|| other.slot.cmp(&self.slot))
            .then_with(|| other.token.cmp(&self.token))
    }
}

impl<T: TokenType> PartialEq for Candidate<T> {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.rank_cmp(other) == Ordering::Equal
    }
}

impl<T: TokenType> Eq for Candidate<T> {}

impl<T: TokenType> PartialOrd for Candidate<T> {
    fn partial_cmp(
        &self,
        other: &Self,
    ) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: TokenType> Ord for Candidate<T> {
    fn cmp(
        &self,
        other: &Self,
    ) -> Ordering {
        self.rank_cmp(other)
    }
}

/// Bounded top-K candidate selection.
///
/// Holds the `k` best candidates seen so far in a min-heap keyed on rank.
#[derive(Debug)]
pub struct TopK<T: TokenType> {
    k: usize,
    heap: OctonaryHeap<Reverse<Candidate<T>>>,
}

impl<T: TokenType> TopK<T> {
    /// Create an empty selector keeping `k` candidates.
    pub fn new(k: usize) -> Self {
        Self {
            k,
            heap: OctonaryHeap::with_capacity(k + 1),
        }
    }

    /// Offer a candidate.
    pub fn push(
        &mut self,
        candidate: Candidate<T>,
    ) {
        if self.k == 0 {
            return;
        }
        if self.heap.len() < self.k {
            self.heap.push(Reverse(candidate));
            return;
        }
        if let Some(Reverse(worst)) = self.heap.peek()
            && candidate > *worst
        {
            self.heap.pop();
            self.heap.push(Reverse(candidate));
        }
    }

    /// The selected candidates, best first.
    pub fn into_sorted(self) -> Vec<Candidate<T>> {
        // Ascending order of `Reverse` is descending order of rank.
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|Reverse(c)| c)
            .collect()
    }
}

/// The beam: the live slots, plus the backpointer arena.
#[derive(Debug, Clone)]
pub struct Beam<T: TokenType> {
    eos: T,
    steps: Vec<Vec<BeamEntry<T>>>,
    slots: Vec<BeamSlot>,
}

impl<T: TokenType> Beam<T> {
    /// The initial beam: the single `sos` hypothesis, score `0.0`.
    pub fn new(
        sos: T,
        eos: T,
    ) -> Self {
        Self {
            eos,
            steps: vec![vec![BeamEntry {
                parent: 0,
                token: sos,
            }]],
            slots: vec![BeamSlot {
                score: 0.0,
                finished: false,
            }],
        }
    }

    /// The live slots.
    pub fn slots(&self) -> &[BeamSlot] {
        &self.slots
    }

    /// The number of live slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Is the beam empty?
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// The number of expansion steps applied.
    pub fn depth(&self) -> usize {
        self.steps.len() - 1
    }

    /// Are all live slots finished?
    pub fn all_finished(&self) -> bool {
        self.slots.iter().all(|s| s.finished)
    }

    /// Indices of the unfinished slots, ascending.
    pub fn active_slots(&self) -> Vec<usize> {
        (0..self.slots.len())
            .filter(|&i| !self.slots[i].finished)
            .collect()
    }

    /// The full token path of a live slot, starting with `sos`.
    pub fn path(
        &self,
        slot: usize,
    ) -> Vec<T> {
        let mut tokens = Vec::with_capacity(self.steps.len());
        let mut slot = slot;
        for step in self.steps.iter().rev() {
            let entry = step[slot];
            tokens.push(entry.token);
            slot = entry.parent;
        }
        tokens.reverse();
        tokens
    }

    /// Replace the live slots with the selected candidates, best first.
    pub fn advance(
        &mut self,
        selected: Vec<Candidate<T>>,
    ) {
        let mut entries = Vec::with_capacity(selected.len());
        let mut slots = Vec::with_capacity(selected.len());
        for c in selected {
            entries.push(BeamEntry {
                parent: c.slot,
                token: c.token,
            });
            slots.push(BeamSlot {
                score: c.score,
                finished: c.finished,
            });
        }
        self.steps.push(entries);
        self.slots = slots;
    }

    /// The carry-over candidate for a finished slot.
    pub fn carry_over(
        &self,
        slot: usize,
    ) -> Candidate<T> {
        Candidate {
            slot,
            token: self.eos,
            score: self.slots[slot].score,
            finished: true,
        }
    }

    /// Rebuild the live slots as hypotheses, in slot order.
    ///
    /// `sos` is stripped, and each path is truncated after its first `eos`.
    pub fn hypotheses(&self) -> Vec<Hypothesis<T>> {
        (0..self.slots.len())
            .map(|slot| {
                let mut tokens = self.path(slot);
                tokens.remove(0);
                if let Some(pos) = tokens.iter().position(|&t| t == self.eos) {
                    tokens.truncate(pos + 1);
                }
                Hypothesis {
                    tokens,
                    score: self.slots[slot].score,
                    is_finished: self.slots[slot].finished,
                }
            })
            .collect()
    }
}
