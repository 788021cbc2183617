//! Append-only store for the fragments of an interleaved alignment.

use std::collections::HashMap;

use crate::model::{Alignment, AlignmentFamily, Sequence};

/// Where a fragment goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentTarget<'a> {
    /// The named sequence, created on first use
    Sequence(&'a str),
    /// The running conservation line
    Annotation,
}

/// Sequences in order of first appearance, with an identifier index, plus
/// the match line assembled so far.
#[derive(Debug, Default)]
pub struct BlockAccumulator {
    sequences: Vec<Sequence>,
    index: HashMap<String, usize>,
    annotation: String,
}

impl BlockAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `fragment` to its target. Never fails.
    pub fn add(&mut self, target: FragmentTarget<'_>, fragment: &str) {
        match target {
            FragmentTarget::Annotation => self.annotation.push_str(fragment),
            FragmentTarget::Sequence(id) => match self.index.get(id) {
                Some(&pos) => self.sequences[pos].data.push_str(fragment),
                None => {
                    self.index.insert(id.to_string(), self.sequences.len());
                    self.sequences.push(Sequence::new(id, fragment));
                }
            },
        }
    }

    /// Returns the n-th sequence by first appearance.
    pub fn fetch_by_position(&self, position: usize) -> Option<&Sequence> {
        self.sequences.get(position)
    }

    pub fn sequence_count(&self) -> usize {
        self.sequences.len()
    }

    pub fn annotation(&self) -> &str {
        &self.annotation
    }

    /// Freezes the accumulated state into an [`Alignment`].
    pub fn into_alignment(self, header: impl Into<String>, family: AlignmentFamily) -> Alignment {
        Alignment::new(header, family, self.sequences, self.annotation)
    }
}
