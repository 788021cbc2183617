//! ClustalW / ALN format parser.
//!
//! Reads the interleaved alignments written by ClustalW2, Muscle and
//! compatible tools.
//!
//! ## ALN Format
//!
//! The first line names the program. Blocks of sequence lines follow, each
//! optionally closed by a conservation line and separated by blank lines:
//! ```text
//! CLUSTAL W 2.1 multiple sequence alignment
//!
//! FOSB_MOUSE      ITTSQDLQWLVQPTLISSMAQSQGQPLASQPPAVDPYDMPGTSYSTPGLSAYSTGGASGS 60
//! FOSB_HUMAN      ITTSQDLQWLVQPTLISSMAQSQGQPLASQPPVVDPYDMPGTSYSTPGMSGYSSGGASGS 60
//!                 ********************************.***************:*.**:******
//! ```
//!
//! The trailing residue count is optional. Conservation symbols are `*`
//! (identical), `:` (conserved substitution) and `.` (semi-conserved
//! substitution); any other character is kept as-is.
//!
//! ## Strictness
//!
//! - The first token of the header must contain `CLUSTAL` or `MUSCLE`.
//! - Every sequence line in the file must use the same identifier column
//!   width: conservation lines are read at that offset, so a file with
//!   mixed widths cannot be interpreted.
//! - Sequence lengths are not checked; see [`Alignment::is_flush`].

pub mod accumulator;
pub mod classifier;

use log::{debug, info, warn};
use thiserror::Error;

use crate::model::{Alignment, AlignmentFamily};
use accumulator::{BlockAccumulator, FragmentTarget};
use classifier::{ClassifiedLine, LineClassifier};

/// Errors that can occur during ClustalW parsing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClustalError {
    #[error("Unrecognized alignment family '{token}' in header: '{header}'")]
    UnrecognizedFamily { token: String, header: String },

    #[error(
        "Inconsistent block layout at line {line_number} \
         (identifier column width {found}, expected {expected}): '{line}'"
    )]
    InconsistentLayout {
        line_number: usize,
        line: String,
        expected: usize,
        found: usize,
    },

    #[error("Conservation line at line {line_number} precedes any sequence line")]
    AnnotationBeforeSequence { line_number: usize },

    #[error("Sequence line {line_number} has no residues: '{line}'")]
    MissingFragment { line_number: usize, line: String },
}

/// Result type for ClustalW operations.
pub type ClustalResult<T> = Result<T, ClustalError>;

/// Parses ClustalW content from a string.
pub fn parse_clustal_str(content: &str) -> ClustalResult<Alignment> {
    let lines: Vec<&str> = content.lines().collect();
    parse_clustal_lines(&lines)
}

/// Parses ClustalW content already split into lines.
///
/// An empty slice is tolerated with a warning and then rejected by the
/// header check.
pub fn parse_clustal_lines<S: AsRef<str>>(lines: &[S]) -> ClustalResult<Alignment> {
    if lines.is_empty() {
        warn!("Unexpected empty buffer while reading ClustalW alignment");
    }

    let header = lines.first().map(|l| l.as_ref().trim()).unwrap_or_default();
    let family = parse_header(header)?;

    let mut classifier = LineClassifier::new();
    let mut accumulator = BlockAccumulator::new();

    for (idx, raw) in lines.iter().enumerate().skip(1) {
        let raw = raw.as_ref();
        if raw.trim().is_empty() {
            continue;
        }

        match classifier.classify(idx + 1, raw)? {
            ClassifiedLine::Sequence { id, fragment } => {
                accumulator.add(FragmentTarget::Sequence(id), fragment);
            }
            ClassifiedLine::Annotation(fragment) => {
                accumulator.add(FragmentTarget::Annotation, &fragment);
            }
        }
    }

    let alignment = accumulator.into_alignment(header, family);
    info!(
        "Read {} alignment: {} sequences, {} columns",
        family,
        alignment.sequence_count(),
        alignment.alignment_length()
    );
    Ok(alignment)
}

/// Checks the first header token against the known program families.
fn parse_header(header: &str) -> ClustalResult<AlignmentFamily> {
    let token = header.split_whitespace().next().unwrap_or("");
    let family = AlignmentFamily::from_token(token).ok_or_else(|| {
        ClustalError::UnrecognizedFamily {
            token: token.to_string(),
            header: header.to_string(),
        }
    })?;
    debug!("Header '{}' identified as {}", header, family);
    Ok(family)
}
