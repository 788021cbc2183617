//! Data model for parsed alignments.
//!
//! This module contains the data structures produced by the parsers:
//! - Sequences and their residue type
//! - The alignment itself, with its header and conservation (match) line
//! - The conservation vocabulary used by ClustalW-style match lines
//!
//! An [`Alignment`] is built once by a parser and is read-only afterwards.

use std::collections::HashMap;
use std::fmt;
use std::ops::Range;

use thiserror::Error;

/// Fraction of alphabetic residues that must be nucleotide codes (`ACGTUN`)
/// for a sequence to be classified as nucleotide.
const NUCLEOTIDE_THRESHOLD: f64 = 0.9;

/// Broad residue alphabet of a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SequenceType {
    /// DNA or RNA
    Nucleotide,
    /// Protein
    AminoAcid,
    /// No alphabetic residue to judge from (empty or gap-only)
    #[default]
    Unknown,
}

impl SequenceType {
    /// Classifies residues: nucleotide when more than 90% of the alphabetic
    /// characters are `A`, `C`, `G`, `T`, `U` or `N`, amino acid otherwise.
    pub fn classify(residues: &str) -> Self {
        let mut letters = 0usize;
        let mut nucleotides = 0usize;
        for c in residues.chars().filter(|c| c.is_ascii_alphabetic()) {
            letters += 1;
            if matches!(c.to_ascii_uppercase(), 'A' | 'C' | 'G' | 'T' | 'U' | 'N') {
                nucleotides += 1;
            }
        }

        if letters == 0 {
            SequenceType::Unknown
        } else if nucleotides as f64 / letters as f64 > NUCLEOTIDE_THRESHOLD {
            SequenceType::Nucleotide
        } else {
            SequenceType::AminoAcid
        }
    }
}

impl fmt::Display for SequenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SequenceType::Nucleotide => write!(f, "nucleotide"),
            SequenceType::AminoAcid => write!(f, "amino acid"),
            SequenceType::Unknown => write!(f, "unknown"),
        }
    }
}

/// Program family named in the first token of an alignment header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignmentFamily {
    Clustal,
    Muscle,
}

impl AlignmentFamily {
    /// Recognizes a header token. The match is a case-sensitive substring
    /// test, so `CLUSTAL`, `CLUSTALW` and `MUSCLE(3.8)` are all accepted.
    pub fn from_token(token: &str) -> Option<Self> {
        if token.contains("CLUSTAL") {
            Some(AlignmentFamily::Clustal)
        } else if token.contains("MUSCLE") {
            Some(AlignmentFamily::Muscle)
        } else {
            None
        }
    }
}

impl fmt::Display for AlignmentFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlignmentFamily::Clustal => write!(f, "CLUSTAL"),
            AlignmentFamily::Muscle => write!(f, "MUSCLE"),
        }
    }
}

/// Column conservation symbols found in match lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conservation {
    /// `*`: identical residues in every sequence
    Identical,
    /// `:`: conserved substitutions
    Conserved,
    /// `.`: semi-conserved substitutions
    SemiConserved,
    /// space: no conservation signal
    Unmarked,
}

impl Conservation {
    pub const IDENTICAL: char = '*';
    pub const CONSERVED: char = ':';
    pub const SEMI_CONSERVED: char = '.';

    /// Maps a match-line character to its meaning. Characters outside the
    /// vocabulary return `None` (they are kept verbatim in the match line).
    pub fn from_symbol(c: char) -> Option<Self> {
        match c {
            Self::IDENTICAL => Some(Conservation::Identical),
            Self::CONSERVED => Some(Conservation::Conserved),
            Self::SEMI_CONSERVED => Some(Conservation::SemiConserved),
            ' ' => Some(Conservation::Unmarked),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Conservation::Identical => Self::IDENTICAL,
            Conservation::Conserved => Self::CONSERVED,
            Conservation::SemiConserved => Self::SEMI_CONSERVED,
            Conservation::Unmarked => ' ',
        }
    }
}

/// Per-symbol tally of a match line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConservationSummary {
    pub identical: usize,
    pub conserved: usize,
    pub semi_conserved: usize,
    pub unmarked: usize,
    /// Characters outside the `*`, `:`, `.`, space vocabulary
    pub other: usize,
}

impl ConservationSummary {
    /// Tallies every character of a match line.
    pub fn from_match_line(match_line: &str) -> Self {
        let mut summary = Self::default();
        for c in match_line.chars() {
            match Conservation::from_symbol(c) {
                Some(Conservation::Identical) => summary.identical += 1,
                Some(Conservation::Conserved) => summary.conserved += 1,
                Some(Conservation::SemiConserved) => summary.semi_conserved += 1,
                Some(Conservation::Unmarked) => summary.unmarked += 1,
                None => summary.other += 1,
            }
        }
        summary
    }

    /// Total number of columns tallied.
    pub fn total(&self) -> usize {
        self.identical + self.conserved + self.semi_conserved + self.unmarked + self.other
    }
}

/// Represents a single aligned sequence with its identifier and residues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    /// The sequence identifier (first token of its data lines)
    pub id: String,
    /// The aligned residues, gaps included
    pub data: String,
}

impl Sequence {
    /// Creates a new sequence.
    pub fn new(id: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            data: data.into(),
        }
    }

    /// Returns the residues as a string slice.
    pub fn as_str(&self) -> &str {
        &self.data
    }

    /// Returns the length of the sequence in columns (characters).
    pub fn len(&self) -> usize {
        self.data.chars().count()
    }

    /// Returns true if the sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Gets a character at a specific position.
    pub fn char_at(&self, pos: usize) -> Option<char> {
        self.data.chars().nth(pos)
    }

    /// Gets the columns `range` of the sequence data, clamped to its bounds.
    pub fn slice(&self, range: Range<usize>) -> &str {
        let end = range.end.max(range.start);
        let start = self.byte_offset(range.start);
        let end = self.byte_offset(end);
        &self.data[start..end]
    }

    /// Byte offset of column `col`, or the end of the data past the last column.
    fn byte_offset(&self, col: usize) -> usize {
        self.data
            .char_indices()
            .nth(col)
            .map_or(self.data.len(), |(offset, _)| offset)
    }

    pub fn sequence_type(&self) -> SequenceType {
        SequenceType::classify(&self.data)
    }
}

/// Positional lookup outside `[0, sequence_count)`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Sequence index {index} out of range (alignment has {count} sequences)")]
pub struct IndexOutOfRange {
    pub index: usize,
    pub count: usize,
}

/// A parsed multiple sequence alignment.
///
/// Sequences are kept in order of first appearance in the file. The match
/// line holds one conservation symbol per column, as assembled from the
/// annotation lines of every block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alignment {
    header: String,
    family: AlignmentFamily,
    sequences: Vec<Sequence>,
    index: HashMap<String, usize>,
    match_line: String,
}

impl Alignment {
    /// Creates an alignment from its parts. When an identifier occurs more
    /// than once, lookups by identifier resolve to its first occurrence.
    pub fn new(
        header: impl Into<String>,
        family: AlignmentFamily,
        sequences: Vec<Sequence>,
        match_line: impl Into<String>,
    ) -> Self {
        let mut index = HashMap::with_capacity(sequences.len());
        for (pos, seq) in sequences.iter().enumerate() {
            index.entry(seq.id.clone()).or_insert(pos);
        }
        Self {
            header: header.into(),
            family,
            sequences,
            index,
            match_line: match_line.into(),
        }
    }

    /// The first line of the file, stripped of surrounding whitespace.
    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn family(&self) -> AlignmentFamily {
        self.family
    }

    /// Program version announced in the header, e.g. `2.1` for
    /// `CLUSTAL W (2.1) multiple sequence alignment`.
    pub fn version(&self) -> Option<&str> {
        self.header
            .split_whitespace()
            .skip(1)
            .map(|token| token.trim_start_matches('(').trim_end_matches(')'))
            .find(|token| token.starts_with(|c: char| c.is_ascii_digit()))
    }

    /// Returns the sequence at `index`, in order of first appearance.
    pub fn get_sequence(&self, index: usize) -> Result<&Sequence, IndexOutOfRange> {
        self.sequences.get(index).ok_or(IndexOutOfRange {
            index,
            count: self.sequences.len(),
        })
    }

    /// Gets a sequence by index.
    pub fn get(&self, index: usize) -> Option<&Sequence> {
        self.sequences.get(index)
    }

    /// Looks a sequence up by identifier.
    pub fn find(&self, id: &str) -> Option<&Sequence> {
        self.index.get(id).map(|&pos| &self.sequences[pos])
    }

    pub fn sequences(&self) -> &[Sequence] {
        &self.sequences
    }

    /// The conservation line: `*` identical, `:` conserved, `.` semi-conserved,
    /// space for no signal, one character per column.
    pub fn match_line(&self) -> &str {
        &self.match_line
    }

    /// Same as [`Alignment::match_line`].
    pub fn alignment_info(&self) -> &str {
        self.match_line()
    }

    pub fn conservation_counts(&self) -> ConservationSummary {
        ConservationSummary::from_match_line(&self.match_line)
    }

    /// Returns the number of sequences.
    pub fn sequence_count(&self) -> usize {
        self.sequences.len()
    }

    /// Returns the alignment length (max sequence length).
    pub fn alignment_length(&self) -> usize {
        self.sequences.iter().map(Sequence::len).max().unwrap_or(0)
    }

    /// True when all sequences share one length and the match line, if
    /// present, spans exactly that many columns.
    pub fn is_flush(&self) -> bool {
        let len = self.alignment_length();
        self.sequences.iter().all(|s| s.len() == len)
            && (self.match_line.is_empty() || self.match_line.chars().count() == len)
    }

    /// Classifies the residues of all sequences taken together.
    pub fn sequence_type(&self) -> SequenceType {
        let all: String = self.sequences.iter().map(Sequence::as_str).collect();
        SequenceType::classify(&all)
    }

    /// Returns the maximum identifier length (for display purposes).
    pub fn max_id_length(&self) -> usize {
        self.sequences
            .iter()
            .map(|s| s.id.chars().count())
            .max()
            .unwrap_or(0)
    }

    /// Returns true if the alignment has no sequence.
    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Alignment {
        Alignment::new(
            "CLUSTAL W (2.1) multiple sequence alignment",
            AlignmentFamily::Clustal,
            vec![Sequence::new("seq1", "ACGT"), Sequence::new("seq2", "AC-T")],
            "**.*",
        )
    }

    #[test]
    fn test_sequence_creation() {
        let seq = Sequence::new("seq1", "ACGT");
        assert_eq!(seq.id, "seq1");
        assert_eq!(seq.as_str(), "ACGT");
        assert_eq!(seq.len(), 4);
        assert!(!seq.is_empty());
    }

    #[test]
    fn test_sequence_char_at_and_slice() {
        let seq = Sequence::new("seq1", "ACGT");
        assert_eq!(seq.char_at(0), Some('A'));
        assert_eq!(seq.char_at(3), Some('T'));
        assert_eq!(seq.char_at(4), None);
        assert_eq!(seq.slice(1..3), "CG");
        assert_eq!(seq.slice(2..10), "GT");
        assert_eq!(seq.slice(7..9), "");
    }

    #[test]
    fn test_classify_sequence_type() {
        assert_eq!(SequenceType::classify("ACGT-ACGU-n"), SequenceType::Nucleotide);
        assert_eq!(
            SequenceType::classify("-MKNTLLKLGVCVSLLGITPFVST"),
            SequenceType::AminoAcid
        );
        assert_eq!(SequenceType::classify("----"), SequenceType::Unknown);
        assert_eq!(SequenceType::classify(""), SequenceType::Unknown);
        // 9 of 10 letters is not strictly above the threshold
        assert_eq!(SequenceType::classify("ACGTACGTAE"), SequenceType::AminoAcid);
    }

    #[test]
    fn test_family_from_token() {
        assert_eq!(AlignmentFamily::from_token("CLUSTAL"), Some(AlignmentFamily::Clustal));
        assert_eq!(AlignmentFamily::from_token("CLUSTALW"), Some(AlignmentFamily::Clustal));
        assert_eq!(AlignmentFamily::from_token("MUSCLE"), Some(AlignmentFamily::Muscle));
        assert_eq!(AlignmentFamily::from_token("clustal"), None);
        assert_eq!(AlignmentFamily::from_token("#NEXUS"), None);
    }

    #[test]
    fn test_conservation_symbols() {
        assert_eq!(Conservation::from_symbol('*'), Some(Conservation::Identical));
        assert_eq!(Conservation::from_symbol(':'), Some(Conservation::Conserved));
        assert_eq!(Conservation::from_symbol('.'), Some(Conservation::SemiConserved));
        assert_eq!(Conservation::from_symbol(' '), Some(Conservation::Unmarked));
        assert_eq!(Conservation::from_symbol('B'), None);
        assert_eq!(Conservation::Conserved.symbol(), ':');
    }

    #[test]
    fn test_conservation_summary() {
        let summary = ConservationSummary::from_match_line("**: . B");
        assert_eq!(summary.identical, 2);
        assert_eq!(summary.conserved, 1);
        assert_eq!(summary.semi_conserved, 1);
        assert_eq!(summary.unmarked, 2);
        assert_eq!(summary.other, 1);
        assert_eq!(summary.total(), 7);
    }

    #[test]
    fn test_alignment_accessors() {
        let alignment = sample();
        assert_eq!(alignment.header(), "CLUSTAL W (2.1) multiple sequence alignment");
        assert_eq!(alignment.family(), AlignmentFamily::Clustal);
        assert_eq!(alignment.version(), Some("2.1"));
        assert_eq!(alignment.sequence_count(), 2);
        assert_eq!(alignment.alignment_length(), 4);
        assert_eq!(alignment.match_line(), "**.*");
        assert_eq!(alignment.alignment_info(), alignment.match_line());
        assert_eq!(alignment.find("seq2").map(Sequence::as_str), Some("AC-T"));
        assert!(alignment.find("seq3").is_none());
        assert_eq!(alignment.max_id_length(), 4);
        assert_eq!(alignment.sequence_type(), SequenceType::Nucleotide);
        assert!(alignment.is_flush());
    }

    #[test]
    fn test_get_sequence_out_of_range() {
        let alignment = sample();
        assert_eq!(alignment.get_sequence(1).unwrap().id, "seq2");
        let err = alignment.get_sequence(2).unwrap_err();
        assert_eq!(err, IndexOutOfRange { index: 2, count: 2 });
        // the alignment is still usable afterwards
        assert_eq!(alignment.get_sequence(0).unwrap().id, "seq1");
    }

    #[test]
    fn test_version_plain_and_missing() {
        let plain = Alignment::new(
            "CLUSTAL 2.0.9 multiple sequence alignment",
            AlignmentFamily::Clustal,
            Vec::new(),
            "",
        );
        assert_eq!(plain.version(), Some("2.0.9"));

        let none = Alignment::new(
            "MUSCLE multiple alignment",
            AlignmentFamily::Muscle,
            Vec::new(),
            "",
        );
        assert_eq!(none.version(), None);
        assert!(none.is_empty());
        assert!(none.is_flush());
    }

    #[test]
    fn test_multibyte_residues_count_as_columns() {
        let seq = Sequence::new("seqÅ", "ÅCGT");
        assert_eq!(seq.len(), 4);
        assert_eq!(seq.char_at(0), Some('Å'));
        assert_eq!(seq.slice(0..1), "Å");
        assert_eq!(seq.slice(1..3), "CG");
        assert_eq!(seq.slice(3..9), "T");
        assert_eq!(seq.slice(3..1), "");

        let alignment = Alignment::new(
            "CLUSTAL",
            AlignmentFamily::Clustal,
            vec![seq, Sequence::new("seqB", "ACGT")],
            "****",
        );
        assert_eq!(alignment.alignment_length(), 4);
        assert_eq!(alignment.max_id_length(), 4);
        assert!(alignment.is_flush());
    }

    #[test]
    fn test_not_flush() {
        let ragged = Alignment::new(
            "CLUSTAL",
            AlignmentFamily::Clustal,
            vec![Sequence::new("a", "ACGT"), Sequence::new("b", "AC")],
            "",
        );
        assert!(!ragged.is_flush());

        let short_match = Alignment::new(
            "CLUSTAL",
            AlignmentFamily::Clustal,
            vec![Sequence::new("a", "ACGT")],
            "**",
        );
        assert!(!short_match.is_flush());
    }
}
