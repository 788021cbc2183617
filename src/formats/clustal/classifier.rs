//! Line classification for ClustalW blocks.
//!
//! There is no tag telling a conservation line apart from a sequence line.
//! The classifier relies on geometry instead: sequence lines start with an
//! identifier in column 0, conservation lines start with blanks and carry
//! their symbols at the same column offset as the residues above them.

use log::debug;

use super::{ClustalError, ClustalResult};

/// Column layout established by the first sequence line of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockGeometry {
    /// Characters taken by the identifier and its padding
    pub id_column_width: usize,
    /// Length of the most recently seen residue fragment
    pub fragment_len: usize,
}

impl BlockGeometry {
    /// Column just past the residue fragment.
    pub fn fragment_end(&self) -> usize {
        self.id_column_width + self.fragment_len
    }
}

/// A non-blank body line, split into the parts the accumulator needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifiedLine<'a> {
    Sequence { id: &'a str, fragment: &'a str },
    Annotation(String),
}

/// Stateful classifier: remembers the identifier-column width across the
/// whole file and the last fragment length within the current block.
#[derive(Debug, Default)]
pub struct LineClassifier {
    geometry: Option<BlockGeometry>,
}

impl LineClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn geometry(&self) -> Option<BlockGeometry> {
        self.geometry
    }

    /// Classifies one raw (unstripped) body line. Blank lines must be
    /// filtered out by the caller. `line_number` is 1-based and only used in
    /// error reports.
    pub fn classify<'a>(
        &mut self,
        line_number: usize,
        line: &'a str,
    ) -> ClustalResult<ClassifiedLine<'a>> {
        let line = line.strip_suffix('\r').unwrap_or(line);

        if line.starts_with(char::is_whitespace) {
            self.annotation(line_number, line)
        } else {
            self.sequence(line_number, line)
        }
    }

    fn sequence<'a>(
        &mut self,
        line_number: usize,
        line: &'a str,
    ) -> ClustalResult<ClassifiedLine<'a>> {
        let missing_fragment = || ClustalError::MissingFragment {
            line_number,
            line: line.to_string(),
        };

        let id_end = line.find(char::is_whitespace).ok_or_else(missing_fragment)?;
        let id = &line[..id_end];
        let rest = &line[id_end..];
        let data_start = id_end + (rest.len() - rest.trim_start().len());

        // Anything after the fragment is the optional residue count.
        let fragment = line[data_start..]
            .split_whitespace()
            .next()
            .ok_or_else(missing_fragment)?;

        let id_column_width = line[..data_start].chars().count();
        if let Some(geometry) = self.geometry {
            if geometry.id_column_width != id_column_width {
                return Err(ClustalError::InconsistentLayout {
                    line_number,
                    line: line.to_string(),
                    expected: geometry.id_column_width,
                    found: id_column_width,
                });
            }
        } else {
            debug!(
                "Identifier column width set to {} by line {}",
                id_column_width, line_number
            );
        }

        self.geometry = Some(BlockGeometry {
            id_column_width,
            fragment_len: fragment.chars().count(),
        });

        Ok(ClassifiedLine::Sequence { id, fragment })
    }

    fn annotation<'a>(&self, line_number: usize, line: &str) -> ClustalResult<ClassifiedLine<'a>> {
        let geometry = self
            .geometry
            .ok_or(ClustalError::AnnotationBeforeSequence { line_number })?;

        let mut fragment: String = line
            .chars()
            .skip(geometry.id_column_width)
            .take(geometry.fragment_len)
            .collect();

        // Editors and some tools trim trailing blanks off conservation lines.
        let found = fragment.chars().count();
        if found < geometry.fragment_len {
            debug!(
                "Padding annotation line {} from {} to {} columns",
                line_number, found, geometry.fragment_len
            );
            fragment.extend(std::iter::repeat(' ').take(geometry.fragment_len - found));
        }

        Ok(ClassifiedLine::Annotation(fragment))
    }
}
