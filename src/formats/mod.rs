//! Alignment file loading.
//!
//! Reads ClustalW / ALN files (as written by ClustalW2, Muscle and
//! compatible tools) into an [`Alignment`].
//!
//! Header detection looks at the first line only, the same line the parser
//! validates.

pub mod clustal;

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use log::debug;
use thiserror::Error;

use crate::model::{Alignment, AlignmentFamily};

/// Errors that can occur while loading an alignment.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("ClustalW error: {0}")]
    ClustalError(#[from] clustal::ClustalError),
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Returns the program family named by the first line, if it is one of the
/// supported ones.
pub fn detect_family_from_content(content: &str) -> Option<AlignmentFamily> {
    let first = content.lines().next()?;
    let token = first.split_whitespace().next()?;
    AlignmentFamily::from_token(token)
}

/// Parses alignment text held in memory.
pub fn parse_str(content: &str) -> ParseResult<Alignment> {
    Ok(clustal::parse_clustal_str(content)?)
}

/// Parses an alignment file.
///
/// # Examples
///
/// ```no_run
/// use clustalrs::formats::parse_file;
///
/// let alignment = parse_file("example.aln").unwrap();
/// println!("{} sequences", alignment.sequence_count());
/// ```
pub fn parse_file<P: AsRef<Path>>(path: P) -> ParseResult<Alignment> {
    let file = File::open(&path)?;
    let file_size = file.metadata()?.len() as usize;
    debug!("Reading {} ({} bytes)", path.as_ref().display(), file_size);

    let mut reader = BufReader::with_capacity(1024 * 1024, file);
    let mut content = String::with_capacity(file_size);
    reader.read_to_string(&mut content)?;

    parse_str(&content)
}
