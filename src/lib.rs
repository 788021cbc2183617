//! # clustalrs - ClustalW alignment reader
//!
//! Reads the interleaved ClustalW / ALN format written by ClustalW2, Muscle
//! and compatible tools, and rebuilds the full-length aligned sequences and
//! the per-column conservation (match) line.
//!
//! ## Architecture
//!
//! - `model`: sequences, the alignment and the conservation vocabulary
//! - `formats`: file loading and error types
//! - `formats::clustal`: header check and line pass, with the line
//!   classifier and the block accumulator as submodules
//!
//! ## Example
//!
//! ```
//! let text = "CLUSTAL 2.0.9 multiple sequence alignment\n\n\
//!             seqA      ABCDE\n\
//!             seqB      AXCDE\n\
//!             \x20         *.***\n";
//! let alignment = clustalrs::formats::parse_str(text).unwrap();
//! assert_eq!(alignment.get_sequence(1).unwrap().as_str(), "AXCDE");
//! assert_eq!(alignment.match_line(), "*.***");
//! ```

pub mod formats;
pub mod model;
