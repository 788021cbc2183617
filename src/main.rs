//! clustalrs - ClustalW alignment reader
//!
//! Reads a ClustalW / ALN alignment and reports on it, or exports its
//! sequences.
//!
//! ## Usage
//!
//! ```bash
//! clustalrs <alignment.aln>                  # summary
//! clustalrs --match-line <alignment.aln>     # summary and conservation line
//! clustalrs -o out.fasta <alignment.aln>     # export as FASTA
//! clustalrs -o - -e tsv <alignment.aln>      # id<TAB>residues to stdout
//! clustalrs -vv <alignment.aln>              # debug logging
//! ```

// Use jemalloc for better memory management (returns memory to OS)
#[cfg(not(windows))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::info;

use clustalrs::formats::parse_file;
use clustalrs::model::Alignment;

/// Layout used when exporting sequences
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ExportFormat {
    /// FASTA records, one line of residues per sequence
    Fasta,
    /// Tab-separated identifier and residues
    Tsv,
}

/// clustalrs - Read ClustalW/ALN multiple sequence alignments
///
/// Without -o/--output, prints a summary of the alignment.
/// With -o/--output, exports the sequences to a file (or stdout with "-").
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Alignment file in ClustalW/ALN format (CLUSTAL or MUSCLE header)
    file: PathBuf,

    /// Output file (enables export). Use "-" for stdout.
    #[arg(short = 'o', long = "output")]
    output: Option<String>,

    /// Export layout
    #[arg(short = 'e', long = "export-format", value_enum, default_value = "fasta")]
    export_format: ExportFormat,

    /// Also print the conservation line in the summary
    #[arg(short = 'm', long = "match-line")]
    match_line: bool,

    /// Verbosity level (-v info, -vv debug)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Writes the human-readable summary of an alignment.
fn write_summary<W: Write>(
    out: &mut W,
    alignment: &Alignment,
    with_match_line: bool,
) -> io::Result<()> {
    writeln!(out, "Header:     {}", alignment.header())?;
    writeln!(
        out,
        "Family:     {} (version {})",
        alignment.family(),
        alignment.version().unwrap_or("unknown")
    )?;
    writeln!(out, "Sequences:  {}", alignment.sequence_count())?;
    writeln!(out, "Columns:    {}", alignment.alignment_length())?;
    writeln!(out, "Residues:   {}", alignment.sequence_type())?;

    let counts = alignment.conservation_counts();
    writeln!(
        out,
        "Conserved:  {} identical, {} conserved, {} semi-conserved, {} unmarked",
        counts.identical, counts.conserved, counts.semi_conserved, counts.unmarked
    )?;
    if counts.other > 0 {
        writeln!(out, "            {} unrecognized match symbols", counts.other)?;
    }
    if !alignment.is_flush() {
        writeln!(out, "Warning: sequences and match line do not all have the same length")?;
    }

    let width = alignment.max_id_length();
    for seq in alignment.sequences() {
        writeln!(out, "  {:<width$}  {}", seq.id, seq.len(), width = width)?;
    }

    if with_match_line {
        writeln!(out, "Match line:")?;
        writeln!(out, "{}", alignment.match_line())?;
    }
    Ok(())
}

/// Writes every sequence in the requested layout.
fn write_sequences<W: Write>(
    out: &mut W,
    alignment: &Alignment,
    format: ExportFormat,
) -> io::Result<()> {
    for seq in alignment.sequences() {
        match format {
            ExportFormat::Fasta => {
                writeln!(out, ">{}", seq.id)?;
                writeln!(out, "{}", seq.as_str())?;
            }
            ExportFormat::Tsv => writeln!(out, "{}\t{}", seq.id, seq.as_str())?,
        }
    }
    Ok(())
}

/// Runs export mode: write sequences to a file or stdout.
fn run_export(alignment: &Alignment, output: &str, format: ExportFormat) -> Result<()> {
    if output == "-" {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        write_sequences(&mut handle, alignment, format)?;
    } else {
        let mut file = io::BufWriter::new(
            std::fs::File::create(output).with_context(|| format!("Cannot create {}", output))?,
        );
        write_sequences(&mut file, alignment, format)?;
        file.flush()?;
        info!("Wrote {} sequences to {}", alignment.sequence_count(), output);
    }
    Ok(())
}

/// Rejects option combinations clap cannot express.
fn check_args(args: &Args) -> Result<()> {
    if args.output.is_none() && args.export_format != ExportFormat::Fasta {
        anyhow::bail!("--export-format only applies together with -o/--output");
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(match args.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        })
        .parse_default_env()
        .init();

    check_args(&args)?;

    let alignment = parse_file(&args.file)
        .with_context(|| format!("Cannot read alignment {}", args.file.display()))?;

    if let Some(output) = args.output {
        run_export(&alignment, &output, args.export_format)?;
    } else {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        write_summary(&mut handle, &alignment, args.match_line)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clustalrs::formats::parse_str;

    const EXAMPLE: &str = "CLUSTAL 2.0.9 multiple sequence alignment

seqA      ABCDE
seqB      AXCDE
          *.***
";

    #[test]
    fn test_write_fasta() {
        let alignment = parse_str(EXAMPLE).unwrap();
        let mut out = Vec::new();
        write_sequences(&mut out, &alignment, ExportFormat::Fasta).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), ">seqA\nABCDE\n>seqB\nAXCDE\n");
    }

    #[test]
    fn test_write_tsv() {
        let alignment = parse_str(EXAMPLE).unwrap();
        let mut out = Vec::new();
        write_sequences(&mut out, &alignment, ExportFormat::Tsv).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "seqA\tABCDE\nseqB\tAXCDE\n");
    }

    #[test]
    fn test_write_summary() {
        let alignment = parse_str(EXAMPLE).unwrap();
        let mut out = Vec::new();
        write_summary(&mut out, &alignment, true).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Family:     CLUSTAL (version 2.0.9)"));
        assert!(text.contains("Sequences:  2"));
        assert!(text.contains(
            "Conserved:  4 identical, 0 conserved, 1 semi-conserved, 0 unmarked"
        ));
        assert!(text.contains("  seqA  5\n"));
        assert!(text.ends_with("Match line:\n*.***\n"));
        assert!(!text.contains("Warning"));
    }

    #[test]
    fn test_args_parse() {
        let args =
            Args::try_parse_from(["clustalrs", "-vv", "-o", "-", "-e", "tsv", "x.aln"]).unwrap();
        assert_eq!(args.verbose, 2);
        assert_eq!(args.output.as_deref(), Some("-"));
        assert_eq!(args.export_format, ExportFormat::Tsv);
        assert!(!args.match_line);
    }

    #[test]
    fn test_export_format_requires_output() {
        let args = Args::try_parse_from(["clustalrs", "-e", "tsv", "x.aln"]).unwrap();
        let err = check_args(&args).unwrap_err();
        assert!(err.to_string().contains("-o/--output"));

        let args =
            Args::try_parse_from(["clustalrs", "-o", "out.tsv", "-e", "tsv", "x.aln"]).unwrap();
        assert!(check_args(&args).is_ok());

        let args = Args::try_parse_from(["clustalrs", "x.aln"]).unwrap();
        assert!(check_args(&args).is_ok());
    }
}
