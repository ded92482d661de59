use clap::{Parser, Subcommand};
use scavenger::{Decoder, Encoder};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::PathBuf;

/// Chunk size for streaming object bytes between files.
const IO_CHUNK_SIZE: usize = 16 * 1024;

#[derive(Parser)]
#[command(name = "scavenger")]
#[command(about = "The Scavenger archive container CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print an archive's signatures and object count.
    Stat {
        input: PathBuf,
    },
    /// Extract one object byte-for-byte.
    Get {
        input: PathBuf,
        index: u64,
        output: PathBuf,
    },
    /// Build an archive from a list file of one input path per line.
    Build {
        output: PathBuf,
        primary: String,
        secondary: String,
        list: PathBuf,
    },
}

/// Initialize the global `tracing` subscriber from `RUST_LOG`.
fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Parse a build list: one path per line, blank lines skipped, a leading
/// BOM stripped, trailing whitespace trimmed.
fn parse_list(listing: &str) -> Vec<PathBuf> {
    listing
        .strip_prefix('\u{feff}')
        .unwrap_or(listing)
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .map(PathBuf::from)
        .collect()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let cli = Cli::parse();
    match &cli.command {
        Commands::Stat { input } => {
            let decoder = Decoder::open(input)?;
            println!("--- Scavenger Archive ---");
            println!("Primary:   {}", decoder.primary());
            match decoder.secondary_ascii() {
                Some(ascii) => println!("Secondary: {} ({ascii:?})", decoder.secondary()),
                None => println!("Secondary: {}", decoder.secondary()),
            }
            println!("Objects:   {}", decoder.count());
        }
        Commands::Get { input, index, output } => {
            let mut decoder = Decoder::open(input)?;
            let mut reader = decoder.object_reader(*index)?;
            let mut out = File::create(output)?;
            let mut buf = vec![0u8; IO_CHUNK_SIZE];
            loop {
                let n = reader.read(&mut buf)?;
                if n == 0 {
                    break;
                }
                out.write_all(&buf[..n])?;
            }
            println!("Extracted object {} to {}", index, output.display());
        }
        Commands::Build { output, primary, secondary, list } => {
            let listing = fs::read_to_string(list)?;
            let paths = parse_list(&listing);

            let mut encoder = Encoder::new(output, primary, secondary)?;
            for path in &paths {
                if fs::metadata(path)?.len() == 0 {
                    return Err(format!("empty input file: {}", path.display()).into());
                }
                encoder.begin_object()?;
                let mut input = File::open(path)?;
                let mut buf = vec![0u8; IO_CHUNK_SIZE];
                loop {
                    let n = input.read(&mut buf)?;
                    if n == 0 {
                        break;
                    }
                    encoder.write(&buf[..n])?;
                }
                tracing::info!(path = %path.display(), "added object");
            }
            encoder.complete()?;
            println!("Built {} with {} objects", output.display(), paths.len());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_skips_blanks_and_trims_trailing_whitespace() {
        let paths = parse_list("a.bin  \n\nb.bin\t\n   \nc.bin\n");
        assert_eq!(
            paths,
            vec![PathBuf::from("a.bin"), PathBuf::from("b.bin"), PathBuf::from("c.bin")]
        );
    }

    #[test]
    fn list_strips_leading_bom() {
        let paths = parse_list("\u{feff}first.bin\nsecond.bin\n");
        assert_eq!(paths, vec![PathBuf::from("first.bin"), PathBuf::from("second.bin")]);
    }

    #[test]
    fn empty_list_yields_no_paths() {
        assert!(parse_list("").is_empty());
        assert!(parse_list("\n\n").is_empty());
    }
}
