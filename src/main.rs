//! pasfront: front end for a small Pascal-like language

use anyhow::{Context, Result};
use clap::Parser;
use pasfront::config::{CompilerConfig, ReservedWords};
use pasfront::logger::{self, LogLevel};
use pasfront::{compile, Compilation};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;

/// Scan, parse and type-check a source file, writing the listing, token
/// trace, symbol dump and memory-offset table next to it.
#[derive(Parser, Debug)]
#[command(name = "pasfront")]
#[command(version, about, long_about = None)]
struct Args {
    /// Source file to compile
    #[arg(value_name = "FILE")]
    source: PathBuf,

    /// Reserved-word list, one word per line (built-in list if omitted)
    #[arg(long, value_name = "FILE")]
    reserved: Option<PathBuf>,

    /// Directory for the output files (defaults to the source's directory)
    #[arg(short, long, value_name = "DIR")]
    out_dir: Option<PathBuf>,

    /// More logging on stderr; repeat for more detail
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    logger::init_with_level(LogLevel::from_verbosity(args.verbose));

    let source = fs::read_to_string(&args.source)
        .with_context(|| format!("Failed to read: {}", args.source.display()))?;

    let config = match &args.reserved {
        Some(path) => CompilerConfig::new(ReservedWords::from_file(path)?),
        None => CompilerConfig::default(),
    };

    let result = compile(&source, &config);

    let out_dir = match &args.out_dir {
        Some(dir) => dir.clone(),
        None => args
            .source
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
    };
    let stem = args
        .source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("out");
    write_artifacts(&out_dir, stem, &result)?;

    for diagnostic in &result.diagnostics {
        eprintln!("line {}: {}", diagnostic.line, diagnostic);
    }
    info!(
        file = %args.source.display(),
        errors = result.diagnostics.len(),
        "compilation finished"
    );

    Ok(if result.is_clean() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn write_artifacts(dir: &Path, stem: &str, result: &Compilation) -> Result<()> {
    if !dir.as_os_str().is_empty() {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create: {}", dir.display()))?;
    }

    let outputs: [(&str, String); 4] = [
        ("listing", result.listing.to_text()),
        ("tokens", result.tokens.to_text()),
        ("symbols", result.symbol_dump().to_text()),
        ("offsets", result.memory_offsets().to_text()),
    ];

    for (extension, text) in outputs {
        let path = dir.join(format!("{}.{}", stem, extension));
        fs::write(&path, text).with_context(|| format!("Failed to write: {}", path.display()))?;
        info!(path = %path.display(), "wrote");
    }
    Ok(())
}
