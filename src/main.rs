//! spendview entry point
//!
//! Reads the exported files, assembles the report data and writes it as JSON
//! for the renderer.

use anyhow::{bail, Context, Result};
use clap::Parser;
use spendview_config::Config;
use spendview_core::{ReportAssembler, ReportData};
use spendview_parser::RowSource;
use std::path::{Path, PathBuf};
use tokio::runtime::Runtime;

const DEFAULT_CONFIG: &str = "config.yaml";

#[derive(Parser, Debug)]
#[command(name = "spendview")]
#[command(version = "0.1.0")]
#[command(about = "Summarizes exported personal transactions into report data", long_about = None)]
struct Args {
    /// Configuration file path (defaults to ./config.yaml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory with the exported files, overrides input.path
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Report data destination, overrides output.path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the default configuration and exit
    #[arg(long)]
    print_default_config: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.print_default_config {
        print!("{}", Config::generate_default());
        return Ok(());
    }

    let mut config = load_config(args.config.as_deref())?;
    if let Some(input) = args.input {
        config.input.path = input;
    }
    if let Some(output) = args.output {
        config.output.path = output;
    }

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();

    let rt = Runtime::new()?;
    rt.block_on(run(config))
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let result = match path {
        Some(path) => Config::load(path.to_path_buf()),
        None if Path::new(DEFAULT_CONFIG).exists() => Config::load(PathBuf::from(DEFAULT_CONFIG)),
        None => return Ok(Config::default()),
    };

    result.map_err(|e| anyhow::anyhow!("{}", e.to_details()))
}

async fn run(config: Config) -> Result<()> {
    let assembler = ReportAssembler::new(&config)
        .map_err(|e| anyhow::anyhow!("{}", e.to_details()))?;

    let files = input_files(&config)?;
    log::info!("Found {} input file(s) in {}", files.len(), config.input.path.display());

    let mut sources = Vec::with_capacity(files.len());
    for file in &files {
        sources.push(read_source(file).await?);
    }

    let report = assembler.assemble(&sources);
    for rejection in report.rejections() {
        log::warn!(
            "Skipped row {} of {} [{}]: {}",
            rejection.row,
            rejection.source,
            rejection.reason.code(),
            rejection.reason
        );
    }

    write_report(&config.output.path, &report).await?;
    log::info!(
        "Wrote {} transactions over {} months to {}",
        report.transactions().len(),
        report.balance_series().len(),
        config.output.path.display()
    );

    Ok(())
}

/// Matching files, sorted by path so runs are reproducible
fn input_files(config: &Config) -> Result<Vec<PathBuf>> {
    let pattern = config.input_glob();
    let pattern = pattern.to_string_lossy();

    let mut files: Vec<PathBuf> = glob::glob(&pattern)
        .with_context(|| format!("invalid input pattern {}", pattern))?
        .filter_map(|entry| match entry {
            Ok(path) if path.is_file() => Some(path),
            Ok(_) => None,
            Err(e) => {
                log::warn!("Cannot read {}: {}", e.path().display(), e);
                None
            }
        })
        .collect();
    files.sort();

    if files.is_empty() {
        log::warn!("No files match {}", pattern);
    }

    Ok(files)
}

async fn read_source(path: &Path) -> Result<RowSource> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    let text = decode(&bytes).with_context(|| format!("decoding {}", path.display()))?;

    let id = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    RowSource::from_delimited(id.as_str(), &text)
        .with_context(|| format!("{} is not a transaction export", path.display()))
}

/// Exports come as UTF-16 with a byte order mark or as plain UTF-8
fn decode(bytes: &[u8]) -> Result<String> {
    let utf16 = |rest: &[u8], from: fn([u8; 2]) -> u16| -> Result<String> {
        if rest.len() % 2 != 0 {
            bail!("odd number of bytes in UTF-16 input");
        }
        let units: Vec<u16> = rest.chunks_exact(2).map(|c| from([c[0], c[1]])).collect();
        Ok(String::from_utf16(&units)?)
    };

    match bytes {
        [0xFF, 0xFE, rest @ ..] => utf16(rest, u16::from_le_bytes),
        [0xFE, 0xFF, rest @ ..] => utf16(rest, u16::from_be_bytes),
        _ => Ok(String::from_utf8(bytes.to_vec())?),
    }
}

async fn write_report(path: &Path, report: &ReportData) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("creating {}", parent.display()))?;
    }

    let json = serde_json::to_string_pretty(report)?;
    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
