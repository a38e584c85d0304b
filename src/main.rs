use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Decode an EU Digital COVID Certificate QR payload.
///
/// Reads the payload text extracted from the QR code and prints the decoded
/// certificate as JSON. The envelope signature is not verified.
#[derive(Parser)]
#[command(name = "hcertdec", version)]
struct Cli {
    /// File holding the QR payload text, or `-` to read standard input
    input: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let data = read_input(&cli.input)
        .with_context(|| format!("can't read {}", cli.input.display()))?;

    let payload = hcertdec::decode(&data)?;
    println!("{}", serde_json::to_string_pretty(&payload)?);

    Ok(())
}

fn read_input(path: &Path) -> io::Result<String> {
    if path.as_os_str() == "-" {
        let mut data = String::new();
        io::stdin().read_to_string(&mut data)?;
        Ok(data)
    } else {
        fs::read_to_string(path)
    }
}
