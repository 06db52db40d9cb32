use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use utoipa::OpenApi;

use saboteur::api::openapi::ApiDoc;

/// Write the agent's OpenAPI document
#[derive(Parser, Debug)]
struct Args {
    /// Destination file, `-` for stdout
    #[arg(short, long, default_value = "openapi.json")]
    output: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let json = ApiDoc::openapi()
        .to_pretty_json()
        .context("Failed to serialize the OpenAPI document")?;

    if args.output.as_os_str() == "-" {
        println!("{}", json);
    } else {
        std::fs::write(&args.output, json)
            .with_context(|| format!("Failed to write {}", args.output.display()))?;
        eprintln!("Wrote {}", args.output.display());
    }
    Ok(())
}
