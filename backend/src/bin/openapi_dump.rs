//! Print or write the OpenAPI document as JSON.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;
use marketplace::ApiDoc;
use utoipa::OpenApi;

/// `openapi-dump` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "openapi-dump",
    about = "Export the marketplace OpenAPI document",
    version
)]
struct CliArgs {
    /// Write to this file instead of standard output.
    #[arg(long, value_name = "path")]
    output: Option<PathBuf>,
    /// Emit compact JSON.
    #[arg(long)]
    compact: bool,
}

fn main() -> io::Result<()> {
    let args = CliArgs::parse();
    let doc = ApiDoc::openapi();
    let json = if args.compact {
        doc.to_json()
    } else {
        doc.to_pretty_json()
    }
    .map_err(io::Error::other)?;

    match args.output {
        Some(path) => std::fs::write(path, format!("{json}\n")),
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{json}")
        }
    }
}
