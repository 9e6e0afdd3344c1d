//! Print the OpenAPI document as JSON, or write it to a file.
//!
//! # Examples
//! ```sh
//! cargo run --manifest-path backend/Cargo.toml --bin openapi-dump -- --output docs/openapi.json
//! ```
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::io::{self, Write as _};
use std::path::{Path, PathBuf};

use cap_std::{ambient_authority, fs::Dir};
use clap::Parser;
use color_eyre::eyre::{Context, Result, eyre};
use devcamper::doc::ApiDoc;
use utoipa::OpenApi;

/// `openapi-dump` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "openapi-dump",
    about = "Emit the DevCamper OpenAPI document",
    version
)]
struct CliArgs {
    /// Write to this file instead of standard output.
    #[arg(long, short, value_name = "path")]
    output: Option<PathBuf>,
    /// Emit compact JSON.
    #[arg(long)]
    compact: bool,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = CliArgs::parse();

    let doc = ApiDoc::openapi();
    let json = if args.compact {
        doc.to_json()
    } else {
        doc.to_pretty_json()
    }
    .wrap_err("serialise OpenAPI document")?;

    match args.output {
        Some(path) => write_file(&path, &json),
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{json}").wrap_err("write to stdout")
        }
    }
}

fn write_file(path: &Path, json: &str) -> Result<()> {
    let file_name = path
        .file_name()
        .ok_or_else(|| eyre!("output path {} has no file name", path.display()))?;
    let parent = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let dir = Dir::open_ambient_dir(parent, ambient_authority())
        .wrap_err_with(|| format!("open {}", parent.display()))?;
    dir.write(file_name, json)
        .wrap_err_with(|| format!("write {}", path.display()))
}
