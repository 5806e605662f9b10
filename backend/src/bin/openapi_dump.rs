//! Print the OpenAPI document.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::io::{self, Write};

use clap::{Parser, ValueEnum};
use color_eyre::eyre::{Result, WrapErr};
use eventhub::ApiDoc;
use utoipa::OpenApi;

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum Format {
    #[default]
    Json,
    Yaml,
}

/// `openapi-dump` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "openapi-dump",
    about = "Print the eventhub OpenAPI document",
    version
)]
struct CliArgs {
    /// Output format.
    #[arg(long, value_enum, default_value_t = Format::Json)]
    format: Format,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = CliArgs::parse();
    let doc = ApiDoc::openapi();
    let rendered = match args.format {
        Format::Json => doc
            .to_pretty_json()
            .wrap_err("render OpenAPI document as JSON")?,
        Format::Yaml => doc.to_yaml().wrap_err("render OpenAPI document as YAML")?,
    };
    writeln!(io::stdout().lock(), "{rendered}").wrap_err("write OpenAPI document")?;
    Ok(())
}
