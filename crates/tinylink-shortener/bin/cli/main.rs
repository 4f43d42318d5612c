mod cli;

use crate::cli::{Command, LogFormatArg, CLI};
use anyhow::Context;
use clap::Parser;
use std::process::ExitCode;
use tinylink_shortener::UrlShortener;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<ExitCode> {
    let config = CLI::parse();

    init_tracing(config.log_format);

    info!(
        storage_path = %config.storage_path.display(),
        log_format = %config.log_format,
        "starting tinylink"
    );

    let mut shortener = UrlShortener::open(&config.storage_path).with_context(|| {
        format!(
            "failed to open url store at {}",
            config.storage_path.display()
        )
    })?;

    info!(
        storage_path = %shortener.repository().path().display(),
        "opened url store"
    );

    match config.command {
        Command::Shorten { url, custom } => {
            let code = shortener
                .create_short_code(&url, custom.as_deref())
                .with_context(|| format!("failed to shorten {url}"))?;
            println!("Shortened URL code: {code}");
        }
        Command::Resolve { code } => match shortener.get_original_url(&code) {
            Some(url) => println!("Original URL: {url}"),
            None => {
                eprintln!("No URL stored for code: {code}");
                return Ok(ExitCode::FAILURE);
            }
        },
    }

    Ok(ExitCode::SUCCESS)
}

fn init_tracing(format: LogFormatArg) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match format {
        LogFormatArg::Text => builder.init(),
        LogFormatArg::Json => builder.json().init(),
    }
}
