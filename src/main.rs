//! Wishclip command-line tool.
//!
//! Runs the extraction engine over a saved page, outside any browser.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::error;

use wishclip::logging;
use wishclip::services::extraction::ExtractionEngine;
use wishclip::services::page_source::is_restricted_url;
use wishclip::services::settings_engine::{SettingsEngine, SettingsEngineTrait};

/// Wishclip CLI.
#[derive(Parser)]
#[command(name = "wishclip")]
#[command(about = "Capture product details from shopping pages")]
#[command(version)]
struct Cli {
    /// Settings file (defaults to the platform config path)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract title, image and price from a saved HTML page
    Extract {
        /// HTML file to read
        file: PathBuf,

        /// URL the page was loaded from
        #[arg(long)]
        url: String,
    },

    /// Report whether extraction would be skipped for a URL
    CheckUrl {
        url: String,
    },
}

fn main() -> ExitCode {
    logging::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Extract { file, url } => {
            let mut settings = SettingsEngine::new(cli.config.map(|p| p.to_string_lossy().to_string()));
            let settings = match settings.load() {
                Ok(s) => s,
                Err(e) => {
                    error!(error = %e, "failed to load settings");
                    return ExitCode::FAILURE;
                }
            };
            if is_restricted_url(&url) {
                error!(url = %url, "restricted page; nothing to extract");
                return ExitCode::FAILURE;
            }
            let html = match fs::read_to_string(&file) {
                Ok(html) => html,
                Err(e) => {
                    error!(error = %e, file = %file.display(), "failed to read page");
                    return ExitCode::FAILURE;
                }
            };

            let product = ExtractionEngine::new(&settings.extraction).extract_html(&url, &html);
            match serde_json::to_string_pretty(&product) {
                Ok(json) => {
                    println!("{}", json);
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    error!(error = %e, "failed to encode result");
                    ExitCode::FAILURE
                }
            }
        }
        Commands::CheckUrl { url } => {
            if is_restricted_url(&url) {
                println!("restricted: {}", url);
            } else {
                println!("allowed: {}", url);
            }
            ExitCode::SUCCESS
        }
    }
}
