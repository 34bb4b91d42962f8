// Copyright 2026 Autoapply Contributors
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use autoapply_runtime::cli;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "autoapply",
    about = "autoapply: browser-driven job application runner",
    version,
    after_help = "Run 'autoapply <command> --help' for details on each command."
)]
struct Cli {
    /// Output results as JSON (machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Suppress non-essential output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Enable verbose/debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Configuration file (default: $AUTOAPPLY_CONFIG, ./autoapply.json, ~/.autoapply/config.json)
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the HTTP API
    Serve {
        /// Port to listen on
        #[arg(long, default_value = "8000")]
        port: u16,
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },
    /// Log job board listings matching keywords for manual review
    Scrape {
        /// Comma-separated keywords
        keywords: String,
    },
    /// Run an automated application pass
    Apply {
        #[command(subcommand)]
        target: ApplyTarget,
    },
    /// Follow an intermediate listing URL to the provider's application form
    Resolve {
        /// Listing URL
        url: String,
    },
    /// Check environment and diagnose issues
    Doctor,
    /// Generate shell completion scripts
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum ApplyTarget {
    /// LinkedIn Easy Apply on recent postings
    Linkedin {
        /// Comma-separated keywords
        keywords: String,
    },
    /// Tracker listings resolved to provider forms
    Greenhouse {
        /// Comma-separated keywords (empty applies to every listing)
        #[arg(default_value = "")]
        keywords: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    cli::output::init(cli.json, cli.quiet, cli.no_color);
    cli::init_tracing(cli.verbose, cli.json);

    let config_path = cli.config.as_deref();
    let result = match cli.command {
        Commands::Serve { port, host } => match cli::load_config(config_path) {
            Ok(config) => cli::serve::run(config, &host, port).await,
            Err(e) => Err(e),
        },
        Commands::Scrape { keywords } => match cli::load_config(config_path) {
            Ok(config) => cli::scrape_cmd::run(config, &keywords).await,
            Err(e) => Err(e),
        },
        Commands::Apply { target } => match cli::load_config(config_path) {
            Ok(config) => match target {
                ApplyTarget::Linkedin { keywords } => {
                    cli::apply_cmd::run_linkedin(config, &keywords).await
                }
                ApplyTarget::Greenhouse { keywords } => {
                    cli::apply_cmd::run_greenhouse(config, &keywords).await
                }
            },
            Err(e) => Err(e),
        },
        Commands::Resolve { url } => match cli::load_config(config_path) {
            Ok(config) => cli::resolve_cmd::run(config, &url).await,
            Err(e) => Err(e),
        },
        Commands::Doctor => cli::doctor::run(config_path).await,
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "autoapply", &mut std::io::stdout());
            Ok(())
        }
    };

    // Consistent exit codes: 0=success, 1=error
    if let Err(e) = &result {
        if cli::output::is_json() {
            cli::output::print_json(&serde_json::json!({
                "error": true,
                "message": format!("{e:#}"),
            }));
        } else if !cli::output::is_quiet() {
            eprintln!("  Error: {e:#}");
        }
        std::process::exit(1);
    }

    result
}
