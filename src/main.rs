//! Nexa Studio - solution diagrams to SoW and LoE documents.
//!
//! Runs the HTTP API, or renders exported session documents to HTML and
//! PDF from the command line.

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use nexa_studio::core::Config;
use nexa_studio::pdf::{converter_from_config, render_document_html, Branding};
use nexa_studio::{server, AppState, ArtifactKind};

/// Solution diagrams to Statement of Work and Level of Effort documents
#[derive(Parser)]
#[command(name = "nexa")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API
    Serve {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (overrides config and PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Render a session document to PDF
    Render {
        /// Document kind (solutioning, sow, loe)
        kind: ArtifactKind,

        /// JSON document to render
        input: PathBuf,

        /// Output PDF file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Render a session document to HTML on stdout
    Html {
        /// Document kind (solutioning, sow, loe)
        kind: ArtifactKind,

        /// JSON document to render
        input: PathBuf,
    },

    /// Show configuration
    Config {
        /// Show config file path
        #[arg(long)]
        path: bool,

        /// Write the default configuration to the user config file
        #[arg(long, conflicts_with = "path")]
        init: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Secrets usually live in .env during development
    dotenvy::dotenv().ok();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::registry().with(fmt::layer().with_target(false)).with(filter).init();

    match cli.command {
        Commands::Serve { host, port } => cmd_serve(host, port)?,
        Commands::Render { kind, input, output } => cmd_render(kind, &input, &output)?,
        Commands::Html { kind, input } => cmd_html(kind, &input)?,
        Commands::Config { path, init } => cmd_config(path, init)?,
        Commands::Completions { shell } => cmd_completions(shell),
    }

    Ok(())
}

/// Run the API until Ctrl-C.
fn cmd_serve(host: Option<String>, port: Option<u16>) -> Result<()> {
    let mut config = Config::load()?;
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let addr = config
        .server
        .socket_addr()
        .with_context(|| format!("Invalid listen address {}:{}", config.server.host, config.server.port))?;
    let state = AppState::from_config(&config)?;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(server::serve(state, addr, &config.server.cors_origins))
}

fn read_document(input: &Path) -> Result<serde_json::Value> {
    let content = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    serde_json::from_str(&content).with_context(|| format!("{} is not valid JSON", input.display()))
}

fn render_html(config: &Config, kind: ArtifactKind, input: &Path) -> Result<String> {
    let document = read_document(input)?;
    let branding = Branding::from_config(&config.branding);
    Ok(render_document_html(kind, document, &branding)?)
}

/// Render a document through the configured PDF converter.
fn cmd_render(kind: ArtifactKind, input: &Path, output: &Path) -> Result<()> {
    let config = Config::load()?;
    let html = render_html(&config, kind, input)?;
    let converter = converter_from_config(&config.pdf)?;

    let rt = tokio::runtime::Runtime::new()?;
    let bytes = rt.block_on(converter.convert(&html))?;

    std::fs::write(output, &bytes).with_context(|| format!("Failed to write {}", output.display()))?;
    println!("Wrote {} ({} bytes) using {}", output.display(), bytes.len(), converter.name());
    Ok(())
}

fn cmd_html(kind: ArtifactKind, input: &Path) -> Result<()> {
    let config = Config::load()?;
    println!("{}", render_html(&config, kind, input)?);
    Ok(())
}

/// Show the effective configuration, or where it is read from.
fn cmd_config(show_path: bool, init: bool) -> Result<()> {
    if init {
        let path = Config::default().save()?;
        println!("Wrote default configuration to {}", path.display());
        return Ok(());
    }

    if show_path {
        match Config::locate() {
            Some(path) => println!("{}", path.display()),
            None => {
                if let Some(dir) = Config::config_dir() {
                    println!("{} (not created)", dir.join("config.toml").display());
                }
            }
        }
        return Ok(());
    }

    let config = Config::load()?;
    let toml = toml::to_string_pretty(&config)?;
    println!("{toml}");
    Ok(())
}

fn cmd_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, nexa_studio::BIN_NAME, &mut io::stdout());
}
