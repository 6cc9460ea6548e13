//! Inspector CLI - debug backend and load-balancer probe.
//!
//! # Commands
//!
//! - `inspector serve [PORT]` - Run a request inspector backend (default port 8081)
//! - `inspector load` - Fire concurrent requests at a load balancer and tabulate backends
//! - `inspector config` - Print the effective configuration

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use inspector_config::{ConfigManager, Settings, Validate};
use inspector_loadtest::BackendTarget;
use std::net::IpAddr;
use std::path::PathBuf;

mod commands;
mod error;

use commands::{config, load, serve};
use error::{CliError, CliResult};

/// Request inspector and load-balancer probe
#[derive(Parser)]
#[command(name = "inspector")]
#[command(author = "Pegasus Heavy Industries LLC")]
#[command(version)]
#[command(about = "Debug HTTP backend that echoes what it receives, plus a load-balancer probe")]
#[command(propagate_version = true)]
#[command(after_help = format!(
    "{}\n  {} inspector serve 8082\n  {} inspector load -n 1000 -c 20\n  {} inspector load --backend \"Blue=9001\" --backend \"Green=9002\"",
    "Examples:".bright_cyan().bold(),
    "$".dimmed(),
    "$".dimmed(),
    "$".dimmed(),
))]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (.toml, .json or .env)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Diagnostic log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Diagnostic log format (compact, plain, pretty, json)
    #[arg(long, global = true)]
    log_format: Option<String>,

    /// Write diagnostic logs to this file instead of stderr
    #[arg(long, global = true, value_name = "FILE")]
    log_file: Option<String>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a request inspector backend
    #[command(alias = "s")]
    Serve(ServeArgs),

    /// Load-test a load balancer and report which backends answered
    #[command(alias = "l")]
    Load(LoadArgs),

    /// Print the effective configuration
    #[command(alias = "c")]
    Config(ConfigArgs),
}

#[derive(Args)]
struct ServeArgs {
    /// Port to listen on [default: 8081]
    port: Option<u16>,

    /// Address to bind [default: 0.0.0.0]
    #[arg(long)]
    host: Option<IpAddr>,

    /// Implementation name reported in X-Backend-Server
    #[arg(long)]
    name: Option<String>,

    /// Do not print request reports
    #[arg(short, long)]
    quiet: bool,

    /// Seconds to wait for a complete request, 0 to wait forever
    #[arg(long, value_name = "SECS")]
    read_timeout: Option<f64>,

    /// Largest accepted POST body in bytes
    #[arg(long, value_name = "BYTES")]
    max_body_bytes: Option<usize>,
}

impl ServeArgs {
    fn apply(&self, manager: &ConfigManager) -> CliResult<()> {
        if let Some(port) = self.port {
            manager.set("server.port", port)?;
        }
        if let Some(host) = self.host {
            manager.set("server.host", host)?;
        }
        if let Some(name) = &self.name {
            manager.set("server.backend_name", name)?;
        }
        if self.quiet {
            manager.set("server.quiet", true)?;
        }
        if let Some(secs) = self.read_timeout {
            manager.set("server.read_timeout_secs", secs)?;
        }
        if let Some(bytes) = self.max_body_bytes {
            manager.set("server.max_body_bytes", bytes)?;
        }
        Ok(())
    }
}

#[derive(Args)]
struct LoadArgs {
    /// Load balancer URL [default: http://127.0.0.1:3000/]
    #[arg(long)]
    url: Option<String>,

    /// Total number of requests [default: 1000]
    #[arg(short = 'n', long)]
    requests: Option<u64>,

    /// Number of concurrent workers [default: 20]
    #[arg(short, long)]
    concurrency: Option<usize>,

    /// Per-request timeout in seconds [default: 10]
    #[arg(long, value_name = "SECS")]
    timeout: Option<f64>,

    /// Backend to look for, repeatable; replaces the default three
    #[arg(long = "backend", value_name = "LABEL=MARKER")]
    backends: Vec<BackendTarget>,

    /// Open a new connection for every request
    #[arg(long)]
    no_keep_alive: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

impl LoadArgs {
    fn apply(&self, manager: &ConfigManager) -> CliResult<()> {
        if let Some(url) = &self.url {
            manager.set("loadtest.url", url)?;
        }
        if let Some(requests) = self.requests {
            manager.set("loadtest.requests", requests)?;
        }
        if let Some(concurrency) = self.concurrency {
            manager.set("loadtest.concurrency", concurrency)?;
        }
        if let Some(secs) = self.timeout {
            manager.set("loadtest.timeout_secs", secs)?;
        }
        if !self.backends.is_empty() {
            manager.set("loadtest.backends", &self.backends)?;
        }
        if self.no_keep_alive {
            manager.set("loadtest.keep_alive", false)?;
        }
        Ok(())
    }
}

#[derive(Args)]
struct ConfigArgs {
    /// Print as JSON instead of TOML
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn apply(&self, manager: &ConfigManager) -> CliResult<()> {
        if let Some(level) = &self.log_level {
            manager.set("log.level", level)?;
        }
        if let Some(format) = &self.log_format {
            manager.set("log.format", format)?;
        }
        if let Some(file) = &self.log_file {
            manager.set("log.file", file)?;
        }
        Ok(())
    }
}

// =============================================================================
// OUTPUT
// =============================================================================

fn warn(msg: &str) {
    eprintln!("  {} {}", "⚠".yellow().bold(), msg.yellow());
}

async fn run(cli: Cli) -> CliResult<()> {
    let manager = ConfigManager::layered(cli.config.as_deref())?;
    cli.apply(&manager)?;

    match &cli.command {
        Commands::Serve(args) => args.apply(&manager)?,
        Commands::Load(args) => args.apply(&manager)?,
        Commands::Config(_) => {}
    }

    let settings: Settings = manager.build()?;
    settings.log.validate()?;
    let colors = !cli.no_color && settings.log.file.is_none();

    match cli.command {
        Commands::Serve(_) => {
            settings.server.validate()?;
            let _guard = settings.log.log_config()?.with_colors(colors).init()?;
            serve::run(settings.server).await
        }

        Commands::Load(args) => {
            settings.loadtest.validate()?;
            let _guard = settings.log.log_config()?.with_colors(colors).init()?;
            load::run(settings.loadtest, args.json).await
        }

        Commands::Config(args) => {
            if let Err(e) = settings.validate() {
                warn(&e.to_string());
            }
            println!("{}", config::show(&settings, args.json)?);
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    if let Err(e) = run(cli).await {
        eprintln!("\n  {} {}\n", "Error:".red().bold(), e);
        std::process::exit(1);
    };
}
