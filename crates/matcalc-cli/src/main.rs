mod config;

use std::io::{Read, Write};
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use matcalc_core::Operation;
use matcalc_web::{ApiOptions, ServerSettings};

use crate::config::Config;

#[derive(Parser)]
#[command(
    name = "matcalc",
    version,
    about = "Matrix calculator - arithmetic and property checks over HTTP"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server (page at `/`, API at `POST /calculate`)
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (default: $PORT, then config, then 5000)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Evaluate one request body and print the response
    Calc {
        /// Read the request from a file instead of stdin
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// List supported operation codes
    Ops,

    /// Show active configuration
    Config,
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config()?;
    debug!("config: {}", config::show_config_path());

    match cli.command {
        Commands::Serve { host, port } => cmd_serve(&cfg, host, port)?,
        Commands::Calc { file } => {
            let succeeded = cmd_calc(&cfg.api.options(), file, &mut std::io::stdout().lock())?;
            if !succeeded {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Ops => cmd_ops()?,
        Commands::Config => cmd_config(&cfg)?,
    }
    Ok(ExitCode::SUCCESS)
}

/// `RUST_LOG` directives, falling back to `info` when unset or empty.
fn log_filter(directives: Option<&str>) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .parse_lossy(directives.unwrap_or_default())
}

fn cmd_serve(cfg: &Config, host: Option<String>, port: Option<u16>) -> Result<()> {
    let env_port = std::env::var("PORT").ok();
    let port = config::resolve_port(port, env_port.as_deref(), &cfg.server)?;
    let host = host.unwrap_or_else(|| cfg.server.host.clone());
    let ip: IpAddr = host
        .parse()
        .with_context(|| format!("invalid host address: {host}"))?;

    matcalc_web::run_server(ServerSettings {
        addr: SocketAddr::new(ip, port),
        cors: cfg.server.cors,
        api: cfg.api.options(),
    })
}

/// Evaluate one request and write the response envelope to `out`.
/// Returns whether the calculation succeeded.
fn cmd_calc(options: &ApiOptions, file: Option<PathBuf>, out: &mut impl Write) -> Result<bool> {
    let body = read_request(file.as_deref())?;
    let response = matcalc_web::calculate(&body, options);
    writeln!(out, "{}", serde_json::to_string_pretty(&response)?)?;
    Ok(response.success)
}

fn read_request(file: Option<&Path>) -> Result<Vec<u8>> {
    match file {
        Some(path) => std::fs::read(path).with_context(|| format!("reading {}", path.display())),
        None => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("reading stdin")?;
            Ok(buf)
        }
    }
}

fn cmd_ops() -> Result<()> {
    println!("{:<6} {:<7} {:<10} DESCRIPTION", "CODE", "ARITY", "PARAMETER");
    for op in Operation::ALL {
        let param = op.parameter().map(|p| p.field()).unwrap_or("-");
        println!(
            "{:<6} {:<7} {:<10} {}",
            op.code(),
            op.arity(),
            param,
            op.description()
        );
    }
    Ok(())
}

fn cmd_config(cfg: &Config) -> Result<()> {
    println!("Config: {}", config::show_config_path());
    println!();
    println!("[server]");
    println!("  host:              {}", cfg.server.host);
    match cfg.server.port {
        Some(port) => println!("  port:              {port}"),
        None => println!("  port:              ($PORT or {})", config::DEFAULT_PORT),
    }
    println!("  cors:              {}", cfg.server.cors);
    println!("[api]");
    println!("  native_scalars:    {}", cfg.api.native_scalars);
    println!("  strict_operations: {}", cfg.api.strict_operations);
    println!("  rtol:              {:e}", cfg.api.rtol);
    println!("  atol:              {:e}", cfg.api.atol);
    Ok(())
}
