// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! `dns01` - drive a DNS-01 provider from the command line.
//!
//! ```text
//! dns01 providers
//! dns01 template linode
//! dns01 present --provider godaddy --config godaddy.yaml --domain example.com \
//!     --token T --key-auth K
//! dns01 hold --provider linode --domain example.com --token T --key-auth K
//! ```
//!
//! Without `--config` the provider is configured from its environment
//! variables (`<PROVIDER>_<FIELD>`).

use std::fmt::Write as _;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use dns01_providers::config::EnvSnapshot;
use dns01_providers::duration::{format_duration, parse_duration};
use dns01_providers::provider::ChallengeProvider;
use dns01_providers::registry::{BoxedProvider, Registry};
use tracing::{debug, info, warn};

/// Publish and remove ACME DNS-01 challenge records through a DNS provider
#[derive(Parser, Debug)]
#[command(name = "dns01", author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List registered providers and their aliases
    Providers,

    /// Print the configuration template of a provider
    Template {
        /// Provider name or alias
        name: String,
    },

    /// Publish the challenge record
    Present(ChallengeArgs),

    /// Remove the challenge record (delete-by-value providers only)
    Cleanup(ChallengeArgs),

    /// Publish the record, wait for a signal or the hold time, then remove it
    Hold {
        #[command(flatten)]
        challenge: ChallengeArgs,

        /// Remove the record after this long instead of waiting for a signal
        #[arg(long, value_parser = parse_hold)]
        hold: Option<Duration>,
    },
}

#[derive(Args, Debug, Clone)]
struct ChallengeArgs {
    /// Provider name or alias
    #[arg(short, long)]
    provider: String,

    /// YAML or JSON configuration document; the environment is used when absent
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Domain being validated
    #[arg(long)]
    domain: String,

    /// ACME challenge token
    #[arg(long)]
    token: String,

    /// ACME key authorization
    #[arg(long)]
    key_auth: String,
}

fn parse_hold(raw: &str) -> Result<Duration, String> {
    parse_duration(raw).map_err(|e| format!("{e:#}"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .thread_name("dns01")
        .enable_all()
        .build()?;

    runtime.block_on(async_main(cli))
}

async fn async_main(cli: Cli) -> Result<()> {
    // Logs go to stderr so `template` and `providers` output stays clean.
    //
    // Respects RUST_LOG (default: warn) and RUST_LOG_FORMAT (text|json).
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_file(true)
                .with_line_number(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_file(true)
                .with_line_number(true)
                .with_target(false)
                .compact()
                .init();
        }
    }

    debug!(command = ?cli.command, "Logging initialized");

    let registry = Registry::builtin();

    match cli.command {
        Command::Providers => print!("{}", render_providers(registry)),
        Command::Template { name } => print!("{}", registry.template(&name)?),
        Command::Present(args) => {
            let provider = load_provider(registry, &args).await?;
            present(provider.as_ref(), &args).await?;
        }
        Command::Cleanup(args) => {
            let provider = load_provider(registry, &args).await?;
            provider
                .cleanup(&args.domain, &args.token, &args.key_auth)
                .await?;
            info!(
                provider = provider.name(),
                domain = %args.domain,
                "Challenge record removed"
            );
        }
        Command::Hold { challenge, hold } => {
            let provider = load_provider(registry, &challenge).await?;
            present(provider.as_ref(), &challenge).await?;

            match hold {
                Some(hold) => tokio::time::sleep(hold).await,
                None => wait_for_shutdown_signal().await?,
            }

            provider
                .cleanup(&challenge.domain, &challenge.token, &challenge.key_auth)
                .await?;
            info!(
                provider = provider.name(),
                domain = %challenge.domain,
                "Challenge record removed"
            );
        }
    }

    Ok(())
}

/// One line per provider: `name [aliases]`.
fn render_providers(registry: &Registry) -> String {
    registry
        .descriptors()
        .iter()
        .map(|d| {
            if d.aliases.is_empty() {
                format!("{}\n", d.name)
            } else {
                format!("{} (aliases: {})\n", d.name, d.aliases.join(", "))
            }
        })
        .collect()
}

/// Build the provider from `--config` when given, otherwise from the environment.
async fn load_provider(registry: &Registry, args: &ChallengeArgs) -> Result<BoxedProvider> {
    let provider = match &args.config {
        Some(path) => {
            let raw = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read configuration {}", path.display()))?;
            registry.lookup(&args.provider, &raw)?
        }
        None => registry.lookup_from_env(&args.provider, &EnvSnapshot::from_process())?,
    };
    Ok(provider)
}

/// Present the challenge and report the propagation settings on stdout.
async fn present(provider: &dyn ChallengeProvider, args: &ChallengeArgs) -> Result<()> {
    provider
        .present(&args.domain, &args.token, &args.key_auth)
        .await?;
    info!(
        provider = provider.name(),
        domain = %args.domain,
        "Challenge record published"
    );
    print!("{}", render_timing(provider));
    Ok(())
}

/// `timeout`, `interval` and, when the provider has it, `sequential`.
fn render_timing(provider: &dyn ChallengeProvider) -> String {
    let (timeout, interval) = provider.timeout();
    let mut out = format!(
        "timeout={}\ninterval={}\n",
        format_duration(timeout),
        format_duration(interval)
    );
    if let Some(sequential) = provider.as_sequential() {
        let _ = writeln!(out, "sequential={}", format_duration(sequential.sequential()));
    }
    out
}

/// Wait for SIGINT or, on Unix, SIGTERM.
async fn wait_for_shutdown_signal() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate())?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => result?,
            _ = sigterm.recv() => warn!("Received SIGTERM, removing challenge record"),
        }
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
    }
    Ok(())
}
