//! HTTP server binary for the Pennywise gateway.

use std::io::{self, Write as _};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::process::ExitCode;

use clap::Parser;
use owo_colors::OwoColorize;
use pennywise::config::Config;
use pennywise::server::{self, AppState};
use tokio::net::TcpListener;

/// Pennywise — brokers Plaid Link, token exchange and transaction calls
/// for the web client.
#[derive(Debug, Parser)]
#[command(name = "pennywise", version, about)]
struct Cli {
    /// Address to bind.
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    host: IpAddr,
    /// Port to listen on.
    #[arg(long, short, default_value_t = 5000)]
    port: u16,
}

/// Prints `context: err` to stderr and returns a failure exit code.
fn report(context: &str, err: &dyn core::fmt::Display) -> io::Result<ExitCode> {
    writeln!(
        io::stderr().lock(),
        "{} {context}: {err}",
        "error:".red().bold()
    )?;
    Ok(ExitCode::FAILURE)
}

/// Runs the server, returning an appropriate exit code.
async fn run() -> io::Result<ExitCode> {
    let _dotenv = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = Config::from_env();
    if let Ok(loaded) = config.as_ref() {
        let missing = loaded.missing_credentials();
        if !missing.is_empty() {
            tracing::warn!(
                missing = ?missing,
                "Plaid credentials are not set; upstream calls will fail"
            );
        }
        tracing::info!(
            environment = %loaded.environment,
            redirect_uri = %loaded.redirect_uri,
            timeout = ?loaded.timeout,
            "Plaid configuration loaded"
        );
    }

    let state = AppState::from_config_result(config);
    if !state.is_ready() {
        tracing::warn!("no Plaid client; JSON routes will report the configuration error");
    }

    let addr = SocketAddr::new(cli.host, cli.port);
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => return report(&format!("failed to bind {addr}"), &err),
    };

    server::serve(listener, state).await?;
    Ok(ExitCode::SUCCESS)
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => {
            // stderr may itself be gone; nothing left to do then.
            let _ignored = writeln!(io::stderr(), "fatal I/O error: {err}");
            ExitCode::FAILURE
        }
    }
}
