// crates/greeter-cli/src/main.rs
// ============================================================================
// Module: Greeter CLI Entry Point
// Description: Command dispatcher for the greeter server and client.
// Purpose: Serve the greeter, validate its config, and issue greet calls.
// Dependencies: clap, greeter-config, greeter-service, thiserror, tokio, tokio-util
// ============================================================================

//! ## Overview
//! `greeter serve` runs the JSON-RPC server until Ctrl-C, `greeter config
//! validate` prints config diagnostics, and `greeter greet` performs a single
//! call against a running server. Every failure becomes one stderr line and
//! a non-zero exit code.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use greeter_config::Diagnostics;
use greeter_service::GreetRequest;
use greeter_service::GreeterClient;
use greeter_service::GreeterServer;
use greeter_service::HelloWorldService;
use greeter_service::StderrAuditSink;
use greeter_service::client::DEFAULT_TIMEOUT;
use greeter_service::server::bind;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "greeter", version, disable_help_subcommand = true)]
struct Cli {
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the greeter server.
    Serve(ServeCommand),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Send one greeting to a running server.
    Greet(GreetCommand),
}

/// Configuration for the `serve` command.
#[derive(Args, Debug)]
struct ServeCommand {
    /// Optional config file path (defaults to greeter.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Listening address overriding the config file (`host:port`).
    #[arg(long, value_name = "ADDR")]
    listen: Option<String>,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate a greeter configuration file.
    Validate(ConfigValidateCommand),
}

/// Configuration for the `config validate` command.
#[derive(Args, Debug)]
struct ConfigValidateCommand {
    /// Optional config file path (defaults to greeter.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Configuration for the `greet` command.
#[derive(Args, Debug)]
struct GreetCommand {
    /// Server base URL, for example `http://127.0.0.1:8080`.
    #[arg(long, value_name = "URL")]
    server: String,
    /// Name to greet.
    #[arg(long)]
    name: String,
    /// Request timeout in milliseconds.
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error carrying the line printed to stderr.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run(Cli::parse()).await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run(cli: Cli) -> CliResult<ExitCode> {
    match cli.command {
        Commands::Serve(command) => command_serve(command).await,
        Commands::Config {
            command: ConfigCommand::Validate(command),
        } => command_config_validate(&command),
        Commands::Greet(command) => command_greet(command).await,
    }
}

// ============================================================================
// SECTION: Serve Command
// ============================================================================

/// Executes the `serve` command.
async fn command_serve(command: ServeCommand) -> CliResult<ExitCode> {
    let addr = resolve_listen_address(command.listen, command.config)?;
    let listener = bind(&addr).await.map_err(|err| CliError::new(err.to_string()))?;
    let local = listener
        .local_addr()
        .map_err(|err| CliError::new(format!("failed to read bound address: {err}")))?;
    write_stderr_line(&format!("greeter listening on {local}"))
        .map_err(|err| CliError::new(output_error("stderr", &err)))?;

    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal.cancel();
        }
    });

    GreeterServer::new(HelloWorldService)
        .with_audit(Arc::new(StderrAuditSink))
        .serve(listener, shutdown)
        .await
        .map_err(|err| CliError::new(err.to_string()))?;
    Ok(ExitCode::SUCCESS)
}

/// Picks the listening address: `--listen` wins, otherwise the config file.
fn resolve_listen_address(listen: Option<String>, config: Option<PathBuf>) -> CliResult<String> {
    if let Some(listen) = listen {
        return Ok(listen);
    }
    let config = greeter_config::load(config.as_deref())
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))?;
    Ok(config.listening_address)
}

// ============================================================================
// SECTION: Config Command
// ============================================================================

/// Executes the config validation command.
fn command_config_validate(command: &ConfigValidateCommand) -> CliResult<ExitCode> {
    let (valid, lines) = validate_config(command.config.clone())?;
    for line in &lines {
        write_stdout_line(line).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    }
    Ok(if valid { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

/// Parses the resolved config file and renders its findings.
///
/// Returns whether the file is free of errors along with the output lines.
fn validate_config(path: Option<PathBuf>) -> CliResult<(bool, Vec<String>)> {
    let resolved = greeter_config::resolve_path(path.as_deref())
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))?;
    let bytes = greeter_config::read(&resolved)
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))?;
    let (config, diagnostics) = greeter_config::parse(&resolved, &bytes);
    let mut lines = diagnostic_lines(&diagnostics);
    if config.is_some() {
        lines.push(format!("config ok: {}", resolved.display()));
    }
    Ok((config.is_some(), lines))
}

/// Renders one line per diagnostic.
fn diagnostic_lines(diagnostics: &Diagnostics) -> Vec<String> {
    diagnostics.as_slice().iter().map(ToString::to_string).collect()
}

// ============================================================================
// SECTION: Greet Command
// ============================================================================

/// Executes the `greet` command.
async fn command_greet(command: GreetCommand) -> CliResult<ExitCode> {
    let timeout = command.timeout_ms.map_or(DEFAULT_TIMEOUT, Duration::from_millis);
    let client = GreeterClient::new(&command.server, timeout)
        .map_err(|err| CliError::new(format!("greet failed: {err}")))?;
    let request = GreetRequest {
        name: command.name,
    };
    let response =
        client.greet(&request).await.map_err(|err| CliError::new(format!("greet failed: {err}")))?;
    write_stdout_line(&response.message)
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Output
// ============================================================================

/// Writes a line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write to {stream}: {error}")
}

/// Emits an error line and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
