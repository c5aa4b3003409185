use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand};
use xferprims_copy::StrategyKind;

use crate::exit::{CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod doctor;
pub mod fetch;
pub mod serve;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve one file to every client that connects.
    Serve(ServeArgs),
    /// Receive one file from a server.
    Fetch(FetchArgs),
    /// Show version information.
    Version(VersionArgs),
    /// Run local environment health checks.
    Doctor(DoctorArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Serve(args) => serve::run(args, format),
        Command::Fetch(args) => fetch::run(args, format),
        Command::Version(args) => version::run(args),
        Command::Doctor(args) => doctor::run(args, format),
    }
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to listen on (host:port; port 0 picks a free port).
    pub addr: String,
    /// File to serve.
    pub file: PathBuf,
    /// Payload copy strategy (auto, buffered, chunked, zero-copy).
    #[arg(long, default_value = "auto", env = "XFERPRIMS_STRATEGY")]
    pub strategy: StrategyKind,
    /// Per-read deadline on each connection (e.g. 5s, 500ms).
    #[arg(long, value_name = "DURATION", env = "XFERPRIMS_READ_TIMEOUT")]
    pub read_timeout: Option<String>,
    /// Per-write deadline on each connection (e.g. 30s).
    #[arg(long, value_name = "DURATION", env = "XFERPRIMS_WRITE_TIMEOUT")]
    pub write_timeout: Option<String>,
    /// Exit after accepting N connections.
    #[arg(long, value_name = "N")]
    pub max_transfers: Option<u64>,
}

#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Server address (host:port).
    pub addr: String,
    /// Destination file; created or truncated.
    pub dest: PathBuf,
    /// Write to <DEST>.part and rename into place only on success.
    #[arg(long)]
    pub atomic: bool,
    /// Per-read deadline while receiving (e.g. 5s, 500ms).
    #[arg(long, value_name = "DURATION", env = "XFERPRIMS_READ_TIMEOUT")]
    pub read_timeout: Option<String>,
    /// Bound on establishing the connection.
    #[arg(long, value_name = "DURATION", default_value = "10s")]
    pub connect_timeout: String,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

#[derive(Args, Debug, Default)]
pub struct DoctorArgs {}

/// Parse `500ms`, `5s` or bare seconds. Zero is rejected.
pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .trim()
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        _ => Ok(Duration::from_secs(value)),
    }
}

pub fn parse_optional_duration(input: Option<&str>) -> CliResult<Option<Duration>> {
    input.map(parse_duration).transpose()
}
