mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "xferprims", version, about = "Single-file TCP transfer CLI")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr). RUST_LOG, when set, takes precedence.
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use xferprims_copy::StrategyKind;

    use super::*;

    #[test]
    fn parses_serve_subcommand() {
        let cli = Cli::try_parse_from([
            "xferprims",
            "serve",
            "127.0.0.1:0",
            "/tmp/payload.bin",
            "--strategy",
            "zero-copy",
            "--max-transfers",
            "3",
        ])
        .expect("serve args should parse");

        match cli.command {
            Command::Serve(args) => {
                assert_eq!(args.strategy, StrategyKind::ZeroCopy);
                assert_eq!(args.max_transfers, Some(3));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_strategy() {
        let err = Cli::try_parse_from([
            "xferprims",
            "serve",
            "127.0.0.1:0",
            "/tmp/payload.bin",
            "--strategy",
            "mmap",
        ])
        .expect_err("unknown strategy should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn parses_fetch_subcommand() {
        let cli = Cli::try_parse_from([
            "xferprims",
            "--format",
            "json",
            "fetch",
            "127.0.0.1:9000",
            "/tmp/out.bin",
            "--atomic",
            "--read-timeout",
            "500ms",
        ])
        .expect("fetch args should parse");

        match cli.command {
            Command::Fetch(args) => {
                assert!(args.atomic);
                assert_eq!(args.read_timeout.as_deref(), Some("500ms"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn fetch_requires_destination() {
        let err = Cli::try_parse_from(["xferprims", "fetch", "127.0.0.1:9000"])
            .expect_err("missing destination should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }
}
