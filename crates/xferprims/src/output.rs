use std::net::SocketAddr;
use std::path::Path;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use xferprims_peer::TransferReport;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        use std::io::IsTerminal;

        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct ReportOutput<'a> {
    schema_id: &'a str,
    #[serde(flatten)]
    report: &'a TransferReport,
    throughput_bytes_per_sec: u64,
}

pub fn print_report(report: &TransferReport, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = ReportOutput {
                schema_id: "https://schemas.3leaps.dev/xferprims/cli/v1/transfer-report.schema.json",
                report,
                throughput_bytes_per_sec: report.throughput() as u64,
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["PEER", "BYTES", "STRATEGY", "ELAPSED", "THROUGHPUT"])
                .add_row(vec![
                    report.peer.clone(),
                    report.bytes.to_string(),
                    report.strategy.to_string(),
                    format!("{:.1} ms", report.elapsed.as_secs_f64() * 1000.0),
                    human_rate(report.throughput()),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "peer={} bytes={} strategy={} elapsed={:?} throughput={}",
                report.peer,
                report.bytes,
                report.strategy,
                report.elapsed,
                human_rate(report.throughput())
            );
        }
        OutputFormat::Raw => {
            println!("{}", report.bytes);
        }
    }
}

#[derive(Serialize)]
struct ListeningOutput<'a> {
    schema_id: &'a str,
    address: String,
    file: String,
    strategy: &'a str,
}

/// Announce the bound address. Always a single line so scripts can read it
/// before the first transfer.
pub fn print_listening(addr: SocketAddr, file: &Path, strategy: &str, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = ListeningOutput {
                schema_id: "https://schemas.3leaps.dev/xferprims/cli/v1/serve-listening.schema.json",
                address: addr.to_string(),
                file: file.display().to_string(),
                strategy,
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table | OutputFormat::Pretty => {
            println!(
                "serving {} on {addr} (strategy={strategy})",
                file.display()
            );
        }
        OutputFormat::Raw => {
            println!("{addr}");
        }
    }
}

#[derive(Serialize)]
struct ServeSummary<'a> {
    schema_id: &'a str,
    accepted: u64,
}

pub fn print_serve_summary(accepted: u64, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = ServeSummary {
                schema_id: "https://schemas.3leaps.dev/xferprims/cli/v1/serve-summary.schema.json",
                accepted,
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("served {accepted} connection(s)");
        }
        OutputFormat::Raw => {
            println!("{accepted}");
        }
    }
}

fn human_rate(bytes_per_sec: f64) -> String {
    const UNITS: [&str; 4] = ["B/s", "KiB/s", "MiB/s", "GiB/s"];

    let mut value = bytes_per_sec;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}
