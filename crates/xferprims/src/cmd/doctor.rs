use std::fs;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use xferprims_copy::{verify_zero_copy, zero_copy_supported};
use xferprims_transport::TcpTransport;

use crate::cmd::DoctorArgs;
use crate::exit::{CliResult, HEALTH_CHECK_FAILED, SUCCESS};
use crate::output::OutputFormat;

#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
enum CheckStatus {
    Pass,
    Fail,
    Warn,
    Info,
}

#[derive(Debug, Serialize)]
struct CheckResult {
    name: String,
    status: CheckStatus,
    detail: String,
}

#[derive(Debug, Serialize)]
struct DoctorOutput {
    schema_id: &'static str,
    checks: Vec<CheckResult>,
    overall: &'static str,
}

pub fn run(_args: DoctorArgs, format: OutputFormat) -> CliResult<i32> {
    let checks = vec![
        zero_copy_check(),
        loopback_bind_check(),
        temp_dir_writable_check(),
        compiled_features_check(),
    ];

    let has_fail = checks.iter().any(|c| matches!(c.status, CheckStatus::Fail));
    let overall = if has_fail { "fail" } else { "pass" };

    let output = DoctorOutput {
        schema_id: "https://schemas.3leaps.dev/xferprims/cli/v1/doctor-report.schema.json",
        checks,
        overall,
    };

    print_doctor(&output, format);

    if has_fail {
        Ok(HEALTH_CHECK_FAILED)
    } else {
        Ok(SUCCESS)
    }
}

fn print_doctor(output: &DoctorOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(output).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("xferprims doctor\n");
            for c in &output.checks {
                println!(
                    "  [{:>4}] {:<20} {}",
                    status_text(c.status),
                    c.name,
                    c.detail
                );
            }
            if output.overall == "pass" {
                println!("\n  Result: all checks passed");
            } else {
                println!("\n  Result: one or more checks failed");
            }
        }
        OutputFormat::Raw => {
            println!("{}", output.overall);
        }
    }
}

fn status_text(status: CheckStatus) -> &'static str {
    match status {
        CheckStatus::Pass => "PASS",
        CheckStatus::Fail => "FAIL",
        CheckStatus::Warn => "WARN",
        CheckStatus::Info => "INFO",
    }
}

/// Push a few bytes through `sendfile` between a temp file and a socket pair.
fn zero_copy_check() -> CheckResult {
    if !zero_copy_supported() {
        return CheckResult {
            name: "zero_copy".to_string(),
            status: CheckStatus::Warn,
            detail: format!(
                "sendfile path not built for {}; auto strategy will buffer",
                std::env::consts::OS
            ),
        };
    }

    match verify_zero_copy() {
        Ok(()) => CheckResult {
            name: "zero_copy".to_string(),
            status: CheckStatus::Pass,
            detail: "sendfile file-to-socket copy succeeded".to_string(),
        },
        Err(err) => CheckResult {
            name: "zero_copy".to_string(),
            status: CheckStatus::Warn,
            detail: format!("sendfile unusable, auto strategy will buffer: {err}"),
        },
    }
}

fn loopback_bind_check() -> CheckResult {
    match TcpTransport::bind("127.0.0.1:0") {
        Ok(transport) => CheckResult {
            name: "loopback_bind".to_string(),
            status: CheckStatus::Pass,
            detail: format!("bound {}", transport.local_addr()),
        },
        Err(err) => CheckResult {
            name: "loopback_bind".to_string(),
            status: CheckStatus::Fail,
            detail: err.to_string(),
        },
    }
}

fn temp_dir_writable_check() -> CheckResult {
    let path = scratch_path("write");
    let result = fs::write(&path, b"ok");
    let _ = fs::remove_file(&path);

    match result {
        Ok(()) => CheckResult {
            name: "temp_dir_writable".to_string(),
            status: CheckStatus::Pass,
            detail: format!("{} is writable", std::env::temp_dir().display()),
        },
        Err(err) => CheckResult {
            name: "temp_dir_writable".to_string(),
            status: CheckStatus::Fail,
            detail: format!("{} is not writable: {err}", std::env::temp_dir().display()),
        },
    }
}

fn compiled_features_check() -> CheckResult {
    let mut features = Vec::new();
    if cfg!(feature = "async") {
        features.push("async");
    }
    if cfg!(feature = "cli") {
        features.push("cli");
    }

    CheckResult {
        name: "compiled_features".to_string(),
        status: CheckStatus::Info,
        detail: features.join(", "),
    }
}

fn scratch_path(tag: &str) -> std::path::PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    std::env::temp_dir().join(format!(
        "xferprims-doctor-{tag}-{}-{nanos}",
        std::process::id()
    ))
}
