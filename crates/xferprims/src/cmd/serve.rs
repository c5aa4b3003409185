use std::net::TcpStream;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::warn;
use xferprims_peer::{TransferConfig, TransferServer};

use crate::cmd::{parse_optional_duration, ServeArgs};
use crate::exit::{transfer_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::{print_listening, print_serve_summary, OutputFormat};

pub fn run(args: ServeArgs, format: OutputFormat) -> CliResult<i32> {
    let config = TransferConfig {
        strategy: args.strategy,
        read_timeout: parse_optional_duration(args.read_timeout.as_deref())?,
        write_timeout: parse_optional_duration(args.write_timeout.as_deref())?,
    };

    if !args.file.is_file() {
        warn!(
            file = %args.file.display(),
            "source is not a readable regular file; transfers will fail until it exists"
        );
    }

    let server = TransferServer::bind(&args.addr, &args.file, config)
        .map_err(|err| transfer_error("bind failed", err))?;
    print_listening(
        server.local_addr(),
        server.source_path(),
        server.strategy_name(),
        format,
    );

    let running = Arc::new(AtomicBool::new(true));
    let wake_addr = server.wake_addr();
    install_ctrlc_handler(running.clone(), move || {
        // Unblocks the pending accept so the loop sees the cleared flag.
        let _ = TcpStream::connect_timeout(&wake_addr, Duration::from_secs(1));
    })?;

    let accepted = server
        .run(&running, args.max_transfers)
        .map_err(|err| transfer_error("accept failed", err))?;
    print_serve_summary(accepted, format);

    Ok(SUCCESS)
}

fn install_ctrlc_handler<F>(running: Arc<AtomicBool>, wake: F) -> CliResult<()>
where
    F: Fn() + Send + 'static,
{
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
        wake();
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
