use std::ffi::OsString;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, info};
use xferprims_transport::{Connection, TcpTransport};

use crate::config::FetchOptions;
use crate::error::{Result, TransferError};
use crate::receiver::receive;
use crate::report::{Direction, TransferReport};

/// Dial `addr`, receive one transfer and write it to `dest`.
///
/// Without [`FetchOptions::atomic`] a failed transfer leaves whatever
/// arrived in `dest`. With it, bytes land in `<dest>.part`, which is renamed
/// over `dest` on success and removed on failure.
pub fn fetch(addr: &str, dest: &Path, options: &FetchOptions) -> Result<TransferReport> {
    let started = Instant::now();
    let mut conn = match options.connect_timeout {
        Some(timeout) => TcpTransport::connect_timeout(addr, timeout)?,
        None => TcpTransport::connect(addr)?,
    };
    options.config.apply(&conn)?;
    let peer = conn.peer_label();

    let bytes = if options.atomic {
        receive_atomic(&mut conn, dest)?
    } else {
        let mut file = File::create(dest)?;
        receive(&mut conn, &mut file)?
    };

    let report = TransferReport {
        direction: Direction::Received,
        peer,
        bytes,
        strategy: "buffered",
        elapsed: started.elapsed(),
    };
    info!(
        peer = %report.peer,
        bytes,
        dest = %dest.display(),
        elapsed_ms = report.elapsed.as_millis() as u64,
        "fetch complete"
    );
    Ok(report)
}

fn receive_atomic(conn: &mut Connection, dest: &Path) -> Result<u64> {
    let part = part_path(dest);
    let outcome: Result<u64> = File::create(&part)
        .map_err(TransferError::from)
        .and_then(|mut file| {
            let bytes = receive(conn, &mut file)?;
            file.sync_all()?;
            Ok(bytes)
        });

    match outcome {
        Ok(bytes) => {
            fs::rename(&part, dest)?;
            Ok(bytes)
        }
        Err(err) => {
            if let Err(cleanup) = fs::remove_file(&part) {
                debug!(path = %part.display(), error = %cleanup, "could not remove partial file");
            }
            Err(err)
        }
    }
}

/// `<dest>.part`, next to `dest` so the final rename stays on one filesystem.
pub(crate) fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("transfer"));
    name.push(".part");
    dest.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn part_path_appends_suffix() {
        assert_eq!(
            part_path(Path::new("/tmp/out/file.bin")),
            PathBuf::from("/tmp/out/file.bin.part")
        );
        assert_eq!(part_path(Path::new("plain")), PathBuf::from("plain.part"));
    }

    #[test]
    fn refused_connection_is_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind should succeed");
        let addr = listener.local_addr().expect("addr should resolve").to_string();
        drop(listener);

        let dir = tempfile::tempdir().expect("temp dir should be creatable");
        let dest = dir.path().join("never.bin");
        let err = fetch(&addr, &dest, &FetchOptions::default()).unwrap_err();

        assert!(matches!(err, TransferError::Transport(_)));
        assert!(!dest.exists());
    }
}
