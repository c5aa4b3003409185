use std::io::{Read, Seek, SeekFrom, Write};
use std::net::TcpListener;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use xferprims_copy::{select_strategy, AutoCopy, StrategyKind};
use xferprims_frame::encode_length;
use xferprims_peer::{
    fetch, receive, send, FetchOptions, TransferConfig, TransferError, TransferServer,
};
use xferprims_transport::{Endpoint, TcpTransport};

fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i.wrapping_mul(31) % 251) as u8).collect()
}

fn temp_source(content: &[u8]) -> std::fs::File {
    let mut file = tempfile::tempfile().expect("temp file should be creatable");
    file.write_all(content).expect("write should succeed");
    file.seek(SeekFrom::Start(0)).expect("seek should succeed");
    file
}

/// Send `content` from a real file over loopback TCP with `kind`, and
/// return what the receiving side got.
fn transfer_over_tcp(content: &[u8], kind: StrategyKind) -> Vec<u8> {
    let transport = TcpTransport::bind("127.0.0.1:0").expect("listener should bind");
    let addr = transport.local_addr().to_string();
    let mut file = temp_source(content);

    let sender = thread::spawn(move || {
        let mut conn = transport.accept().expect("accept should succeed");
        let strategy = select_strategy(kind);
        send(&mut file, &mut conn, strategy.as_ref())
    });

    let mut conn = TcpTransport::connect(&addr).expect("client should connect");
    let mut sink = Vec::new();
    let received = receive(&mut conn, &mut sink).expect("receive should succeed");

    let sent = sender
        .join()
        .expect("sender thread should finish")
        .expect("send should succeed");
    assert_eq!(sent, content.len() as u64);
    assert_eq!(received, sent);
    sink
}

#[test]
fn every_strategy_roundtrips_every_length() {
    let lengths = [0usize, 1, 1000, 64 * 1024 + 3, 1536 * 1024];
    for kind in StrategyKind::ALL {
        for len in lengths {
            let content = pattern(len);
            let received = transfer_over_tcp(&content, kind);
            assert_eq!(received, content, "strategy {kind} length {len}");
        }
    }
}

#[test]
fn strategies_produce_identical_output() {
    let content = pattern(300_001);
    let outputs: Vec<Vec<u8>> = StrategyKind::ALL
        .iter()
        .map(|kind| transfer_over_tcp(&content, *kind))
        .collect();

    for output in &outputs[1..] {
        assert_eq!(output, &outputs[0]);
    }
}

#[test]
fn peer_closing_inside_header_is_header_truncated() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("listener should bind");
    let addr = listener.local_addr().expect("addr should resolve").to_string();

    let server = thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("accept should succeed");
        stream
            .write_all(&encode_length(1024)[..5])
            .expect("write should succeed");
    });

    let mut conn = TcpTransport::connect(&addr).expect("client should connect");
    let mut sink = Vec::new();
    let err = receive(&mut conn, &mut sink).unwrap_err();
    server.join().expect("server thread should finish");

    assert!(matches!(err, TransferError::HeaderTruncated { received: 5 }));
    assert!(sink.is_empty());
}

#[test]
fn peer_closing_one_byte_early_is_payload_truncated() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("listener should bind");
    let addr = listener.local_addr().expect("addr should resolve").to_string();

    let server = thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("accept should succeed");
        stream
            .write_all(&encode_length(100))
            .expect("write should succeed");
        stream.write_all(&pattern(99)).expect("write should succeed");
    });

    let mut conn = TcpTransport::connect(&addr).expect("client should connect");
    let mut sink = Vec::new();
    let err = receive(&mut conn, &mut sink).unwrap_err();
    server.join().expect("server thread should finish");

    assert!(matches!(
        err,
        TransferError::PayloadTruncated {
            expected: 100,
            received: 99
        }
    ));
    assert_eq!(sink, pattern(99));
}

#[test]
fn zero_length_puts_only_header_on_the_wire() {
    let transport = TcpTransport::bind("127.0.0.1:0").expect("listener should bind");
    let addr = transport.local_addr().to_string();

    let sender = thread::spawn(move || {
        let mut conn = transport.accept().expect("accept should succeed");
        let mut empty = temp_source(b"");
        send(&mut empty, &mut conn, &AutoCopy::default())
    });

    let mut conn = TcpTransport::connect(&addr).expect("client should connect");
    let mut wire = Vec::new();
    conn.read_to_end(&mut wire).expect("read should succeed");

    assert_eq!(
        sender.join().expect("sender should finish").expect("send should succeed"),
        0
    );
    assert_eq!(wire, encode_length(0));
}

#[test]
#[cfg(any(target_os = "linux", target_os = "android"))]
fn auto_plans_zero_copy_for_file_to_tcp() {
    let transport = TcpTransport::bind("127.0.0.1:0").expect("listener should bind");
    let addr = transport.local_addr().to_string();
    let _client = TcpTransport::connect(&addr).expect("client should connect");
    let conn = transport.accept().expect("accept should succeed");

    let file = temp_source(b"payload");
    assert_eq!(
        AutoCopy::plan(file.descriptor(), conn.descriptor()),
        StrategyKind::ZeroCopy
    );
}

#[test]
fn concurrent_fetches_stay_independent() {
    const CLIENTS: usize = 8;

    let content = pattern(700_000);
    let mut source = tempfile::NamedTempFile::new().expect("temp file should be creatable");
    source.write_all(&content).expect("write should succeed");

    let server = Arc::new(
        TransferServer::bind("127.0.0.1:0", source.path(), TransferConfig::default())
            .expect("server should bind"),
    );
    let addr = server.local_addr().to_string();

    let serving = {
        let server = Arc::clone(&server);
        thread::spawn(move || {
            let running = AtomicBool::new(true);
            server.run(&running, Some(CLIENTS as u64))
        })
    };

    let dir = tempfile::tempdir().expect("temp dir should be creatable");
    let clients: Vec<_> = (0..CLIENTS)
        .map(|i| {
            let addr = addr.clone();
            let dest = dir.path().join(format!("copy-{i}.bin"));
            thread::spawn(move || {
                let report =
                    fetch(&addr, &dest, &FetchOptions::default()).expect("fetch should succeed");
                (dest, report)
            })
        })
        .collect();

    for client in clients {
        let (dest, report) = client.join().expect("client thread should finish");
        assert_eq!(report.bytes, content.len() as u64);
        assert_eq!(std::fs::read(&dest).expect("dest should be readable"), content);
    }

    let accepted = serving
        .join()
        .expect("server thread should finish")
        .expect("run should succeed");
    assert_eq!(accepted, CLIENTS as u64);
}

#[test]
fn silent_peer_times_out_with_read_deadline() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("listener should bind");
    let addr = listener.local_addr().expect("addr should resolve").to_string();
    let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();

    let server = thread::spawn(move || {
        let (_stream, _) = listener.accept().expect("accept should succeed");
        let _ = release_rx.recv_timeout(Duration::from_secs(10));
    });

    let dir = tempfile::tempdir().expect("temp dir should be creatable");
    let options = FetchOptions {
        config: TransferConfig::default().with_read_timeout(Duration::from_millis(200)),
        ..FetchOptions::default()
    };
    let err = fetch(&addr, &dir.path().join("stalled.bin"), &options).unwrap_err();
    release_tx.send(()).expect("server should still be waiting");
    server.join().expect("server thread should finish");

    assert!(err.is_timeout(), "expected timeout, got {err}");
}

#[test]
fn failed_atomic_fetch_leaves_no_destination() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("listener should bind");
    let addr = listener.local_addr().expect("addr should resolve").to_string();

    let server = thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("accept should succeed");
        stream
            .write_all(&encode_length(4096))
            .expect("write should succeed");
        stream.write_all(&pattern(100)).expect("write should succeed");
    });

    let dir = tempfile::tempdir().expect("temp dir should be creatable");
    let dest = dir.path().join("atomic.bin");
    let options = FetchOptions {
        atomic: true,
        ..FetchOptions::default()
    };

    let err = fetch(&addr, &dest, &options).unwrap_err();
    server.join().expect("server thread should finish");

    assert!(err.is_truncation());
    assert!(!dest.exists());
    assert!(!dir.path().join("atomic.bin.part").exists());
}

#[test]
fn successful_atomic_fetch_renames_into_place() {
    let content = pattern(12_345);
    let mut source = tempfile::NamedTempFile::new().expect("temp file should be creatable");
    source.write_all(&content).expect("write should succeed");

    let server = TransferServer::bind("127.0.0.1:0", source.path(), TransferConfig::default())
        .expect("server should bind");
    let addr = server.local_addr().to_string();
    let serving = thread::spawn(move || {
        server
            .accept_one()
            .expect("accept should succeed")
            .join()
            .expect("transfer thread should finish")
    });

    let dir = tempfile::tempdir().expect("temp dir should be creatable");
    let dest = dir.path().join("atomic.bin");
    let options = FetchOptions {
        atomic: true,
        ..FetchOptions::default()
    };
    let report = fetch(&addr, &dest, &options).expect("fetch should succeed");
    serving
        .join()
        .expect("server thread should finish")
        .expect("transfer should succeed");

    assert_eq!(report.bytes, content.len() as u64);
    assert_eq!(std::fs::read(&dest).expect("dest should be readable"), content);
    assert!(!dir.path().join("atomic.bin.part").exists());
}
