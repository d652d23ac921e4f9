mod common;

use common::{init_logging, pump, Event, Recorder};
use redlilium_io::{IoDriverConfig, IoDriverDual, OperationMode, PathKind};

fn config_for(root: &std::path::Path) -> IoDriverConfig {
    IoDriverConfig {
        root_uri: root.to_string_lossy().into_owned(),
        block_pool_capacity: 32,
        ..IoDriverConfig::default()
    }
}

#[test]
fn blocking_read_under_root() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("config.txt"), "hello").unwrap();
    let (io, pool) = IoDriverDual::start(&config_for(dir.path()), None).unwrap();

    let block = io
        .driver(OperationMode::Blocking)
        .read("config.txt", PathKind::Relative)
        .ready()
        .flatten()
        .unwrap();
    assert_eq!(block.data(), b"hello");
    assert_eq!(pool.live_blocks(), 1);
    drop(block);
    assert_eq!(pool.live_blocks(), 0);
}

#[test]
fn empty_file_is_ok_in_both_modes() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("empty.txt"), "").unwrap();
    let (recorder, events) = Recorder::shared();
    let (mut io, _pool) =
        IoDriverDual::start(&config_for(dir.path()), Some(Box::new(recorder))).unwrap();

    let blocking = io
        .driver(OperationMode::Blocking)
        .read("empty.txt", PathKind::Relative);
    assert!(matches!(blocking.ready(), Some(None)));

    assert!(io
        .driver(OperationMode::Async)
        .read("empty.txt", PathKind::Relative)
        .is_submitted());
    pump(&mut io.async_driver);
    assert_eq!(
        *events.borrow(),
        vec![Event::ReadComplete {
            uri: "empty.txt".into(),
            data: None
        }]
    );
}

#[test]
fn asset_writes_fail_in_both_modes() {
    let dir = tempfile::tempdir().unwrap();
    let (recorder, events) = Recorder::shared();
    let (mut io, pool) =
        IoDriverDual::start(&config_for(dir.path()), Some(Box::new(recorder))).unwrap();
    let block = pool.copy_block(b"mod").unwrap();

    let written = io
        .driver(OperationMode::Blocking)
        .write("patch.bin", &block, PathKind::Assets)
        .ready();
    assert_eq!(written, Some(0));

    io.driver(OperationMode::Async)
        .write("patch.bin", &block, PathKind::Assets);
    pump(&mut io.async_driver);
    assert_eq!(*events.borrow(), vec![Event::WriteError("patch.bin".into())]);
    assert!(!dir.path().join("assets").exists());
}

#[test]
fn async_write_then_blocking_read() {
    let dir = tempfile::tempdir().unwrap();
    let (recorder, events) = Recorder::shared();
    let (mut io, pool) =
        IoDriverDual::start(&config_for(dir.path()), Some(Box::new(recorder))).unwrap();

    let block = pool.copy_block(b"checkpoint").unwrap();
    io.driver(OperationMode::Async)
        .write("progress.sav", &block, PathKind::Relative);
    pump(&mut io.async_driver);
    assert_eq!(
        *events.borrow(),
        vec![Event::WriteComplete {
            uri: "progress.sav".into(),
            bytes: 10
        }]
    );

    assert_eq!(
        io.blocking
            .read_text("progress.sav", PathKind::Relative)
            .as_deref(),
        Some("checkpoint")
    );
}

#[test]
fn config_file_drives_setup() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("content")).unwrap();
    std::fs::write(dir.path().join("content/title.txt"), "RedLilium").unwrap();
    let config_path = dir.path().join("io.toml");
    std::fs::write(
        &config_path,
        format!(
            "root_uri = {:?}\nassets_dir = \"content\"\nblock_pool_capacity = 8\nworker_name = \"test-io\"\n",
            dir.path().to_string_lossy()
        ),
    )
    .unwrap();

    let config = IoDriverConfig::load(&config_path).unwrap();
    let (mut io, pool) = IoDriverDual::start(&config, None).unwrap();
    assert_eq!(pool.capacity(), 8);
    assert_eq!(io.async_driver.worker_config().name, "test-io");
    assert_eq!(
        io.blocking.read_text("title.txt", PathKind::Assets).as_deref(),
        Some("RedLilium")
    );
    io.shutdown();
}
