//! Integration tests for SessionManager with session change events
//!
//! These tests verify that the SessionManager correctly:
//! - Emits session change events on mutations
//! - Stays silent for duplicate adds and out-of-range removes
//! - Supports multiple subscribers
//! - Handles concurrent access from multiple tasks

use camino::Utf8PathBuf;
use pyibuilder::models::{AddOutcome, BuildMode, LogLevel, WindowMode};
use pyibuilder::{CommandCompiler, SessionChange, SessionManager};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::time::{Duration, timeout};

async fn next_event(rx: &mut tokio::sync::broadcast::Receiver<SessionChange>) -> SessionChange {
    timeout(Duration::from_millis(100), rx.recv())
        .await
        .expect("Timeout waiting for event")
        .expect("Channel closed")
}

#[tokio::test]
async fn test_session_change_events_emitted() {
    let session = Arc::new(SessionManager::new());
    let mut rx = session.subscribe();

    session.set_script("/p/app.py");

    let event = next_event(&mut rx).await;
    assert!(
        matches!(&event, SessionChange::ScriptChanged { script: Some(s) } if s == "/p/app.py"),
        "Expected ScriptChanged event, got: {:?}",
        event
    );
}

#[tokio::test]
async fn test_multiple_subscribers_receive_events() {
    let session = Arc::new(SessionManager::new());
    let mut rx1 = session.subscribe();
    let mut rx2 = session.subscribe();

    session.add_hidden_import("numpy");

    for rx in [&mut rx1, &mut rx2] {
        let event = next_event(rx).await;
        assert_eq!(event, SessionChange::HiddenImportsChanged { len: 1 });
    }
}

#[tokio::test]
async fn test_duplicate_add_keeps_single_entry() {
    let session = SessionManager::new();
    let mut rx = session.subscribe();

    assert_eq!(session.add_excluded_module("tkinter"), AddOutcome::Added);
    assert_eq!(session.add_excluded_module(" tkinter "), AddOutcome::Duplicate);

    assert_eq!(
        next_event(&mut rx).await,
        SessionChange::ExcludedModulesChanged { len: 1 }
    );
    assert!(
        timeout(Duration::from_millis(50), rx.recv()).await.is_err(),
        "Duplicate add should not emit an event"
    );
    assert_eq!(session.read(|s| s.excluded_modules.len()), 1);
}

#[tokio::test]
async fn test_remove_by_index() {
    let session = SessionManager::new();
    session.add_hidden_import("numpy");
    session.add_hidden_import("pandas");
    session.add_hidden_import("scipy");

    let mut rx = session.subscribe();

    assert!(session.remove_hidden_import(7).is_empty());
    let changes = session.remove_hidden_import(1);
    assert_eq!(changes, vec![SessionChange::HiddenImportsChanged { len: 2 }]);
    assert_eq!(
        next_event(&mut rx).await,
        SessionChange::HiddenImportsChanged { len: 2 }
    );

    let remaining: Vec<String> = session.read(|s| s.hidden_imports.iter().cloned().collect());
    assert_eq!(remaining, vec!["numpy", "scipy"]);
}

#[tokio::test]
async fn test_resource_events() {
    let temp_dir = TempDir::new().unwrap();
    let dir = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    let config = dir.join("config.json");
    std::fs::write(&config, "{}").unwrap();
    let dll = dir.join("native.dll");
    std::fs::write(&dll, b"MZ").unwrap();

    let session = SessionManager::new();
    let mut rx = session.subscribe();

    assert!(session.add_data_file(&config, ".").is_added());
    assert!(session.add_binary_file(&dll, "lib").is_added());
    assert!(session.add_search_path(&dir).is_added());

    assert_eq!(next_event(&mut rx).await, SessionChange::DataFilesChanged { len: 1 });
    assert_eq!(next_event(&mut rx).await, SessionChange::BinaryFilesChanged { len: 1 });
    assert_eq!(next_event(&mut rx).await, SessionChange::SearchPathsChanged { len: 1 });
}

#[tokio::test]
async fn test_compile_and_reset_events() {
    let session = SessionManager::new();
    session.set_script("/p/app.py");
    session.set_mode(BuildMode::OneFile);
    session.set_window_mode(WindowMode::Windowed);
    session.set_log_level(LogLevel::Debug);

    let mut rx = session.subscribe();

    let command = session.compile(&CommandCompiler::new()).unwrap();
    assert_eq!(
        command,
        r#"pyinstaller -F -w -y --log-level DEBUG "/p/app.py""#
    );
    assert_eq!(
        next_event(&mut rx).await,
        SessionChange::CommandCompiled { command }
    );

    session.reset();

    assert_eq!(
        next_event(&mut rx).await,
        SessionChange::ScriptChanged { script: None }
    );
    assert_eq!(next_event(&mut rx).await, SessionChange::OptionsChanged);
    assert_eq!(next_event(&mut rx).await, SessionChange::SessionReset);

    let snapshot = session.snapshot();
    assert!(snapshot.options.no_confirm);
    assert_eq!(snapshot.options.log_level, LogLevel::Info);
    assert_eq!(snapshot.options.mode, BuildMode::OneDir);
}

#[tokio::test]
async fn test_concurrent_session_access() {
    let session = Arc::new(SessionManager::new());
    let mut handles = Vec::new();

    for i in 0..10 {
        let session = Arc::clone(&session);
        let handle = tokio::spawn(async move {
            session.add_hidden_import(&format!("module_{}", i % 5));
        });
        handles.push(handle);
    }

    for handle in handles {
        handle.await.unwrap();
    }

    // Every name was added twice; duplicates collapse
    assert_eq!(session.read(|s| s.hidden_imports.len()), 5);
}
