//! The UCI driver against a real child process: a shell script speaking just
//! enough of the protocol.

#![cfg(unix)]

use kibitz::analysis::{
    AnalysisEngine, AnalysisError, AnalysisRequest, EngineEvent, EngineSettings, EngineStream,
    UciEngine,
};
use kibitz::chess::Position;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::timeout;

/// The first search runs until stopped; every later one answers at once.
const SEARCHING_ENGINE: &str = r#"#!/bin/sh
go_count=0
stopped_search_open=0
while read -r cmd rest; do
  printf '%s\n' "$cmd" >> "LOG_PATH"
  case "$cmd" in
    uci) echo "id name scripted"; echo "uciok" ;;
    isready) echo "readyok" ;;
    go)
      go_count=$((go_count + 1))
      if [ "$go_count" -eq 1 ]; then
        stopped_search_open=1
      else
        echo "info depth 12 score cp 222 pv d2d4 d7d5"
        echo "bestmove d2d4"
      fi
      ;;
    stop)
      if [ "$stopped_search_open" -eq 1 ]; then
        echo "info depth 9 score cp 111 pv e2e4"
        echo "bestmove e2e4"
        stopped_search_open=0
      fi
      ;;
    quit) exit 0 ;;
  esac
done
"#;

/// Completes the handshake, then dies on the first search.
const CRASHING_ENGINE: &str = r#"#!/bin/sh
while read -r cmd rest; do
  case "$cmd" in
    uci) echo "uciok" ;;
    isready) echo "readyok" ;;
    go) exit 3 ;;
  esac
done
"#;

fn write_engine(dir: &TempDir, script: &str) -> PathBuf {
    let log = dir.path().join("commands.log");
    let path = dir.path().join("engine.sh");
    std::fs::write(&path, script.replace("LOG_PATH", &log.display().to_string())).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

async fn launch(path: &Path) -> UciEngine {
    let settings = EngineSettings {
        path: path.to_path_buf(),
        ..EngineSettings::default()
    };
    // A freshly written script can briefly be "text file busy" while another
    // test's child inherits the write handle.
    for _ in 0..10 {
        match UciEngine::launch(&settings).await {
            Ok(engine) => return engine,
            Err(AnalysisError::Spawn { .. }) => {
                tokio::time::sleep(Duration::from_millis(50)).await
            }
            Err(e) => panic!("engine failed to start: {}", e),
        }
    }
    panic!("engine script could not be started");
}

fn request(position: &Position) -> AnalysisRequest {
    AnalysisRequest {
        fingerprint: position.fingerprint().clone(),
        target_depth: 12,
    }
}

async fn next_event(stream: &mut EngineStream) -> Option<EngineEvent> {
    timeout(Duration::from_secs(5), stream.recv())
        .await
        .expect("timed out waiting for engine output")
}

fn centipawns(event: Option<EngineEvent>) -> Option<i32> {
    match event {
        Some(EngineEvent::Info(message)) => message.evaluation_centipawns,
        other => panic!("expected an info report, got {:?}", other),
    }
}

#[cfg(test)]
mod uci_process_tests {
    use super::*;

    #[tokio::test]
    async fn test_output_is_attributed_to_the_search_that_produced_it() {
        let dir = TempDir::new().unwrap();
        let mut engine = launch(&write_engine(&dir, SEARCHING_ENGINE)).await;
        assert!(engine.is_running());

        let start = Position::starting();
        let mut first = engine.evaluate(&request(&start)).unwrap();
        let mut second = engine.evaluate(&request(&start)).unwrap();

        // The superseded search reports after being stopped; all of it stays on
        // its own stream.
        assert_eq!(centipawns(next_event(&mut first).await), Some(111));
        assert_eq!(
            next_event(&mut first).await,
            Some(EngineEvent::BestMove(Some("e2e4".to_string())))
        );
        assert_eq!(next_event(&mut first).await, None);

        assert_eq!(centipawns(next_event(&mut second).await), Some(222));
        assert_eq!(
            next_event(&mut second).await,
            Some(EngineEvent::BestMove(Some("d2d4".to_string())))
        );
        assert_eq!(next_event(&mut second).await, None);

        let log = std::fs::read_to_string(dir.path().join("commands.log")).unwrap();
        let commands: Vec<&str> = log.lines().collect();
        assert_eq!(
            commands,
            vec![
                "uci", "setoption", "setoption", "isready", "position", "go", "stop", "position",
                "go"
            ]
        );
    }

    #[tokio::test]
    async fn test_engine_exit_fails_open_searches() {
        let dir = TempDir::new().unwrap();
        let mut engine = launch(&write_engine(&dir, CRASHING_ENGINE)).await;

        let mut stream = engine.evaluate(&request(&Position::starting())).unwrap();
        match next_event(&mut stream).await {
            Some(EngineEvent::Failed(reason)) => assert_eq!(reason, "engine process exited"),
            other => panic!("expected a failure, got {:?}", other),
        }
        assert_eq!(next_event(&mut stream).await, None);

        timeout(Duration::from_secs(5), async {
            while engine.is_running() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("driver kept running after the engine exited");

        let refused = engine.evaluate(&request(&Position::starting()));
        assert!(matches!(refused, Err(AnalysisError::Unavailable(_))));
    }
}
