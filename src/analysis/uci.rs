//! UCI engine process driver.

use super::engine::{AnalysisEngine, AnalysisRequest, EngineStream};
use super::error::AnalysisError;
use super::message::{parse_uci_line, EngineEvent, UciLine};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

/// How to start the engine process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Executable name or path of a UCI engine
    pub path: PathBuf,
    pub threads: u32,
    pub hash_mb: u32,
    pub handshake_timeout_ms: u64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("stockfish"),
            threads: 1,
            hash_mb: 16,
            handshake_timeout_ms: 5000,
        }
    }
}

enum EngineCommand {
    Go {
        request: AnalysisRequest,
        sink: mpsc::UnboundedSender<EngineEvent>,
    },
    Stop,
}

/// A running UCI engine.
///
/// One actor task owns the process pipes. Requests queue up in order; `info` lines
/// belong to the oldest unfinished search until its `bestmove` arrives.
pub struct UciEngine {
    commands: mpsc::UnboundedSender<EngineCommand>,
    actor: JoinHandle<()>,
}

impl UciEngine {
    /// Spawn the engine and complete the UCI handshake
    #[instrument(skip(settings), fields(path = %settings.path.display()))]
    pub async fn launch(settings: &EngineSettings) -> Result<Self, AnalysisError> {
        let mut child = Command::new(&settings.path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| AnalysisError::Spawn {
                path: settings.path.clone(),
                source,
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| AnalysisError::Handshake("engine stdin unavailable".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| AnalysisError::Handshake("engine stdout unavailable".to_string()))?;
        let mut lines = BufReader::new(stdout).lines();

        let limit = Duration::from_millis(settings.handshake_timeout_ms);
        send(&mut stdin, "uci").await?;
        wait_for(&mut lines, "uciok", limit).await?;
        send(&mut stdin, &format!("setoption name Threads value {}", settings.threads)).await?;
        send(&mut stdin, &format!("setoption name Hash value {}", settings.hash_mb)).await?;
        send(&mut stdin, "isready").await?;
        wait_for(&mut lines, "readyok", limit).await?;
        info!("Analysis engine ready");

        let (commands, receiver) = mpsc::unbounded_channel();
        let actor = tokio::spawn(drive(child, stdin, lines, receiver));

        Ok(Self { commands, actor })
    }

    /// Whether the engine process is still being driven
    pub fn is_running(&self) -> bool {
        !self.actor.is_finished()
    }
}

impl AnalysisEngine for UciEngine {
    fn evaluate(&mut self, request: &AnalysisRequest) -> Result<EngineStream, AnalysisError> {
        let (sink, stream) = mpsc::unbounded_channel();
        self.commands
            .send(EngineCommand::Go {
                request: request.clone(),
                sink,
            })
            .map_err(|_| AnalysisError::Unavailable("engine process has exited".to_string()))?;
        Ok(stream)
    }

    fn stop(&mut self) {
        let _ = self.commands.send(EngineCommand::Stop);
    }
}

async fn send(stdin: &mut ChildStdin, command: &str) -> Result<(), AnalysisError> {
    debug!(">> {}", command);
    stdin.write_all(command.as_bytes()).await?;
    stdin.write_all(b"\n").await?;
    stdin.flush().await?;
    Ok(())
}

async fn read_until(
    lines: &mut Lines<BufReader<ChildStdout>>,
    expected: &str,
) -> Result<(), AnalysisError> {
    while let Some(line) = lines.next_line().await? {
        if line.trim() == expected {
            return Ok(());
        }
    }
    Err(AnalysisError::Handshake(format!(
        "engine exited before sending '{expected}'"
    )))
}

async fn wait_for(
    lines: &mut Lines<BufReader<ChildStdout>>,
    expected: &str,
    limit: Duration,
) -> Result<(), AnalysisError> {
    tokio::time::timeout(limit, read_until(lines, expected))
        .await
        .map_err(|_| AnalysisError::Handshake(format!("timed out waiting for '{expected}'")))?
}

async fn drive(
    mut child: Child,
    mut stdin: ChildStdin,
    mut lines: Lines<BufReader<ChildStdout>>,
    mut commands: mpsc::UnboundedReceiver<EngineCommand>,
) {
    let mut searches: VecDeque<mpsc::UnboundedSender<EngineEvent>> = VecDeque::new();

    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(EngineCommand::Go { request, sink }) => {
                    searches.push_back(sink);
                    let written = async {
                        if searches.len() > 1 {
                            send(&mut stdin, "stop").await?;
                        }
                        send(&mut stdin, &format!("position fen {}", request.fingerprint)).await?;
                        send(&mut stdin, &format!("go depth {}", request.target_depth)).await
                    }
                    .await;
                    if let Err(e) = written {
                        fail_all(&mut searches, &e.to_string());
                        break;
                    }
                }
                Some(EngineCommand::Stop) => {
                    if !searches.is_empty() {
                        if let Err(e) = send(&mut stdin, "stop").await {
                            fail_all(&mut searches, &e.to_string());
                            break;
                        }
                    }
                }
                None => {
                    let _ = send(&mut stdin, "quit").await;
                    break;
                }
            },
            line = lines.next_line() => match line {
                Ok(Some(line)) => route(&line, &mut searches),
                Ok(None) => {
                    fail_all(&mut searches, "engine process exited");
                    break;
                }
                Err(e) => {
                    fail_all(&mut searches, &e.to_string());
                    break;
                }
            },
        }
    }

    let _ = child.kill().await;
}

fn route(line: &str, searches: &mut VecDeque<mpsc::UnboundedSender<EngineEvent>>) {
    match parse_uci_line(line) {
        Ok(UciLine::Info(message)) => {
            if let Some(current) = searches.front() {
                let _ = current.send(EngineEvent::Info(message));
            }
        }
        Ok(UciLine::BestMove(best)) => {
            if let Some(finished) = searches.pop_front() {
                let _ = finished.send(EngineEvent::BestMove(best));
            }
        }
        Ok(UciLine::Other) => {}
        Err(e) => debug!("Discarding engine line '{}': {}", line, e),
    }
}

fn fail_all(searches: &mut VecDeque<mpsc::UnboundedSender<EngineEvent>>, reason: &str) {
    warn!("Analysis engine failed: {}", reason);
    for search in searches.drain(..) {
        let _ = search.send(EngineEvent::Failed(reason.to_string()));
    }
}
