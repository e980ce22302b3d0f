//! Background workers that drive the controller off the caller's task.
//!
//! A streaming worker forwards each stdout line as it arrives and finishes
//! with exactly one [`SessionEvent::Finished`]. Start errors arrive the same
//! way, so the caller only ever watches one channel.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, Instrument};

use crate::domain::errors::{CodexError, CodexResult};
use crate::domain::models::{CommandVector, SessionOutcome, SessionRequest};

use super::session_controller::{SessionController, SessionStream};

/// Notification sent from a session worker.
#[derive(Debug)]
pub enum SessionEvent {
    /// One stdout line, in the order the process wrote it
    Line(String),
    /// Sent last, exactly once
    Finished(CodexResult<SessionOutcome>),
}

/// Handle to a running streaming worker.
pub struct SessionWorker {
    events: mpsc::UnboundedReceiver<SessionEvent>,
    handle: JoinHandle<()>,
}

impl SessionWorker {
    /// Next event, or `None` once the worker has finished and every event
    /// was received.
    pub async fn recv(&mut self) -> Option<SessionEvent> {
        self.events.recv().await
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Receive everything that is left: the remaining lines and the final
    /// result.
    pub async fn collect(mut self) -> (Vec<String>, CodexResult<SessionOutcome>) {
        let mut lines = Vec::new();
        while let Some(event) = self.events.recv().await {
            match event {
                SessionEvent::Line(line) => lines.push(line),
                SessionEvent::Finished(result) => return (lines, result),
            }
        }
        (
            lines,
            Err(CodexError::Io(std::io::Error::other(
                "session worker exited without a result",
            ))),
        )
    }
}

/// Start `request` on a background task.
///
/// Lines are still drained if the receiver is dropped, so the process is
/// never blocked on a full pipe.
pub fn spawn_session(controller: Arc<SessionController>, request: SessionRequest) -> SessionWorker {
    let (tx, rx) = mpsc::unbounded_channel();
    let span = tracing::info_span!("session_worker", prompt_len = request.prompt.len());

    let handle = tokio::spawn(
        async move {
            let result = match controller.start(&request) {
                Ok(stream) => drive(stream, &tx).await,
                Err(e) => Err(e),
            };
            if tx.send(SessionEvent::Finished(result)).is_err() {
                debug!("session result dropped, receiver gone");
            }
        }
        .instrument(span),
    );

    SessionWorker { events: rx, handle }
}

async fn drive(
    mut stream: SessionStream,
    tx: &mpsc::UnboundedSender<SessionEvent>,
) -> CodexResult<SessionOutcome> {
    let mut forwarding = true;
    while let Some(line) = stream.next_line().await? {
        if forwarding && tx.send(SessionEvent::Line(line)).is_err() {
            debug!(session_id = %stream.session_id(), "receiver gone, draining output");
            forwarding = false;
        }
    }
    stream.outcome().ok_or_else(|| {
        CodexError::Io(std::io::Error::other(
            "Codex session ended without an exit status",
        ))
    })
}

/// Run a one-shot command on a background task.
pub fn spawn_one_shot(
    controller: Arc<SessionController>,
    command: CommandVector,
    cwd: Option<PathBuf>,
    timeout_secs: Option<f64>,
) -> JoinHandle<CodexResult<Vec<String>>> {
    tokio::spawn(async move {
        controller
            .run_one_shot(&command, cwd.as_deref(), timeout_secs)
            .await
    })
}
