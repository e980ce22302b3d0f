//! Process Session Controller
//!
//! Owns the single slot for a running Codex CLI process. Streaming sessions
//! hand their stdout to the caller line by line through [`SessionStream`];
//! one-shot commands (login, credit redemption) run to completion and return
//! every line at once.
//!
//! `stop()` may be called from any task while another task is reading the
//! stream. It marks the session as terminated before signalling, so the
//! reader sees a cancellation instead of a failure.

use std::io;
use std::path::Path;
use std::process::ExitStatus;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::Stream;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tokio::process::{Child, ChildStderr, ChildStdout};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::adapters::process::signal;
use crate::adapters::process::TokioProcessSpawner;
use crate::domain::errors::{CodexError, CodexResult};
use crate::domain::models::{
    CommandVector, OneShotCommand, RuntimeSettings, SessionConfig, SessionOutcome, SessionRequest,
    SessionState,
};
use crate::domain::ports::ProcessSpawner;
use crate::services::command_builder::{base_command, build_session_command};

/// Default time a process gets to exit after SIGTERM before it is killed.
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(5);

type Slot = Arc<Mutex<Option<Arc<ActiveSession>>>>;

fn lock(slot: &Mutex<Option<Arc<ActiveSession>>>) -> MutexGuard<'_, Option<Arc<ActiveSession>>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Clear the slot if it still belongs to session `id`.
fn release(slot: &Mutex<Option<Arc<ActiveSession>>>, id: Uuid) {
    let mut current = lock(slot);
    if current.as_ref().is_some_and(|session| session.id == id) {
        *current = None;
        debug!(session_id = %id, "released session slot");
    }
}

/// The process currently occupying the slot.
struct ActiveSession {
    id: Uuid,
    pid: Option<u32>,
    program: String,
    child: tokio::sync::Mutex<Child>,
    terminated: AtomicBool,
    reaped: AtomicBool,
    phase: Mutex<SessionState>,
}

impl ActiveSession {
    fn phase(&self) -> SessionState {
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_phase(&self, phase: SessionState) {
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner) = phase;
    }

    fn is_terminated(&self) -> bool {
        self.terminated.load(Ordering::SeqCst)
    }

    /// Wait for exit. Safe to call from several tasks; the status is cached
    /// after the first successful wait.
    async fn wait(&self) -> io::Result<ExitStatus> {
        let mut child = self.child.lock().await;
        let status = child.wait().await?;
        self.reaped.store(true, Ordering::SeqCst);
        Ok(status)
    }

    async fn terminate(&self) {
        if let Some(pid) = self.live_pid() {
            signal::terminate(pid).await;
        }
    }

    async fn kill(&self) {
        if let Some(pid) = self.live_pid() {
            signal::kill(pid).await;
        }
    }

    /// The pid, unless the process has already been reaped and the id may
    /// have been reused.
    fn live_pid(&self) -> Option<u32> {
        if self.reaped.load(Ordering::SeqCst) {
            None
        } else {
            self.pid
        }
    }
}

struct Launched {
    session: Arc<ActiveSession>,
    stdout: ChildStdout,
    stderr: ChildStderr,
}

/// Supervises at most one Codex CLI process at a time.
///
/// Instances are independent of each other; share one behind an `Arc` to
/// drive a stream on a worker task while calling [`stop`](Self::stop) from
/// another.
pub struct SessionController {
    spawner: Arc<dyn ProcessSpawner>,
    grace_period: Duration,
    slot: Slot,
}

impl SessionController {
    pub fn new(spawner: Arc<dyn ProcessSpawner>, grace_period: Duration) -> Self {
        Self {
            spawner,
            grace_period,
            slot: Arc::new(Mutex::new(None)),
        }
    }

    /// Controller using the tokio spawner and the configured grace period.
    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(Arc::new(TokioProcessSpawner::new()), config.grace_period())
    }

    pub fn grace_period(&self) -> Duration {
        self.grace_period
    }

    pub fn state(&self) -> SessionState {
        lock(&self.slot)
            .as_ref()
            .map_or(SessionState::Idle, |session| session.phase())
    }

    pub fn is_active(&self) -> bool {
        lock(&self.slot).is_some()
    }

    /// Start a streaming session for `request`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&self, request: &SessionRequest) -> CodexResult<SessionStream> {
        let command = build_session_command(request);
        self.start_command(&command, request.cwd())
    }

    /// Start a streaming session for an already built command line.
    pub fn start_command(
        &self,
        command: &CommandVector,
        cwd: Option<&Path>,
    ) -> CodexResult<SessionStream> {
        let Launched {
            session,
            stdout,
            stderr,
        } = self.launch(command, cwd)?;

        let stderr_task = tokio::spawn(read_all(stderr));
        session.set_phase(SessionState::Streaming);

        Ok(SessionStream {
            session,
            slot: Arc::clone(&self.slot),
            stdout: Some(BufReader::new(stdout)),
            stderr_task: Some(stderr_task),
            buf: Vec::new(),
            outcome: None,
            finished: false,
        })
    }

    /// Check the slot and spawn while holding it, so two concurrent starts
    /// can never both see it empty.
    fn launch(&self, command: &CommandVector, cwd: Option<&Path>) -> CodexResult<Launched> {
        let mut slot = lock(&self.slot);
        if let Some(active) = slot.as_ref() {
            warn!(session_id = %active.id, "rejected start, a Codex session is already running");
            return Err(CodexError::AlreadyRunning);
        }

        let program = command.program().ok_or(CodexError::EmptyCommand)?.to_string();
        let mut child = self
            .spawner
            .spawn(command, cwd)
            .map_err(|source| CodexError::LaunchFailed {
                program: program.clone(),
                source,
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::other("child stdout was not piped"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| io::Error::other("child stderr was not piped"))?;

        let session = Arc::new(ActiveSession {
            id: Uuid::new_v4(),
            pid: child.id(),
            program,
            child: tokio::sync::Mutex::new(child),
            terminated: AtomicBool::new(false),
            reaped: AtomicBool::new(false),
            phase: Mutex::new(SessionState::Starting),
        });
        *slot = Some(Arc::clone(&session));

        info!(
            session_id = %session.id,
            pid = ?session.pid,
            argv = %command.display(),
            "started Codex process"
        );

        Ok(Launched {
            session,
            stdout,
            stderr,
        })
    }

    /// Stop the active process, if any.
    ///
    /// Sends SIGTERM, waits up to the grace period, then kills. The slot is
    /// cleared afterwards however the process ended. Returns `false` when
    /// nothing was running.
    pub async fn stop(&self) -> bool {
        let Some(session) = lock(&self.slot).clone() else {
            debug!("stop requested with no active session");
            return false;
        };

        session.terminated.store(true, Ordering::SeqCst);
        info!(session_id = %session.id, pid = ?session.pid, "stopping Codex process");
        session.terminate().await;

        match tokio::time::timeout(self.grace_period, session.wait()).await {
            Ok(Ok(status)) => {
                info!(session_id = %session.id, exit_code = signal::exit_code(status), "Codex process exited");
            }
            Ok(Err(e)) => warn!(session_id = %session.id, error = %e, "failed waiting for Codex process"),
            Err(_) => {
                warn!(
                    session_id = %session.id,
                    grace_period = ?self.grace_period,
                    "Codex process ignored SIGTERM, killing"
                );
                session.kill().await;
                match session.wait().await {
                    Ok(status) => info!(session_id = %session.id, exit_code = signal::exit_code(status), "Codex process killed"),
                    Err(e) => warn!(session_id = %session.id, error = %e, "failed waiting for killed Codex process"),
                }
            }
        }

        release(&self.slot, session.id);
        true
    }

    /// Run a command to completion and return its stdout lines.
    ///
    /// The timeout, if given, must be a positive number of seconds; it is
    /// checked before anything is spawned. A `stop()` during the run yields
    /// the lines captured so far.
    pub async fn run_one_shot(
        &self,
        command: &CommandVector,
        cwd: Option<&Path>,
        timeout_secs: Option<f64>,
    ) -> CodexResult<Vec<String>> {
        let limit = timeout_secs.map(validate_timeout).transpose()?;

        let Launched {
            session,
            stdout,
            stderr,
        } = self.launch(command, cwd)?;
        session.set_phase(SessionState::Streaming);

        let collect = async {
            let (out, err) = tokio::try_join!(read_all(stdout), read_all(stderr))?;
            let status = session.wait().await?;
            Ok::<_, io::Error>((out, err, status))
        };

        let result = match limit {
            Some(limit) => match tokio::time::timeout(limit, collect).await {
                Ok(result) => result,
                Err(_) => {
                    let timeout_secs = limit.as_secs_f64();
                    warn!(session_id = %session.id, timeout_secs, "one-shot command timed out, killing");
                    session.kill().await;
                    if let Err(e) = session.wait().await {
                        warn!(session_id = %session.id, error = %e, "failed waiting for killed process");
                    }
                    release(&self.slot, session.id);
                    return Err(CodexError::CliTimeout { timeout_secs });
                }
            },
            None => collect.await,
        };

        session.set_phase(SessionState::Finalizing);
        release(&self.slot, session.id);

        let (out, err, status) = result?;
        let exit_code = signal::exit_code(status);
        let lines: Vec<String> = out.lines().map(str::to_string).collect();

        if session.is_terminated() {
            info!(session_id = %session.id, exit_code, "one-shot command stopped");
            return Ok(lines);
        }
        if !status.success() {
            warn!(session_id = %session.id, program = %session.program, exit_code, "one-shot command failed");
            return Err(CodexError::CliExit {
                exit_code,
                stderr: err,
            });
        }

        debug!(session_id = %session.id, lines = lines.len(), "one-shot command finished");
        Ok(lines)
    }

    /// Run `codex --login`.
    pub async fn login(
        &self,
        settings: &RuntimeSettings,
        timeout_secs: Option<f64>,
    ) -> CodexResult<Vec<String>> {
        self.run_command(OneShotCommand::Login, settings, timeout_secs)
            .await
    }

    /// Run `codex --free`, bounded by `settings.redeem_timeout` (30 s when unset).
    pub async fn redeem_credits(&self, settings: &RuntimeSettings) -> CodexResult<Vec<String>> {
        self.run_command(OneShotCommand::RedeemCredits, settings, Some(settings.redeem_timeout_secs()))
            .await
    }

    pub async fn run_command(
        &self,
        kind: OneShotCommand,
        settings: &RuntimeSettings,
        timeout_secs: Option<f64>,
    ) -> CodexResult<Vec<String>> {
        let command = base_command(settings).with_trailing(kind.flag());
        info!(command = %kind, "running one-shot command");
        self.run_one_shot(&command, None, timeout_secs).await
    }
}

impl Default for SessionController {
    fn default() -> Self {
        Self::new(Arc::new(TokioProcessSpawner::new()), DEFAULT_GRACE_PERIOD)
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        let Some(session) = lock(&self.slot).take() else {
            return;
        };
        let child = session.child.try_lock();
        if let Ok(mut child) = child {
            if let Err(e) = child.start_kill() {
                debug!(session_id = %session.id, error = %e, "could not kill child on drop");
            }
        }
    }
}

fn validate_timeout(secs: f64) -> CodexResult<Duration> {
    if !(secs.is_finite() && secs > 0.0) {
        return Err(CodexError::InvalidTimeout(secs));
    }
    Duration::try_from_secs_f64(secs).map_err(|_| CodexError::InvalidTimeout(secs))
}

async fn read_all<R: AsyncRead + Unpin>(mut reader: R) -> io::Result<String> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf).await?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// The stdout of a running session, one line at a time.
///
/// Not restartable. Dropping an unfinished stream closes its pipes and
/// leaves a background task waiting for the process, which frees the slot
/// once the process exits.
pub struct SessionStream {
    session: Arc<ActiveSession>,
    slot: Slot,
    stdout: Option<BufReader<ChildStdout>>,
    stderr_task: Option<JoinHandle<io::Result<String>>>,
    buf: Vec<u8>,
    outcome: Option<SessionOutcome>,
    finished: bool,
}

impl SessionStream {
    pub fn session_id(&self) -> Uuid {
        self.session.id
    }

    pub fn pid(&self) -> Option<u32> {
        self.session.pid
    }

    /// Set once the process has exited without failing.
    pub fn outcome(&self) -> Option<SessionOutcome> {
        self.outcome
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Next stdout line without its line ending.
    ///
    /// `Ok(None)` once the process has exited successfully or was stopped,
    /// and on every call after that. A non-zero exit that was not requested
    /// through `stop()` is returned as [`CodexError::CliExit`].
    pub async fn next_line(&mut self) -> CodexResult<Option<String>> {
        if self.finished {
            return Ok(None);
        }
        let Some(reader) = self.stdout.as_mut() else {
            return self.finish().await.map(|_| None);
        };

        self.buf.clear();
        match reader.read_until(b'\n', &mut self.buf).await {
            Ok(0) => {
                self.stdout = None;
                self.finish().await.map(|_| None)
            }
            Ok(_) => {
                if self.buf.last() == Some(&b'\n') {
                    self.buf.pop();
                    if self.buf.last() == Some(&b'\r') {
                        self.buf.pop();
                    }
                }
                Ok(Some(String::from_utf8_lossy(&self.buf).into_owned()))
            }
            Err(e) => {
                warn!(session_id = %self.session.id, error = %e, "failed reading Codex output");
                self.stdout = None;
                match self.finish().await? {
                    outcome if outcome.is_cancelled() => Ok(None),
                    _ => Err(CodexError::Io(e)),
                }
            }
        }
    }

    /// Drain stderr, wait for exit exactly once, and free the slot.
    async fn finish(&mut self) -> CodexResult<SessionOutcome> {
        self.finished = true;
        self.session.set_phase(SessionState::Finalizing);

        let stderr = match self.stderr_task.take() {
            Some(task) => match task.await {
                Ok(Ok(text)) => text,
                Ok(Err(e)) => {
                    warn!(session_id = %self.session.id, error = %e, "failed reading Codex stderr");
                    String::new()
                }
                Err(e) => {
                    warn!(session_id = %self.session.id, error = %e, "stderr reader task failed");
                    String::new()
                }
            },
            None => String::new(),
        };

        let status = self.session.wait().await;
        release(&self.slot, self.session.id);
        let status = status?;
        let exit_code = signal::exit_code(status);

        let outcome = if self.session.is_terminated() {
            SessionOutcome::Cancelled { exit_code }
        } else if status.success() {
            SessionOutcome::Completed { exit_code }
        } else {
            warn!(session_id = %self.session.id, exit_code, "Codex process failed");
            return Err(CodexError::CliExit { exit_code, stderr });
        };

        info!(session_id = %self.session.id, ?outcome, "Codex session finished");
        self.outcome = Some(outcome);
        Ok(outcome)
    }

    /// Adapt into a [`Stream`] of lines. The stream ends after the first
    /// error.
    pub fn into_stream(self) -> impl Stream<Item = CodexResult<String>> + Send {
        futures::stream::unfold(Some(self), |state| async move {
            let mut stream = state?;
            match stream.next_line().await {
                Ok(Some(line)) => Some((Ok(line), Some(stream))),
                Ok(None) => None,
                Err(e) => Some((Err(e), None)),
            }
        })
    }
}

impl Drop for SessionStream {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        self.stdout = None;
        if let Some(task) = self.stderr_task.take() {
            task.abort();
        }

        let session = Arc::clone(&self.session);
        let slot = Arc::clone(&self.slot);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                debug!(session_id = %session.id, "session stream abandoned, reaping in background");
                handle.spawn(async move {
                    match session.wait().await {
                        Ok(status) => debug!(session_id = %session.id, exit_code = signal::exit_code(status), "reaped abandoned session"),
                        Err(e) => warn!(session_id = %session.id, error = %e, "failed reaping abandoned session"),
                    }
                    release(&slot, session.id);
                });
            }
            Err(_) => {
                warn!(session_id = %session.id, "no runtime to reap abandoned session, releasing slot");
                release(&slot, session.id);
            }
        }
    }
}
