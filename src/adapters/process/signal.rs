//! Graceful and forced termination by process id.
//!
//! Signalling by pid lets `stop()` reach a process whose handle is busy in
//! another task's `wait()`.

use std::process::ExitStatus;

use tracing::warn;

/// Ask the process to exit (SIGTERM).
#[cfg(unix)]
pub async fn terminate(pid: u32) {
    send(pid, nix::sys::signal::Signal::SIGTERM);
}

/// Kill the process outright (SIGKILL).
#[cfg(unix)]
pub async fn kill(pid: u32) {
    send(pid, nix::sys::signal::Signal::SIGKILL);
}

#[cfg(unix)]
fn send(pid: u32, signal: nix::sys::signal::Signal) {
    use nix::unistd::Pid;

    let Ok(raw) = i32::try_from(pid) else {
        warn!(pid, "pid out of range, not signalling");
        return;
    };
    if let Err(errno) = nix::sys::signal::kill(Pid::from_raw(raw), signal) {
        warn!(pid, ?signal, error = %errno, "failed to signal process");
    }
}

/// Ask the process to exit (`taskkill` without `/F`).
#[cfg(not(unix))]
pub async fn terminate(pid: u32) {
    taskkill(pid, false).await;
}

/// Kill the process outright (`taskkill /F`).
#[cfg(not(unix))]
pub async fn kill(pid: u32) {
    taskkill(pid, true).await;
}

#[cfg(not(unix))]
async fn taskkill(pid: u32, force: bool) {
    let mut cmd = tokio::process::Command::new("taskkill");
    if force {
        cmd.arg("/F");
    }
    cmd.args(["/T", "/PID", &pid.to_string()])
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null());
    match cmd.status().await {
        Ok(status) if status.success() => {}
        Ok(status) => warn!(pid, ?status, "taskkill reported failure"),
        Err(err) => warn!(pid, error = %err, "failed to run taskkill"),
    }
}

/// Exit code of a finished process; signal deaths report the negated
/// signal number.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return -signal;
        }
    }
    -1
}
