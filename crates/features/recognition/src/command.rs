//! Runs external OCR tooling under a deadline.

use crate::error::{RecognitionError, RecognitionErrorExt};
use std::io::ErrorKind;
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Longest stderr excerpt carried into error messages.
const STDERR_EXCERPT: usize = 512;

/// Spawns `cmd`, waits for it, and collects stdout/stderr.
///
/// The child is killed if the deadline passes or the caller is dropped.
/// A binary that cannot be found maps to [`RecognitionError::EngineUnavailable`].
pub(crate) async fn run(mut cmd: Command, timeout: Duration) -> Result<Output, RecognitionError> {
    let program = cmd.as_std().get_program().to_string_lossy().into_owned();
    cmd.stdin(Stdio::null()).stdout(Stdio::piped()).stderr(Stdio::piped()).kill_on_drop(true);

    debug!(program = %program, timeout_s = timeout.as_secs(), "Spawning tool");

    let child = match cmd.spawn() {
        Ok(child) => child,
        Err(err) if matches!(err.kind(), ErrorKind::NotFound | ErrorKind::PermissionDenied) => {
            return Err(RecognitionError::EngineUnavailable { binary: program, context: None });
        },
        Err(err) => return Err(err).context(format!("Spawning {program}")),
    };

    match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(output) => output.context(format!("Waiting for {program}")),
        Err(_) => Err(RecognitionError::Timeout { seconds: timeout.as_secs(), context: Some(program.into()) }),
    }
}

/// Exit status plus the tail of stderr, for error messages.
pub(crate) fn failure_message(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    let excerpt = match stderr.char_indices().nth_back(STDERR_EXCERPT) {
        Some((idx, _)) => &stderr[idx..],
        None => stderr,
    };

    if excerpt.is_empty() { output.status.to_string() } else { format!("{}: {excerpt}", output.status) }
}
