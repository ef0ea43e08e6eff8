// src/command.rs

use std::process::Stdio;
use tokio::process::Command as TokioCommand;
use which::which;

use crate::error::LookupError;

/// Runs `program` with `args` and returns its stdout.
///
/// The program is resolved on `PATH` first so a missing tool reports as such
/// rather than as a spawn error.
pub async fn run_listing(program: &str, args: &[&str]) -> Result<String, LookupError> {
    let path = which(program).map_err(|_| LookupError::MissingCommand { program: program.to_string() })?;

    tracing::debug!(program, ?args, path = %path.display(), "running routing command");

    let output = TokioCommand::new(&path)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|source| LookupError::CommandSpawn { program: program.to_string(), source })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(LookupError::CommandFailure {
            program: program.to_string(),
            status: output.status,
            stderr,
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
