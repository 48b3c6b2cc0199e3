//! Blocking invocation of external tools located on `PATH`.

use std::process::{Command, Stdio};

use crate::error::ToolError;

/// Run `program` with `args` and return its stdout.
///
/// Blocks until the process exits; no timeout is applied beyond the tool's
/// own defaults. Non-zero exit is reported with the captured stderr.
pub(crate) fn run(program: &str, args: &[&str]) -> Result<String, ToolError> {
    let executable = which::which(program).map_err(|source| ToolError::NotFound {
        program: program.to_owned(),
        source,
    })?;
    tracing::debug!(program, ?args, "running external tool");

    let output = Command::new(&executable)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .map_err(|source| ToolError::Spawn {
            program: program.to_owned(),
            source,
        })?;

    if !output.status.success() {
        return Err(ToolError::Failed {
            program: program.to_owned(),
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Take the digest from a line-oriented tool report.
///
/// The digest is the second-to-last `\n`-separated line; the last is the
/// empty remainder after the trailing newline.
pub(crate) fn digest_line(program: &str, output: &str) -> Result<String, ToolError> {
    let lines: Vec<&str> = output.split('\n').collect();
    let malformed = || ToolError::MalformedOutput {
        program: program.to_owned(),
        lines: lines.len(),
    };
    if lines.len() < 2 {
        return Err(malformed());
    }
    let digest = lines[lines.len() - 2].trim();
    if digest.is_empty() {
        return Err(malformed());
    }
    Ok(digest.to_owned())
}
