//! Running external tools.
//!
//! Both `curl` and `pdftotext` are invoked through [`run`]: the process runs
//! to completion with stdout/stderr captured, and a non-zero exit becomes
//! [`ExtractError::CommandFailed`] carrying both streams.

use crate::error::ExtractError;
use std::ffi::OsString;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Captured output of a successful command.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Render `program args…` for logs and error messages.
pub fn display_command(program: &str, args: &[OsString]) -> String {
    let mut parts = Vec::with_capacity(args.len() + 1);
    parts.push(program.to_string());
    parts.extend(args.iter().map(|a| a.to_string_lossy().into_owned()));
    parts.join(" ")
}

/// Run `program` with `args`, wait for it, and fail on a non-zero exit.
pub async fn run(program: &str, args: &[OsString]) -> Result<CommandOutput, ExtractError> {
    let command_line = display_command(program, args);
    debug!("Running: {}", command_line);

    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| ExtractError::CommandSpawn {
            program: program.to_string(),
            source: e,
        })?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    if !output.status.success() {
        return Err(ExtractError::CommandFailed {
            command: command_line,
            status: output.status,
            stdout,
            stderr,
        });
    }

    debug!("{} exited with {}", program, output.status);
    Ok(CommandOutput { stdout, stderr })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<OsString> {
        list.iter().map(OsString::from).collect()
    }

    #[test]
    fn display_joins_program_and_args() {
        assert_eq!(
            display_command("pdftotext", &args(&["-layout", "-nopgbrk", "a.pdf", "a.txt"])),
            "pdftotext -layout -nopgbrk a.pdf a.txt"
        );
        assert_eq!(display_command("true", &[]), "true");
    }

    #[test]
    fn missing_program_is_spawn_error() {
        let result = tokio_test::block_on(run("definitely-not-a-real-tool-4821", &[]));
        match result {
            Err(ExtractError::CommandSpawn { program, .. }) => {
                assert_eq!(program, "definitely-not-a-real-tool-4821")
            }
            other => panic!("expected CommandSpawn, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_zero_exit_captures_streams() {
        let result = run("sh", &args(&["-c", "echo out; echo err >&2; exit 3"])).await;
        match result {
            Err(ExtractError::CommandFailed {
                command,
                status,
                stdout,
                stderr,
            }) => {
                assert!(command.starts_with("sh -c"));
                assert_eq!(status.code(), Some(3));
                assert_eq!(stdout.trim(), "out");
                assert_eq!(stderr.trim(), "err");
            }
            other => panic!("expected CommandFailed, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn zero_exit_returns_output() {
        let out = run("sh", &args(&["-c", "echo hello"])).await.unwrap();
        assert_eq!(out.stdout.trim(), "hello");
        assert!(out.stderr.is_empty());
    }
}
