//! External executable lookup and invocation.

use std::path::PathBuf;
use std::process::Output;

use tokio::process::Command;
use tracing::{debug, info};
use vinascreen_common::{Result, ScreenError};

/// Resolve `tool` (a name on PATH or an explicit path) to an executable.
pub fn ensure_available(tool: &str) -> Result<PathBuf> {
    match which::which(tool) {
        Ok(path) => {
            info!("Found {} at {}", tool, path.display());
            Ok(path)
        }
        Err(_) => Err(ScreenError::ToolUnavailable {
            tool: tool.to_string(),
        }),
    }
}

/// Run `command` to completion; a nonzero exit becomes [`ScreenError::Invocation`].
pub(crate) async fn run_checked(tool: &str, command: &mut Command) -> Result<Output> {
    debug!("Invoking {:?}", command.as_std());

    let output = command.output().await.map_err(|source| ScreenError::Spawn {
        tool: tool.to_string(),
        source,
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ScreenError::Invocation {
            tool: tool.to_string(),
            status: output.status.to_string(),
            stderr: stderr.trim().to_string(),
        });
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_tool_is_unavailable() {
        let err = ensure_available("vinascreen-no-such-binary-x9").unwrap_err();
        assert!(matches!(err, ScreenError::ToolUnavailable { tool } if tool == "vinascreen-no-such-binary-x9"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_nonzero_exit_is_invocation_error() {
        let mut command = Command::new("sh");
        command.arg("-c").arg("echo broken >&2; exit 3");
        let err = run_checked("sh", &mut command).await.unwrap_err();
        match err {
            ScreenError::Invocation { tool, stderr, .. } => {
                assert_eq!(tool, "sh");
                assert_eq!(stderr, "broken");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_spawn_failure() {
        let mut command = Command::new("/nonexistent/vinascreen/tool");
        let err = run_checked("tool", &mut command).await.unwrap_err();
        assert!(matches!(err, ScreenError::Spawn { .. }));
    }
}
