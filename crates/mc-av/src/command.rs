//! A single transcoder invocation that can be stopped from outside.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

use mc_core::{Error, Result};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

/// Number of stderr lines kept for error reports.
const STDERR_TAIL: usize = 5;

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub status: ExitStatus,
    /// Final non-empty stderr lines.
    pub stderr_tail: String,
}

/// Program plus arguments, optionally bound to a cancellation token.
///
/// Stdin is closed and stdout is discarded; the transcoder writes its output
/// to files named in the arguments. The child is killed if the token fires
/// or the `execute` future is dropped.
///
/// ```no_run
/// use mc_av::ToolCommand;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> mc_core::Result<()> {
/// let token = CancellationToken::new();
/// ToolCommand::new("/usr/bin/ffmpeg")
///     .args(["-i", "in.mkv", "-f", "null", "-"])
///     .cancel_on(token.clone())
///     .execute()
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<OsString>,
    cancel: Option<CancellationToken>,
}

impl ToolCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cancel: None,
        }
    }

    pub fn arg(&mut self, arg: impl Into<OsString>) -> &mut Self {
        self.args.push(arg.into());
        self
    }

    pub fn args(&mut self, args: impl IntoIterator<Item = impl Into<OsString>>) -> &mut Self {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn cancel_on(&mut self, token: CancellationToken) -> &mut Self {
        self.cancel = Some(token);
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn tool_name(&self) -> String {
        self.program
            .file_name()
            .unwrap_or(self.program.as_os_str())
            .to_string_lossy()
            .into_owned()
    }

    /// Run to completion.
    ///
    /// # Errors
    ///
    /// [`Error::Cancelled`] when the token fires first; [`Error::Tool`] when
    /// the program cannot be spawned or exits unsuccessfully, with the tail
    /// of its stderr in the message.
    pub async fn execute(&self) -> Result<ToolOutput> {
        let tool = self.tool_name();

        let child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::tool(&tool, format!("failed to spawn: {e}")))?;

        let cancelled = async {
            match &self.cancel {
                Some(token) => token.cancelled().await,
                None => std::future::pending().await,
            }
        };

        // Losing the race drops the child, which kills it.
        let waited = tokio::select! {
            output = child.wait_with_output() => output,
            () = cancelled => return Err(Error::Cancelled(format!("{tool} was stopped"))),
        };
        let output =
            waited.map_err(|e| Error::tool(&tool, format!("failed waiting for exit: {e}")))?;

        let stderr_tail = last_lines(&String::from_utf8_lossy(&output.stderr), STDERR_TAIL);
        if !output.status.success() {
            return Err(Error::tool(
                tool,
                format!("exited with {}: {stderr_tail}", output.status),
            ));
        }

        Ok(ToolOutput {
            status: output.status,
            stderr_tail,
        })
    }
}

/// Last `n` non-empty lines; transcoders print a long banner before the
/// actual error.
fn last_lines(text: &str, n: usize) -> String {
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    lines[lines.len().saturating_sub(n)..].join("\n")
}
