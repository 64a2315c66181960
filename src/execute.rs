use crate::command::ResolvedCommand;
use anyhow::Context;
use anyhow::Result;
use serde::Deserialize;
use serde::Serialize;
use std::path::Path;
use std::process::Stdio;
use tokio::io::AsyncBufReadExt;
use tokio::io::AsyncRead;
use tokio::io::AsyncWriteExt;
use tokio::io::BufReader;
use tokio::process::Command;
use tracing::Instrument;

/// Exit record for one resolved command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandOutcome {
  pub line: String,
  pub exit_code: Option<i32>,
  pub success: bool,
}

/// Execution collaborator interface.
///
/// Receives one experiment's resolved command sequence plus the path its
/// stdout log should accumulate into, and reports per-command outcomes. The
/// engine only requires that a single experiment's commands run in declared
/// order and that the sequence stops at the first failure (later commands may
/// depend on files produced by earlier ones). Scheduling across experiments,
/// retries, and timeouts are all the implementor's policy.
pub trait Executor {
  fn execute(
    &self,
    commands: &[ResolvedCommand],
    log_file: &Path,
  ) -> impl Future<Output = Result<Vec<CommandOutcome>>>;
}

/// Runs commands as local child processes through `sh -c`.
///
/// Each command's stdout is appended to the experiment log file; stderr lines
/// are forwarded to the tracing subscriber as they arrive.
#[derive(Debug, Clone, Default)]
pub struct LocalExecutor;

impl Executor for LocalExecutor {
  async fn execute(
    &self,
    commands: &[ResolvedCommand],
    log_file: &Path,
  ) -> Result<Vec<CommandOutcome>> {
    let mut log = tokio::fs::OpenOptions::new()
      .create(true)
      .append(true)
      .open(log_file)
      .await
      .with_context(|| format!("Failed to open log file {}", log_file.display()))?;

    let mut outcomes = Vec::with_capacity(commands.len());

    for command in commands {
      let span = tracing::info_span!("run_command", cmd = %command.line);

      let outcome = async {
        tracing::debug!(dir = %command.working_dir.display(), "Spawning command");

        let mut child = Command::new("sh")
          .arg("-c")
          .arg(&command.line)
          .current_dir(&command.working_dir)
          .stdin(Stdio::null())
          .stdout(Stdio::piped())
          .stderr(Stdio::piped())
          .kill_on_drop(true)
          .spawn()
          .with_context(|| format!("Failed to spawn command: {}", command.line))?;

        let stdout = child.stdout.take().context("Failed to pipe command stdout")?;
        let stderr = child.stderr.take().context("Failed to pipe command stderr")?;

        let stderr_task = tokio::spawn(
          read_and_log_stderr(stderr).instrument(tracing::info_span!("stderr_handler")),
        );

        let mut reader = BufReader::new(stdout).lines();
        while let Some(line) = reader
          .next_line()
          .await
          .context("Failed to read command stdout")?
        {
          log
            .write_all(line.as_bytes())
            .await
            .context("Failed to append to log file")?;
          log.write_all(b"\n").await.context("Failed to append to log file")?;
        }

        let status = child.wait().await.context("Failed to wait for command")?;
        stderr_task.await??;

        Ok::<CommandOutcome, anyhow::Error>(CommandOutcome {
          line: command.line.clone(),
          exit_code: status.code(),
          success: status.success(),
        })
      }
      .instrument(span)
      .await?;

      let success = outcome.success;
      outcomes.push(outcome);

      if !success {
        tracing::error!(cmd = %command.line, "Command failed; skipping remaining commands for this experiment");
        break;
      }
    }

    log.flush().await.context("Failed to flush log file")?;
    Ok(outcomes)
  }
}

/// Reads lines from a child's stderr and logs them.
async fn read_and_log_stderr<R: AsyncRead + Unpin>(stream: R) -> Result<()> {
  let mut reader = BufReader::new(stream).lines();

  while let Some(line) = reader
    .next_line()
    .await
    .context("Failed to read command stderr")?
  {
    tracing::warn!("{}", line);
  }
  Ok(())
}
