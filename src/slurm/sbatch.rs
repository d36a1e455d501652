use std::fmt;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use log::info;
use thiserror::Error;
use tokio::process::Command;

use crate::slurm::job_path::{JobPath, SUBMISSION_SCRIPT};

/// sbatch prints e.g. "Submitted batch job 5022607" on success
const SUBMITTED_PREFIX: &str = "Submitted batch job ";

/// Job id assigned by SLURM
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerId(String);

impl SchedulerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SchedulerId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reasons a single job couldn't be submitted
///
/// None of these are fatal for a launch pass: the job keeps its created status and is retried on
/// the next run.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("failed to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    /// The submission command was killed after the timeout.
    ///
    /// Only the direct child is killed. If sbatch had already queued the job before it stalled,
    /// the record stays created and the next run submits it a second time.
    #[error("scheduler did not answer within {0:?}")]
    TimedOut(Duration),
    #[error("scheduler reported an error: {0}")]
    Stderr(String),
    #[error("scheduler exited with {0}")]
    ExitStatus(ExitStatus),
    #[error("unexpected scheduler output: {0:?}")]
    MalformedOutput(String),
}

/// Submits job directories with sbatch
///
/// The job directory is passed to each child process explicitly, the launcher never changes its
/// own working directory.
#[derive(Debug, Clone)]
pub struct Scheduler {
    pub command: String,
    pub timeout: Duration,
}

impl Scheduler {
    pub fn new(command: impl Into<String>, timeout: Duration) -> Scheduler {
        Scheduler { command: command.into(), timeout }
    }

    /// Run `sbatch submit.sl` from the job directory and wait for it to finish
    pub async fn submit(&self, job: &JobPath) -> Result<SchedulerId, SubmitError> {
        let mut cmd = Command::new(&self.command);
        cmd.arg(SUBMISSION_SCRIPT)
            .current_dir(&job.path)
            .stdin(Stdio::null())
            .kill_on_drop(true);
        info!("Running {} {} in {}", self.command, SUBMISSION_SCRIPT, job.path.display());

        // a timed out child is dropped with the future and killed
        let output = match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(output) => output.map_err(|source| SubmitError::Spawn {
                command: self.command.clone(),
                source,
            })?,
            Err(_) => return Err(SubmitError::TimedOut(self.timeout)),
        };

        if !output.stderr.is_empty() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SubmitError::Stderr(stderr.trim().to_string()));
        }
        if !output.status.success() {
            return Err(SubmitError::ExitStatus(output.status));
        }

        parse_scheduler_id(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Extract the job id from sbatch stdout
///
/// Anything other than the prefix followed by a number is rejected, so a change in sbatch output
/// can't end up stored as a job id.
pub fn parse_scheduler_id(stdout: &str) -> Result<SchedulerId, SubmitError> {
    let trimmed = stdout.trim();
    match trimmed.strip_prefix(SUBMITTED_PREFIX).map(str::trim) {
        Some(id) if !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()) => {
            Ok(SchedulerId(id.to_string()))
        }
        _ => Err(SubmitError::MalformedOutput(trimmed.to_string())),
    }
}
