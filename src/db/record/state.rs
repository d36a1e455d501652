use std::fmt;
use std::str::FromStr;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use thiserror::Error;

/// A simple way to keep track of job state.
///
/// The launcher only knows two states: created (input files written by the job creator) and
/// launched (after sbatch accepted the job). Jobs that fail to submit stay created and are picked
/// up again on the next run.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum JobStatus {
    Created,
    Launched,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown job status {0:?}")]
pub struct UnknownStatus(pub String);

impl JobStatus {
    /// Status strings shared with the job creator, don't change these
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Created => "job_created",
            JobStatus::Launched => "job_launched",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "job_created" => Ok(JobStatus::Created),
            "job_launched" => Ok(JobStatus::Launched),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

impl ToSql for JobStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for JobStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|err| FromSqlError::Other(Box::new(err)))
    }
}
