//! Job records as registered by the upstream job creator
//!
//! A record is keyed by its augmented InChI. The launcher only ever moves a record from
//! `job_created` to `job_launched`, it never deletes one.

use std::path::Path;

use rusqlite::Row;

use crate::db::record::state::JobStatus;
use crate::slurm::job_path::JobPath;

pub mod load;
pub mod state;
pub mod update;

#[derive(Debug, Clone, PartialEq)]
pub struct JobRecord {
    pub aug_inchi: String,
    pub status: JobStatus,
    /// Popularity of the species, higher counts are launched first. Not always a whole number.
    pub count: f64,
    /// SLURM job id, only set once the job is launched
    pub job_id: Option<String>,
}

impl JobRecord {
    pub fn job_path(&self, data_path: &Path) -> JobPath {
        JobPath::new(data_path, &self.aug_inchi)
    }

    /// Columns must be selected in the order of [`load::RECORD_COLUMNS`]
    fn from_row(row: &Row) -> rusqlite::Result<JobRecord> {
        Ok(JobRecord {
            aug_inchi: row.get(0)?,
            status: row.get(1)?,
            count: row.get(2)?,
            job_id: row.get(3)?,
        })
    }
}
