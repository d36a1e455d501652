use chrono::Utc;
use log::info;
use rusqlite::{params, Connection};

use crate::db::record::state::JobStatus;
use crate::db::record::JobRecord;
use crate::slurm::sbatch::SchedulerId;

impl JobRecord {
    /// Record a successful submission
    ///
    /// Upserts on the InChI: a record that disappeared from the store since it was selected is
    /// registered again as launched.
    pub fn launch(&self, conn: &Connection, job_id: &SchedulerId) -> rusqlite::Result<()> {
        let state = JobStatus::Launched;
        info!(
            "Updating {} with job id {job_id} and state {state}",
            self.aug_inchi
        );
        let launched_at = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT INTO registration (aug_inchi, status, job_id, launched_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(aug_inchi) DO UPDATE SET
                status = excluded.status,
                job_id = excluded.job_id,
                launched_at = excluded.launched_at",
            params![self.aug_inchi, state, job_id.as_str(), launched_at],
        )?;

        Ok(())
    }
}
