//! Select created jobs and submit them to SLURM
//!
//! A launch pass:
//! 1. loads the most popular created records
//! 2. keeps those whose input files are on disk
//! 3. runs `sbatch submit.sl` from each job directory
//! 4. stores the SLURM job id and marks the record launched
//!
//! A job that fails to submit is logged and left alone, it will be selected again next time.
//! Database errors end the pass.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{info, warn};
use rusqlite::Connection;

use crate::config::LauncherConfig;
use crate::db::record::load::get_launch_candidates;
use crate::db::record::JobRecord;
use crate::slurm::sbatch::Scheduler;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LaunchSummary {
    pub selected: usize,
    pub launched: usize,
    pub failed: usize,
}

/// Outcome of a selection: launchable records in launch order, and the candidates left behind
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Selection {
    pub targets: Vec<JobRecord>,
    pub excluded: Vec<Exclusion>,
}

/// A created record whose input files aren't on disk yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exclusion {
    pub aug_inchi: String,
    pub path: PathBuf,
    /// Never empty, lists every required file that is absent
    pub missing: Vec<&'static str>,
}

impl Exclusion {
    /// One warning per excluded record, however many files are missing
    fn report(&self) {
        warn!(
            "{} has status job_created, but {} not found in {}; \
             check the job creator if it isn't still writing input",
            self.aug_inchi,
            self.missing.join(" and "),
            self.path.display()
        );
    }
}

/// Pick up to `limit` created records that are ready to launch, most popular first
///
/// The limit applies before the file check, excluded records aren't replaced.
pub fn select_launch_target(conn: &Connection, data_path: &Path, limit: u32) -> Result<Selection> {
    let candidates = get_launch_candidates(conn, limit).context("Loading launch candidates")?;

    let mut selection = Selection::default();
    for record in candidates {
        let job_path = record.job_path(data_path);
        let missing = job_path.missing_files();
        if missing.is_empty() {
            selection.targets.push(record);
        } else {
            let exclusion = Exclusion { aug_inchi: record.aug_inchi, path: job_path.path, missing };
            exclusion.report();
            selection.excluded.push(exclusion);
        }
    }

    info!(
        "Selected {} targets to launch, {} waiting for input files",
        selection.targets.len(),
        selection.excluded.len()
    );
    Ok(selection)
}

pub async fn launch_jobs(conn: &Connection, config: &LauncherConfig) -> Result<LaunchSummary> {
    let targets = select_launch_target(conn, &config.data_path, config.limit)?.targets;
    let scheduler = Scheduler::new(config.sbatch.as_str(), config.timeout);
    let mut summary = LaunchSummary { selected: targets.len(), ..LaunchSummary::default() };

    for record in &targets {
        let job_path = record.job_path(&config.data_path);

        if config.dry_run {
            info!(
                "--dry-run set, not submitting {} from {}",
                record.aug_inchi,
                job_path.path.display()
            );
            continue;
        }

        match scheduler.submit(&job_path).await {
            Ok(job_id) => {
                record
                    .launch(conn, &job_id)
                    .with_context(|| format!("Updating {} after launch", record.aug_inchi))?;
                info!("Job id for {} is {}", record.aug_inchi, job_id);
                summary.launched += 1;
            }
            Err(err) => {
                warn!("Couldn't launch {}: {}", record.aug_inchi, err);
                summary.failed += 1;
            }
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use rusqlite::params;

    use super::*;
    use crate::db::open::open_in_memory;
    use crate::slurm::job_path::{JobPath, INPUT_FILE, SUBMISSION_SCRIPT};

    fn register(conn: &Connection, aug_inchi: &str, count: f64) {
        conn.execute(
            "INSERT INTO registration (aug_inchi, status, count) VALUES (?1, 'job_created', ?2)",
            params![aug_inchi, count],
        ).unwrap();
    }

    fn write_files(data_path: &Path, aug_inchi: &str, files: &[&str]) {
        let job = JobPath::new(data_path, aug_inchi);
        fs::create_dir_all(&job.path).unwrap();
        for file in files {
            fs::write(job.path.join(file), "").unwrap();
        }
    }

    fn ids(records: &[JobRecord]) -> Vec<&str> {
        records.iter().map(|r| r.aug_inchi.as_str()).collect()
    }

    #[test]
    fn excludes_jobs_without_input_files() {
        let dir = tempfile::tempdir().unwrap();
        let conn = open_in_memory().unwrap();
        register(&conn, "InChI=1S/CH4/h1H4", 10.0);
        register(&conn, "InChI=1S/H2O/h1H2", 8.0);
        register(&conn, "InChI=1S/H2/h1H", 6.0);
        write_files(dir.path(), "InChI=1S/CH4/h1H4", &[INPUT_FILE, SUBMISSION_SCRIPT]);
        write_files(dir.path(), "InChI=1S/H2O/h1H2", &[INPUT_FILE]);

        let selection = select_launch_target(&conn, dir.path(), 10).unwrap();
        assert_eq!(ids(&selection.targets), ["InChI=1S/CH4/h1H4"]);

        // one entry per excluded record, even with both files missing
        assert_eq!(selection.excluded.len(), 2);
        let water = &selection.excluded[0];
        assert_eq!(water.aug_inchi, "InChI=1S/H2O/h1H2");
        assert_eq!(water.missing, [SUBMISSION_SCRIPT]);
        assert_eq!(water.path, JobPath::new(dir.path(), "InChI=1S/H2O/h1H2").path);
        let hydrogen = &selection.excluded[1];
        assert_eq!(hydrogen.aug_inchi, "InChI=1S/H2/h1H");
        assert_eq!(hydrogen.missing, [INPUT_FILE, SUBMISSION_SCRIPT]);

        // nothing changes until the files appear
        let again = select_launch_target(&conn, dir.path(), 10).unwrap();
        assert_eq!(again, selection);
    }

    #[test]
    fn limit_applies_before_file_check() {
        let dir = tempfile::tempdir().unwrap();
        let conn = open_in_memory().unwrap();
        register(&conn, "popular", 10.0);
        register(&conn, "ready", 1.0);
        write_files(dir.path(), "ready", &[INPUT_FILE, SUBMISSION_SCRIPT]);

        let selection = select_launch_target(&conn, dir.path(), 1).unwrap();
        assert!(selection.targets.is_empty());
        assert_eq!(selection.excluded.len(), 1);
    }

    #[test]
    fn ready_jobs_produce_no_exclusions() {
        let dir = tempfile::tempdir().unwrap();
        let conn = open_in_memory().unwrap();
        register(&conn, "InChI=1S/CH4/h1H4", 2.5);
        write_files(dir.path(), "InChI=1S/CH4/h1H4", &[INPUT_FILE, SUBMISSION_SCRIPT]);

        let selection = select_launch_target(&conn, dir.path(), 10).unwrap();
        assert_eq!(ids(&selection.targets), ["InChI=1S/CH4/h1H4"]);
        assert!(selection.excluded.is_empty());
    }
}
