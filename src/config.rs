//! Launcher settings
//!
//! Settings are read from an optional TOML file shared with the rest of the autoQM tools and can
//! be overridden on the command line:
//!
//! ```toml
//! [QuantumMechanicJob]
//! data_path = "/scratch/autoqm/jobs"
//! limit_per_launch = 100
//!
//! [Launcher]
//! db_path = "/scratch/autoqm/registration.db"
//! sbatch = "/usr/bin/sbatch"
//! timeout_secs = 300
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use log::info;
use serde::Deserialize;

const DEFAULT_LIMIT: u32 = 100;
const DEFAULT_SBATCH: &str = "sbatch";
const DEFAULT_TIMEOUT_SECS: u64 = 300;
const DEFAULT_DB_NAME: &str = "registration.db";

#[derive(Parser, Debug, Default)]
#[command(name = "autoqm-launcher")]
#[command(about = "Submit created quantum chemistry jobs to SLURM", long_about = None)]
pub struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory containing one working directory per job
    #[arg(short, long)]
    pub data_path: Option<PathBuf>,

    /// Maximum number of jobs to launch in this run
    #[arg(short, long)]
    pub limit: Option<u32>,

    /// Path to the registration database
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// Batch submission command
    #[arg(long)]
    pub sbatch: Option<String>,

    /// Seconds to wait for the submission command before giving up on a job
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Select jobs but don't submit them or touch the database
    #[arg(long, action)]
    pub dry_run: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(rename = "QuantumMechanicJob", default)]
    pub quantum_mechanic_job: QuantumMechanicJob,
    #[serde(rename = "Launcher", default)]
    pub launcher: LauncherSection,
}

#[derive(Debug, Default, Deserialize)]
pub struct QuantumMechanicJob {
    pub data_path: Option<PathBuf>,
    pub limit_per_launch: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LauncherSection {
    pub db_path: Option<PathBuf>,
    pub sbatch: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Resolved settings for a single launch pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LauncherConfig {
    pub data_path: PathBuf,
    pub limit: u32,
    pub db_path: PathBuf,
    pub sbatch: String,
    pub timeout: Duration,
    pub dry_run: bool,
}

impl LauncherConfig {
    pub fn load(args: Args) -> Result<LauncherConfig> {
        let file = match &args.config {
            Some(path) => read_config(path)?,
            None => ConfigFile::default(),
        };
        LauncherConfig::resolve(args, file)
    }

    /// Command line arguments win over the configuration file
    pub fn resolve(args: Args, file: ConfigFile) -> Result<LauncherConfig> {
        let data_path = args
            .data_path
            .or(file.quantum_mechanic_job.data_path)
            .ok_or_else(|| {
                anyhow!("No data path set, use --data-path or [QuantumMechanicJob] data_path")
            })?;

        let limit = args
            .limit
            .or(file.quantum_mechanic_job.limit_per_launch)
            .unwrap_or(DEFAULT_LIMIT);
        if limit == 0 {
            bail!("Launch limit must be at least 1");
        }

        let timeout_secs = args
            .timeout
            .or(file.launcher.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            bail!("Submission timeout must be at least 1 second");
        }

        let db_path = args
            .db
            .or(file.launcher.db_path)
            .unwrap_or_else(|| data_path.join(DEFAULT_DB_NAME));

        let sbatch = args
            .sbatch
            .or(file.launcher.sbatch)
            .unwrap_or_else(|| DEFAULT_SBATCH.to_string());

        Ok(LauncherConfig {
            data_path,
            limit,
            db_path,
            sbatch,
            timeout: Duration::from_secs(timeout_secs),
            dry_run: args.dry_run,
        })
    }
}

fn read_config(path: &Path) -> Result<ConfigFile> {
    info!("Reading configuration {}", path.display());
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Can't read configuration at {}", path.display()))?;
    toml::from_str(&contents)
        .with_context(|| format!("Invalid configuration in {}", path.display()))
}
