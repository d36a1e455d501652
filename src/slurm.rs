//! Find job directories on disk and submit them to SLURM

/// Deterministic job working directories and their required files
pub mod job_path;

/// Run sbatch and read the job id it reports
pub mod sbatch;
