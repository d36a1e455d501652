//! Launch pending quantum chemistry jobs on SLURM
//!
//! Job records are registered upstream with the status `job_created` once their input files are
//! written to disk. This crate picks the most popular of them, checks the input files are really
//! there, submits each one with `sbatch` and records the SLURM job id.

pub mod config;
pub mod db;
pub mod launch;
pub mod slurm;
