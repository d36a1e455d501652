use std::path::{Path, PathBuf};

/// Quantum chemistry input written by the job creator
pub const INPUT_FILE: &str = "input.inp";
/// Script passed to sbatch
pub const SUBMISSION_SCRIPT: &str = "submit.sl";

/// InChIs contain slashes, which can't appear in a directory name
const SLASH_MARKER: &str = "_slash_";

/// A JobPath is the working directory of a single job
///
/// A JobPath **requires** the following files before it can be launched:
/// - [`INPUT_FILE`]
/// - [`SUBMISSION_SCRIPT`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobPath {
    pub path: PathBuf,
}

impl JobPath {
    pub fn new(data_path: &Path, aug_inchi: &str) -> JobPath {
        let spec_name = aug_inchi.replace('/', SLASH_MARKER);
        JobPath { path: data_path.join(spec_name) }
    }

    pub fn input(&self) -> PathBuf {
        self.path.join(INPUT_FILE)
    }

    pub fn submission_script(&self) -> PathBuf {
        self.path.join(SUBMISSION_SCRIPT)
    }

    /// Required files that aren't on disk yet, empty if the job is ready to launch
    pub fn missing_files(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if !self.input().exists() {
            missing.push(INPUT_FILE);
        }
        if !self.submission_script().exists() {
            missing.push(SUBMISSION_SCRIPT);
        }
        missing
    }
}
