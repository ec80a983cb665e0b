use crate::error::{Result, TsStatsError};
use crate::process::{self, CommandOutput};

use super::GitRepo;

/// Exclusive access to a working copy that has been reset to one commit.
pub struct WorkingTree<'repo> {
    repo: &'repo mut GitRepo,
    sha: String,
}

impl<'repo> WorkingTree<'repo> {
    pub(super) fn new(repo: &'repo mut GitRepo, sha: &str) -> Self {
        Self {
            repo,
            sha: sha.to_string(),
        }
    }

    /// Install the dependencies declared at this commit. Any failure is a sync failure.
    pub fn install_dependencies(&mut self, argv: &[String]) -> Result<CommandOutput> {
        let output = process::run(argv, self.repo.path(), self.repo.timeout())
            .map_err(|e| TsStatsError::Sync(format!("{}: {e}", process::display(argv))))?;

        if !output.success() {
            return Err(TsStatsError::Sync(format!(
                "{} exited with {} at {}: {}",
                process::display(argv),
                output.status,
                self.sha,
                output.stderr.trim()
            )));
        }
        Ok(output)
    }

    /// Run the type-checker. Its exit status is not inspected: it exits
    /// non-zero whenever it reports errors.
    pub fn type_check(&mut self, argv: &[String]) -> Result<CommandOutput> {
        process::run(argv, self.repo.path(), self.repo.timeout())
            .map_err(|e| TsStatsError::Measurement(format!("{} at {}: {e}", process::display(argv), self.sha)))
    }
}
