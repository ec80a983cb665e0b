use crate::error::{Result, TsStatsError};
use crate::process::{self, CommandOutput};
use chrono::{DateTime, Utc};
use console::style;
use gix::{discover, ObjectId, Repository};
use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::WorkingTree;

pub struct GitRepo {
    repo: Repository,
    path: PathBuf,
    timeout: Option<Duration>,
}

impl GitRepo {
    /// Open the repository containing `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = discover(path.as_ref())?;
        let path = repo.workdir().unwrap_or_else(|| repo.path()).to_path_buf();

        Ok(Self {
            repo,
            path,
            timeout: None,
        })
    }

    /// Bound every git child process spawned through this handle.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Move the working copy to the tip of `branch`, then optionally pull.
    ///
    /// Local modifications left behind by a previous measurement are discarded.
    pub fn sync_branch(&mut self, branch: &str, pull: bool) -> Result<()> {
        self.git(&["checkout", "--force", branch])?;
        if pull {
            self.git(&["pull"])?;
        }
        // refs and packs may have changed underneath the handle
        self.repo = discover(&self.path)?;
        Ok(())
    }

    /// Merge commits reachable from HEAD but not from `baseline`, newest first.
    pub fn merge_commits_since(&self, baseline: &str) -> Result<Vec<String>> {
        let baseline = self.resolve_commit(baseline)?;
        let hidden = self.ancestors(baseline)?;

        let mut head = self.repo.head()?;
        let head_commit = head.peel_to_commit_in_place()?;

        let mut merges: Vec<(i64, ObjectId)> = Vec::new();
        let mut seen: HashSet<ObjectId> = HashSet::new();
        let mut stack: VecDeque<ObjectId> = VecDeque::from([head_commit.id]);

        while let Some(commit_id) = stack.pop_back() {
            if hidden.contains(&commit_id) || !seen.insert(commit_id) {
                continue;
            }

            let commit = self.repo.find_commit(commit_id)?;
            let parents: Vec<ObjectId> = commit.parent_ids().map(|id| id.into()).collect();

            if parents.len() > 1 {
                merges.push((commit.time()?.seconds, commit_id));
            }

            for pid in parents {
                stack.push_back(pid);
            }
        }

        // stable, so equal timestamps keep walk order
        merges.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(merges.into_iter().map(|(_, id)| id.to_string()).collect())
    }

    pub fn commit_time(&self, sha: &str) -> Result<DateTime<Utc>> {
        let oid = ObjectId::from_hex(sha.as_bytes())
            .map_err(|e| TsStatsError::GitRepo(format!("Invalid commit ID '{sha}': {e}")))?;
        let commit = self.repo.find_commit(oid)?;
        let secs = commit.time()?.seconds;
        DateTime::<Utc>::from_timestamp(secs, 0)
            .ok_or_else(|| TsStatsError::GitRepo(format!("Invalid timestamp: {secs}")))
    }

    /// Hard-reset the working copy to `sha` on a detached HEAD.
    ///
    /// Any local modification is discarded; the tracked branch stays where it
    /// is. The returned handle borrows the repository mutably, so nothing else
    /// can touch the tree while it lives.
    pub fn checkout(&mut self, sha: &str) -> Result<WorkingTree<'_>> {
        self.git(&["checkout", "--quiet", "--detach"])?;
        self.git(&["reset", "--hard", sha])?;
        Ok(WorkingTree::new(self, sha))
    }

    fn resolve_commit(&self, rev: &str) -> Result<ObjectId> {
        let id = self
            .repo
            .rev_parse_single(rev)
            .map_err(|e| TsStatsError::Sync(format!("Cannot resolve baseline '{rev}': {e}")))?;

        let commit = id
            .object()?
            .try_into_commit()
            .map_err(|_| TsStatsError::Sync(format!("Baseline is not a commit: {rev}")))?;

        Ok(commit.id)
    }

    fn ancestors(&self, tip: ObjectId) -> Result<HashSet<ObjectId>> {
        let mut seen: HashSet<ObjectId> = HashSet::new();
        let mut stack = vec![tip];

        while let Some(commit_id) = stack.pop() {
            if !seen.insert(commit_id) {
                continue;
            }
            let commit = self.repo.find_commit(commit_id)?;
            stack.extend(commit.parent_ids().map(|id| -> ObjectId { id.into() }));
        }

        Ok(seen)
    }

    fn git(&self, args: &[&str]) -> Result<CommandOutput> {
        let argv: Vec<String> = std::iter::once("git")
            .chain(args.iter().copied())
            .map(str::to_string)
            .collect();

        let output = process::run(&argv, &self.path, self.timeout)
            .map_err(|e| TsStatsError::Sync(format!("{}: {e}", process::display(&argv))))?;

        if !output.success() {
            return Err(TsStatsError::Sync(format!(
                "{} exited with {}: {}",
                process::display(&argv),
                output.status,
                output.stderr.trim()
            )));
        }

        if !output.stderr.trim().is_empty() {
            eprintln!("{}", style(output.stderr.trim_end()).dim());
        }

        Ok(output)
    }
}
