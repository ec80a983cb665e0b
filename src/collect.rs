use crate::cli::{CollectArgs, CommonArgs};
use crate::config::{CollectConfig, Config};
use crate::dataset::Dataset;
use crate::diagnostics::{count_diagnostics, distinct_files};
use crate::error::Result;
use crate::git::GitRepo;
use crate::model::{RunSummary, Sample};
use anyhow::Context;
use chrono::{DateTime, Utc};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;

/// The operations the collector needs from a version-controlled project.
pub trait Workspace {
    /// Bring the project to its tracked branch tip and list merge commits
    /// after the baseline, in whatever order the history walk yields.
    fn list_candidate_commits(&mut self) -> Result<Vec<String>>;

    fn commit_date(&self, sha: &str) -> Result<DateTime<Utc>>;

    /// Check out `sha` destructively and return its diagnostic line count.
    fn measure_commit(&mut self, sha: &str) -> Result<u32>;
}

pub struct GitWorkspace {
    repo: GitRepo,
    config: CollectConfig,
}

impl GitWorkspace {
    pub fn open(path: &std::path::Path, config: CollectConfig) -> Result<Self> {
        let repo = GitRepo::open(path)?.with_timeout(config.timeout);
        Ok(Self { repo, config })
    }
}

impl Workspace for GitWorkspace {
    fn list_candidate_commits(&mut self) -> Result<Vec<String>> {
        println!("Checking out latest {}", style(&self.config.branch).cyan());
        self.repo.sync_branch(&self.config.branch, self.config.pull)?;

        let shas = self.repo.merge_commits_since(&self.config.baseline)?;
        println!("Found {} merge commits", style(shas.len()).cyan());
        Ok(shas)
    }

    fn commit_date(&self, sha: &str) -> Result<DateTime<Utc>> {
        self.repo.commit_time(sha)
    }

    fn measure_commit(&mut self, sha: &str) -> Result<u32> {
        let mut tree = self.repo.checkout(sha)?;

        println!("Installing dependencies");
        let install = tree.install_dependencies(&self.config.install)?;
        if !install.stderr.trim().is_empty() {
            eprintln!("{}", style(install.stderr.trim_end()).dim());
        }

        let output = tree.type_check(&self.config.type_check)?;
        if !output.stderr.trim().is_empty() {
            eprintln!("{} {}", style("stderr:").yellow(), output.stderr.trim_end());
        }

        let count = count_diagnostics(&output.stdout);
        println!(
            "Found {} typescript errors in {} files",
            style(count).red(),
            distinct_files(&output.stdout)
        );
        Ok(count)
    }
}

pub struct Collector<W> {
    workspace: W,
    dataset: Dataset,
}

impl<W: Workspace> Collector<W> {
    pub fn new(workspace: W, dataset: Dataset) -> Self {
        Self { workspace, dataset }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn into_dataset(self) -> Dataset {
        self.dataset
    }

    /// Measure every candidate commit not already in the dataset.
    ///
    /// Each sample is persisted before the next commit is touched, so an
    /// aborted run keeps all finished work.
    pub fn run(&mut self) -> Result<RunSummary> {
        let known = self.dataset.shas();
        let candidates = self.workspace.list_candidate_commits()?;

        let mut summary = RunSummary {
            candidates: candidates.len(),
            ..RunSummary::default()
        };

        let pending: Vec<&String> = candidates
            .iter()
            .filter(|sha| {
                if known.contains(sha.as_str()) {
                    println!("{} already exists. Skipping...", style(sha.as_str()).dim());
                    summary.skipped += 1;
                    false
                } else {
                    true
                }
            })
            .collect();

        let pb = ProgressBar::new(pending.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );

        for sha in pending {
            // the walk may yield a sha twice when histories are odd
            if self.dataset.contains(sha) {
                summary.skipped += 1;
                pb.inc(1);
                continue;
            }

            pb.set_message(sha.chars().take(8).collect::<String>());
            pb.suspend(|| println!("Calculating stats for sha {sha}"));

            let date = self.workspace.commit_date(sha)?;
            let ts_error_count = self.workspace.measure_commit(sha)?;
            self.dataset.append(Sample::new(sha.as_str(), date, ts_error_count))?;

            summary.measured += 1;
            pb.inc(1);
        }

        pb.finish_and_clear();
        Ok(summary)
    }
}

pub fn exec(common: CommonArgs, args: CollectArgs) -> anyhow::Result<()> {
    let mut config = Config::load(common.config.as_deref()).context("Failed to load configuration")?;
    common.apply(&mut config);
    args.apply(&mut config).context("Invalid collect options")?;

    let repo_path: PathBuf = config
        .repo_path
        .clone()
        .context("No repository given")?;

    let dataset = Dataset::load_or_default(&config.dataset_path).context("Failed to load dataset")?;
    let workspace = GitWorkspace::open(&repo_path, config.collect.clone())
        .with_context(|| format!("Failed to open git repository at {}", repo_path.display()))?;

    let mut collector = Collector::new(workspace, dataset);
    let summary = collector.run().context("Failed to collect stats")?;

    println!(
        "{} measured, {} skipped, {} samples in {}",
        style(summary.measured).green(),
        style(summary.skipped).dim(),
        collector.dataset().len(),
        config.dataset_path.display()
    );
    Ok(())
}
