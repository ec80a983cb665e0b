use crate::config::{self, Config};
use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ts-stats")]
#[command(about = "Track type-checker errors across merge commits and chart them")]
#[command(version)]
pub struct Cli {
    #[clap(flatten)]
    pub common: CommonArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Clone)]
pub struct CommonArgs {
    #[arg(long, global = true, help = "Path to a TOML configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Path to the stats dataset (default: stats.json)")]
    pub dataset: Option<PathBuf>,
}

impl CommonArgs {
    pub fn apply(&self, config: &mut Config) {
        if let Some(dataset) = &self.dataset {
            config.dataset_path = dataset.clone();
        }
    }
}

#[derive(Args, Clone)]
pub struct CollectArgs {
    #[arg(help = "Path to the working copy to measure; it is hard-reset for every commit (default: `repo` from the config file)")]
    pub repo: Option<PathBuf>,

    #[arg(long, help = "Branch to sync before walking history")]
    pub branch: Option<String>,

    #[arg(long, help = "Only merge commits after this commit are measured")]
    pub baseline: Option<String>,

    #[arg(long, help = "Do not pull the branch before walking history")]
    pub no_pull: bool,

    #[arg(long, help = "Kill any external command running longer than this (e.g. 30m)")]
    pub timeout: Option<String>,
}

impl CollectArgs {
    pub fn apply(&self, config: &mut Config) -> crate::error::Result<()> {
        if let Some(repo) = &self.repo {
            config.repo_path = Some(repo.clone());
        }
        if let Some(branch) = &self.branch {
            config.collect.branch = branch.clone();
        }
        if let Some(baseline) = &self.baseline {
            config.collect.baseline = baseline.clone();
        }
        if self.no_pull {
            config.collect.pull = false;
        }
        if let Some(timeout) = &self.timeout {
            config.collect.timeout = Some(config::parse_timeout(timeout)?);
        }
        config.validate()
    }
}

#[derive(Args, Clone)]
pub struct RenderArgs {
    #[arg(long, help = "Where to write the HTML chart (default: index.html)")]
    pub output: Option<PathBuf>,
}

impl RenderArgs {
    pub fn apply(&self, config: &mut Config) {
        if let Some(output) = &self.output {
            config.output_path = output.clone();
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Measure every unrecorded merge commit and append it to the dataset
    Collect(CollectArgs),
    /// Render the dataset as a standalone HTML line chart
    Render(RenderArgs),
    /// Print a short summary of the dataset
    Summary {
        #[arg(long, help = "Output as JSON")]
        json: bool,
    },
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn execute(self) -> Result<()> {
        match self.command {
            Commands::Collect(args) => crate::collect::exec(self.common, args),
            Commands::Render(args) => crate::render::exec(self.common, args),
            Commands::Summary { json } => crate::summary::exec(self.common, json),
        }
    }
}
