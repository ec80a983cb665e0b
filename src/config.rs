use crate::error::{Result, TsStatsError};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_DATASET: &str = "stats.json";
pub const DEFAULT_OUTPUT: &str = "index.html";
pub const DEFAULT_BRANCH: &str = "typescript";
pub const DEFAULT_BASELINE: &str = "0ea6a2c97f0d69534d668a01015ed9a352addddf";

/// Everything a run needs, resolved up front and handed to each component.
#[derive(Debug, Clone)]
pub struct Config {
    pub dataset_path: PathBuf,
    pub output_path: PathBuf,
    pub repo_path: Option<PathBuf>,
    pub collect: CollectConfig,
    pub chart: ChartConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CollectConfig {
    pub branch: String,
    pub baseline: String,
    pub pull: bool,
    pub install: Vec<String>,
    pub type_check: Vec<String>,
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub title: String,
    pub label: String,
    pub color: String,
}

impl Default for CollectConfig {
    fn default() -> Self {
        Self {
            branch: DEFAULT_BRANCH.to_string(),
            baseline: DEFAULT_BASELINE.to_string(),
            pull: true,
            install: argv(&["yarn", "install", "--silent"]),
            type_check: argv(&["./node_modules/.bin/tsc", "--noEmit", "--pretty", "false"]),
            timeout: None,
        }
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            title: "Line Chart".to_string(),
            label: "TypeScript errors".to_string(),
            color: "#ff5959".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from(DEFAULT_DATASET),
            output_path: PathBuf::from(DEFAULT_OUTPUT),
            repo_path: None,
            collect: CollectConfig::default(),
            chart: ChartConfig::default(),
        }
    }
}

/// TOML file layout. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    dataset: Option<PathBuf>,
    output: Option<PathBuf>,
    repo: Option<PathBuf>,
    #[serde(default)]
    collect: CollectFile,
    chart: Option<ChartConfig>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct CollectFile {
    branch: Option<String>,
    baseline: Option<String>,
    pull: Option<bool>,
    install: Option<Vec<String>>,
    type_check: Option<Vec<String>>,
    timeout: Option<String>,
}

impl Config {
    /// Defaults overlaid with the TOML file at `path`, if one is given.
    ///
    /// Relative paths in the file resolve against the file's directory.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();
        let Some(path) = path else {
            return Ok(config);
        };

        let content = fs::read_to_string(path)?;
        let file: ConfigFile = toml::from_str(&content)?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));

        if let Some(p) = file.dataset {
            config.dataset_path = base.join(p);
        }
        if let Some(p) = file.output {
            config.output_path = base.join(p);
        }
        if let Some(p) = file.repo {
            config.repo_path = Some(base.join(p));
        }
        if let Some(chart) = file.chart {
            config.chart = chart;
        }

        let collect = file.collect;
        if let Some(branch) = collect.branch {
            config.collect.branch = branch;
        }
        if let Some(baseline) = collect.baseline {
            config.collect.baseline = baseline;
        }
        if let Some(pull) = collect.pull {
            config.collect.pull = pull;
        }
        if let Some(install) = collect.install {
            config.collect.install = install;
        }
        if let Some(type_check) = collect.type_check {
            config.collect.type_check = type_check;
        }
        if let Some(timeout) = collect.timeout {
            config.collect.timeout = Some(parse_timeout(&timeout)?);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.collect.install.is_empty() {
            return Err(TsStatsError::Config("collect.install must name a program".to_string()));
        }
        if self.collect.type_check.is_empty() {
            return Err(TsStatsError::Config("collect.type_check must name a program".to_string()));
        }
        if self.collect.branch.trim().is_empty() {
            return Err(TsStatsError::Config("collect.branch is empty".to_string()));
        }
        if self.collect.baseline.trim().is_empty() {
            return Err(TsStatsError::Config("collect.baseline is empty".to_string()));
        }
        Ok(())
    }
}

pub fn parse_timeout(input: &str) -> Result<Duration> {
    humantime::parse_duration(input.trim())
        .map_err(|e| TsStatsError::Config(format!("Invalid timeout '{input}': {e}")))
}

fn argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn defaults_without_file() {
        let config = Config::load(None).unwrap();
        assert_eq!(config.dataset_path, PathBuf::from("stats.json"));
        assert_eq!(config.collect, CollectConfig::default());
        assert_eq!(config.collect.type_check[1], "--noEmit");
    }

    #[test]
    fn file_overrides_and_resolves_relative_paths() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ts-stats.toml");
        fs::write(
            &path,
            r#"
dataset = "data/stats.json"
output = "public/index.html"
repo = "../checkout"

[collect]
branch = "main"
pull = false
type_check = ["npx", "tsc", "--noEmit"]
timeout = "15m"

[chart]
label = "Errors"
"#,
        )
        .unwrap();

        let config = Config::load(Some(path.as_path())).unwrap();
        assert_eq!(config.dataset_path, dir.path().join("data/stats.json"));
        assert_eq!(config.output_path, dir.path().join("public/index.html"));
        assert_eq!(config.repo_path, Some(dir.path().join("../checkout")));
        assert_eq!(config.collect.branch, "main");
        assert!(!config.collect.pull);
        assert_eq!(config.collect.baseline, DEFAULT_BASELINE);
        assert_eq!(config.collect.timeout, Some(Duration::from_secs(15 * 60)));
        assert_eq!(config.chart.label, "Errors");
        assert_eq!(config.chart.title, "Line Chart");
    }

    #[test]
    fn rejects_empty_commands_and_unknown_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ts-stats.toml");

        fs::write(&path, "[collect]\ninstall = []\n").unwrap();
        assert!(matches!(Config::load(Some(path.as_path())), Err(TsStatsError::Config(_))));

        fs::write(&path, "datset = \"typo.json\"\n").unwrap();
        assert!(matches!(Config::load(Some(path.as_path())), Err(TsStatsError::Toml(_))));
    }

    #[test]
    fn bad_timeout_is_a_config_error() {
        assert!(parse_timeout("soon").is_err());
        assert_eq!(parse_timeout("90s").unwrap(), Duration::from_secs(90));
    }
}
