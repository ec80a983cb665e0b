use crate::cli::CommonArgs;
use crate::config::Config;
use crate::dataset::Dataset;
use crate::model::DatasetSummary;
use anyhow::Context;
use console::style;

pub fn summarize(dataset: &Dataset) -> DatasetSummary {
    let first = dataset.samples().first().cloned();
    let latest = dataset.samples().last().cloned();
    let change = match (&first, &latest) {
        (Some(f), Some(l)) => Some(l.ts_error_count as i64 - f.ts_error_count as i64),
        _ => None,
    };

    DatasetSummary {
        dataset_path: dataset.path().to_string_lossy().to_string(),
        samples: dataset.len(),
        first,
        latest,
        change,
    }
}

pub fn exec(common: CommonArgs, json: bool) -> anyhow::Result<()> {
    let mut config = Config::load(common.config.as_deref()).context("Failed to load configuration")?;
    common.apply(&mut config);

    let dataset = Dataset::load(&config.dataset_path).context("Failed to load dataset")?;
    let summary = summarize(&dataset);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        output_summary(&summary);
    }
    Ok(())
}

fn output_summary(summary: &DatasetSummary) {
    println!("{}", style("Type Error Summary").bold());
    println!("{}", "─".repeat(50));
    println!("Dataset: {}", style(&summary.dataset_path).dim());
    println!("Samples: {}", style(summary.samples).cyan());

    let (Some(first), Some(latest)) = (&summary.first, &summary.latest) else {
        println!("\nNo samples recorded yet.");
        return;
    };

    println!(
        "Date range: {} to {}",
        style(first.date.format("%Y-%m-%d")).dim(),
        style(latest.date.format("%Y-%m-%d")).dim()
    );
    println!("First: {} errors at {}", first.ts_error_count, short(&first.sha));
    println!("Latest: {} errors at {}", latest.ts_error_count, short(&latest.sha));

    if let Some(change) = summary.change {
        let styled = match change {
            c if c < 0 => style(format!("{c}")).green(),
            c if c > 0 => style(format!("+{c}")).red(),
            c => style(format!("{c}")).dim(),
        };
        println!("Change: {}", styled);
    }
}

fn short(sha: &str) -> String {
    sha.chars().take(8).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Sample;
    use chrono::{TimeZone, Utc};
    use tempfile::tempdir;

    #[test]
    fn change_is_latest_minus_first() {
        let dir = tempdir().unwrap();
        let mut dataset = Dataset::empty(dir.path().join("stats.json"));
        dataset
            .append(Sample::new("new", Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(), 3))
            .unwrap();
        dataset
            .append(Sample::new("old", Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(), 10))
            .unwrap();

        let summary = summarize(&dataset);
        assert_eq!(summary.samples, 2);
        assert_eq!(summary.first.unwrap().sha, "old");
        assert_eq!(summary.latest.unwrap().sha, "new");
        assert_eq!(summary.change, Some(-7));
    }

    #[test]
    fn empty_dataset_has_no_change() {
        let dir = tempdir().unwrap();
        let summary = summarize(&Dataset::empty(dir.path().join("stats.json")));
        assert_eq!(summary.samples, 0);
        assert!(summary.first.is_none());
        assert_eq!(summary.change, None);
    }
}
