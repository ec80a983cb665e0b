use crate::cli::{CommonArgs, RenderArgs};
use crate::config::{ChartConfig, Config};
use crate::dataset::Dataset;
use crate::error::Result;
use crate::model::Sample;
use anyhow::Context;
use console::style;
use std::fs;
use std::path::Path;

const CHART_JS: &str = "https://cdn.jsdelivr.net/npm/chart.js@2.9.3/dist/Chart.min.js";
const DATE_ADAPTER: &str =
    "https://cdn.jsdelivr.net/npm/chartjs-adapter-date-fns@1.0.0/dist/chartjs-adapter-date-fns.bundle.min.js";

/// Render `samples` as a standalone HTML page with a time-series line chart.
pub fn render(samples: &[Sample], chart: &ChartConfig) -> Result<String> {
    let data = embed_json(&serde_json::to_string(samples)?);
    let label = embed_json(&serde_json::to_string(&chart.label)?);
    let color = embed_json(&serde_json::to_string(&chart.color)?);

    Ok(format!(
        r#"<!doctype html>
<html>

<head>
    <meta charset="utf-8">
    <title>{title}</title>
    <script src="{CHART_JS}"></script>
    <script src="{DATE_ADAPTER}"></script>

    <style>
    canvas {{
        -moz-user-select: none;
        -webkit-user-select: none;
        -ms-user-select: none;
    }}
    </style>
</head>

<body>
    <div>
        <canvas id="canvas"></canvas>
        <script type="application/json" id="stats">
{data}
        </script>
    </div>
    <script>
        var stats = JSON.parse(document.getElementById('stats').textContent);
        var ctx = document.getElementById('canvas').getContext('2d');

        var labels = stats.map(function (s) {{ return new Date(s.date); }});
        var data = stats.map(function (s) {{ return s.tsErrorCount; }});

        var chart = new Chart(ctx, {{
            type: 'line',
            data: {{
                labels: labels,
                datasets: [{{
                    label: {label},
                    borderColor: {color},
                    fill: false,
                    data: data,
                }}]
            }},
            options: {{
                scales: {{
                    xAxes: [{{
                        type: 'time',
                        time: {{
                            unit: 'hour',
                            tooltipFormat: 'd. MMM HH:mm',
                            displayFormats: {{
                                hour: 'd. MMM HH:mm'
                            }}
                        }}
                    }}],
                    yAxes: [{{
                        ticks: {{
                            suggestedMin: 0,
                        }}
                    }}]
                }}
            }}
        }});
    </script>
</body>

</html>
"#,
        title = escape_html(&chart.title),
    ))
}

/// Keep JSON inert inside `<script>` elements.
fn embed_json(json: &str) -> String {
    json.replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn write_document(path: &Path, document: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, document)?;
    Ok(())
}

pub fn exec(common: CommonArgs, args: RenderArgs) -> anyhow::Result<()> {
    let mut config = Config::load(common.config.as_deref()).context("Failed to load configuration")?;
    common.apply(&mut config);
    args.apply(&mut config);

    let dataset = Dataset::load(&config.dataset_path).context("Failed to load dataset")?;
    let document = render(dataset.samples(), &config.chart).context("Failed to render chart")?;
    write_document(&config.output_path, &document)
        .with_context(|| format!("Failed to write {}", config.output_path.display()))?;

    println!(
        "Rendered {} samples to {}",
        style(dataset.len()).cyan(),
        config.output_path.display()
    );
    Ok(())
}
