use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// A diagnostic line starts with a path glued to its `(line,col)` marker.
static DIAGNOSTIC_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^(\S+?)\(").expect("diagnostic pattern is valid"));

/// Leading path of every diagnostic line, in output order, repeats included.
pub fn diagnostic_paths(output: &str) -> Vec<&str> {
    DIAGNOSTIC_LINE
        .captures_iter(output)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect()
}

/// Number of diagnostic lines, not distinct files.
pub fn count_diagnostics(output: &str) -> u32 {
    diagnostic_paths(output).len() as u32
}

pub fn distinct_files(output: &str) -> usize {
    diagnostic_paths(output).into_iter().collect::<HashSet<_>>().len()
}
