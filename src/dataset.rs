use crate::error::{Result, TsStatsError};
use crate::model::{Sample, StatsFile};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// The persisted, date-ordered collection of samples.
///
/// Every mutation rewrites the whole file through a sibling temporary file
/// and a rename, so readers never observe a half-written document.
#[derive(Debug, Clone)]
pub struct Dataset {
    path: PathBuf,
    samples: Vec<Sample>,
}

impl Dataset {
    pub fn empty<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            samples: Vec::new(),
        }
    }

    /// Load the dataset, treating a missing file as an empty dataset.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::empty(path));
        }
        Self::load(path)
    }

    /// Load the dataset, failing if the file does not exist.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(TsStatsError::DatasetMissing(path.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        };

        let file: StatsFile =
            serde_json::from_str(&content).map_err(|source| TsStatsError::DatasetCorrupt {
                path: path.to_path_buf(),
                source,
            })?;

        let mut samples = file.stats;
        samples.sort_by(|a, b| a.date.cmp(&b.date));

        Ok(Self {
            path: path.to_path_buf(),
            samples,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn contains(&self, sha: &str) -> bool {
        self.samples.iter().any(|s| s.sha == sha)
    }

    pub fn shas(&self) -> HashSet<String> {
        self.samples.iter().map(|s| s.sha.clone()).collect()
    }

    /// Merge `sample` in, keep date order and persist.
    ///
    /// Returns `false` without touching the file when the sha is already
    /// recorded.
    pub fn append(&mut self, sample: Sample) -> Result<bool> {
        if self.contains(&sample.sha) {
            return Ok(false);
        }
        let mut samples = self.samples.clone();
        samples.push(sample);
        // stable: equal dates keep insertion order
        samples.sort_by(|a, b| a.date.cmp(&b.date));

        // memory only follows once the file has been replaced
        write_samples(&self.path, &samples)?;
        self.samples = samples;
        Ok(true)
    }

    pub fn save(&self) -> Result<()> {
        write_samples(&self.path, &self.samples)
    }
}

fn write_samples(path: &Path, samples: &[Sample]) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let file = StatsFile {
        stats: samples.to_vec(),
    };
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    file.serialize(&mut ser)?;
    buf.push(b'\n');

    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(&buf)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|err| TsStatsError::Io(err.error))?;
    Ok(())
}
