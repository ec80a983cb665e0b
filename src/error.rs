use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TsStatsError>;

#[derive(Error, Debug)]
pub enum TsStatsError {
    #[error("Dataset not found: {}", .0.display())]
    DatasetMissing(PathBuf),
    #[error("Dataset {} is corrupt: {source}", path.display())]
    DatasetCorrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Sync failed: {0}")]
    Sync(String),
    #[error("Measurement failed: {0}")]
    Measurement(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Git repository error: {0}")]
    GitRepo(String),
    #[error("Git discover error: {0}")]
    GitDiscover(#[from] Box<gix::discover::Error>),
    #[error("Object find error: {0}")]
    ObjectFind(#[from] Box<gix::object::find::existing::Error>),
    #[error("Object find with conversion error: {0}")]
    ObjectFindConv(#[from] Box<gix::object::find::existing::with_conversion::Error>),
    #[error("Commit error: {0}")]
    Commit(#[from] Box<gix::object::commit::Error>),
    #[error("Object decode error: {0}")]
    ObjectDecode(#[from] Box<gix::objs::decode::Error>),
    #[error("Reference find error: {0}")]
    RefFind(#[from] Box<gix::reference::find::existing::Error>),
    #[error("Head peel error: {0}")]
    HeadPeel(#[from] Box<gix::head::peel::to_commit::Error>),
}

// Manual From implementations for unboxed to boxed conversions
impl From<gix::discover::Error> for TsStatsError {
    fn from(err: gix::discover::Error) -> Self {
        TsStatsError::GitDiscover(Box::new(err))
    }
}

impl From<gix::object::find::existing::Error> for TsStatsError {
    fn from(err: gix::object::find::existing::Error) -> Self {
        TsStatsError::ObjectFind(Box::new(err))
    }
}

impl From<gix::object::find::existing::with_conversion::Error> for TsStatsError {
    fn from(err: gix::object::find::existing::with_conversion::Error) -> Self {
        TsStatsError::ObjectFindConv(Box::new(err))
    }
}

impl From<gix::object::commit::Error> for TsStatsError {
    fn from(err: gix::object::commit::Error) -> Self {
        TsStatsError::Commit(Box::new(err))
    }
}

impl From<gix::objs::decode::Error> for TsStatsError {
    fn from(err: gix::objs::decode::Error) -> Self {
        TsStatsError::ObjectDecode(Box::new(err))
    }
}

impl From<gix::reference::find::existing::Error> for TsStatsError {
    fn from(err: gix::reference::find::existing::Error) -> Self {
        TsStatsError::RefFind(Box::new(err))
    }
}

impl From<gix::head::peel::to_commit::Error> for TsStatsError {
    fn from(err: gix::head::peel::to_commit::Error) -> Self {
        TsStatsError::HeadPeel(Box::new(err))
    }
}
