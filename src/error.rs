use thiserror::Error;

/// Invalid, missing or unsupported configuration. Always raised before the
/// first record is loaded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("missing required key `{0}`")]
    MissingKey(&'static str),

    #[error("unsupported return mode: {0}")]
    UnsupportedReturnMode(String),

    #[error("invalid value for `{key}`: {reason}")]
    InvalidValue { key: &'static str, reason: String },

    #[error("malformed configuration: {0}")]
    Malformed(String),
}

/// A record's backing data could not be obtained.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("record `{0}` not found")]
    Missing(String),

    #[error("record `{id}` is malformed: {reason}")]
    Malformed { id: String, reason: String },

    #[error("i/o error on record `{id}`: {source}")]
    Io {
        id: String,
        #[source]
        source: std::io::Error,
    },
}

/// The configured selectors do not fit the shape of a loaded record, or an
/// array cannot be read at the rank it is used with.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WindowError {
    #[error("record `{record}`: index {index} out of range for {axis} axis of size {size}")]
    IndexOutOfRange {
        record: String,
        axis: &'static str,
        index: usize,
        size: usize,
    },

    #[error("record `{record}`: vectorizing needs at least 2 track channels, got {channels}")]
    TrackTooNarrow { record: String, channels: usize },

    #[error("record `{record}`: weather mode needs a grid but none was loaded")]
    MissingGrid { record: String },

    #[error("array of shape {shape:?} with {values} values cannot be read as rank {rank}")]
    Shape {
        rank: usize,
        shape: Vec<usize>,
        values: usize,
    },
}

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("load error: {0}")]
    Load(#[from] LoadError),

    #[error("window error: {0}")]
    Window(#[from] WindowError),
}

pub type Result<T, E = DatasetError> = std::result::Result<T, E>;
