//! Turns variable-length storm records into fixed-shape window pairs for
//! sequence models.
//!
//! Each record's track (and, in weather mode, its atmospheric grid) is
//! trimmed to a multiple of `batch_size * window_len`, laid out as
//! `batch_size` parallel rows and cut into consecutive windows. Targets are
//! always track windows moved `phase_shift` steps into the future.

pub mod batch_generator;
pub mod config;
pub mod data;
pub mod error;
pub mod experiment;
pub mod utils;
pub mod windowing;

pub use batch_generator::BatchGenerator;
pub use config::{LoadPolicy, ReturnMode, WindowingConfig};
pub use data::loader::{InMemoryLoader, JsonFileLoader, JsonRowsLoader, SequenceLoader};
pub use data::record::{ArrayData, Record};
pub use data::split::{RecordSplit, Subset};
pub use data::window::{InputWindow, WindowPair};
pub use error::{ConfigError, DatasetError, LoadError, WindowError};
pub use windowing::{PassStats, WindowDataset};
