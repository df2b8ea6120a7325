pub mod alignment;
pub mod dataset;
pub mod engine;
pub mod fusion;
pub mod reshaper;
pub mod source;
pub mod vector;

pub use alignment::{Alignment, AlignmentPlanner};
pub use dataset::{DatasetWindows, WindowDataset};
pub use engine::{Outcome, PassStats, SkipReason, Windows, WindowingEngine};
pub use fusion::FusionAssembler;
pub use reshaper::BatchReshaper;
pub use source::{FusedSource, TrackSource, WindowSource};
pub use vector::VectorTransform;
