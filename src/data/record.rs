use burn::tensor::backend::Backend;
use burn::tensor::{Data, Shape, Tensor};
use serde::{Deserialize, Serialize};

use crate::error::{LoadError, WindowError};

/// Dense row-major array as stored on disk: flat values plus shape.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ArrayData {
    pub shape: Vec<usize>,
    pub values: Vec<f32>,
}

impl ArrayData {
    pub fn new(shape: Vec<usize>, values: Vec<f32>) -> Self {
        Self { shape, values }
    }

    /// Length along the leading (time) axis.
    pub fn time_len(&self) -> usize {
        self.shape.first().copied().unwrap_or(0)
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Size of `axis`, zero when the array has no such axis.
    pub fn dim(&self, axis: usize) -> usize {
        self.shape.get(axis).copied().unwrap_or(0)
    }

    /// Number of values in one time step.
    pub fn step_len(&self) -> usize {
        self.shape.iter().skip(1).product()
    }

    pub fn is_consistent(&self) -> bool {
        self.shape.iter().product::<usize>() == self.values.len()
    }

    pub fn to_tensor<B: Backend, const D: usize>(
        &self,
        device: &B::Device,
    ) -> Result<Tensor<B, D>, WindowError> {
        let dims: [usize; D] = match self.shape.as_slice().try_into() {
            Ok(dims) if self.is_consistent() => dims,
            _ => {
                return Err(WindowError::Shape {
                    rank: D,
                    shape: self.shape.clone(),
                    values: self.values.len(),
                })
            }
        };

        let data = Data::new(self.values.clone(), Shape::new(dims));
        Ok(Tensor::from_data(
            data.convert::<B::FloatElem>(),
            device,
        ))
    }
}

/// One storm: its track and, when available, the co-located atmospheric grid.
/// Only built through `Record::new`, so shapes are always checked.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Record {
    id: String,
    track: ArrayData,        // [T, C]
    grid: Option<ArrayData>, // [T, L, M, N, C]
}

impl Record {
    pub fn new(
        id: impl Into<String>,
        track: ArrayData,
        grid: Option<ArrayData>,
    ) -> Result<Self, LoadError> {
        let id = id.into();
        let malformed = |reason: String| LoadError::Malformed {
            id: id.clone(),
            reason,
        };

        if track.rank() != 2 {
            return Err(malformed(format!(
                "track must be [time, channels], got shape {:?}",
                track.shape
            )));
        }
        if !track.is_consistent() {
            return Err(malformed(format!(
                "track shape {:?} does not match {} values",
                track.shape,
                track.values.len()
            )));
        }

        if let Some(grid) = &grid {
            if grid.rank() != 5 {
                return Err(malformed(format!(
                    "grid must be [time, levels, m, n, channels], got shape {:?}",
                    grid.shape
                )));
            }
            if !grid.is_consistent() {
                return Err(malformed(format!(
                    "grid shape {:?} does not match {} values",
                    grid.shape,
                    grid.values.len()
                )));
            }
            if grid.time_len() != track.time_len() {
                return Err(malformed(format!(
                    "track has {} steps but grid has {}",
                    track.time_len(),
                    grid.time_len()
                )));
            }
        }

        Ok(Self { id, track, grid })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn track(&self) -> &ArrayData {
        &self.track
    }

    pub fn grid(&self) -> Option<&ArrayData> {
        self.grid.as_ref()
    }

    pub fn without_grid(mut self) -> Self {
        self.grid = None;
        self
    }

    pub fn track_channels(&self) -> usize {
        self.track.dim(1)
    }
}
