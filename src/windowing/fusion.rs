use burn::tensor::{backend::Backend, Tensor};

use crate::data::record::Record;
use crate::error::WindowError;
use crate::utils::{check_indices, select};

/// Picks levels and channels from an atmospheric grid and merges them into
/// one feature axis, level-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FusionAssembler {
    atm_levels: Vec<usize>,
    channels: Vec<usize>,
}

impl FusionAssembler {
    pub fn new(atm_levels: Vec<usize>, channels: Vec<usize>) -> Self {
        Self {
            atm_levels,
            channels,
        }
    }

    /// Width of the fused feature axis.
    pub fn feature_width(&self) -> usize {
        self.atm_levels.len() * self.channels.len()
    }

    pub fn check(&self, record: &Record) -> Result<(), WindowError> {
        let grid = record.grid().ok_or_else(|| WindowError::MissingGrid {
            record: record.id().to_string(),
        })?;

        check_indices(record.id(), "level", &self.atm_levels, grid.dim(1))?;
        check_indices(record.id(), "grid channel", &self.channels, grid.dim(4))
    }

    /// `[T, L, M, N, C]` becomes `[T, M, N, levels * channels]`; feature
    /// `l * channels + c` is channel `c` of the `l`-th selected level.
    pub fn assemble<B: Backend>(&self, grid: Tensor<B, 5>) -> Tensor<B, 4> {
        let grid = select(grid, 4, &self.channels);
        let grid = select(grid, 1, &self.atm_levels);

        let [t, l, m, n, c] = grid.dims();
        grid.swap_dims(1, 2).swap_dims(2, 3).reshape([t, m, n, l * c])
    }
}
