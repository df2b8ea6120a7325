use burn::tensor::{backend::Backend, Tensor};

use super::fusion::FusionAssembler;
use super::reshaper::BatchReshaper;
use crate::config::ReturnMode;
use crate::data::record::{ArrayData, Record};
use crate::data::window::InputWindow;
use crate::error::WindowError;
use crate::utils::check_indices;

/// Builds the input side of each window pair. Targets always come from the
/// track and are built by the engine.
pub trait WindowSource<B: Backend> {
    type Input: Clone + Into<InputWindow<B>>;

    fn return_mode(&self) -> ReturnMode;

    /// Checks that the selectors fit `record`. `track` is the possibly
    /// vectorized track that windows are cut from.
    fn check(&self, record: &Record, track: &ArrayData) -> Result<(), WindowError>;

    fn inputs(
        &self,
        record: &Record,
        track: &ArrayData,
        reshaper: &BatchReshaper,
        device: &B::Device,
    ) -> Result<Vec<Self::Input>, WindowError>;
}

/// Track channels in, track channels out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackSource {
    input_dim: Vec<usize>,
}

impl TrackSource {
    pub fn new(input_dim: Vec<usize>) -> Self {
        Self { input_dim }
    }
}

impl<B: Backend> WindowSource<B> for TrackSource {
    type Input = Tensor<B, 3>;

    fn return_mode(&self) -> ReturnMode {
        ReturnMode::Hurricane
    }

    fn check(&self, record: &Record, track: &ArrayData) -> Result<(), WindowError> {
        check_indices(record.id(), "track channel", &self.input_dim, track.dim(1))
    }

    fn inputs(
        &self,
        _record: &Record,
        track: &ArrayData,
        reshaper: &BatchReshaper,
        device: &B::Device,
    ) -> Result<Vec<Self::Input>, WindowError> {
        let tensor: Tensor<B, 2> = track.to_tensor(device)?;
        Ok(reshaper.buffer(tensor, Some(self.input_dim.as_slice()), 0))
    }
}

/// Fused atmospheric levels in, track channels out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FusedSource {
    fusion: FusionAssembler,
}

impl FusedSource {
    pub fn new(fusion: FusionAssembler) -> Self {
        Self { fusion }
    }
}

impl<B: Backend> WindowSource<B> for FusedSource {
    type Input = Tensor<B, 5>;

    fn return_mode(&self) -> ReturnMode {
        ReturnMode::Weather
    }

    fn check(&self, record: &Record, _track: &ArrayData) -> Result<(), WindowError> {
        self.fusion.check(record)
    }

    fn inputs(
        &self,
        record: &Record,
        _track: &ArrayData,
        reshaper: &BatchReshaper,
        device: &B::Device,
    ) -> Result<Vec<Self::Input>, WindowError> {
        let grid = record.grid().ok_or_else(|| WindowError::MissingGrid {
            record: record.id().to_string(),
        })?;

        let grid: Tensor<B, 5> = grid.to_tensor(device)?;
        Ok(reshaper.buffer(self.fusion.assemble(grid), None, 0))
    }
}
