use burn::tensor::{backend::Backend, Tensor};

use super::alignment::{Alignment, AlignmentPlanner};
use crate::utils::{select, split};

/// Lays an aligned sequence out as `batch_size` parallel rows and cuts the
/// rows into consecutive, non-overlapping windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchReshaper {
    planner: AlignmentPlanner,
}

impl BatchReshaper {
    pub fn new(planner: AlignmentPlanner) -> Self {
        Self { planner }
    }

    pub fn planner(&self) -> &AlignmentPlanner {
        &self.planner
    }

    /// Plan for a sequence of `len` steps moved forward by `phase_shift`.
    /// The returned range is in the coordinates of the unshifted sequence.
    pub fn plan(&self, len: usize, phase_shift: usize) -> Alignment {
        let mut alignment = self.planner.plan(len.saturating_sub(phase_shift));
        alignment.range = alignment.range.start + phase_shift..alignment.range.end + phase_shift;
        alignment
    }

    /// `[T, ...dims]` becomes `[batch_size, n_batches * window_len, ...dims]`.
    /// Row `r` holds the `r`-th contiguous block of the kept steps.
    pub fn align<B: Backend, const D: usize, const D2: usize>(
        &self,
        data: Tensor<B, D>,
        alignment: &Alignment,
    ) -> Tensor<B, D2> {
        debug_assert_eq!(D2, D + 1);

        let dims = data.dims();
        let mut ranges = dims.map(|x| 0..x);
        ranges[0] = alignment.range.clone();

        let mut shape = [0; D2];
        shape[0] = self.planner.batch_size();
        shape[1] = alignment.n_batches * self.planner.window_len();
        shape[2..].copy_from_slice(&dims[1..]);

        data.slice(ranges).reshape(shape)
    }

    /// Windows of shape `[batch_size, window_len, ...dims]`, in time order.
    /// `chosen_dims` filters the last axis; indices must already be checked.
    /// Empty when the shifted sequence is shorter than one full batch.
    pub fn buffer<B: Backend, const D: usize, const D2: usize>(
        &self,
        data: Tensor<B, D>,
        chosen_dims: Option<&[usize]>,
        phase_shift: usize,
    ) -> Vec<Tensor<B, D2>> {
        let alignment = self.plan(data.dims()[0], phase_shift);
        if alignment.is_empty() {
            return Vec::new();
        }

        let aligned: Tensor<B, D2> = self.align(data, &alignment);
        let aligned = match chosen_dims {
            Some(dims) => select(aligned, D2 - 1, dims),
            None => aligned,
        };

        split(aligned, self.planner.window_len(), 1)
    }
}
