use burn::tensor::{backend::Backend, Data, Int, Shape, Tensor};

use crate::error::WindowError;

/// Splits `x` along `dim` into consecutive chunks of length `size`.
/// A trailing chunk shorter than `size` is dropped.
pub fn split<B: Backend, const D: usize>(x: Tensor<B, D>, size: usize, dim: i32) -> Vec<Tensor<B, D>> {
    let dim: usize = if dim < 0 { D - 1 } else { dim as usize };

    if size == 0 {
        return Vec::new();
    }

    let reps = x.dims()[dim] / size;
    (0..reps)
        .map(|i| {
            let mut ranges = x.dims().map(|x| 0..x);
            ranges[dim] = i * size..(i + 1) * size;
            x.clone().slice(ranges)
        })
        .collect()
}

pub fn index_tensor<B: Backend>(indices: &[usize], device: &B::Device) -> Tensor<B, 1, Int> {
    let values: Vec<i64> = indices.iter().map(|i| *i as i64).collect();
    let data = Data::new(values, Shape::new([indices.len()]));
    Tensor::from_data(data.convert::<B::IntElem>(), device)
}

/// Keeps `indices` along `dim`, in the given order.
pub fn select<B: Backend, const D: usize>(x: Tensor<B, D>, dim: usize, indices: &[usize]) -> Tensor<B, D> {
    let indices = index_tensor::<B>(indices, &x.device());
    x.select(dim, indices)
}

/// Errors unless every index is below `size`.
pub fn check_indices(
    record: &str,
    axis: &'static str,
    indices: &[usize],
    size: usize,
) -> Result<(), WindowError> {
    match indices.iter().find(|index| **index >= size) {
        Some(index) => Err(WindowError::IndexOutOfRange {
            record: record.to_string(),
            axis,
            index: *index,
            size,
        }),
        None => Ok(()),
    }
}
