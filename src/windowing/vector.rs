use crate::data::record::{ArrayData, Record};
use crate::error::WindowError;

/// Channels treated as position; only these survive vectorizing.
pub const POSITION_CHANNELS: usize = 2;

/// Turns absolute track positions into displacements between samples
/// `freq` steps apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VectorTransform {
    freq: usize,
}

impl VectorTransform {
    pub fn new(freq: usize) -> Self {
        Self { freq }
    }

    /// Output is `[T - freq, 2]`, or `[0, 2]` when the track is not longer
    /// than `freq`. An empty result is not an error.
    pub fn apply(&self, record: &Record) -> Result<ArrayData, WindowError> {
        let channels = record.track_channels();
        if channels < POSITION_CHANNELS {
            return Err(WindowError::TrackTooNarrow {
                record: record.id().to_string(),
                channels,
            });
        }

        let track = record.track();
        let steps: Vec<&[f32]> = track.values.chunks_exact(channels).collect();
        let len = steps.len().saturating_sub(self.freq);

        let mut values = Vec::with_capacity(len * POSITION_CHANNELS);
        for i in 0..len {
            let (later, earlier) = (steps[i + self.freq], steps[i]);
            for c in 0..POSITION_CHANNELS {
                values.push(later[c] - earlier[c]);
            }
        }

        Ok(ArrayData::new(vec![len, POSITION_CHANNELS], values))
    }
}
