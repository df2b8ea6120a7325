use std::ops::Range;

/// How many full batches fit in a sequence and which steps are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alignment {
    pub n_batches: usize,
    /// Kept steps, relative to the start of the planned sequence.
    pub range: Range<usize>,
}

impl Alignment {
    pub fn len(&self) -> usize {
        self.range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.n_batches == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlignmentPlanner {
    batch_size: usize,
    window_len: usize,
    cut_start: bool,
}

impl AlignmentPlanner {
    pub fn new(batch_size: usize, window_len: usize, cut_start: bool) -> Self {
        Self {
            batch_size,
            window_len,
            cut_start,
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn window_len(&self) -> usize {
        self.window_len
    }

    /// Steps consumed by one batch of windows.
    pub fn stride(&self) -> usize {
        self.batch_size.saturating_mul(self.window_len)
    }

    /// With `cut_start` the most recent steps are kept, otherwise the earliest.
    pub fn plan(&self, len: usize) -> Alignment {
        let stride = self.stride();
        let n_batches = if stride == 0 { 0 } else { len / stride };
        let kept = n_batches * stride;

        let range = if self.cut_start {
            len - kept..len
        } else {
            0..kept
        };

        Alignment { n_batches, range }
    }
}
