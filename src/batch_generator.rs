use burn::tensor::backend::Backend;
use tracing::info;

use crate::config::WindowingConfig;
use crate::data::loader::SequenceLoader;
use crate::data::split::{RecordSplit, Subset};
use crate::error::ConfigError;
use crate::windowing::{DatasetWindows, WindowDataset};

/// Splits a record list and hands out window passes per subset.
pub struct BatchGenerator<B: Backend, L> {
    dataset: WindowDataset<B>,
    loader: L,
    split: RecordSplit,
}

impl<B: Backend, L: SequenceLoader> BatchGenerator<B, L> {
    pub fn new(
        config: &WindowingConfig,
        loader: L,
        ids: &[String],
        test_ratio: f64,
        val_ratio: f64,
        device: B::Device,
    ) -> Result<Self, ConfigError> {
        let dataset = WindowDataset::new(config, device)?;
        let split = RecordSplit::new(ids, test_ratio, val_ratio)?;

        info!(
            test = split.test.len(),
            validation = split.validation.len(),
            train = split.train.len(),
            mode = %config.return_mode,
            "Split records"
        );

        Ok(Self {
            dataset,
            loader,
            split,
        })
    }

    /// A fresh, lazy pass over one subset.
    pub fn generate(&self, subset: Subset) -> DatasetWindows<'_, B, L> {
        self.dataset.windows(&self.loader, self.split.get(subset))
    }
}
