use burn::tensor::backend::Backend;

use super::engine::{PassStats, Windows, WindowingEngine};
use super::fusion::FusionAssembler;
use super::source::{FusedSource, TrackSource};
use crate::config::{ReturnMode, WindowingConfig};
use crate::data::loader::SequenceLoader;
use crate::data::window::WindowPair;
use crate::error::{ConfigError, DatasetError};

/// Windowed view of a record list, selected by `return_mode`. Both variants
/// share the same engine and differ only in how inputs are built.
pub enum WindowDataset<B: Backend> {
    Fused(WindowingEngine<B, FusedSource>),
    Autoregressive(WindowingEngine<B, TrackSource>),
}

impl<B: Backend> WindowDataset<B> {
    pub fn new(config: &WindowingConfig, device: B::Device) -> Result<Self, ConfigError> {
        config.validate()?;

        let dataset = match config.return_mode {
            ReturnMode::Weather => {
                let fusion = FusionAssembler::new(
                    config.atm_levels.clone().unwrap_or_default(),
                    config.weather_input_dim.clone().unwrap_or_default(),
                );
                WindowDataset::Fused(WindowingEngine::new(config, FusedSource::new(fusion), device)?)
            }
            ReturnMode::Hurricane => {
                let source = TrackSource::new(config.hur_input_dim.clone().unwrap_or_default());
                WindowDataset::Autoregressive(WindowingEngine::new(config, source, device)?)
            }
        };

        Ok(dataset)
    }

    pub fn return_mode(&self) -> ReturnMode {
        match self {
            WindowDataset::Fused(_) => ReturnMode::Weather,
            WindowDataset::Autoregressive(_) => ReturnMode::Hurricane,
        }
    }

    /// Starts a fresh lazy pass over `ids`.
    pub fn windows<'a, L: SequenceLoader>(
        &'a self,
        loader: &'a L,
        ids: &'a [String],
    ) -> DatasetWindows<'a, B, L> {
        match self {
            WindowDataset::Fused(engine) => DatasetWindows::Fused(engine.windows(loader, ids)),
            WindowDataset::Autoregressive(engine) => {
                DatasetWindows::Autoregressive(engine.windows(loader, ids))
            }
        }
    }
}

pub enum DatasetWindows<'a, B: Backend, L> {
    Fused(Windows<'a, B, FusedSource, L>),
    Autoregressive(Windows<'a, B, TrackSource, L>),
}

impl<'a, B: Backend, L: SequenceLoader> DatasetWindows<'a, B, L> {
    pub fn stats(&self) -> PassStats {
        match self {
            DatasetWindows::Fused(windows) => windows.stats(),
            DatasetWindows::Autoregressive(windows) => windows.stats(),
        }
    }

    pub fn current_index(&self) -> Option<usize> {
        match self {
            DatasetWindows::Fused(windows) => windows.current_index(),
            DatasetWindows::Autoregressive(windows) => windows.current_index(),
        }
    }
}

impl<'a, B: Backend, L: SequenceLoader> Iterator for DatasetWindows<'a, B, L> {
    type Item = Result<WindowPair<B>, DatasetError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            DatasetWindows::Fused(windows) => windows
                .next()
                .map(|pair| pair.map(|pair| pair.map_input(Into::into))),
            DatasetWindows::Autoregressive(windows) => windows
                .next()
                .map(|pair| pair.map(|pair| pair.map_input(Into::into))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::InMemoryLoader;
    use crate::data::record::{ArrayData, Record};
    use crate::data::window::InputWindow;

    type TestBackend = burn::backend::NdArray;

    fn weather_record(id: &str, len: usize) -> Record {
        let track_values = (0..len * 3).map(|v| v as f32).collect();
        let track = ArrayData::new(vec![len, 3], track_values);
        let grid_len = len * 5 * 4 * 4 * 3;
        let grid = ArrayData::new(
            vec![len, 5, 4, 4, 3],
            (0..grid_len).map(|v| v as f32).collect(),
        );
        Record::new(id, track, Some(grid)).unwrap()
    }

    fn weather_config() -> WindowingConfig {
        WindowingConfig::new(2, 3, ReturnMode::Weather, vec![0, 1])
            .with_weather_input_dim(Some(vec![1]))
            .with_atm_levels(Some(vec![0, 2]))
    }

    #[test]
    fn weather_mode_fuses_levels_into_features() {
        let dataset = WindowDataset::<TestBackend>::new(&weather_config(), Default::default()).unwrap();
        let loader: InMemoryLoader = vec![weather_record("al07", 13)].into_iter().collect();
        let ids = vec!["al07".to_string()];

        let pairs: Vec<WindowPair<TestBackend>> = dataset
            .windows(&loader, &ids)
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(dataset.return_mode(), ReturnMode::Weather);
        assert_eq!(pairs.len(), 2);
        for pair in &pairs {
            assert_eq!(pair.input.leading_dims(), [2, 3]);
            assert_eq!(pair.input.feature_width(), 2);
            assert_eq!(pair.target.dims(), [2, 3, 2]);
            assert!(matches!(&pair.input, InputWindow::Fused(tensor) if tensor.dims() == [2, 3, 4, 4, 2]));
        }
    }

    #[test]
    fn weather_targets_are_shifted_but_grid_inputs_are_not() {
        let mut config = weather_config().with_phase_shift(1);
        config.batch_size = 1;
        let dataset = WindowDataset::<TestBackend>::new(&config, Default::default()).unwrap();
        let loader: InMemoryLoader = vec![weather_record("al10", 7)].into_iter().collect();
        let ids = vec!["al10".to_string()];

        let pairs: Vec<WindowPair<TestBackend>> = dataset
            .windows(&loader, &ids)
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(pairs.len(), 2);

        // track step t, channel c holds 3t + c; target covers steps 1..4
        let target = pairs[0].target.clone().into_data().convert::<f32>().value;
        assert_eq!(target, vec![3.0, 4.0, 6.0, 7.0, 9.0, 10.0]);

        // grid cell (0, 0) at step t: levels 0 and 2 of channel 1, steps 0..3
        let fused = pairs[0].input.clone().into_fused().unwrap();
        let cell = fused
            .slice([0..1, 0..3, 0..1, 0..1, 0..2])
            .into_data()
            .convert::<f32>()
            .value;
        assert_eq!(cell, vec![1.0, 97.0, 241.0, 337.0, 481.0, 577.0]);
    }

    #[test]
    fn hurricane_mode_yields_track_inputs() {
        let config = WindowingConfig::new(2, 3, ReturnMode::Hurricane, vec![0, 1])
            .with_hur_input_dim(Some(vec![0, 1, 2]));
        let dataset = WindowDataset::<TestBackend>::new(&config, Default::default()).unwrap();
        let loader: InMemoryLoader = vec![weather_record("al08", 12)].into_iter().collect();
        let ids = vec!["al08".to_string()];

        let mut windows = dataset.windows(&loader, &ids);
        let first = windows.next().unwrap().unwrap();

        assert_eq!(first.input.clone().into_track().unwrap().dims(), [2, 3, 3]);
        assert!(first.input.into_fused().is_none());
        assert_eq!(windows.current_index(), Some(0));
    }

    #[test]
    fn weather_mode_with_vectors_skips_uneven_records() {
        // the grid keeps every step while the vectorized track loses one
        let config = weather_config().with_vector_mode(true);
        let dataset = WindowDataset::<TestBackend>::new(&config, Default::default()).unwrap();
        let loader: InMemoryLoader = vec![weather_record("al09", 12)].into_iter().collect();
        let ids = vec!["al09".to_string()];

        let mut windows = dataset.windows(&loader, &ids);
        assert_eq!(windows.by_ref().count(), 0);
        assert_eq!(windows.stats().skipped, 1);
    }

    #[test]
    fn invalid_config_fails_before_any_record() {
        let mut config = weather_config();
        config.atm_levels = None;

        assert_eq!(
            WindowDataset::<TestBackend>::new(&config, Default::default()).err(),
            Some(ConfigError::MissingKey("atm_levels"))
        );
    }
}
