use std::borrow::Cow;

use burn::tensor::{backend::Backend, Tensor};
use tracing::{debug, info, warn};

use super::alignment::AlignmentPlanner;
use super::reshaper::BatchReshaper;
use super::source::WindowSource;
use super::vector::VectorTransform;
use crate::config::{LoadPolicy, WindowingConfig};
use crate::data::loader::SequenceLoader;
use crate::data::record::{ArrayData, Record};
use crate::data::window::WindowPair;
use crate::error::{ConfigError, DatasetError, WindowError};
use crate::utils::check_indices;

/// Counters for one pass over a record list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassStats {
    /// Records too short or whose buffers came out empty or uneven.
    pub skipped: usize,
    /// Records dropped under `LoadPolicy::Skip`.
    pub load_failures: usize,
    pub emitted: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    TooShort { len: usize, min: usize },
    EmptyBuffer,
    CountMismatch { inputs: usize, targets: usize },
}

pub enum Outcome<B: Backend, I> {
    Emit(Vec<WindowPair<B, I>>),
    Skip(SkipReason),
}

pub struct WindowingEngine<B: Backend, S> {
    source: S,
    reshaper: BatchReshaper,
    vectors: Option<VectorTransform>,
    output_dim: Vec<usize>,
    phase_shift: usize,
    min_len: usize,
    load_policy: LoadPolicy,
    device: B::Device,
}

impl<B: Backend, S: WindowSource<B>> WindowingEngine<B, S> {
    pub fn new(config: &WindowingConfig, source: S, device: B::Device) -> Result<Self, ConfigError> {
        config.validate()?;
        if config.return_mode != source.return_mode() {
            return Err(ConfigError::InvalidValue {
                key: "return_mode",
                reason: format!(
                    "{} windows cannot be built for return mode {}",
                    source.return_mode(),
                    config.return_mode
                ),
            });
        }

        let planner = AlignmentPlanner::new(config.batch_size, config.window_len, config.cut_start);

        Ok(Self {
            source,
            reshaper: BatchReshaper::new(planner),
            vectors: config
                .vector_mode
                .then(|| VectorTransform::new(config.vector_freq)),
            output_dim: config.hur_output_dim.clone(),
            phase_shift: config.phase_shift,
            min_len: config.min_len(),
            load_policy: config.load_policy,
            device,
        })
    }

    /// Starts a fresh lazy pass over `ids`, in order.
    pub fn windows<'a, L: SequenceLoader>(
        &'a self,
        loader: &'a L,
        ids: &'a [String],
    ) -> Windows<'a, B, S, L> {
        Windows {
            engine: self,
            loader,
            ids,
            position: 0,
            current: None,
            pending: Vec::new().into_iter(),
            stats: PassStats::default(),
            done: false,
        }
    }

    /// Every window pair of one record, or the reason it yields none.
    pub fn process(&self, record: &Record) -> Result<Outcome<B, S::Input>, WindowError> {
        let track: Cow<'_, ArrayData> = match &self.vectors {
            Some(vectors) => Cow::Owned(vectors.apply(record)?),
            None => Cow::Borrowed(record.track()),
        };

        let len = track.time_len();
        if len < self.min_len {
            return Ok(Outcome::Skip(SkipReason::TooShort {
                len,
                min: self.min_len,
            }));
        }

        check_indices(record.id(), "track channel", &self.output_dim, track.dim(1))?;
        self.source.check(record, &track)?;

        let inputs = self
            .source
            .inputs(record, &track, &self.reshaper, &self.device)?;
        let targets: Vec<Tensor<B, 3>> = self.reshaper.buffer(
            track.to_tensor::<B, 2>(&self.device)?,
            Some(self.output_dim.as_slice()),
            self.phase_shift,
        );

        if inputs.is_empty() || targets.is_empty() {
            return Ok(Outcome::Skip(SkipReason::EmptyBuffer));
        }
        if inputs.len() != targets.len() {
            return Ok(Outcome::Skip(SkipReason::CountMismatch {
                inputs: inputs.len(),
                targets: targets.len(),
            }));
        }

        let pairs = inputs
            .into_iter()
            .zip(targets)
            .enumerate()
            .map(|(slot, (input, target))| WindowPair {
                record: record.id().to_string(),
                slot,
                input,
                target,
            })
            .collect();

        Ok(Outcome::Emit(pairs))
    }
}

/// One pass over a record list. Records are loaded one at a time and all of
/// a record's windows are built before the first is yielded.
pub struct Windows<'a, B: Backend, S: WindowSource<B>, L> {
    engine: &'a WindowingEngine<B, S>,
    loader: &'a L,
    ids: &'a [String],
    position: usize,
    current: Option<usize>,
    pending: std::vec::IntoIter<WindowPair<B, S::Input>>,
    stats: PassStats,
    done: bool,
}

impl<'a, B: Backend, S: WindowSource<B>, L: SequenceLoader> Windows<'a, B, S, L> {
    pub fn stats(&self) -> PassStats {
        self.stats
    }

    /// Index into the record list of the record being processed.
    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    fn finish(&mut self) {
        if self.done {
            return;
        }
        self.done = true;
        info!(
            skipped = self.stats.skipped,
            load_failures = self.stats.load_failures,
            emitted = self.stats.emitted,
            "Skipped {} records",
            self.stats.skipped
        );
    }
}

impl<'a, B: Backend, S: WindowSource<B>, L: SequenceLoader> Iterator for Windows<'a, B, S, L> {
    type Item = Result<WindowPair<B, S::Input>, DatasetError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(pair) = self.pending.next() {
                self.stats.emitted += 1;
                return Some(Ok(pair));
            }
            if self.done {
                return None;
            }

            let ids = self.ids;
            let Some(id) = ids.get(self.position) else {
                self.finish();
                return None;
            };
            self.current = Some(self.position);
            self.position += 1;

            let with_grid = self.engine.source.return_mode().needs_grid();
            let record = match self.loader.load(id, with_grid) {
                Ok(record) => record,
                Err(err) => match self.engine.load_policy {
                    LoadPolicy::Abort => {
                        self.finish();
                        return Some(Err(err.into()));
                    }
                    LoadPolicy::Skip => {
                        warn!(record = %id, error = %err, "Could not load record");
                        self.stats.load_failures += 1;
                        continue;
                    }
                },
            };

            match self.engine.process(&record) {
                Ok(Outcome::Emit(pairs)) => self.pending = pairs.into_iter(),
                Ok(Outcome::Skip(reason)) => {
                    debug!(record = %id, ?reason, "Skipping record");
                    self.stats.skipped += 1;
                }
                Err(err) => {
                    self.finish();
                    return Some(Err(err.into()));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReturnMode;
    use crate::data::loader::InMemoryLoader;
    use crate::error::LoadError;
    use crate::windowing::source::TrackSource;

    type TestBackend = burn::backend::NdArray;

    /// Step `t` carries `[t, 100 + t, 200 + t]`.
    fn record(id: &str, len: usize) -> Record {
        let values = (0..len)
            .flat_map(|t| [t as f32, 100.0 + t as f32, 200.0 + t as f32])
            .collect();
        Record::new(id, ArrayData::new(vec![len, 3], values), None).unwrap()
    }

    fn config() -> WindowingConfig {
        WindowingConfig::new(2, 3, ReturnMode::Hurricane, vec![0, 1])
            .with_hur_input_dim(Some(vec![0, 1, 2]))
    }

    fn engine(config: &WindowingConfig) -> WindowingEngine<TestBackend, TrackSource> {
        let source = TrackSource::new(config.hur_input_dim.clone().unwrap());
        WindowingEngine::new(config, source, Default::default()).unwrap()
    }

    fn ids(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn emits_two_pairs_for_thirteen_steps() {
        let engine = engine(&config());
        let loader: InMemoryLoader = vec![record("al01", 13)].into_iter().collect();
        let ids = ids(&["al01"]);

        let pairs: Vec<_> = engine
            .windows(&loader, &ids)
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(pairs.len(), 2);
        for (slot, pair) in pairs.iter().enumerate() {
            assert_eq!(pair.slot, slot);
            assert_eq!(pair.input.dims(), [2, 3, 3]);
            assert_eq!(pair.target.dims(), [2, 3, 2]);
        }
    }

    #[test]
    fn short_records_are_counted_as_skips() {
        let engine = engine(&config());
        let loader: InMemoryLoader = vec![
            record("short_a", 5),
            record("long", 12),
            record("short_b", 1),
            record("short_c", 0),
        ]
        .into_iter()
        .collect();
        let ids = ids(&["short_a", "long", "short_b", "short_c"]);

        let mut windows = engine.windows(&loader, &ids);
        let emitted = windows.by_ref().filter(|pair| pair.is_ok()).count();

        assert_eq!(emitted, 2);
        assert_eq!(windows.stats().skipped, 3);
        assert_eq!(windows.stats().emitted, 2);
        assert_eq!(windows.current_index(), Some(3));
    }

    #[test]
    fn phase_shift_that_empties_target_skips_record() {
        let config = config().with_phase_shift(1);
        let engine = engine(&config);

        // 6 steps fill one batch for the input, but only 5 remain for the target.
        let outcome = engine.process(&record("al02", 6)).unwrap();
        assert!(matches!(outcome, Outcome::Skip(SkipReason::EmptyBuffer)));
    }

    #[test]
    fn uneven_buffers_skip_the_whole_record() {
        let config = config().with_phase_shift(2);
        let engine = engine(&config);

        // inputs: 13 / 6 = 2 windows, targets: 11 / 6 = 1 window
        let outcome = engine.process(&record("al03", 13)).unwrap();
        assert!(matches!(
            outcome,
            Outcome::Skip(SkipReason::CountMismatch {
                inputs: 2,
                targets: 1
            })
        ));
    }

    #[test]
    fn target_is_shifted_into_the_future() {
        let mut config = config().with_phase_shift(1);
        config.batch_size = 1;
        let engine = engine(&config);

        let Outcome::Emit(pairs) = engine.process(&record("al04", 7)).unwrap() else {
            panic!("record should emit");
        };
        let input = pairs[0].input.clone().slice([0..1, 0..3, 0..1]);
        let target = pairs[0].target.clone().slice([0..1, 0..3, 0..1]);

        assert_eq!(input.into_data().convert::<f32>().value, vec![0.0, 1.0, 2.0]);
        assert_eq!(target.into_data().convert::<f32>().value, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn vector_mode_windows_displacements() {
        let mut config = config()
            .with_vector_mode(true)
            .with_hur_input_dim(Some(vec![0, 1]));
        config.batch_size = 1;
        let engine = engine(&config);

        let Outcome::Emit(pairs) = engine.process(&record("al05", 7)).unwrap() else {
            panic!("record should emit");
        };

        assert_eq!(pairs.len(), 2);
        assert_eq!(
            pairs[0].input.clone().into_data().convert::<f32>().value,
            vec![1.0; 6]
        );
    }

    #[test]
    fn out_of_range_channel_ends_the_pass() {
        let config = config().with_hur_input_dim(Some(vec![0, 5]));
        let engine = engine(&config);
        let loader: InMemoryLoader = vec![record("a", 12), record("b", 12)].into_iter().collect();
        let ids = ids(&["a", "b"]);

        let results: Vec<_> = engine.windows(&loader, &ids).collect();

        assert_eq!(results.len(), 1);
        assert!(matches!(
            results[0],
            Err(DatasetError::Window(WindowError::IndexOutOfRange { index: 5, .. }))
        ));
    }

    #[test]
    fn load_policy_decides_between_abort_and_skip() {
        let loader: InMemoryLoader = vec![record("present", 12)].into_iter().collect();
        let ids = ids(&["missing", "present"]);

        let aborting = engine(&config());
        let results: Vec<_> = aborting.windows(&loader, &ids).collect();
        assert_eq!(results.len(), 1);
        assert!(matches!(
            results[0],
            Err(DatasetError::Load(LoadError::Missing(_)))
        ));

        let skipping = engine(&config().with_load_policy(LoadPolicy::Skip));
        let mut windows = skipping.windows(&loader, &ids);
        assert_eq!(windows.by_ref().filter(|pair| pair.is_ok()).count(), 2);
        assert_eq!(windows.stats().load_failures, 1);
        assert_eq!(windows.stats().skipped, 0);
    }

    #[test]
    fn each_call_starts_a_fresh_pass() {
        let engine = engine(&config());
        let loader: InMemoryLoader = vec![record("a", 12), record("b", 2)].into_iter().collect();
        let ids = ids(&["a", "b"]);

        for _ in 0..2 {
            let mut windows = engine.windows(&loader, &ids);
            assert_eq!(windows.by_ref().count(), 2);
            assert_eq!(windows.stats().skipped, 1);
        }
    }

    #[test]
    fn mismatched_return_mode_is_a_config_error() {
        let config = WindowingConfig::new(2, 3, ReturnMode::Weather, vec![0, 1])
            .with_weather_input_dim(Some(vec![0]))
            .with_atm_levels(Some(vec![0]));
        let source = TrackSource::new(vec![0]);

        assert!(WindowingEngine::<TestBackend, _>::new(&config, source, Default::default()).is_err());
    }
}
