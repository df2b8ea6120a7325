use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::config::{ReturnMode, WindowingConfig};
use crate::error::ConfigError;

/// Candidate values for the windowing hyper-parameters. Every other field
/// of a generated config is taken from the base config.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ExperimentGrid {
    pub batch_size: Vec<usize>,
    pub window_len: Vec<usize>,
    pub phase_shift: Vec<usize>,
    pub cut_start: Vec<bool>,
    pub return_mode: Vec<ReturnMode>,
    pub vector_mode: Vec<bool>,
    pub vector_freq: Vec<usize>,
}

impl ExperimentGrid {
    /// A grid with a single point: the base config itself.
    pub fn from_base(base: &WindowingConfig) -> Self {
        Self {
            batch_size: vec![base.batch_size],
            window_len: vec![base.window_len],
            phase_shift: vec![base.phase_shift],
            cut_start: vec![base.cut_start],
            return_mode: vec![base.return_mode],
            vector_mode: vec![base.vector_mode],
            vector_freq: vec![base.vector_freq],
        }
    }

    pub fn len(&self) -> usize {
        self.batch_size.len()
            * self.window_len.len()
            * self.phase_shift.len()
            * self.cut_start.len()
            * self.return_mode.len()
            * self.vector_mode.len()
            * self.vector_freq.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cartesian product in a fixed order, the last field varying fastest.
    /// Every produced config is validated.
    pub fn enumerate(&self, base: &WindowingConfig) -> Result<Vec<WindowingConfig>, ConfigError> {
        let mut configs = Vec::with_capacity(self.len());

        for batch_size in &self.batch_size {
            for window_len in &self.window_len {
                for phase_shift in &self.phase_shift {
                    for cut_start in &self.cut_start {
                        for return_mode in &self.return_mode {
                            for vector_mode in &self.vector_mode {
                                for vector_freq in &self.vector_freq {
                                    let mut config = base.clone();
                                    config.batch_size = *batch_size;
                                    config.window_len = *window_len;
                                    config.phase_shift = *phase_shift;
                                    config.cut_start = *cut_start;
                                    config.return_mode = *return_mode;
                                    config.vector_mode = *vector_mode;
                                    config.vector_freq = *vector_freq;
                                    config.validate()?;
                                    configs.push(config);
                                }
                            }
                        }
                    }
                }
            }
        }

        Ok(configs)
    }
}

/// Reorders `configs` with a seeded RNG; the same seed gives the same order.
pub fn shuffled(mut configs: Vec<WindowingConfig>, seed: u64) -> Vec<WindowingConfig> {
    let mut rng = StdRng::seed_from_u64(seed);
    configs.shuffle(&mut rng);
    configs
}
