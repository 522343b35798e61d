//! Control-side consumers of [`SumMessage`]s.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::{config::MeterConfig, message::SumMessage};

/// Display values derived from one metric message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelReading {
    /// Mean absolute amplitude over the quantum.
    pub mean_abs: f64,
    /// `mean_abs` in dBFS, never below the configured floor.
    pub dbfs: f64,
    /// Peak-hold level with release applied.
    pub held: f64,
}

/// Level meter with peak hold, fed from the control thread.
#[derive(Debug, Clone)]
pub struct LevelMeter {
    config: MeterConfig,
    held: f64,
    readings: u64,
}

impl LevelMeter {
    pub fn new(config: MeterConfig) -> Self {
        Self {
            config,
            held: 0.0,
            readings: 0,
        }
    }

    pub fn update(&mut self, message: &SumMessage) -> LevelReading {
        let mean_abs = mean_amplitude(message);
        self.held = (self.held * self.config.release).max(mean_abs);
        self.readings += 1;

        LevelReading {
            mean_abs,
            dbfs: to_dbfs(mean_abs, self.config.floor_db),
            held: self.held,
        }
    }

    pub fn held(&self) -> f64 {
        self.held
    }

    pub fn readings(&self) -> u64 {
        self.readings
    }

}

impl Default for LevelMeter {
    fn default() -> Self {
        Self::new(MeterConfig::default())
    }
}

/// Rolling history of per-quantum mean amplitudes, for waveform drawing.
#[derive(Debug, Clone)]
pub struct WaveformTrace {
    capacity: usize,
    points: VecDeque<f64>,
}

impl WaveformTrace {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            points: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, message: &SumMessage) {
        if self.capacity == 0 {
            return;
        }
        if self.points.len() == self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(mean_amplitude(message));
    }

    pub fn points(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Largest value currently held, for scaling a plot.
    pub fn max(&self) -> f64 {
        self.points.iter().copied().fold(0.0, f64::max)
    }
}

/// `sum / length`, or zero for an empty quantum.
pub fn mean_amplitude(message: &SumMessage) -> f64 {
    if message.length == 0 {
        0.0
    } else {
        message.sum / message.length as f64
    }
}

fn to_dbfs(amplitude: f64, floor_db: f64) -> f64 {
    if amplitude <= 0.0 {
        return floor_db;
    }
    (20.0 * amplitude.log10()).max(floor_db)
}
