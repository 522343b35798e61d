//! Buffers handed to a processor for one render quantum.
//!
//! The host allocates every bus before rendering starts and reuses it for each
//! quantum; processors only ever borrow them for the duration of one call.

use std::collections::HashMap;

/// Frames in one render quantum unless the host configures otherwise.
pub const RENDER_QUANTUM_FRAMES: usize = 128;

/// One channel group: an ordered set of equally sized channel buffers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AudioBus {
    channels: Vec<Vec<f32>>,
}

impl AudioBus {
    /// Allocates `channel_count` silent channels of `frames` samples each.
    pub fn new(channel_count: usize, frames: usize) -> Self {
        Self {
            channels: vec![vec![0.0; frames]; channel_count],
        }
    }

    /// A bus with no channels, i.e. nothing connected.
    pub fn disconnected() -> Self {
        Self::default()
    }

    pub fn from_channels(channels: Vec<Vec<f32>>) -> Self {
        Self { channels }
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    pub fn channel_mut(&mut self, index: usize) -> Option<&mut [f32]> {
        self.channels.get_mut(index).map(Vec::as_mut_slice)
    }

    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    /// Zeroes every channel without touching the allocation.
    pub fn silence(&mut self) {
        for channel in &mut self.channels {
            channel.fill(0.0);
        }
    }
}

/// Automation values for one quantum, keyed by parameter name.
#[derive(Debug, Clone, Default)]
pub struct ParameterValues {
    values: HashMap<String, Vec<f32>>,
}

impl ParameterValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, values: Vec<f32>) {
        self.values.insert(name.into(), values);
    }

    pub fn get(&self, name: &str) -> Option<&[f32]> {
        self.values.get(name).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocates_silent_channels() {
        let bus = AudioBus::new(2, RENDER_QUANTUM_FRAMES);

        assert_eq!(bus.channel_count(), 2);
        assert!(bus.channels().iter().all(|c| c.len() == RENDER_QUANTUM_FRAMES));
        assert!(bus.channel(0).unwrap().iter().all(|s| *s == 0.0));
        assert!(bus.channel(2).is_none());
    }

    #[test]
    fn silence_keeps_shape() {
        let mut bus = AudioBus::from_channels(vec![vec![0.5, -0.5]]);
        bus.silence();
        assert_eq!(bus.channel(0).unwrap(), &[0.0, 0.0]);
    }

    #[test]
    fn parameter_values_look_up_by_name() {
        let mut params = ParameterValues::new();
        assert!(params.is_empty());

        params.insert("gain", vec![0.5; 4]);

        assert!(!params.is_empty());
        assert_eq!(params.get("gain"), Some(&[0.5; 4][..]));
        assert!(params.get("pan").is_none());
    }

    #[test]
    fn disconnected_bus_has_no_channels() {
        assert!(AudioBus::disconnected().is_empty());
    }
}
