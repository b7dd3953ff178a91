//! Tempo in beats per minute

use std::fmt;

use crate::mapping::{denormalize, normalize};

pub const MIN_BPM: f64 = 1.0;
pub const MAX_BPM: f64 = 960.0;

/// A tempo clamped to 1-960 bpm
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Tempo {
    bpm: f64,
}

impl Tempo {
    pub fn new(bpm: f64) -> Self {
        Self {
            bpm: bpm.clamp(MIN_BPM, MAX_BPM),
        }
    }

    pub fn from_normalized_value(value: f64) -> Self {
        Self::new(denormalize(value, MIN_BPM, MAX_BPM))
    }

    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    pub fn normalized_value(&self) -> f64 {
        normalize(self.bpm, MIN_BPM, MAX_BPM)
    }
}

impl fmt::Display for Tempo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4} bpm", self.bpm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tempo_clamps() {
        assert_eq!(Tempo::new(0.0).bpm(), 1.0);
        assert_eq!(Tempo::new(2000.0).bpm(), 960.0);
    }

    #[test]
    fn test_tempo_normalized() {
        assert_eq!(Tempo::new(1.0).normalized_value(), 0.0);
        assert_eq!(Tempo::new(960.0).normalized_value(), 1.0);
        assert_eq!(Tempo::from_normalized_value(1.0).bpm(), 960.0);
    }

    #[test]
    fn test_tempo_display() {
        assert_eq!(Tempo::new(120.0).to_string(), "120.0000 bpm");
    }
}
