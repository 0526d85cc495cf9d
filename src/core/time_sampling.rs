//! Time sampling types.
//!
//! Cached properties are sampled over time. The TimeSampling struct
//! describes when each sample was recorded and resolves a
//! [`SampleSelector`] to a sample index.

use serde::{Deserialize, Serialize};

use crate::core::SampleSelector;
use crate::util::Chrono;

/// Type of time sampling.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TimeSampling {
    /// Every sample sits at time 0.
    #[default]
    Identity,

    /// Uniform sampling: samples at regular intervals.
    /// start_time + index * time_per_cycle
    Uniform {
        time_per_cycle: Chrono,
        start_time: Chrono,
    },

    /// Cyclic sampling: repeating pattern of sample times.
    Cyclic {
        time_per_cycle: Chrono,
        times: Vec<Chrono>,
    },

    /// Acyclic sampling: explicit time for each sample.
    Acyclic {
        times: Vec<Chrono>,
    },
}

impl TimeSampling {
    /// Create uniform time sampling.
    pub fn uniform(time_per_cycle: Chrono, start_time: Chrono) -> Self {
        Self::Uniform { time_per_cycle, start_time }
    }

    /// Create acyclic time sampling from explicit times.
    pub fn acyclic(times: Vec<Chrono>) -> Self {
        Self::Acyclic { times }
    }

    /// Create cyclic time sampling.
    pub fn cyclic(time_per_cycle: Chrono, times: Vec<Chrono>) -> Self {
        Self::Cyclic { time_per_cycle, times }
    }

    /// Get the time for a specific sample index.
    pub fn sample_time(&self, index: usize) -> Chrono {
        match self {
            Self::Identity => 0.0,
            Self::Uniform { time_per_cycle, start_time } => {
                *start_time + (index as Chrono) * *time_per_cycle
            }
            Self::Cyclic { time_per_cycle, times } => {
                if times.is_empty() {
                    return 0.0;
                }
                let cycle = index / times.len();
                let local_idx = index % times.len();
                times[local_idx] + (cycle as Chrono) * *time_per_cycle
            }
            Self::Acyclic { times } => times.get(index).copied().unwrap_or(0.0),
        }
    }

    /// Find the floor index (largest index with time <= given time).
    pub fn floor_index(&self, time: Chrono, num_samples: usize) -> (usize, Chrono) {
        if num_samples == 0 {
            return (0, 0.0);
        }

        match self {
            Self::Identity => (0, 0.0),
            Self::Uniform { time_per_cycle, start_time } => {
                if time <= *start_time || *time_per_cycle <= 0.0 {
                    return (0, *start_time);
                }
                let idx = ((time - start_time) / time_per_cycle).floor() as usize;
                let idx = idx.min(num_samples - 1);
                (idx, self.sample_time(idx))
            }
            Self::Cyclic { .. } | Self::Acyclic { .. } => {
                // Binary search for floor
                let mut lo = 0;
                let mut hi = num_samples;
                while lo < hi {
                    let mid = lo + (hi - lo) / 2;
                    if self.sample_time(mid) <= time {
                        lo = mid + 1;
                    } else {
                        hi = mid;
                    }
                }
                let idx = lo.saturating_sub(1);
                (idx, self.sample_time(idx))
            }
        }
    }

    /// Find the ceiling index (smallest index with time >= given time).
    pub fn ceil_index(&self, time: Chrono, num_samples: usize) -> (usize, Chrono) {
        if num_samples == 0 {
            return (0, 0.0);
        }

        let (floor_idx, floor_time) = self.floor_index(time, num_samples);
        if floor_time >= time {
            return (floor_idx, floor_time);
        }

        let ceil_idx = (floor_idx + 1).min(num_samples - 1);
        (ceil_idx, self.sample_time(ceil_idx))
    }

    /// Find the nearest index to the given time.
    pub fn near_index(&self, time: Chrono, num_samples: usize) -> (usize, Chrono) {
        if num_samples == 0 {
            return (0, 0.0);
        }

        let (floor_idx, floor_time) = self.floor_index(time, num_samples);
        if floor_idx >= num_samples - 1 {
            return (floor_idx, floor_time);
        }

        let ceil_idx = floor_idx + 1;
        let ceil_time = self.sample_time(ceil_idx);

        if (time - floor_time).abs() <= (ceil_time - time).abs() {
            (floor_idx, floor_time)
        } else {
            (ceil_idx, ceil_time)
        }
    }

    /// Resolve a selector to a sample index in `0..num_samples`.
    pub fn select(&self, selector: SampleSelector, num_samples: usize) -> usize {
        if num_samples == 0 {
            return 0;
        }
        match selector {
            SampleSelector::Index(i) => i.min(num_samples - 1),
            SampleSelector::TimeFloor(t) => self.floor_index(t, num_samples).0,
            SampleSelector::TimeCeil(t) => self.ceil_index(t, num_samples).0,
            SampleSelector::TimeNear(t) => self.near_index(t, num_samples).0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_sampling() {
        let ts = TimeSampling::uniform(1.0 / 24.0, 0.0); // 24 fps

        assert_eq!(ts.sample_time(0), 0.0);
        assert!((ts.sample_time(24) - 1.0).abs() < 1e-10);
        assert!((ts.sample_time(48) - 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_acyclic_sampling() {
        let ts = TimeSampling::acyclic(vec![0.0, 0.5, 1.0, 2.0]);

        assert_eq!(ts.sample_time(0), 0.0);
        assert_eq!(ts.sample_time(1), 0.5);
        assert_eq!(ts.sample_time(3), 2.0);
        assert_eq!(ts.floor_index(1.9, 4).0, 2);
        assert_eq!(ts.floor_index(-1.0, 4).0, 0);
        assert_eq!(ts.floor_index(10.0, 4).0, 3);
    }

    #[test]
    fn test_floor_index() {
        let ts = TimeSampling::uniform(1.0, 0.0);

        assert_eq!(ts.floor_index(0.5, 10).0, 0);
        assert_eq!(ts.floor_index(1.5, 10).0, 1);
        assert_eq!(ts.floor_index(5.0, 10).0, 5);
        assert_eq!(ts.floor_index(50.0, 10).0, 9);
    }

    #[test]
    fn test_select() {
        let ts = TimeSampling::uniform(1.0, 0.0);

        assert_eq!(ts.select(SampleSelector::TimeFloor(2.9), 5), 2);
        assert_eq!(ts.select(SampleSelector::TimeCeil(2.1), 5), 3);
        assert_eq!(ts.select(SampleSelector::TimeNear(2.6), 5), 3);
        assert_eq!(ts.select(SampleSelector::Index(99), 5), 4);
        assert_eq!(ts.select(SampleSelector::TimeFloor(3.0), 0), 0);
    }

    #[test]
    fn test_deserialize() {
        let ts: TimeSampling =
            serde_json::from_str(r#"{"type":"uniform","time_per_cycle":0.5,"start_time":1.0}"#).unwrap();
        assert_eq!(ts, TimeSampling::uniform(0.5, 1.0));
    }
}
