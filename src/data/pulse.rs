use serde::{Deserialize, Serialize};

use super::model::{Axis, PulseSet, Series};

/// Reference value for [`ThresholdPolicy::Fixed`] on coarsely sampled
/// positions.
pub const DEFAULT_FIXED_THRESHOLD: f64 = 0.01;

/// How far above its floor a value may sit and still count as a pulse.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdPolicy {
    /// The series' own first sampling step, `x[1] - x[0]`.
    Adaptive,
    /// A constant threshold.
    Fixed(f64),
}

impl Default for ThresholdPolicy {
    fn default() -> Self {
        ThresholdPolicy::Fixed(DEFAULT_FIXED_THRESHOLD)
    }
}

impl ThresholdPolicy {
    pub fn resolve(self, series: &Series) -> f64 {
        match self {
            ThresholdPolicy::Adaptive => series.first_step(),
            ThresholdPolicy::Fixed(t) => t,
        }
    }
}

/// Proximity filter for samples sitting just above an integer.
///
/// This is not a peak picker: depending on sampling density a single pulse
/// may yield zero, one or several adjacent samples.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PulseDetector {
    pub policy: ThresholdPolicy,
    /// Column whose values are tested.
    pub axis: Axis,
}

impl PulseDetector {
    pub fn new(policy: ThresholdPolicy) -> Self {
        Self {
            policy,
            axis: Axis::default(),
        }
    }

    /// Test another column instead.
    pub fn on(self, axis: Axis) -> Self {
        Self { axis, ..self }
    }

    pub fn detect(&self, series: &Series) -> PulseSet {
        detect_with_threshold(series, self.axis, self.policy.resolve(series))
    }
}

/// Samples of `series` where `|v - floor(v)| < threshold`, `v` taken from
/// `axis`.
pub fn detect_with_threshold(series: &Series, axis: Axis, threshold: f64) -> PulseSet {
    let mut pulses = PulseSet {
        threshold,
        ..PulseSet::default()
    };

    let tested = series.axis(axis);
    for (i, &v) in tested.iter().enumerate() {
        if (v - v.floor()).abs() < threshold {
            pulses.indices.push(i);
            pulses.independent.push(series.independent()[i]);
            pulses.dependent.push(series.dependent()[i]);
        }
    }
    pulses
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Section;

    fn series(x: Vec<f64>, y: Vec<f64>) -> Series {
        Series::new(Section::PosFromTime, x, y).unwrap()
    }

    #[test]
    fn fixed_threshold_keeps_values_near_floor() {
        let s = series(vec![0.0, 1.0, 2.0, 3.0], vec![0.0, 0.005, 0.5, 1.0]);
        let pulses = PulseDetector::new(ThresholdPolicy::Fixed(0.01)).detect(&s);
        assert_eq!(pulses.indices, vec![0, 1, 3]);
        assert_eq!(pulses.independent, vec![0.0, 1.0, 3.0]);
        assert_eq!(pulses.dependent, vec![0.0, 0.005, 1.0]);
        assert_eq!(pulses.threshold, 0.01);
    }

    #[test]
    fn distance_is_to_floor_not_nearest_integer() {
        let s = series(vec![0.0, 1.0], vec![0.999, 2.001]);
        let pulses = PulseDetector::new(ThresholdPolicy::Fixed(0.01)).detect(&s);
        assert_eq!(pulses.indices, vec![1]);
    }

    #[test]
    fn negative_values_use_floor() {
        // floor(-0.995) = -1, distance 0.005
        let s = series(vec![0.0, 1.0], vec![-0.995, -0.5]);
        let pulses = PulseDetector::new(ThresholdPolicy::Fixed(0.01)).detect(&s);
        assert_eq!(pulses.indices, vec![0]);
    }

    #[test]
    fn adaptive_threshold_is_first_independent_step() {
        let s = series(vec![0.0, 0.25, 0.5, 0.75, 1.0, 1.25], vec![0.0; 6]);
        let detector = PulseDetector::new(ThresholdPolicy::Adaptive).on(Axis::Independent);
        let pulses = detector.detect(&s);
        assert_eq!(pulses.threshold, 0.25);
        assert_eq!(pulses.indices, vec![0, 4]);
    }

    #[test]
    fn empty_result_is_valid() {
        let s = series(vec![0.0, 1.0], vec![0.5, 0.6]);
        let pulses = PulseDetector::new(ThresholdPolicy::Fixed(0.01)).detect(&s);
        assert!(pulses.is_empty());
    }

    #[test]
    fn larger_threshold_gives_superset() {
        let y: Vec<f64> = (0..200).map(|i| i as f64 * 0.037).collect();
        let x: Vec<f64> = (0..200).map(|i| i as f64).collect();
        let s = series(x, y);

        let mut previous: Vec<usize> = Vec::new();
        for t in [0.0, 0.005, 0.01, 0.05, 0.2, 0.5, 1.0] {
            let current = detect_with_threshold(&s, Axis::Dependent, t).indices;
            assert!(previous.iter().all(|i| current.contains(i)), "threshold {t}");
            for &i in &current {
                let v = s.dependent()[i];
                assert!((v - v.floor()).abs() < t);
            }
            previous = current;
        }
        assert_eq!(previous.len(), 200);
    }
}
