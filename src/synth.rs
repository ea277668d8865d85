//! Synthetic transport curves, for producing dumps without the instrumentation
//! program.
//!
//! A curve is a chain of [`TempoRamp`]s. Each ramp changes tempo linearly
//! with position. With `T(p) = T0 + k·p`, elapsed time is
//! `t(p) = ln(T(p) / T0) / k` (or `p / T0` for a flat ramp), and position from
//! time is the inverse `p(t) = T0·(e^(k·t) - 1) / k`.

use std::io::{self, Write};

use thiserror::Error;

use crate::data::model::Section;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum InvalidRamp {
    #[error("ramp length must be positive and finite, got {0}")]
    Length(f64),
    #[error("tempo must be positive and finite, got {0}")]
    Tempo(f64),
}

/// Tempo changing linearly from `start` to `end` over `length` beats.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TempoRamp {
    start: f64,
    slope: f64,
    length: f64,
    duration: f64,
}

impl TempoRamp {
    pub fn new(start: f64, end: f64, length: f64) -> Result<Self, InvalidRamp> {
        if !(length.is_finite() && length > 0.0) {
            return Err(InvalidRamp::Length(length));
        }
        for tempo in [start, end] {
            if !(tempo.is_finite() && tempo > 0.0) {
                return Err(InvalidRamp::Tempo(tempo));
            }
        }
        let slope = (end - start) / length;
        let mut ramp = Self {
            start,
            slope,
            length,
            duration: 0.0,
        };
        ramp.duration = ramp.time_at(length);
        Ok(ramp)
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn tempo_at(&self, pos: f64) -> f64 {
        self.start + self.slope * pos
    }

    /// Time elapsed since the ramp start at local position `pos`.
    pub fn time_at(&self, pos: f64) -> f64 {
        if self.slope == 0.0 {
            pos / self.start
        } else {
            (self.tempo_at(pos) / self.start).ln() / self.slope
        }
    }

    /// Local position reached `time` after the ramp start.
    pub fn pos_at(&self, time: f64) -> f64 {
        if self.slope == 0.0 {
            self.start * time
        } else {
            self.start * (self.slope * time).exp_m1() / self.slope
        }
    }
}

/// Consecutive tempo ramps.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportCurve {
    ramps: Vec<TempoRamp>,
}

impl TransportCurve {
    pub fn new(ramps: Vec<TempoRamp>) -> Self {
        Self { ramps }
    }

    /// Tempo 2 → 8 over 10 beats, then back to 2 over another 10.
    pub fn accelerando_ritardando() -> Self {
        // Both ramps are statically valid.
        let up = TempoRamp {
            start: 2.0,
            slope: 0.6,
            length: 10.0,
            duration: (4.0f64).ln() / 0.6,
        };
        let down = TempoRamp {
            start: 8.0,
            slope: -0.6,
            length: 10.0,
            duration: (0.25f64).ln() / -0.6,
        };
        Self::new(vec![up, down])
    }

    pub fn total_length(&self) -> f64 {
        self.ramps.iter().map(TempoRamp::length).sum()
    }

    pub fn total_duration(&self) -> f64 {
        self.ramps.iter().map(TempoRamp::duration).sum()
    }

    /// Time at absolute position `pos`, clamped to the curve.
    pub fn time_at(&self, pos: f64) -> f64 {
        let mut pos = pos.max(0.0);
        let mut elapsed = 0.0;
        for ramp in &self.ramps {
            if pos <= ramp.length {
                return elapsed + ramp.time_at(pos);
            }
            pos -= ramp.length;
            elapsed += ramp.duration;
        }
        elapsed
    }

    /// Position at absolute time `time`, clamped to the curve.
    pub fn pos_at(&self, time: f64) -> f64 {
        let mut time = time.max(0.0);
        let mut covered = 0.0;
        for ramp in &self.ramps {
            if time <= ramp.duration {
                return covered + ramp.pos_at(time);
            }
            time -= ramp.duration;
            covered += ramp.length;
        }
        covered
    }

    /// Write both sections, sampling position and time every `step`.
    ///
    /// Rows are `position ; time` in both sections.
    pub fn write_dump<W: Write>(&self, step: f64, out: &mut W) -> io::Result<()> {
        writeln!(out, "{}", Section::TimeFromPos.sentinel())?;
        for i in 0..step_count(self.total_length(), step) {
            let pos = i as f64 * step;
            writeln!(out, "{pos:.12} ; {:.12}", self.time_at(pos))?;
        }

        writeln!(out, "{}", Section::PosFromTime.sentinel())?;
        for i in 0..step_count(self.total_duration(), step) {
            let time = i as f64 * step;
            writeln!(out, "{:.12} ; {time:.12}", self.pos_at(time))?;
        }
        Ok(())
    }

    pub fn dump_string(&self, step: f64) -> String {
        let mut buf = Vec::new();
        // Writing to a Vec cannot fail.
        let _ = self.write_dump(step, &mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }
}

/// Samples covering `[0, total]` inclusive.
fn step_count(total: f64, step: f64) -> usize {
    if step.is_nan() || step <= 0.0 {
        return 0;
    }
    (total / step + 1e-9).floor() as usize + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn rejects_bad_ramps() {
        assert_eq!(TempoRamp::new(2.0, 8.0, 0.0), Err(InvalidRamp::Length(0.0)));
        assert_eq!(TempoRamp::new(0.0, 8.0, 1.0), Err(InvalidRamp::Tempo(0.0)));
        assert_eq!(TempoRamp::new(2.0, -1.0, 1.0), Err(InvalidRamp::Tempo(-1.0)));
    }

    #[test]
    fn flat_ramp_is_linear() {
        let ramp = TempoRamp::new(4.0, 4.0, 8.0).unwrap();
        assert_eq!(ramp.duration(), 2.0);
        assert_eq!(ramp.pos_at(1.0), 4.0);
    }

    #[test]
    fn time_and_position_are_inverse() {
        let curve = TransportCurve::accelerando_ritardando();
        for i in 0..=40 {
            let pos = i as f64 * 0.5;
            let back = curve.pos_at(curve.time_at(pos));
            assert!(approx_eq!(f64, back, pos, epsilon = 1e-9), "{pos} -> {back}");
        }
    }

    #[test]
    fn builtin_curve_matches_constructor() {
        let built = TransportCurve::new(vec![
            TempoRamp::new(2.0, 8.0, 10.0).unwrap(),
            TempoRamp::new(8.0, 2.0, 10.0).unwrap(),
        ]);
        let builtin = TransportCurve::accelerando_ritardando();
        assert!(approx_eq!(f64, built.total_duration(), builtin.total_duration(), epsilon = 1e-12));
        assert_eq!(builtin.total_length(), 20.0);
    }

    #[test]
    fn local_tempo_is_derivative() {
        let curve = TransportCurve::accelerando_ritardando();
        let h = 1e-6;
        let pos = 5.0;
        let tempo = h / (curve.time_at(pos + h) - curve.time_at(pos));
        assert!(approx_eq!(f64, tempo, 5.0, epsilon = 1e-4));
    }

    #[test]
    fn dump_has_both_sections() {
        let curve = TransportCurve::new(vec![TempoRamp::new(1.0, 1.0, 1.0).unwrap()]);
        let dump = curve.dump_string(0.5);
        assert_eq!(
            dump,
            "time from pos\n\
             0.000000000000 ; 0.000000000000\n\
             0.500000000000 ; 0.500000000000\n\
             1.000000000000 ; 1.000000000000\n\
             pos from time\n\
             0.000000000000 ; 0.000000000000\n\
             0.500000000000 ; 0.500000000000\n\
             1.000000000000 ; 1.000000000000\n"
        );
    }
}
