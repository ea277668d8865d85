use serde::{Deserialize, Serialize};

use super::error::AnalysisError;
use super::model::{Series, TempoCurve};

/// Which axis is the numerator of the finite-difference ratio.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TempoOrientation {
    /// `Δx / Δy`: with position in the first column, beats per time unit.
    #[default]
    IndependentPerDependent,
    /// `Δy / Δx`.
    DependentPerIndependent,
}

/// What to do when the denominator step is zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegenerateStep {
    /// Keep the IEEE result (±inf, or NaN for 0/0) at that index.
    #[default]
    Propagate,
    /// Fail with [`AnalysisError::DegenerateSample`].
    Reject,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TempoEstimator {
    pub orientation: TempoOrientation,
    pub degenerate: DegenerateStep,
}

impl TempoEstimator {
    pub fn new(orientation: TempoOrientation, degenerate: DegenerateStep) -> Self {
        Self {
            orientation,
            degenerate,
        }
    }

    /// Local tempo for every adjacent sample pair: `len(series) - 1` values.
    pub fn estimate(&self, series: &Series) -> Result<TempoCurve, AnalysisError> {
        let (num, den) = match self.orientation {
            TempoOrientation::IndependentPerDependent => (series.independent(), series.dependent()),
            TempoOrientation::DependentPerIndependent => (series.dependent(), series.independent()),
        };

        let mut values = Vec::with_capacity(series.len() - 1);
        let mut degenerate = Vec::new();
        for (i, (n, d)) in num.windows(2).zip(den.windows(2)).enumerate() {
            let d_step = d[1] - d[0];
            if d_step == 0.0 {
                if self.degenerate == DegenerateStep::Reject {
                    return Err(AnalysisError::DegenerateSample {
                        section: series.section(),
                        index: i,
                    });
                }
                degenerate.push(i);
            }
            values.push((n[1] - n[0]) / d_step);
        }

        if !degenerate.is_empty() {
            log::warn!(
                "{}: {} zero-length step(s) on the denominator axis, first at sample {}",
                series.section(),
                degenerate.len(),
                degenerate[0]
            );
        }

        Ok(TempoCurve { values, degenerate })
    }
}
