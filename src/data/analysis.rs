use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};

use super::error::AnalysisError;
use super::loader::{parse_dump, DumpSeries};
use super::model::{Axis, PulseSet, Section, Series, TempoCurve};
use super::pulse::{PulseDetector, ThresholdPolicy};
use super::tempo::{DegenerateStep, TempoEstimator, TempoOrientation};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Per-mapping choices for the pulse detector and tempo estimator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MappingConfig {
    pub pulses: PulseDetector,
    pub tempo_orientation: TempoOrientation,
}

impl MappingConfig {
    /// Both dumped sections carry position in the first column. Time from
    /// position is sampled on a fine position grid, so its own step is the
    /// pulse threshold; position from time is tested against a fixed 0.01.
    pub fn default_for(section: Section) -> Self {
        let policy = match section {
            Section::TimeFromPos => ThresholdPolicy::Adaptive,
            Section::PosFromTime => ThresholdPolicy::default(),
        };
        Self {
            pulses: PulseDetector::new(policy).on(Axis::Independent),
            tempo_orientation: TempoOrientation::IndependentPerDependent,
        }
    }

    fn overridden_by(mut self, partial: PartialMapping) -> Self {
        if let Some(pulses) = partial.pulses {
            self.pulses.policy = pulses.policy.unwrap_or(self.pulses.policy);
            self.pulses.axis = pulses.axis.unwrap_or(self.pulses.axis);
        }
        self.tempo_orientation = partial.tempo_orientation.unwrap_or(self.tempo_orientation);
        self
    }
}

/// A mapping as written in a config file: every field may be left out.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct PartialMapping {
    pulses: Option<PartialPulses>,
    tempo_orientation: Option<TempoOrientation>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct PartialPulses {
    policy: Option<ThresholdPolicy>,
    axis: Option<Axis>,
}

fn time_from_pos_mapping<'de, D: Deserializer<'de>>(de: D) -> Result<MappingConfig, D::Error> {
    let partial = PartialMapping::deserialize(de)?;
    Ok(MappingConfig::default_for(Section::TimeFromPos).overridden_by(partial))
}

fn pos_from_time_mapping<'de, D: Deserializer<'de>>(de: D) -> Result<MappingConfig, D::Error> {
    let partial = PartialMapping::deserialize(de)?;
    Ok(MappingConfig::default_for(Section::PosFromTime).overridden_by(partial))
}

/// Settings for a whole run. Missing JSON fields, at any depth, fall back to
/// the defaults of the mapping they belong to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    #[serde(deserialize_with = "time_from_pos_mapping")]
    pub time_from_pos: MappingConfig,
    #[serde(deserialize_with = "pos_from_time_mapping")]
    pub pos_from_time: MappingConfig,
    pub degenerate_step: DegenerateStep,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            time_from_pos: MappingConfig::default_for(Section::TimeFromPos),
            pos_from_time: MappingConfig::default_for(Section::PosFromTime),
            degenerate_step: DegenerateStep::Propagate,
        }
    }
}

impl AnalysisConfig {
    /// Read a JSON config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn mapping(&self, section: Section) -> &MappingConfig {
        match section {
            Section::TimeFromPos => &self.time_from_pos,
            Section::PosFromTime => &self.pos_from_time,
        }
    }

    /// Use the same fixed pulse threshold for both mappings.
    pub fn with_fixed_threshold(mut self, threshold: f64) -> Self {
        self.time_from_pos.pulses.policy = ThresholdPolicy::Fixed(threshold);
        self.pos_from_time.pulses.policy = ThresholdPolicy::Fixed(threshold);
        self
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Everything derived from one mapping.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MappingAnalysis {
    pub series: Series,
    pub pulses: PulseSet,
    pub tempo: TempoCurve,
}

impl MappingAnalysis {
    pub fn run(series: Series, config: &MappingConfig, degenerate: DegenerateStep) -> Result<Self, AnalysisError> {
        let pulses = config.pulses.detect(&series);
        let tempo = TempoEstimator::new(config.tempo_orientation, degenerate).estimate(&series)?;
        Ok(Self {
            series,
            pulses,
            tempo,
        })
    }

    pub fn section(&self) -> Section {
        self.series.section()
    }
}

/// Both analysed mappings of a dump.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub time_from_pos: MappingAnalysis,
    pub pos_from_time: MappingAnalysis,
}

impl Analysis {
    pub fn from_series(series: DumpSeries, config: &AnalysisConfig) -> Result<Self, AnalysisError> {
        Ok(Self {
            time_from_pos: MappingAnalysis::run(
                series.time_from_pos,
                &config.time_from_pos,
                config.degenerate_step,
            )?,
            pos_from_time: MappingAnalysis::run(
                series.pos_from_time,
                &config.pos_from_time,
                config.degenerate_step,
            )?,
        })
    }

    /// Text in, derived series out.
    pub fn from_dump(text: &str, config: &AnalysisConfig) -> Result<Self, AnalysisError> {
        Self::from_series(parse_dump(text)?, config)
    }

    pub fn get(&self, section: Section) -> &MappingAnalysis {
        match section {
            Section::TimeFromPos => &self.time_from_pos,
            Section::PosFromTime => &self.pos_from_time,
        }
    }

    /// Multi-line human readable statistics.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        for section in Section::ALL {
            let m = self.get(section);
            out.push_str(&format!(
                "{section}: {} samples, {} pulses (threshold {:.6})",
                m.series.len(),
                m.pulses.len(),
                m.pulses.threshold
            ));
            match m.tempo.finite_stats() {
                Some((min, max, mean)) => out.push_str(&format!(
                    ", tempo min {min:.4} max {max:.4} mean {mean:.4}"
                )),
                None => out.push_str(", tempo undefined"),
            }
            if !m.tempo.degenerate.is_empty() {
                out.push_str(&format!(", {} degenerate steps", m.tempo.degenerate.len()));
            }
            out.push('\n');
        }
        out
    }
}
