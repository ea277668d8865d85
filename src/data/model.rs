use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::AnalysisError;

// ---------------------------------------------------------------------------
// Section – which mapping a row group belongs to
// ---------------------------------------------------------------------------

/// One of the two labeled sections of a dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    /// Time computed from position updates.
    TimeFromPos,
    /// Position computed from time updates.
    PosFromTime,
}

impl Section {
    pub const ALL: [Section; 2] = [Section::TimeFromPos, Section::PosFromTime];

    /// The exact header line that opens this section in a dump.
    pub const fn sentinel(self) -> &'static str {
        match self {
            Section::TimeFromPos => "time from pos",
            Section::PosFromTime => "pos from time",
        }
    }

    /// Recognize a (right-trimmed) line as a section header.
    pub fn from_sentinel(line: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.sentinel() == line)
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sentinel())
    }
}

// ---------------------------------------------------------------------------
// Axis – selects one column of a series
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    /// First recorded column.
    Independent,
    /// Second recorded column.
    #[default]
    Dependent,
}

// ---------------------------------------------------------------------------
// Series – one parsed mapping
// ---------------------------------------------------------------------------

/// Two aligned columns parsed from one row group, in record order.
///
/// Both columns always have the same length, and that length is at least 2.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    section: Section,
    independent: Vec<f64>,
    dependent: Vec<f64>,
}

impl Series {
    /// Minimum number of samples: tempo needs one finite difference.
    pub const MIN_LEN: usize = 2;

    pub fn new(
        section: Section,
        independent: Vec<f64>,
        dependent: Vec<f64>,
    ) -> Result<Self, AnalysisError> {
        // Columns come from the same records, so lengths only differ on misuse.
        if independent.len() != dependent.len() {
            return Err(AnalysisError::MisalignedColumns {
                section,
                independent: independent.len(),
                dependent: dependent.len(),
            });
        }
        if independent.len() < Self::MIN_LEN {
            return Err(AnalysisError::EmptySeries {
                section,
                rows: independent.len(),
            });
        }
        Ok(Self {
            section,
            independent,
            dependent,
        })
    }

    pub fn section(&self) -> Section {
        self.section
    }

    pub fn independent(&self) -> &[f64] {
        &self.independent
    }

    pub fn dependent(&self) -> &[f64] {
        &self.dependent
    }

    pub fn axis(&self, axis: Axis) -> &[f64] {
        match axis {
            Axis::Independent => &self.independent,
            Axis::Dependent => &self.dependent,
        }
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.independent.len()
    }

    /// Always false for a constructed series.
    pub fn is_empty(&self) -> bool {
        self.independent.is_empty()
    }

    /// `x[1] - x[0]`, the first sampling step of the independent axis.
    pub fn first_step(&self) -> f64 {
        self.independent[1] - self.independent[0]
    }

    /// `(x, y)` pairs in record order.
    pub fn points(&self) -> impl Iterator<Item = [f64; 2]> + '_ {
        self.independent
            .iter()
            .zip(&self.dependent)
            .map(|(&x, &y)| [x, y])
    }
}

// ---------------------------------------------------------------------------
// PulseSet – samples close to an integer
// ---------------------------------------------------------------------------

/// Subset of a series' samples flagged as pulses.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PulseSet {
    /// Threshold the samples were tested against.
    pub threshold: f64,
    /// Source indices into the series, ascending.
    pub indices: Vec<usize>,
    pub independent: Vec<f64>,
    pub dependent: Vec<f64>,
}

impl PulseSet {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

// ---------------------------------------------------------------------------
// TempoCurve – one value per adjacent sample pair
// ---------------------------------------------------------------------------

/// Local tempo of a series, `len(series) - 1` values.
///
/// Value `i` belongs to the step from sample `i` to `i + 1`, so it pairs with
/// the series axes truncated by their last element.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TempoCurve {
    pub values: Vec<f64>,
    /// Indices whose denominator step was zero (value is inf or NaN).
    pub degenerate: Vec<usize>,
}

impl TempoCurve {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Values paired with the first `len` elements of `axis`.
    pub fn against<'a>(&'a self, axis: &'a [f64]) -> impl Iterator<Item = [f64; 2]> + 'a {
        axis.iter().zip(&self.values).map(|(&a, &v)| [a, v])
    }

    /// `(min, max, mean)` over the finite values, if any.
    pub fn finite_stats(&self) -> Option<(f64, f64, f64)> {
        let finite: Vec<f64> = self.values.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.is_empty() {
            return None;
        }
        let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
        let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = finite.iter().sum::<f64>() / finite.len() as f64;
        Some((min, max, mean))
    }
}
