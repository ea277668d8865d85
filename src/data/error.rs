use thiserror::Error;

use super::model::Section;

/// Everything that can go wrong while turning a dump into an analysis.
///
/// Line numbers are 1-based and refer to the raw dump text.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// A data row does not have exactly two `;`-separated fields.
    #[error("line {line}: expected 2 fields separated by ';', found {fields} in {text:?}")]
    MalformedInput {
        line: usize,
        fields: usize,
        text: String,
    },
    /// A field is not a real number.
    #[error("{section}, line {line}, column {column}: {text:?} is not a number")]
    NumericParse {
        section: Section,
        line: usize,
        column: usize,
        text: String,
    },
    /// Tempo needs at least one finite difference.
    #[error("{section}: needs at least 2 samples, found {rows}")]
    EmptySeries { section: Section, rows: usize },
    /// The two columns of a series have different lengths.
    #[error("{section}: column lengths differ ({independent} independent, {dependent} dependent)")]
    MisalignedColumns {
        section: Section,
        independent: usize,
        dependent: usize,
    },
    /// Zero step on the denominator axis while degenerate steps are rejected.
    #[error("{section}: zero denominator step after sample {index}")]
    DegenerateSample { section: Section, index: usize },
}
