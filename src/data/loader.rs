use std::path::Path;

use anyhow::{Context, Result};

use super::error::AnalysisError;
use super::model::{Section, Series};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Read a dump file from disk and build both series.
pub fn load_file(path: &Path) -> Result<DumpSeries> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading dump {}", path.display()))?;
    let series = parse_dump(&text).with_context(|| format!("parsing dump {}", path.display()))?;
    log::info!(
        "Loaded {}: {} samples {}, {} samples {}",
        path.display(),
        series.time_from_pos.len(),
        Section::TimeFromPos,
        series.pos_from_time.len(),
        Section::PosFromTime,
    );
    Ok(series)
}

/// Both mappings of a dump.
#[derive(Debug, Clone, PartialEq)]
pub struct DumpSeries {
    pub time_from_pos: Series,
    pub pos_from_time: Series,
}

impl DumpSeries {
    pub fn get(&self, section: Section) -> &Series {
        match section {
            Section::TimeFromPos => &self.time_from_pos,
            Section::PosFromTime => &self.pos_from_time,
        }
    }
}

/// Section parser followed by the series builder for both sections.
pub fn parse_dump(text: &str) -> Result<DumpSeries, AnalysisError> {
    let groups = split_sections(text);
    Ok(DumpSeries {
        time_from_pos: build_series(Section::TimeFromPos, &groups.time_from_pos)?,
        pos_from_time: build_series(Section::PosFromTime, &groups.pos_from_time)?,
    })
}

// ---------------------------------------------------------------------------
// Section parser
// ---------------------------------------------------------------------------

/// One data line, remembered with its 1-based line number in the dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row<'a> {
    pub line: usize,
    pub text: &'a str,
}

/// The two row groups of a dump.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowGroups<'a> {
    pub time_from_pos: Vec<Row<'a>>,
    pub pos_from_time: Vec<Row<'a>>,
    /// Data lines seen before the first sentinel.
    pub dropped: usize,
}

impl<'a> RowGroups<'a> {
    pub fn get(&self, section: Section) -> &[Row<'a>] {
        match section {
            Section::TimeFromPos => &self.time_from_pos,
            Section::PosFromTime => &self.pos_from_time,
        }
    }

    fn get_mut(&mut self, section: Section) -> &mut Vec<Row<'a>> {
        match section {
            Section::TimeFromPos => &mut self.time_from_pos,
            Section::PosFromTime => &mut self.pos_from_time,
        }
    }
}

/// Sort the lines of a dump into row groups.
///
/// A sentinel line selects the group that receives the following rows and is
/// not stored itself. The parser starts unassigned: rows before the first
/// sentinel are dropped. Blank lines are skipped. No content validation
/// happens here.
pub fn split_sections(text: &str) -> RowGroups<'_> {
    let mut groups = RowGroups::default();
    let mut target: Option<Section> = None;

    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim_end();
        if let Some(section) = Section::from_sentinel(line) {
            log::debug!("line {}: start of section '{section}'", idx + 1);
            target = Some(section);
            continue;
        }
        if line.trim_start().is_empty() {
            continue;
        }
        match target {
            Some(section) => groups.get_mut(section).push(Row {
                line: idx + 1,
                text: line,
            }),
            None => {
                log::debug!("line {}: dropped, no section yet", idx + 1);
                groups.dropped += 1;
            }
        }
    }

    if groups.dropped > 0 {
        log::warn!(
            "Dropped {} data line(s) before the first section header",
            groups.dropped
        );
    }
    groups
}

// ---------------------------------------------------------------------------
// Series builder
// ---------------------------------------------------------------------------

/// Parse a row group into a [`Series`]: first column independent, second
/// dependent.
///
/// Records are split on `;` without quoting and fields are trimmed, so the
/// `"%.12f ; %.12f"` rows of the instrumentation tool parse as-is.
pub fn build_series(section: Section, rows: &[Row<'_>]) -> Result<Series, AnalysisError> {
    let mut independent = Vec::with_capacity(rows.len());
    let mut dependent = Vec::with_capacity(rows.len());

    for row in rows {
        let record = split_record(row)?;
        independent.push(parse_field(section, row, &record, 0)?);
        dependent.push(parse_field(section, row, &record, 1)?);
    }

    Series::new(section, independent, dependent)
}

fn split_record(row: &Row<'_>) -> Result<csv::StringRecord, AnalysisError> {
    let malformed = |fields| AnalysisError::MalformedInput {
        line: row.line,
        fields,
        text: row.text.to_string(),
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .quoting(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(row.text.as_bytes());

    let mut record = csv::StringRecord::new();
    match reader.read_record(&mut record) {
        Ok(true) if record.len() == 2 => Ok(record),
        Ok(true) => Err(malformed(record.len())),
        // Invalid UTF-8 cannot occur on a &str; an empty read means no fields.
        Ok(false) | Err(_) => Err(malformed(0)),
    }
}

fn parse_field(
    section: Section,
    row: &Row<'_>,
    record: &csv::StringRecord,
    column: usize,
) -> Result<f64, AnalysisError> {
    let text = record.get(column).unwrap_or_default();
    // `f64::from_str` also takes "nan", "inf" and overflowing literals.
    text.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| AnalysisError::NumericParse {
            section,
            line: row.line,
            column,
            text: text.to_string(),
        })
}
