use std::path::Path;

use anyhow::Result;

use crate::color::RoleColors;
use crate::data::analysis::{Analysis, AnalysisConfig};
use crate::data::loader;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Current analysis (None until a dump is loaded).
    pub analysis: Option<Analysis>,

    /// Where the current analysis came from, for the top bar.
    pub source: Option<String>,

    /// Pulse and tempo settings applied to every load.
    pub config: AnalysisConfig,

    pub colors: RoleColors,

    /// Draw pulse stems.
    pub show_pulses: bool,

    /// Draw tempo curves.
    pub show_tempo: bool,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}

impl AppState {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            analysis: None,
            source: None,
            config,
            colors: RoleColors::default(),
            show_pulses: true,
            show_tempo: true,
            status_message: None,
        }
    }

    /// Replace the shown analysis.
    pub fn set_analysis(&mut self, analysis: Analysis, source: String) {
        self.analysis = Some(analysis);
        self.source = Some(source);
        self.status_message = None;
    }

    /// Load and analyse a dump file. On failure the previous analysis stays.
    pub fn load_path(&mut self, path: &Path) -> Result<()> {
        let series = loader::load_file(path)?;
        let analysis = Analysis::from_series(series, &self.config)?;
        self.set_analysis(analysis, path.display().to_string());
        Ok(())
    }

    /// [`AppState::load_path`] with the error reported in the status bar.
    pub fn open(&mut self, path: &Path) {
        if let Err(e) = self.load_path(path) {
            log::error!("Failed to load dump: {e:#}");
            self.status_message = Some(format!("Error: {e:#}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_dump(tag: &str, contents: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("timing_scope_state_{tag}_{}.txt", std::process::id()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn failed_load_keeps_previous_analysis() {
        let good = temp_dump("good", "time from pos\n0;0\n1;1\npos from time\n0;0\n1;1\n");
        let bad = temp_dump("bad", "time from pos\n0;0\n1\n");

        let mut state = AppState::default();
        state.open(&good);
        assert!(state.analysis.is_some());
        assert!(state.status_message.is_none());

        state.open(&bad);
        assert!(state.analysis.is_some());
        assert_eq!(state.source.as_deref(), Some(good.display().to_string().as_str()));
        let msg = state.status_message.clone().unwrap();
        assert!(msg.contains("expected 2 fields"), "{msg}");

        std::fs::remove_file(good).unwrap();
        std::fs::remove_file(bad).unwrap();
    }

    #[test]
    fn missing_file_sets_status() {
        let mut state = AppState::default();
        state.open(Path::new("/definitely/not/here.txt"));
        assert!(state.analysis.is_none());
        assert!(state.status_message.unwrap().contains("reading dump"));
    }
}
