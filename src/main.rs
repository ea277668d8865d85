use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;

use timing_scope::app;
use timing_scope::capture;
use timing_scope::data::analysis::{Analysis, AnalysisConfig};
use timing_scope::data::loader;
use timing_scope::data::tempo::DegenerateStep;
use timing_scope::state::AppState;

/// Plot pulses and inferred tempo from a transport timing dump.
#[derive(Parser, Debug)]
#[command(name = "timing-scope", version, about)]
struct Cli {
    /// Dump file with `time from pos` and `pos from time` sections.
    #[arg(conflicts_with = "run")]
    dump: Option<PathBuf>,

    /// Capture the dump from a program's stdout. Everything after it is
    /// passed to the program, so put it last.
    #[arg(long, num_args = 1.., value_name = "PROGRAM [ARGS]", allow_hyphen_values = true)]
    run: Option<Vec<String>>,

    /// JSON analysis config; missing fields take their defaults.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Fixed pulse threshold for both mappings.
    #[arg(long, value_name = "T")]
    pulse_threshold: Option<f64>,

    /// Fail on zero-length tempo steps instead of plotting inf/NaN gaps.
    #[arg(long)]
    reject_degenerate: bool,

    /// Print per-mapping statistics and exit.
    #[arg(long)]
    summary: bool,

    /// Write the full analysis as JSON and exit.
    #[arg(long, value_name = "FILE")]
    export_json: Option<PathBuf>,
}

impl Cli {
    fn analysis_config(&self) -> Result<AnalysisConfig> {
        let mut config = match &self.config {
            Some(path) => AnalysisConfig::from_file(path)?,
            None => AnalysisConfig::default(),
        };
        if let Some(t) = self.pulse_threshold {
            if !(t.is_finite() && t >= 0.0) {
                bail!("--pulse-threshold must be a non-negative number, got {t}");
            }
            config = config.with_fixed_threshold(t);
        }
        if self.reject_degenerate {
            config.degenerate_step = DegenerateStep::Reject;
        }
        Ok(config)
    }

    fn headless(&self) -> bool {
        self.summary || self.export_json.is_some()
    }

    /// Analysis of the dump named on the command line, if any.
    fn load(&self, config: &AnalysisConfig) -> Result<Option<(Analysis, String)>> {
        if let Some(path) = &self.dump {
            let series = loader::load_file(path)?;
            let analysis = Analysis::from_series(series, config)?;
            return Ok(Some((analysis, path.display().to_string())));
        }

        let Some((program, args)) = self.run.as_deref().and_then(<[String]>::split_first) else {
            return Ok(None);
        };
        // The temporary dump is removed when `dump` goes out of scope.
        let dump = capture::run(program, args)?;
        let text = dump.read_to_string()?;
        let analysis = Analysis::from_dump(&text, config)
            .with_context(|| format!("parsing output of {program}"))?;
        Ok(Some((analysis, program.clone())))
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = cli.analysis_config()?;
    let loaded = cli.load(&config)?;

    if cli.headless() {
        let Some((analysis, source)) = loaded else {
            bail!("--summary and --export-json need a DUMP or --run");
        };
        if cli.summary {
            println!("{source}");
            print!("{}", analysis.summary());
        }
        if let Some(path) = &cli.export_json {
            let json = serde_json::to_string_pretty(&analysis).context("serializing analysis")?;
            std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
            log::info!("Wrote analysis to {}", path.display());
        }
        return Ok(());
    }

    let mut state = AppState::new(config);
    if let Some((analysis, source)) = loaded {
        state.set_analysis(analysis, source);
    }
    app::run(state).map_err(|e| anyhow!("running viewer: {e}"))
}
