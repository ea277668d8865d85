use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use timing_scope::synth::{TempoRamp, TransportCurve};

/// Write a synthetic timing dump in the instrumentation format.
///
/// Without `--ramp`, uses tempo 2 → 8 over 10 beats, then 8 → 2 over 10.
#[derive(Parser, Debug)]
#[command(name = "generate_dump")]
struct Args {
    /// Output file; stdout when omitted.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Sampling step for both sections.
    #[arg(long, default_value_t = 0.001)]
    step: f64,

    /// Tempo ramp as START:END:LENGTH (beats). Repeat for more segments.
    #[arg(long, value_parser = parse_ramp)]
    ramp: Vec<TempoRamp>,
}

fn parse_ramp(s: &str) -> Result<TempoRamp, String> {
    let parts: Vec<&str> = s.split(':').collect();
    let [start, end, length] = parts[..] else {
        return Err(format!("expected START:END:LENGTH, got {s:?}"));
    };
    let num = |t: &str| {
        t.trim()
            .parse::<f64>()
            .map_err(|_| format!("{t:?} is not a number"))
    };
    TempoRamp::new(num(start)?, num(end)?, num(length)?).map_err(|e| e.to_string())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let curve = if args.ramp.is_empty() {
        TransportCurve::accelerando_ritardando()
    } else {
        TransportCurve::new(args.ramp)
    };

    match &args.output {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
            let mut out = BufWriter::new(file);
            curve.write_dump(args.step, &mut out)?;
            out.flush()?;
            println!(
                "Wrote {:.3} beats / {:.3} time units at step {} to {}",
                curve.total_length(),
                curve.total_duration(),
                args.step,
                path.display()
            );
        }
        None => {
            let stdout = io::stdout();
            let mut out = BufWriter::new(stdout.lock());
            curve.write_dump(args.step, &mut out)?;
            out.flush()?;
        }
    }
    Ok(())
}
