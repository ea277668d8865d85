use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use float_cmp::approx_eq;
use timing_scope::capture;
use timing_scope::data::analysis::{Analysis, AnalysisConfig};
use timing_scope::data::error::AnalysisError;
use timing_scope::data::loader;
use timing_scope::data::model::{Axis, Section};
use timing_scope::data::pulse::{PulseDetector, ThresholdPolicy};
use timing_scope::synth::TransportCurve;

fn temp_path(tag: &str) -> PathBuf {
    static NEXT_ID: AtomicU64 = AtomicU64::new(1);
    let seq = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    let mut path = std::env::temp_dir();
    path.push(format!("timing_scope_it_{tag}_{}_{seq}.txt", std::process::id()));
    path
}

fn builtin_analysis() -> Analysis {
    let text = TransportCurve::accelerando_ritardando().dump_string(0.001);
    Analysis::from_dump(&text, &AnalysisConfig::default()).unwrap()
}

#[test]
fn three_row_section_parses_in_order() {
    let series = loader::parse_dump(
        "time from pos\n0.0;0.0\n1.0;0.5\n2.0;1.0\npos from time\n0;0\n1;1\n",
    )
    .unwrap();
    assert_eq!(series.time_from_pos.independent(), &[0.0, 1.0, 2.0]);
    assert_eq!(series.time_from_pos.dependent(), &[0.0, 0.5, 1.0]);
}

#[test]
fn sentinel_only_dump_is_empty() {
    let err = Analysis::from_dump("time from pos\npos from time\n", &AnalysisConfig::default())
        .unwrap_err();
    assert_eq!(
        err,
        AnalysisError::EmptySeries {
            section: Section::TimeFromPos,
            rows: 0
        }
    );
}

#[test]
fn truncated_row_is_not_silently_dropped() {
    let err = Analysis::from_dump(
        "time from pos\n0;0\n1.0\n2;2\npos from time\n0;0\n1;1\n",
        &AnalysisConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, AnalysisError::MalformedInput { line: 3, .. }));
    assert_eq!(
        err.to_string(),
        "line 3: expected 2 fields separated by ';', found 1 in \"1.0\""
    );
}

#[test]
fn lengths_hold_for_synthetic_dump() {
    let analysis = builtin_analysis();
    for section in Section::ALL {
        let m = analysis.get(section);
        assert_eq!(m.series.independent().len(), m.series.dependent().len());
        assert!(m.series.len() >= 2);
        assert_eq!(m.tempo.len(), m.series.len() - 1);
        assert!(m.tempo.degenerate.is_empty());
    }
    // 20 beats at 0.001
    assert_eq!(analysis.time_from_pos.series.len(), 20_001);
}

#[test]
fn every_beat_produces_a_pulse() {
    let analysis = builtin_analysis();

    let beats = |section: Section| {
        let mut beats: Vec<i64> = analysis
            .get(section)
            .pulses
            .independent
            .iter()
            .map(|p| p.floor() as i64)
            .collect();
        beats.dedup();
        beats
    };
    assert_eq!(beats(Section::TimeFromPos), (0..=20).collect::<Vec<_>>());
    assert_eq!(&beats(Section::PosFromTime)[..20], &(0..20).collect::<Vec<_>>()[..]);
}

#[test]
fn pulses_satisfy_their_threshold() {
    let analysis = builtin_analysis();
    for section in Section::ALL {
        let m = analysis.get(section);
        let threshold = m.pulses.threshold;
        for &i in &m.pulses.indices {
            let p = m.series.independent()[i];
            assert!((p - p.floor()).abs() < threshold, "{section}: sample {i} = {p}");
        }
    }
    assert!(approx_eq!(f64, analysis.time_from_pos.pulses.threshold, 0.001, epsilon = 1e-12));
    assert_eq!(analysis.pos_from_time.pulses.threshold, 0.01);
}

#[test]
fn inferred_tempo_follows_the_curve() {
    let analysis = builtin_analysis();
    for section in Section::ALL {
        let (min, max, _) = analysis.get(section).tempo.finite_stats().unwrap();
        assert!(approx_eq!(f64, max, 8.0, epsilon = 0.02), "{section}: max {max}");
        assert!(approx_eq!(f64, min, 2.0, epsilon = 0.02), "{section}: min {min}");
    }

    // tempo(5 beats) = 2 + 0.6 * 5
    let tfp = &analysis.time_from_pos;
    let at_five = tfp.tempo.values[5000];
    assert!(approx_eq!(f64, at_five, 5.0, epsilon = 0.01), "{at_five}");
}

#[test]
fn custom_detector_on_time_axis() {
    let series = loader::parse_dump(
        "time from pos\n0;0\n1;0.999\n2;2.004\npos from time\n0;0\n1;1\n",
    )
    .unwrap();
    let pulses = PulseDetector::new(ThresholdPolicy::Fixed(0.01))
        .on(Axis::Dependent)
        .detect(&series.time_from_pos);
    assert_eq!(pulses.indices, vec![0, 2]);
}

#[test]
fn load_file_reads_synthetic_dump() {
    let path = temp_path("load");
    std::fs::write(&path, TransportCurve::accelerando_ritardando().dump_string(0.01)).unwrap();

    let series = loader::load_file(&path).unwrap();
    assert_eq!(series.get(Section::TimeFromPos).len(), 2_001);
    assert_eq!(series.get(Section::TimeFromPos).first_step(), 0.01);

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn analysis_serializes_to_json() {
    let text = "time from pos\n0;0\n1;1\npos from time\n0;0\n1;0\n";
    let analysis = Analysis::from_dump(text, &AnalysisConfig::default()).unwrap();
    let json = serde_json::to_value(&analysis).unwrap();

    assert_eq!(json["time_from_pos"]["series"]["section"], "time_from_pos");
    assert_eq!(json["time_from_pos"]["tempo"]["values"][0], 1.0);
    // inf is not representable in JSON
    assert!(json["pos_from_time"]["tempo"]["values"][0].is_null());
    assert_eq!(json["pos_from_time"]["tempo"]["degenerate"][0], 0);
}

#[cfg(unix)]
#[test]
fn captured_dump_is_removed_after_use() {
    let source = temp_path("capture_src");
    std::fs::write(&source, "time from pos\n0;0\n1;0.5\npos from time\n0;0\n0.5;1\n").unwrap();

    let dump = capture::run("cat", &[source.to_string_lossy()]).unwrap();
    let captured = dump.path().to_path_buf();
    let analysis = Analysis::from_dump(&dump.read_to_string().unwrap(), &AnalysisConfig::default())
        .unwrap();
    drop(dump);

    assert!(!captured.exists());
    assert_eq!(analysis.time_from_pos.tempo.values, vec![2.0]);
    assert_eq!(analysis.pos_from_time.tempo.values, vec![0.5]);

    std::fs::remove_file(&source).unwrap();
}
