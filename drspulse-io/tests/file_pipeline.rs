#![allow(clippy::float_cmp, clippy::cast_precision_loss)]
use approx::assert_relative_eq;
use drspulse_algorithms::analyze;
use drspulse_core::{AnalysisConfig, EventSource, WaveformEvent};
use drspulse_io::{load_events, write_analysis_csv, DrsFileWriter, OutputPaths, RunSummary};
use tempfile::tempdir;

const SAMPLES: usize = 64;
const SETPOINT: usize = 40;

/// Two channels: a positive pulse at sample 30 on a pedestal of 5, and a
/// flat trigger-reference channel.
fn event(dt: i64) -> WaveformEvent {
    let template = |i: i64| match i {
        28 | 32 => 8.0,
        29 | 31 => 15.0,
        30 => 25.0,
        _ => 5.0,
    };
    let signal = (0..SAMPLES as i64).map(|j| template(j - dt)).collect();
    WaveformEvent::new(vec![signal, vec![-100.0; SAMPLES]], SETPOINT as f32 + dt as f32)
}

fn config() -> AnalysisConfig {
    AnalysisConfig::new()
        .with_signal_channel(0)
        .with_reference_channel(1)
        .with_trigger_setpoint(SETPOINT)
        .with_canonical_length(SAMPLES)
        .with_integration_half_width(8)
}

#[test]
fn test_drs_file_to_outputs() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("run7.drs");

    let mut writer = DrsFileWriter::create(&input, 2, SAMPLES as u32).unwrap();
    for dt in [-2, 0, 1, 3, 0] {
        writer.write_event(&event(dt)).unwrap();
    }
    assert_eq!(writer.finish().unwrap(), 5);

    let events = load_events(&input).unwrap();
    assert_eq!(events.len(), 5);
    assert_eq!(events.extremum_range(), Some((38.0, 43.0)));

    let config = config();
    let result = analyze(&events, &config).unwrap();
    assert_eq!(result.calibration.peak_index, 30);
    assert_relative_eq!(result.calibration.baseline, 5.0);
    assert_eq!(result.mean_pulse(), 20);
    assert_eq!(result.reference_waveform.mean(10), -100.0);

    let out = dir.path().join("out");
    std::fs::create_dir_all(&out).unwrap();
    let paths = OutputPaths::new(&out, &input);
    let written = write_analysis_csv(&result, &paths).unwrap();
    assert_eq!(written.len(), 3);
    RunSummary::new(&input, &config, &result)
        .write_json(paths.summary())
        .unwrap();

    let metrics = std::fs::read_to_string(out.join("run7_metrics.csv")).unwrap();
    assert_eq!(metrics.lines().count(), 6);
    assert!(metrics.lines().nth(1).unwrap().starts_with("0,-2,20,46,"));

    let mean = std::fs::read_to_string(out.join("run7_mean.csv")).unwrap();
    assert!(mean.lines().any(|line| line == "30,25,5,-100"));

    let hist = std::fs::read_to_string(out.join("run7_hist.csv")).unwrap();
    assert!(hist.lines().any(|line| line.starts_with("heights,")));
    assert!(hist.lines().any(|line| line.starts_with("integrals,")));

    let summary = std::fs::read_to_string(out.join("run7_summary.json")).unwrap();
    assert!(summary.contains("\"peak_index\": 30"));
}

#[test]
fn test_invalid_file_is_rejected() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("garbage.drs");
    std::fs::write(&input, b"not a drs file").unwrap();
    assert!(matches!(
        load_events(&input),
        Err(drspulse_io::Error::InvalidFormat(_))
    ));
}
