#![allow(clippy::float_cmp, clippy::cast_precision_loss)]
use approx::assert_relative_eq;
use drspulse_algorithms::{
    analyze, calibrate, extract_metrics, AlignmentEngine, AnalysisConfig, Polarity,
};
use drspulse_core::{Binning, Error, WaveformEvent};

const PULSE: [f32; 10] = [0.0, 0.0, 0.0, 0.0, 0.0, 10.0, 0.0, 0.0, 0.0, 0.0];

fn small_config() -> AnalysisConfig {
    AnalysisConfig::new()
        .with_signal_channel(0)
        .with_reference_channel(1)
        .with_trigger_setpoint(5)
        .with_canonical_length(10)
}

fn three_pulses() -> Vec<WaveformEvent> {
    (0..3)
        .map(|_| WaveformEvent::new(vec![PULSE.to_vec(), vec![500.0; 10]], 5.0))
        .collect()
}

/// Baseline of 5 with a symmetric pulse peaking at index 30.
fn template() -> Vec<f32> {
    let mut samples = vec![5.0; 64];
    samples[28] = 8.0;
    samples[29] = 15.0;
    samples[30] = 25.0;
    samples[31] = 15.0;
    samples[32] = 8.0;
    samples
}

/// Records the template `dt` samples late: raw[j] = template[j - dt].
fn shifted(template: &[f32], dt: i64, setpoint: usize) -> WaveformEvent {
    let samples = (0..template.len() as i64)
        .map(|j| {
            usize::try_from(j - dt)
                .ok()
                .and_then(|i| template.get(i).copied())
                .unwrap_or(5.0)
        })
        .collect();
    WaveformEvent::new(vec![samples], setpoint as f32 + dt as f32)
}

fn template_config() -> AnalysisConfig {
    AnalysisConfig::new()
        .with_signal_channel(0)
        .with_trigger_setpoint(40)
        .with_canonical_length(64)
        .with_integration_half_width(8)
}

#[test]
fn test_default_half_width_rejected_on_short_axis() {
    // Half-width 25 does not fit below a set-point of 5.
    let err = analyze(&three_pulses(), &small_config()).unwrap_err();
    assert!(err.is_configuration(), "expected configuration error, got {err}");
}

#[test]
fn test_early_peak_leaves_no_baseline_window() {
    // Valid configuration, but the pulse peaks at 10 so [0, 10 - 25) is empty.
    let mut signal = vec![0.0_f32; 64];
    signal[10] = 50.0;
    let events: Vec<_> = (0..3)
        .map(|_| WaveformEvent::new(vec![signal.clone()], 30.0))
        .collect();
    let config = AnalysisConfig::new()
        .with_signal_channel(0)
        .with_trigger_setpoint(30)
        .with_canonical_length(64)
        .with_integration_half_width(25);
    config.validate().unwrap();

    let err = analyze(&events, &config).unwrap_err();
    assert!(
        matches!(
            err,
            Error::DegenerateBaselineWindow {
                peak_index: 10,
                half_width: 25
            }
        ),
        "expected degenerate baseline window, got {err}"
    );
    assert!(err.is_configuration());
}

fn huge_pulse_events(peak: f32, config: &AnalysisConfig) -> Vec<WaveformEvent> {
    let mut template = template();
    template[30] = peak;
    (0..3)
        .map(|_| shifted(&template, 0, config.trigger_setpoint))
        .collect()
}

#[test]
fn test_huge_pulse_falls_back_to_single_bin() {
    let config = template_config();
    let result = analyze(&huge_pulse_events(4.0e18, &config), &config).unwrap();

    assert_eq!(*result.height_histogram.binning(), Binning::FALLBACK);
    assert_eq!(*result.integral_histogram.binning(), Binning::FALLBACK);
    assert_eq!(result.height_histogram.overflow(), 3);
    assert_eq!(result.metrics.len(), 3);
}

#[test]
fn test_large_pulse_caps_bin_count() {
    let config = template_config();
    let result = analyze(&huge_pulse_events(2.0e9, &config), &config).unwrap();

    assert_eq!(result.mean_pulse(), 1_999_999_995);
    assert_eq!(result.height_histogram.binning().nbins, Binning::MAX_BINS);
    assert_eq!(result.height_histogram.counts().iter().sum::<u64>(), 3);
    assert!(result.integral_histogram.binning().nbins <= Binning::MAX_BINS);
}

#[test]
fn test_zero_shift_mean_equals_raw() {
    let config = small_config().with_integration_half_width(2);
    let events = three_pulses();
    let engine = AlignmentEngine::from_config(&config);
    for event in &events {
        assert_eq!(engine.shift(event), Some(0));
    }

    let stage = calibrate(&events, &config).unwrap();
    for n in 0..10 {
        assert_eq!(stage.mean_waveform.mean(n), f64::from(PULSE[n]));
        assert_eq!(stage.mean_waveform.count(n), 3);
        assert_eq!(stage.reference_waveform.mean(n), 500.0);
    }
    assert_eq!(stage.calibration.peak_index, 5);
}

#[test]
fn test_small_window_integral() {
    let config = small_config().with_integration_half_width(2);
    let result = analyze(&three_pulses(), &config).unwrap();

    assert_eq!(result.calibration.peak_index, 5);
    assert_eq!(result.calibration.baseline, 0.0);
    for m in &result.metrics.events {
        assert_eq!(m.height, Some(10.0));
        // [3, 7) holds 0 + 0 + 10 + 0
        assert_relative_eq!(m.integral, 10.0);
        assert_eq!(m.clipped_terms, 0);
    }
}

#[test]
fn test_padded_pulse_with_offset_baseline() {
    // Pad the pulse with 20 samples of pedestal so the default-style window fits.
    let mut signal = vec![3.0_f32; 20];
    signal.extend(PULSE.iter().map(|v| v + 3.0));
    signal.extend(vec![3.0_f32; 10]);
    let events: Vec<_> = (0..4)
        .map(|_| WaveformEvent::new(vec![signal.clone()], 25.0))
        .collect();
    let config = AnalysisConfig::new()
        .with_signal_channel(0)
        .with_trigger_setpoint(25)
        .with_canonical_length(40)
        .with_integration_half_width(4);

    let result = analyze(&events, &config).unwrap();
    assert_eq!(result.calibration.peak_index, 25);
    assert_eq!(result.calibration.baseline, 3.0);
    assert_eq!(result.mean_pulse(), 10);

    let expected: f64 = (21..29).map(|n| f64::from(signal[n]) - 3.0).sum();
    for m in &result.metrics.events {
        assert_relative_eq!(m.integral, expected);
        assert_eq!(m.height, Some(10.0));
    }
}

#[test]
fn test_shifted_copies_recover_template_height() {
    let template = template();
    let config = template_config();
    let events: Vec<_> = [-2, 0, 1, 3]
        .iter()
        .map(|&dt| shifted(&template, dt, config.trigger_setpoint))
        .collect();

    let result = analyze(&events, &config).unwrap();
    assert_eq!(result.calibration.polarity, Polarity::Positive);
    assert_eq!(result.calibration.peak_index, 30);
    assert_eq!(result.calibration.baseline, 5.0);

    for n in 0..64 {
        assert_eq!(result.mean_waveform.mean(n), f64::from(template[n]));
    }
    for (m, dt) in result.metrics.events.iter().zip([-2, 0, 1, 3]) {
        assert_eq!(m.shift, Some(dt));
        assert_relative_eq!(m.height.unwrap(), 20.0, epsilon = 1e-9);
        // 20 + 2 * 10 + 2 * 3
        assert_relative_eq!(m.integral, 46.0, epsilon = 1e-9);
    }
    assert!(result.metrics.warnings.is_clean());
}

#[test]
fn test_negative_pulses() {
    let template: Vec<f32> = template().iter().map(|v| 1000.0 - 10.0 * v).collect();
    let config = template_config();
    let events: Vec<_> = [0, 2, -1]
        .iter()
        .map(|&dt| {
            let mut event = shifted(&template, dt, config.trigger_setpoint);
            // padding must sit on the pedestal of the inverted pulse
            for (j, sample) in event.channels[0].iter_mut().enumerate() {
                let source = j as i64 - dt;
                if !(0..64).contains(&source) {
                    *sample = 950.0;
                }
            }
            event
        })
        .collect();

    let result = analyze(&events, &config).unwrap();
    assert_eq!(result.calibration.polarity, Polarity::Negative);
    assert_eq!(result.calibration.peak_index, 30);
    assert_relative_eq!(result.calibration.baseline, -950.0);
    for m in &result.metrics.events {
        assert_relative_eq!(m.height.unwrap(), 200.0, epsilon = 1e-6);
    }
}

#[test]
fn test_out_of_range_events_are_kept_and_counted() {
    let config = template_config();
    let template = template();
    let mut events: Vec<_> = (0..5)
        .map(|_| shifted(&template, 0, config.trigger_setpoint))
        .collect();
    // Trigger far too late: the peak lands past the end of the buffer.
    let late = WaveformEvent::new(
        events[0].channels.clone(),
        (config.trigger_setpoint + 40) as f32,
    );
    events.push(late);

    let result = analyze(&events, &config).unwrap();
    assert_eq!(result.metrics.len(), 6);
    assert_eq!(result.metrics.events[5].height, None);
    assert_eq!(result.metrics.warnings.height_out_of_range, 1);
    assert_eq!(result.height_histogram.entries(), 5);
}

#[test]
fn test_pipeline_is_idempotent() {
    let template = template();
    let config = template_config();
    let events: Vec<_> = [3, -1, 0, 2, -4, 1]
        .iter()
        .map(|&dt| shifted(&template, dt, config.trigger_setpoint))
        .collect();

    let first = analyze(&events, &config).unwrap();
    let second = analyze(&events, &config).unwrap();
    assert_eq!(first.metrics, second.metrics);
    assert_eq!(first.calibration, second.calibration);
    assert_eq!(first.height_histogram, second.height_histogram);

    let again = extract_metrics(&events, &config, &first.calibration).unwrap();
    assert_eq!(again, first.metrics);
}
