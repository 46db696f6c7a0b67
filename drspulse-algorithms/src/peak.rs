//! Peak location on the mean waveform.

use drspulse_core::MeanWaveform;

/// Returns the canonical index of the largest mean value.
///
/// Empty indices count as zero. Ties resolve to the lowest index and NaN
/// values are never selected. Returns `None` if no index holds a comparable
/// value.
#[must_use]
pub fn locate_peak(waveform: &MeanWaveform) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, &value) in waveform.means().iter().enumerate() {
        if value.is_nan() {
            continue;
        }
        match best {
            Some((_, current)) if value <= current => {}
            _ => best = Some((index, value)),
        }
    }
    best.map(|(index, _)| index)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn waveform(values: &[f64]) -> MeanWaveform {
        let mut waveform = MeanWaveform::new(values.len());
        for (i, &v) in values.iter().enumerate() {
            waveform.update(i, v);
        }
        waveform
    }

    #[test]
    fn test_single_maximum() {
        assert_eq!(locate_peak(&waveform(&[1.0, 3.0, 9.0, 2.0])), Some(2));
    }

    #[test]
    fn test_tie_picks_lowest_index() {
        assert_eq!(locate_peak(&waveform(&[0.0, 7.0, 1.0, 7.0, 0.0])), Some(1));
    }

    #[test]
    fn test_empty_indices_read_as_zero() {
        let mut waveform = MeanWaveform::new(4);
        waveform.update(1, -3.0);
        waveform.update(2, -1.0);
        // index 0 was never filled and reads as zero
        assert_eq!(locate_peak(&waveform), Some(0));
    }

    #[test]
    fn test_nan_is_skipped() {
        assert_eq!(locate_peak(&waveform(&[f64::NAN, 2.0, 1.0])), Some(1));
        assert_eq!(locate_peak(&waveform(&[f64::NAN])), None);
        assert_eq!(locate_peak(&MeanWaveform::new(0)), None);
    }
}
