//! SNR estimation and the adaptive detection percentile.

use crate::filters::{savgol_smooth, std_dev};

/// Estimate the signal-to-noise ratio of an area sequence: signal range
/// divided by the standard deviation of the residual against a heavily
/// smoothed version of the same sequence.
pub fn estimate_snr(area: &[f64], heights: &[f64]) -> f64 {
    let m = area.len();
    let mut window = (m / 5).min(21);
    if window % 2 == 0 {
        window += 1;
    }
    let window = window.max(5);

    let heavy = savgol_smooth(area, heights, window, 2);
    let noise: Vec<f64> = area.iter().zip(heavy.iter()).map(|(a, s)| a - s).collect();
    let noise_std = std_dev(&noise);

    let min = area.iter().copied().fold(f64::INFINITY, f64::min);
    let max = area.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    (max - min) / (noise_std + 1e-8)
}

/// Map an SNR estimate to the score percentile used for thresholding.
/// Cleaner data gets a lower, more sensitive percentile.
pub fn percentile_for_snr(snr: f64) -> u32 {
    if snr > 100.0 {
        70
    } else if snr > 50.0 {
        75
    } else if snr > 20.0 {
        80
    } else if snr > 10.0 {
        85
    } else {
        90
    }
}
