//! Analysis window

use std::f32::consts::PI;

/// Symmetric Hann window of `size` coefficients.
///
/// `w[i] = 0.5 * (1 - cos(2π·i / (N - 1)))`, so both ends are exactly zero.
pub fn hann_window(size: usize) -> Vec<f32> {
    match size {
        0 => Vec::new(),
        1 => vec![1.0],
        _ => {
            let denom = (size - 1) as f32;
            (0..size)
                .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f32 / denom).cos()))
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_hann_endpoints_and_peak() {
        let w = hann_window(9);
        assert_eq!(w.len(), 9);
        assert_relative_eq!(w[0], 0.0, epsilon = 1e-7);
        assert_relative_eq!(w[8], 0.0, epsilon = 1e-6);
        assert_relative_eq!(w[4], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_hann_symmetric() {
        let w = hann_window(256);
        for i in 0..128 {
            assert_relative_eq!(w[i], w[255 - i], epsilon = 1e-5);
        }
    }

    #[test]
    fn test_degenerate_sizes() {
        assert!(hann_window(0).is_empty());
        assert_eq!(hann_window(1), vec![1.0]);
    }
}
