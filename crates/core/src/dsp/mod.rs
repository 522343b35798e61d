//! Per-quantum sample kernels. Both run on the rendering thread: single
//! forward passes over borrowed slices, no allocation.

/// Sum of absolute sample values over one channel buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AmplitudeMetric {
    pub sum: f64,
    pub length: usize,
}

/// Copies `input` into `output` unchanged and returns the number of samples
/// written.
///
/// Hosts always pass equally sized buffers. Should they differ, only the
/// overlapping prefix is copied and the remainder of `output` is left alone.
#[inline]
pub fn pass_through(input: &[f32], output: &mut [f32]) -> usize {
    let len = input.len().min(output.len());
    output[..len].copy_from_slice(&input[..len]);
    len
}

/// Accumulates `|sample|` left to right in `f64`.
#[inline]
pub fn accumulate_abs(samples: &[f32]) -> AmplitudeMetric {
    let mut sum = 0.0_f64;
    for sample in samples {
        sum += f64::from(sample.abs());
    }

    AmplitudeMetric {
        sum,
        length: samples.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copies_samples_unchanged() {
        let input = [0.5, -0.25, 0.0, 1.0];
        let mut output = [9.0; 4];

        assert_eq!(pass_through(&input, &mut output), 4);
        assert_eq!(output, input);
    }

    #[test]
    fn longer_output_keeps_its_tail() {
        let input = [0.1, 0.2];
        let mut output = [7.0; 4];

        assert_eq!(pass_through(&input, &mut output), 2);
        assert_eq!(output, [0.1, 0.2, 7.0, 7.0]);
    }

    #[test]
    fn shorter_output_is_not_overrun() {
        let input = [0.1, 0.2, 0.3];
        let mut output = [0.0; 2];

        assert_eq!(pass_through(&input, &mut output), 2);
        assert_eq!(output, [0.1, 0.2]);
    }

    #[test]
    fn sums_absolute_values() {
        let metric = accumulate_abs(&[0.5, -0.25, 0.0, 1.0]);
        assert_eq!(metric, AmplitudeMetric { sum: 1.75, length: 4 });
    }

    #[test]
    fn empty_buffer_sums_to_zero() {
        assert_eq!(accumulate_abs(&[]), AmplitudeMetric::default());
    }

    #[test]
    fn non_finite_samples_pass_through() {
        let input = [f32::NAN, f32::INFINITY];
        let mut output = [0.0; 2];
        pass_through(&input, &mut output);

        assert!(output[0].is_nan());
        assert_eq!(output[1], f32::INFINITY);
        assert!(accumulate_abs(&input).sum.is_nan());
    }
}
