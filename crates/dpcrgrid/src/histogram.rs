//! Intensity histogram datasets handed to an external plotter.

/// Bin width of the intensity histograms.
pub const BIN_WIDTH: f64 = 0.005;
/// Number of bins spanning `[0, 1]`.
pub const N_BINS: usize = 200;

/// Fixed-width histogram of intensities over `[0, 1]`.
///
/// Bin `k` covers `[k * BIN_WIDTH, (k + 1) * BIN_WIDTH)`; an intensity of
/// exactly 1 falls into the last bin.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct IntensityHistogram {
    pub bin_width: f64,
    pub counts: Vec<usize>,
    /// Values outside `[0, 1]` or non-finite.
    pub n_out_of_range: usize,
}

impl IntensityHistogram {
    /// Bin a set of intensities.
    pub fn from_values(values: &[f64]) -> Self {
        let mut counts = vec![0usize; N_BINS];
        let mut n_out_of_range = 0;
        for &v in values {
            if !v.is_finite() || !(0.0..=1.0).contains(&v) {
                n_out_of_range += 1;
                continue;
            }
            let bin = ((v / BIN_WIDTH).floor() as usize).min(N_BINS - 1);
            counts[bin] += 1;
        }
        Self {
            bin_width: BIN_WIDTH,
            counts,
            n_out_of_range,
        }
    }

    /// Lower edge of bin `k`.
    pub fn bin_start(&self, k: usize) -> f64 {
        k as f64 * self.bin_width
    }

    /// Total number of binned values.
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Raw intensity sequences (detected and fitted wells) and their histograms.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct HistogramDatasets {
    pub detected: Vec<f64>,
    pub fitted: Vec<f64>,
    pub detected_histogram: IntensityHistogram,
    pub fitted_histogram: IntensityHistogram,
}

impl HistogramDatasets {
    pub fn new(detected: Vec<f64>, fitted: Vec<f64>) -> Self {
        let detected_histogram = IntensityHistogram::from_values(&detected);
        let fitted_histogram = IntensityHistogram::from_values(&fitted);
        Self {
            detected,
            fitted,
            detected_histogram,
            fitted_histogram,
        }
    }
}
