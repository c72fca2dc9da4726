//! Positive/negative calls for measured wells.
//!
//! A well is "dark" when `intensity < threshold` and "bright" otherwise, so a
//! well exactly at the threshold is bright. Which of the two counts as a
//! positive partition depends on the assay polarity.

use std::str::FromStr;

use crate::concentration::{estimate_concentration, ConcentrationEstimate};
use crate::error::{ClassifyError, EstimateError};
use crate::intensity::WellMeasurement;

/// Which wells carry the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssayPolarity {
    /// Occupied wells are dark (bead assays). Selector `1`.
    #[default]
    Beads,
    /// Occupied wells fluoresce (labelled bacteria). Selector `2`.
    Bacteria,
}

impl AssayPolarity {
    /// Map the numeric selector (`1` beads, `2` bacteria).
    pub fn from_selector(selector: u8) -> Result<Self, ClassifyError> {
        match selector {
            1 => Ok(Self::Beads),
            2 => Ok(Self::Bacteria),
            other => Err(ClassifyError::UnknownPolarity(other.to_string())),
        }
    }
}

impl FromStr for AssayPolarity {
    type Err = ClassifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" | "beads" => Ok(Self::Beads),
            "2" | "bacteria" => Ok(Self::Bacteria),
            _ => Err(ClassifyError::UnknownPolarity(s.to_string())),
        }
    }
}

/// Validated threshold and polarity.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ClassifyParams {
    threshold: f64,
    polarity: AssayPolarity,
}

impl ClassifyParams {
    /// Validate a threshold in `[0, 1]`.
    pub fn new(threshold: f64, polarity: AssayPolarity) -> Result<Self, ClassifyError> {
        if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
            return Err(ClassifyError::ThresholdOutOfRange(threshold));
        }
        Ok(Self {
            threshold,
            polarity,
        })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn polarity(&self) -> AssayPolarity {
        self.polarity
    }
}

/// Call for a single well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Classification {
    pub is_positive: bool,
}

/// Classify one intensity.
pub fn classify(intensity: f64, params: &ClassifyParams) -> Classification {
    let dark = intensity < params.threshold;
    let is_positive = match params.polarity {
        AssayPolarity::Beads => dark,
        AssayPolarity::Bacteria => !dark,
    };
    Classification { is_positive }
}

/// Positive/negative counts over a set of wells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct WellTally {
    pub n_positive: usize,
    pub n_negative: usize,
}

impl WellTally {
    /// Total number of partitions counted.
    pub fn n_partitions(&self) -> usize {
        self.n_positive + self.n_negative
    }

    /// Add one call.
    pub fn record(&mut self, call: Classification) {
        if call.is_positive {
            self.n_positive += 1;
        } else {
            self.n_negative += 1;
        }
    }

    /// Poisson concentration from these counts.
    pub fn estimate(&self, well_volume: f64) -> Result<ConcentrationEstimate, EstimateError> {
        estimate_concentration(self.n_positive as f64, self.n_negative as f64, well_volume)
    }
}

/// Classify and count a set of measured wells.
pub fn tally<'a>(
    wells: impl IntoIterator<Item = &'a WellMeasurement>,
    params: &ClassifyParams,
) -> WellTally {
    let mut out = WellTally::default();
    for w in wells {
        out.record(classify(w.intensity, params));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circle::Circle;

    fn well(intensity: f64) -> WellMeasurement {
        WellMeasurement {
            circle: Circle::new(0.0, 0.0, 1.0).expect("valid circle"),
            panel_index: 0,
            intensity,
        }
    }

    #[test]
    fn threshold_equality_is_bright() {
        let beads = ClassifyParams::new(0.5, AssayPolarity::Beads).unwrap();
        assert!(!classify(0.5, &beads).is_positive);
        assert!(classify(0.4999, &beads).is_positive);

        let bacteria = ClassifyParams::new(0.5, AssayPolarity::Bacteria).unwrap();
        assert!(classify(0.5, &bacteria).is_positive);
        assert!(!classify(0.4999, &bacteria).is_positive);
    }

    #[test]
    fn polarity_swaps_counts() {
        let wells: Vec<_> = [0.1, 0.2, 0.6, 0.7, 0.8].into_iter().map(well).collect();
        let beads = ClassifyParams::new(0.5, AssayPolarity::Beads).unwrap();
        let bacteria = ClassifyParams::new(0.5, AssayPolarity::Bacteria).unwrap();

        let t_beads = tally(&wells, &beads);
        let t_bact = tally(&wells, &bacteria);
        assert_eq!(t_beads, WellTally { n_positive: 2, n_negative: 3 });
        assert_eq!(t_bact.n_positive, t_beads.n_negative);
        assert_eq!(t_bact.n_negative, t_beads.n_positive);
        assert_eq!(t_bact.n_partitions(), 5);
    }

    #[test]
    fn rejects_out_of_range_threshold() {
        for t in [-0.1, 1.01, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                ClassifyParams::new(t, AssayPolarity::Beads),
                Err(ClassifyError::ThresholdOutOfRange(_))
            ));
        }
        assert!(ClassifyParams::new(0.0, AssayPolarity::Beads).is_ok());
        assert!(ClassifyParams::new(1.0, AssayPolarity::Beads).is_ok());
    }

    #[test]
    fn polarity_selectors() {
        assert_eq!(AssayPolarity::from_selector(1), Ok(AssayPolarity::Beads));
        assert_eq!(AssayPolarity::from_selector(2), Ok(AssayPolarity::Bacteria));
        assert!(AssayPolarity::from_selector(3).is_err());
        assert_eq!("Bacteria".parse::<AssayPolarity>(), Ok(AssayPolarity::Bacteria));
        assert_eq!(" 1 ".parse::<AssayPolarity>(), Ok(AssayPolarity::Beads));
        assert!("cells".parse::<AssayPolarity>().is_err());
    }
}
