use crate::circle::Circle;
use crate::classify::{tally, AssayPolarity, ClassifyParams, WellTally};
use crate::concentration::ConcentrationEstimate;
use crate::error::{PanelError, Stage, SummaryError};
use crate::histogram::HistogramDatasets;
use crate::intensity::WellMeasurement;
use crate::records::{CircleRecord, IntensityRecord};

/// Detected and fitted circles of one panel.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PanelResult {
    /// Zero-based panel index (image number minus one).
    pub panel_index: usize,
    /// Circles in detector emission order.
    pub detected_circles: Vec<Circle>,
    /// `array_size²` lattice wells, column-major.
    pub fitted_circles: Vec<Circle>,
}

/// A processed panel: its circles plus per-well intensities.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PanelMeasurements {
    pub result: PanelResult,
    /// One entry per detected circle, same order.
    pub detected: Vec<WellMeasurement>,
    /// One entry per fitted circle, same order.
    pub fitted: Vec<WellMeasurement>,
}

/// Serializable form of a [`PanelError`].
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PanelFailure {
    pub panel_index: usize,
    pub stage: Stage,
    pub message: String,
}

impl From<&PanelError> for PanelFailure {
    fn from(e: &PanelError) -> Self {
        Self {
            panel_index: e.panel_index,
            stage: e.stage,
            message: e.to_string(),
        }
    }
}

/// Run-level summary over the fitted wells of all successful panels.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RunSummary {
    pub classify: ClassifyParams,
    pub tally: WellTally,
    pub estimate: ConcentrationEstimate,
}

/// Everything accumulated over a run, in panel order.
#[derive(Debug, Default)]
pub struct RunOutcome {
    /// Successfully processed panels.
    pub panels: Vec<PanelMeasurements>,
    /// Panels that failed; the run continued past them.
    pub failures: Vec<PanelError>,
}

impl RunOutcome {
    /// Fitted-well measurements across all panels.
    pub fn fitted_wells(&self) -> impl Iterator<Item = &WellMeasurement> + '_ {
        self.panels.iter().flat_map(|p| p.fitted.iter())
    }

    /// Detected-well measurements across all panels.
    pub fn detected_wells(&self) -> impl Iterator<Item = &WellMeasurement> + '_ {
        self.panels.iter().flat_map(|p| p.detected.iter())
    }

    pub fn detected_circle_records(&self) -> Vec<CircleRecord> {
        self.panels
            .iter()
            .flat_map(|p| {
                p.result
                    .detected_circles
                    .iter()
                    .map(move |c| CircleRecord::new(c, p.result.panel_index))
            })
            .collect()
    }

    pub fn fitted_circle_records(&self) -> Vec<CircleRecord> {
        self.panels
            .iter()
            .flat_map(|p| {
                p.result
                    .fitted_circles
                    .iter()
                    .map(move |c| CircleRecord::new(c, p.result.panel_index))
            })
            .collect()
    }

    pub fn detected_intensity_records(&self) -> Vec<IntensityRecord> {
        self.detected_wells().map(IntensityRecord::from).collect()
    }

    pub fn fitted_intensity_records(&self) -> Vec<IntensityRecord> {
        self.fitted_wells().map(IntensityRecord::from).collect()
    }

    pub fn failure_records(&self) -> Vec<PanelFailure> {
        self.failures.iter().map(PanelFailure::from).collect()
    }

    /// Raw intensities and 0.005-wide histograms for both well sets.
    pub fn histograms(&self) -> HistogramDatasets {
        HistogramDatasets::new(
            self.detected_wells().map(|w| w.intensity).collect(),
            self.fitted_wells().map(|w| w.intensity).collect(),
        )
    }

    /// Classify all fitted wells and estimate the concentration.
    ///
    /// Threshold and polarity are validated before any well is classified.
    pub fn summarize(
        &self,
        threshold: f64,
        polarity: AssayPolarity,
        well_volume: f64,
    ) -> Result<RunSummary, SummaryError> {
        let classify = ClassifyParams::new(threshold, polarity)?;
        let tally = tally(self.fitted_wells(), &classify);
        let estimate = tally.estimate(well_volume)?;
        tracing::info!(
            "summary: {} positive, {} negative, p_hat={:.4}",
            tally.n_positive,
            tally.n_negative,
            estimate.p_hat
        );
        Ok(RunSummary {
            classify,
            tally,
            estimate,
        })
    }
}
