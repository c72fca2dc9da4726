//! dpcrgrid: digital-PCR quantification from microwell array images.
//!
//! Each panel image goes through these stages:
//!
//! 1. **Preprocess** – median smoothing to suppress spurious edges.
//! 2. **Detect** – Hough-gradient circle search for reaction wells.
//! 3. **Fit** – idealized square lattice anchored at the minimum detected
//!    x and y, using the known well spacing.
//! 4. **Measure** – mean normalized brightness inside every detected and
//!    fitted well (disk mask, parallel over wells).
//!
//! After all panels, fitted wells are classified against a threshold and the
//! positive fraction is converted into a Poisson concentration with a 95%
//! confidence interval.
//!
//! # Public API
//! - [`Analyzer`] and [`RunConfig`] as primary entry points
//! - stage functions ([`detect_circles`], [`fit_grid`], [`measure_intensity`],
//!   [`classify`], [`estimate_concentration`]) for direct use
//! - [`ImageSource`] for supplying panel images

mod analyzer;
mod circle;
mod classify;
mod concentration;
mod config;
mod detector;
mod error;
mod grid;
mod histogram;
mod intensity;
mod pipeline;
mod records;
mod source;

#[cfg(test)]
mod test_utils;

pub use analyzer::Analyzer;
pub use circle::Circle;
pub use classify::{classify, tally, AssayPolarity, Classification, ClassifyParams, WellTally};
pub use concentration::{estimate_concentration, ConcentrationEstimate};
pub use config::RunConfig;
pub use detector::{detect_circles, median_smooth, HoughConfig};
pub use error::{
    ClassifyError, EstimateError, GridError, PanelError, PanelErrorKind, SourceError, Stage,
    SummaryError,
};
pub use grid::{fit_grid, grid_anchor, GridSpec};
pub use histogram::{HistogramDatasets, IntensityHistogram, BIN_WIDTH, N_BINS};
pub use intensity::{measure_intensity, measure_wells, WellMeasurement};
pub use pipeline::{
    process_panel, run_panels, PanelFailure, PanelMeasurements, PanelResult, RunOutcome,
    RunSummary,
};
pub use records::{
    read_intensity_column, write_circle_table, write_intensity_table, CircleRecord,
    IntensityRecord,
};
pub use source::{DirectorySource, ImageSource, MemorySource};
