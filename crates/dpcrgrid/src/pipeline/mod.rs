//! Quantification pipeline driver.
//!
//! Wires the stages together per panel (smooth → detect → fit → measure),
//! accumulates results in memory across panels, and runs classification and
//! the concentration estimate once at the end.
//!
//! Panels are processed sequentially; wells within a panel are measured in
//! parallel. A failing panel never aborts the run.

mod result;
mod run;

pub use result::{PanelFailure, PanelMeasurements, PanelResult, RunOutcome, RunSummary};
pub use run::{process_panel, run_panels};
