//! Per-panel stages and the sequential run loop: smooth → detect → fit → measure.

use image::GrayImage;

use super::result::{PanelMeasurements, PanelResult, RunOutcome};
use crate::config::RunConfig;
use crate::detector::{detect_circles, median_smooth};
use crate::error::{PanelError, PanelErrorKind, Stage};
use crate::grid::fit_grid;
use crate::intensity::measure_wells;
use crate::source::ImageSource;

/// Process one decoded panel image.
///
/// Intensities are measured on the median-smoothed image that detection ran
/// on. A panel with no detected circles, or an invalid detection
/// configuration, fails at the detect stage.
pub fn process_panel(
    gray: &GrayImage,
    panel_index: usize,
    config: &RunConfig,
) -> Result<PanelMeasurements, PanelError> {
    let smoothed = median_smooth(gray, config.median_kernel);

    let detected_circles = detect_circles(&smoothed, &config.hough).map_err(|msg| {
        PanelError::new(panel_index, Stage::Detect, PanelErrorKind::Config(msg))
    })?;
    if detected_circles.is_empty() {
        return Err(PanelError::new(
            panel_index,
            Stage::Detect,
            PanelErrorKind::DetectionEmpty,
        ));
    }

    let fitted_circles = fit_grid(&detected_circles, &config.grid)
        .map_err(|e| PanelError::new(panel_index, Stage::Fit, PanelErrorKind::Grid(e)))?;

    let detected = measure_wells(&smoothed, &detected_circles, panel_index);
    let fitted = measure_wells(&smoothed, &fitted_circles, panel_index);
    tracing::debug!(
        "panel {}: {} detected, {} fitted wells",
        panel_index,
        detected.len(),
        fitted.len()
    );

    Ok(PanelMeasurements {
        result: PanelResult {
            panel_index,
            detected_circles,
            fitted_circles,
        },
        detected,
        fitted,
    })
}

/// Process panels `0..config.n_panels` in order.
///
/// A failing panel is recorded in [`RunOutcome::failures`] and the run moves
/// on to the next panel.
pub fn run_panels<S: ImageSource + ?Sized>(source: &S, config: &RunConfig) -> RunOutcome {
    let mut outcome = RunOutcome::default();
    for panel_index in 0..config.n_panels {
        let image_number = panel_index + 1;
        tracing::info!("processing panel {} (image {})", panel_index, image_number);

        let processed = source
            .load_panel(image_number)
            .map_err(|e| PanelError::new(panel_index, Stage::Load, PanelErrorKind::Load(e)))
            .and_then(|gray| process_panel(&gray, panel_index, config));

        match processed {
            Ok(panel) => outcome.panels.push(panel),
            Err(e) => {
                tracing::warn!("{}", e);
                outcome.failures.push(e);
            }
        }
    }
    tracing::info!(
        "run finished: {} panels processed, {} failed",
        outcome.panels.len(),
        outcome.failures.len()
    );
    outcome
}
