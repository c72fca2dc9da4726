//! High-level quantification API.
//!
//! [`Analyzer`] is the primary entry point. It wraps a [`RunConfig`] and
//! runs the per-panel pipeline on single images or on a whole image source.

use std::path::Path;

use image::GrayImage;

use crate::config::RunConfig;
use crate::error::PanelError;
use crate::pipeline::{process_panel, run_panels, PanelMeasurements, RunOutcome};
use crate::source::ImageSource;

/// Primary quantification interface.
///
/// Create once, analyze many panels.
///
/// # Examples
///
/// ```no_run
/// use dpcrgrid::{Analyzer, AssayPolarity, DirectorySource};
///
/// let analyzer = Analyzer::default();
/// let outcome = analyzer.run(&DirectorySource::new("panels", "jpg"));
/// let summary = outcome
///     .summarize(0.4, AssayPolarity::Beads, analyzer.config().well_volume_ul)
///     .expect("summary");
/// println!("{:.3} copies/uL", summary.estimate.c_estimate);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    config: RunConfig,
}

impl Analyzer {
    /// Create with a validated configuration.
    pub fn new(config: RunConfig) -> Result<Self, String> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Create from a run configuration JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self {
            config: RunConfig::from_json_file(path)?,
        })
    }

    /// Access the current configuration.
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Mutable access to configuration for post-construction tuning.
    pub fn config_mut(&mut self) -> &mut RunConfig {
        &mut self.config
    }

    /// Analyze one decoded panel image.
    pub fn analyze_panel(
        &self,
        image: &GrayImage,
        panel_index: usize,
    ) -> Result<PanelMeasurements, PanelError> {
        process_panel(image, panel_index, &self.config)
    }

    /// Analyze every configured panel from `source`.
    pub fn run<S: ImageSource + ?Sized>(&self, source: &S) -> RunOutcome {
        run_panels(source, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Stage;
    use crate::source::MemorySource;
    use image::Luma;

    #[test]
    fn rejects_invalid_config() {
        let cfg = RunConfig {
            n_panels: 0,
            ..Default::default()
        };
        assert!(Analyzer::new(cfg).is_err());
    }

    #[test]
    fn config_mut_tunes_analyzer() {
        let mut analyzer = Analyzer::default();
        analyzer.config_mut().grid.array_size = 4;
        assert_eq!(analyzer.config().grid.n_wells(), 16);
    }

    #[test]
    fn blank_images_fail_every_panel() {
        let blank = GrayImage::from_pixel(64, 64, Luma([0]));
        let mut analyzer = Analyzer::default();
        analyzer.config_mut().n_panels = 2;
        let outcome = analyzer.run(&MemorySource::new(vec![blank.clone(), blank]));
        assert!(outcome.panels.is_empty());
        assert_eq!(outcome.failures.len(), 2);
        assert!(outcome.failures.iter().all(|f| f.stage == Stage::Detect));
    }
}
