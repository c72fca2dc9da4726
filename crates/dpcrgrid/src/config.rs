//! Run configuration.
//!
//! JSON follows a versioned schema (`dpcrgrid.run.v1`). Omitted fields take
//! their defaults; unknown fields are rejected.

use std::path::Path;

use crate::detector::HoughConfig;
use crate::grid::GridSpec;

const RUN_SCHEMA_V1: &str = "dpcrgrid.run.v1";

const DEFAULT_N_PANELS: usize = 3;
/// Volume of a single well in µL.
const DEFAULT_WELL_VOLUME_UL: f64 = 1.257e-5;
const DEFAULT_MEDIAN_KERNEL: u32 = 5;

/// Fixed parameters of one quantification run.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Schema tag; must be `dpcrgrid.run.v1`.
    pub schema: String,
    /// Number of panel images (`1..=n_panels`).
    pub n_panels: usize,
    /// Well array geometry.
    pub grid: GridSpec,
    /// Volume of one well (µL).
    pub well_volume_ul: f64,
    /// Median filter window (odd) applied before detection and measurement.
    pub median_kernel: u32,
    /// Circle detection parameters.
    pub hough: HoughConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            schema: RUN_SCHEMA_V1.to_string(),
            n_panels: DEFAULT_N_PANELS,
            grid: GridSpec::default(),
            well_volume_ul: DEFAULT_WELL_VOLUME_UL,
            median_kernel: DEFAULT_MEDIAN_KERNEL,
            hough: HoughConfig::default(),
        }
    }
}

impl RunConfig {
    /// Load and validate a run configuration from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    /// Parse and validate a run configuration from JSON text.
    pub fn from_json_str(data: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: Self = serde_json::from_str(data)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every parameter is usable.
    pub fn validate(&self) -> Result<(), String> {
        if self.schema != RUN_SCHEMA_V1 {
            return Err(format!(
                "unsupported run schema '{}' (expected '{}')",
                self.schema, RUN_SCHEMA_V1
            ));
        }
        if self.n_panels == 0 {
            return Err("n_panels must be >= 1".to_string());
        }
        if !self.well_volume_ul.is_finite() || self.well_volume_ul <= 0.0 {
            return Err("well_volume_ul must be finite and > 0".to_string());
        }
        if self.median_kernel % 2 == 0 {
            return Err(format!(
                "median_kernel must be odd, got {}",
                self.median_kernel
            ));
        }
        self.grid.validate().map_err(|e| e.to_string())?;
        self.hough.validate()?;
        Ok(())
    }

    /// Serialize to pretty JSON.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_setup() {
        let cfg = RunConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.n_panels, 3);
        assert_eq!(cfg.grid.array_size, 30);
        assert_eq!(cfg.grid.x_spacing, 24.5);
        assert_eq!(cfg.grid.fitted_radius, 6.0);
        assert_eq!(cfg.hough.param2, 7.0);
        assert_eq!(cfg.median_kernel, 5);
    }

    #[test]
    fn json_round_trips_defaults() {
        let cfg = RunConfig::default();
        let json = cfg.to_json_pretty().unwrap();
        let back = RunConfig::from_json_str(&json).expect("valid config");
        assert_eq!(back, cfg);
    }

    #[test]
    fn partial_json_overrides_fields() {
        let raw = r#"{
            "schema": "dpcrgrid.run.v1",
            "n_panels": 5,
            "grid": {"array_size": 12},
            "hough": {"min_radius": 4.0, "max_radius": 9.0}
        }"#;
        let cfg = RunConfig::from_json_str(raw).expect("valid config");
        assert_eq!(cfg.n_panels, 5);
        assert_eq!(cfg.grid.array_size, 12);
        assert_eq!(cfg.grid.y_spacing, 24.5);
        assert_eq!(cfg.hough.max_radius, 9.0);
    }

    #[test]
    fn rejects_wrong_schema() {
        let err = RunConfig::from_json_str(r#"{"schema": "dpcrgrid.run.v0"}"#)
            .expect_err("expected error");
        assert!(err.to_string().contains("unsupported run schema"));
    }

    #[test]
    fn rejects_unknown_fields() {
        let raw = r#"{"schema": "dpcrgrid.run.v1", "threshold": 0.4}"#;
        assert!(RunConfig::from_json_str(raw).is_err());
    }

    #[test]
    fn rejects_even_median_kernel() {
        let cfg = RunConfig {
            median_kernel: 4,
            ..Default::default()
        };
        assert!(cfg.validate().unwrap_err().contains("median_kernel"));
    }
}
