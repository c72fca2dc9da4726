/// Hough-gradient circle detection parameters.
///
/// All distances are in image pixels and are fixed for a run.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HoughConfig {
    /// Inverse accumulator resolution: 1 means same resolution as the image,
    /// 2 means half resolution.
    pub dp: f64,
    /// Minimum distance between accepted circle centers.
    pub min_dist: f64,
    /// High threshold of the Canny edge detector (low is half of it, at least 1).
    pub param1: f64,
    /// Vote threshold: a center, and its best radius, must exceed this many
    /// votes. Lower values find more circles, including false ones.
    pub param2: f64,
    /// Smallest radius searched.
    pub min_radius: f64,
    /// Largest radius searched.
    pub max_radius: f64,
}

impl Default for HoughConfig {
    fn default() -> Self {
        Self {
            dp: 1.0,
            min_dist: 20.0,
            param1: 1.0,
            param2: 7.0,
            min_radius: 5.0,
            max_radius: 13.0,
        }
    }
}

impl HoughConfig {
    /// Check parameter consistency.
    pub fn validate(&self) -> Result<(), String> {
        if !self.dp.is_finite() || self.dp < 1.0 {
            return Err("hough.dp must be finite and >= 1".to_string());
        }
        if !self.min_dist.is_finite() || self.min_dist < 0.0 {
            return Err("hough.min_dist must be finite and >= 0".to_string());
        }
        if !self.param1.is_finite() || self.param1 <= 0.0 {
            return Err("hough.param1 must be finite and > 0".to_string());
        }
        if !self.param2.is_finite() || self.param2 < 0.0 {
            return Err("hough.param2 must be finite and >= 0".to_string());
        }
        if !self.min_radius.is_finite() || self.min_radius <= 0.0 {
            return Err("hough.min_radius must be finite and > 0".to_string());
        }
        if !self.max_radius.is_finite() || self.max_radius < self.min_radius {
            return Err(format!(
                "hough.max_radius ({}) must be >= min_radius ({})",
                self.max_radius, self.min_radius
            ));
        }
        Ok(())
    }
}
