//! Well detection: median smoothing followed by a Hough-gradient circle search.

mod config;
mod hough;
mod preprocess;

pub use config::HoughConfig;
pub use hough::detect_circles;
pub use preprocess::median_smooth;
