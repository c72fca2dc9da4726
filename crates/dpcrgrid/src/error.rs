//! Error types for the quantification pipeline.
//!
//! Every error that reaches a caller names the pipeline [`Stage`] it came
//! from; panel-level errors also carry the zero-based panel index.

use std::fmt;

// ── Stage ──────────────────────────────────────────────────────────────────

/// Pipeline stage an error was raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Loading/decoding the panel image.
    Load,
    /// Circle detection.
    Detect,
    /// Grid fitting.
    Fit,
    /// Intensity measurement. Measuring never fails (an empty mask reads 0),
    /// so no error carries this stage; it names the step in reports.
    Measure,
    /// Threshold/polarity validation and classification.
    Classify,
    /// Poisson concentration estimate.
    Estimate,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Load => "load",
            Self::Detect => "detect",
            Self::Fit => "fit",
            Self::Measure => "measure",
            Self::Classify => "classify",
            Self::Estimate => "estimate",
        };
        f.write_str(name)
    }
}

// ── Grid fitting ───────────────────────────────────────────────────────────

/// Errors returned by grid fitting.
#[derive(Debug, Clone, PartialEq)]
pub enum GridError {
    /// No detected circles to anchor the grid on.
    EmptyDetection,
    /// Grid geometry is unusable.
    InvalidSpec(String),
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyDetection => write!(f, "no detected circles to anchor the grid"),
            Self::InvalidSpec(msg) => write!(f, "invalid grid spec: {}", msg),
        }
    }
}

impl std::error::Error for GridError {}

// ── Classification ─────────────────────────────────────────────────────────

/// Invalid user-supplied classification parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassifyError {
    /// Threshold is non-finite or outside `[0, 1]`.
    ThresholdOutOfRange(f64),
    /// Polarity selector is not recognized.
    UnknownPolarity(String),
}

impl fmt::Display for ClassifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ThresholdOutOfRange(t) => {
                write!(f, "threshold {} is outside [0, 1]", t)
            }
            Self::UnknownPolarity(s) => write!(
                f,
                "unknown assay polarity '{}' (expected 1/beads or 2/bacteria)",
                s
            ),
        }
    }
}

impl std::error::Error for ClassifyError {}

// ── Concentration ──────────────────────────────────────────────────────────

/// Errors returned by the Poisson concentration estimator.
#[derive(Debug, Clone, PartialEq)]
pub enum EstimateError {
    /// Zero partitions in total.
    NoPartitions,
    /// Negative or non-finite partition counts.
    InvalidCounts {
        /// Positive count as given.
        n_positive: f64,
        /// Negative count as given.
        n_negative: f64,
    },
    /// Well volume is non-finite or not strictly positive.
    InvalidWellVolume(f64),
    /// Positive fraction (or its upper confidence bound) reaches 1, where
    /// `-ln(1 - p)` is undefined.
    InvalidProportion {
        /// Point estimate of the positive fraction.
        p_hat: f64,
        /// Upper 95% bound of the positive fraction.
        p_upper: f64,
    },
}

impl fmt::Display for EstimateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoPartitions => write!(f, "no partitions to estimate from"),
            Self::InvalidCounts {
                n_positive,
                n_negative,
            } => write!(
                f,
                "invalid partition counts: positive={}, negative={}",
                n_positive, n_negative
            ),
            Self::InvalidWellVolume(v) => {
                write!(f, "well volume must be finite and > 0, got {}", v)
            }
            Self::InvalidProportion { p_hat, p_upper } => write!(
                f,
                "positive fraction out of range for Poisson model: p_hat={:.4}, p_upper={:.4}",
                p_hat, p_upper
            ),
        }
    }
}

impl std::error::Error for EstimateError {}

// ── Image source ───────────────────────────────────────────────────────────

/// Errors returned by an [`ImageSource`](crate::ImageSource).
#[derive(Debug)]
pub enum SourceError {
    /// No image for the requested 1-based image number.
    Missing(usize),
    /// The image exists but could not be decoded.
    Decode {
        /// Path or label of the image.
        path: String,
        /// Decoder message.
        message: String,
    },
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing(n) => write!(f, "no image for image number {}", n),
            Self::Decode { path, message } => {
                write!(f, "failed to open image {}: {}", path, message)
            }
        }
    }
}

impl std::error::Error for SourceError {}

// ── Panel / run ────────────────────────────────────────────────────────────

/// What went wrong while processing one panel.
#[derive(Debug)]
pub enum PanelErrorKind {
    /// Image could not be loaded.
    Load(SourceError),
    /// Circle detection found no wells.
    DetectionEmpty,
    /// Stage parameters were rejected before running.
    Config(String),
    /// Grid fitting failed.
    Grid(GridError),
}

/// A failure confined to a single panel.
#[derive(Debug)]
pub struct PanelError {
    /// Zero-based panel index.
    pub panel_index: usize,
    /// Stage the failure occurred in.
    pub stage: Stage,
    /// Failure detail.
    pub kind: PanelErrorKind,
}

impl PanelError {
    pub(crate) fn new(panel_index: usize, stage: Stage, kind: PanelErrorKind) -> Self {
        Self {
            panel_index,
            stage,
            kind,
        }
    }
}

impl fmt::Display for PanelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "panel {} [{}]: ", self.panel_index, self.stage)?;
        match &self.kind {
            PanelErrorKind::Load(e) => write!(f, "{}", e),
            PanelErrorKind::DetectionEmpty => write!(f, "no circles detected"),
            PanelErrorKind::Config(msg) => write!(f, "invalid configuration: {}", msg),
            PanelErrorKind::Grid(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for PanelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            PanelErrorKind::Load(e) => Some(e),
            PanelErrorKind::Grid(e) => Some(e),
            PanelErrorKind::DetectionEmpty | PanelErrorKind::Config(_) => None,
        }
    }
}

/// Failure of the run-level summary step (after all panels were measured).
#[derive(Debug, Clone, PartialEq)]
pub enum SummaryError {
    /// Classification parameters were rejected.
    Classify(ClassifyError),
    /// Concentration estimate failed.
    Estimate(EstimateError),
}

impl SummaryError {
    /// Stage the failure belongs to.
    pub fn stage(&self) -> Stage {
        match self {
            Self::Classify(_) => Stage::Classify,
            Self::Estimate(_) => Stage::Estimate,
        }
    }
}

impl fmt::Display for SummaryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Classify(e) => write!(f, "all panels [{}]: {}", self.stage(), e),
            Self::Estimate(e) => write!(f, "all panels [{}]: {}", self.stage(), e),
        }
    }
}

impl std::error::Error for SummaryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Classify(e) => Some(e),
            Self::Estimate(e) => Some(e),
        }
    }
}

impl From<ClassifyError> for SummaryError {
    fn from(e: ClassifyError) -> Self {
        Self::Classify(e)
    }
}

impl From<EstimateError> for SummaryError {
    fn from(e: EstimateError) -> Self {
        Self::Estimate(e)
    }
}
