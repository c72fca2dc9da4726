//! dpcrgrid command-line interface for dPCR well-array quantification.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

use dpcrgrid::{
    estimate_concentration, write_circle_table, write_intensity_table, Analyzer, AssayPolarity,
    CircleRecord, DirectorySource, HistogramDatasets, ImageSource, IntensityRecord,
    PanelFailure, PanelMeasurements, RunConfig, RunOutcome, RunSummary,
};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "dpcrgrid")]
#[command(
    about = "Quantify digital-PCR microwell array images (well detection, grid fit, Poisson concentration)"
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect, fit and measure wells on all panels, then estimate concentration.
    Analyze(CliAnalyzeArgs),

    /// Estimate concentration from positive/negative partition counts.
    Concentration {
        /// Number of positive partitions.
        #[arg(long)]
        positive: f64,

        /// Number of negative partitions.
        #[arg(long)]
        negative: f64,

        /// Volume of a single well in uL.
        #[arg(long, default_value = "1.257e-5")]
        well_volume: f64,
    },

    /// Print the default run configuration (JSON).
    DefaultConfig,
}

#[derive(Debug, Clone, Args)]
struct CliAnalyzeArgs {
    /// Directory holding the numbered panel images (1.jpg, 2.jpg, ...).
    #[arg(long)]
    images: PathBuf,

    /// Image file extension.
    #[arg(long, default_value = "jpg")]
    ext: String,

    /// Run configuration JSON (defaults are used when omitted).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the number of panels.
    #[arg(long)]
    panels: Option<usize>,

    /// Override the number of wells per array side.
    #[arg(long)]
    array_size: Option<usize>,

    /// Override the well spacing in pixels (both axes).
    #[arg(long)]
    spacing: Option<f64>,

    /// Override the well volume in uL.
    #[arg(long)]
    well_volume: Option<f64>,

    /// Fluorescence threshold in [0, 1] for the positive call.
    /// Without it only measurements are reported.
    #[arg(long)]
    threshold: Option<f64>,

    /// Assay polarity: which wells count as positive.
    #[arg(long, value_enum, default_value_t = AssayArg::Beads)]
    assay: AssayArg,

    /// Path to write the JSON report.
    #[arg(long)]
    out: PathBuf,

    /// Directory for tab-delimited circle and intensity tables.
    #[arg(long)]
    tables: Option<PathBuf>,

    /// Directory for annotated panel images.
    #[arg(long)]
    annotate: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AssayArg {
    /// Occupied wells are dark.
    Beads,
    /// Occupied wells fluoresce.
    Bacteria,
}

impl AssayArg {
    fn to_core(self) -> AssayPolarity {
        match self {
            Self::Beads => AssayPolarity::Beads,
            Self::Bacteria => AssayPolarity::Bacteria,
        }
    }
}

impl CliAnalyzeArgs {
    fn to_config(&self) -> CliResult<RunConfig> {
        let mut config = match &self.config {
            Some(path) => RunConfig::from_json_file(path).map_err(|e| -> CliError {
                format!("Failed to load config {}: {}", path.display(), e).into()
            })?,
            None => RunConfig::default(),
        };

        if let Some(n) = self.panels {
            config.n_panels = n;
        }
        if let Some(n) = self.array_size {
            config.grid.array_size = n;
        }
        if let Some(s) = self.spacing {
            config.grid.x_spacing = s;
            config.grid.y_spacing = s;
        }
        if let Some(v) = self.well_volume {
            config.well_volume_ul = v;
        }
        config.validate()?;
        Ok(config)
    }
}

#[derive(serde::Serialize)]
struct AnalyzeReport<'a> {
    config: &'a RunConfig,
    panels: &'a [PanelMeasurements],
    failures: Vec<PanelFailure>,
    histograms: HistogramDatasets,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<RunSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary_error: Option<String>,
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze(args) => run_analyze(&args),
        Commands::Concentration {
            positive,
            negative,
            well_volume,
        } => run_concentration(positive, negative, well_volume),
        Commands::DefaultConfig => run_default_config(),
    }
}

// ── default-config ─────────────────────────────────────────────────────

fn run_default_config() -> CliResult<()> {
    println!("{}", RunConfig::default().to_json_pretty()?);
    Ok(())
}

// ── concentration ──────────────────────────────────────────────────────

fn run_concentration(positive: f64, negative: f64, well_volume: f64) -> CliResult<()> {
    let est = estimate_concentration(positive, negative, well_volume)?;
    print_estimate(est.n_positive, est.n_negative, &est);
    Ok(())
}

fn print_estimate(n_pos: f64, n_neg: f64, est: &dpcrgrid::ConcentrationEstimate) {
    println!("Number of positive calls:                {:.2}", n_pos);
    println!("Number of negative calls:                {:.2}", n_neg);
    println!("Probability of positive partition:       {:.2}", est.p_hat);
    println!();
    println!(
        "Estimated concentration:                 {:.3} copies/uL",
        est.c_estimate
    );
    println!(
        "Lower bound of 95% confidence interval:  {:.3} copies/uL",
        est.c_lower
    );
    println!(
        "Upper bound of 95% confidence interval:  {:.3} copies/uL",
        est.c_upper
    );
}

// ── analyze ────────────────────────────────────────────────────────────

fn run_analyze(args: &CliAnalyzeArgs) -> CliResult<()> {
    let config = args.to_config()?;
    let analyzer = Analyzer::new(config)?;
    let source = DirectorySource::new(&args.images, &args.ext);

    tracing::info!(
        "Analyzing {} panels from {}",
        analyzer.config().n_panels,
        source.dir().display()
    );
    let outcome = analyzer.run(&source);

    let n_detected: usize = outcome.panels.iter().map(|p| p.detected.len()).sum();
    let n_fitted: usize = outcome.panels.iter().map(|p| p.fitted.len()).sum();
    tracing::info!(
        "{} panels ok, {} failed; {} detected wells, {} fitted wells",
        outcome.panels.len(),
        outcome.failures.len(),
        n_detected,
        n_fitted
    );

    if let Some(dir) = &args.tables {
        write_tables(dir, &outcome)?;
    }
    if let Some(dir) = &args.annotate {
        write_annotations(dir, &source, &outcome)?;
    }

    let (summary, summary_error) = match args.threshold {
        Some(threshold) => match outcome.summarize(
            threshold,
            args.assay.to_core(),
            analyzer.config().well_volume_ul,
        ) {
            Ok(s) => (Some(s), None),
            Err(e) => {
                tracing::error!("{}", e);
                (None, Some(e))
            }
        },
        None => {
            tracing::info!("No --threshold given; skipping classification");
            (None, None)
        }
    };

    let report = AnalyzeReport {
        config: analyzer.config(),
        panels: &outcome.panels,
        failures: outcome.failure_records(),
        histograms: outcome.histograms(),
        summary,
        summary_error: summary_error.as_ref().map(ToString::to_string),
    };
    let json = serde_json::to_string_pretty(&report)?;
    std::fs::write(&args.out, &json)?;
    tracing::info!("Report written to {}", args.out.display());

    if let Some(s) = &summary {
        print_estimate(
            s.tally.n_positive as f64,
            s.tally.n_negative as f64,
            &s.estimate,
        );
    }

    match summary_error {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}

fn write_tables(dir: &Path, outcome: &RunOutcome) -> CliResult<()> {
    std::fs::create_dir_all(dir)?;

    let circle_tables: [(&str, Vec<CircleRecord>); 2] = [
        ("circles.txt", outcome.detected_circle_records()),
        ("circles-fitted.txt", outcome.fitted_circle_records()),
    ];
    for (name, rows) in &circle_tables {
        let mut file = std::io::BufWriter::new(std::fs::File::create(dir.join(name))?);
        write_circle_table(&mut file, rows)?;
    }

    let intensity_tables: [(&str, Vec<IntensityRecord>); 2] = [
        ("intensity_table.txt", outcome.detected_intensity_records()),
        (
            "intensity_table-fitted.txt",
            outcome.fitted_intensity_records(),
        ),
    ];
    for (name, rows) in &intensity_tables {
        let mut file = std::io::BufWriter::new(std::fs::File::create(dir.join(name))?);
        write_intensity_table(&mut file, rows)?;
    }

    tracing::info!("Tables written to {}", dir.display());
    Ok(())
}

// ── annotation ─────────────────────────────────────────────────────────

const GREEN: image::Rgb<u8> = image::Rgb([0, 255, 0]);
const RED: image::Rgb<u8> = image::Rgb([255, 0, 0]);

fn mark_circles(
    canvas: &mut image::RgbImage,
    circles: &[dpcrgrid::Circle],
    ring: image::Rgb<u8>,
    center: image::Rgb<u8>,
) {
    for c in circles {
        let xy = (c.x.round() as i32, c.y.round() as i32);
        imageproc::drawing::draw_hollow_circle_mut(canvas, xy, c.radius.round() as i32, ring);
        imageproc::drawing::draw_filled_circle_mut(canvas, xy, 2, center);
    }
}

fn write_annotations(dir: &Path, source: &DirectorySource, outcome: &RunOutcome) -> CliResult<()> {
    std::fs::create_dir_all(dir)?;
    for panel in &outcome.panels {
        let image_number = panel.result.panel_index + 1;
        let gray = source.load_panel(image_number)?;
        let base = image::DynamicImage::ImageLuma8(gray).to_rgb8();

        let mut detected = base.clone();
        mark_circles(&mut detected, &panel.result.detected_circles, GREEN, RED);
        let path = dir.join(format!("{}marked_circles.png", image_number));
        detected.save(&path)?;

        let mut fitted = base;
        mark_circles(&mut fitted, &panel.result.fitted_circles, RED, GREEN);
        let path = dir.join(format!("fitted{}marked_circles.png", image_number));
        fitted.save(&path)?;
    }
    tracing::info!("Annotated images written to {}", dir.display());
    Ok(())
}
