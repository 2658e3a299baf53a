use anyhow::Context;
use clap::{Parser, ValueEnum};
use jpeg_ssim::quality_search::{DEFAULT_TOLERANCE, SearchConfig};
use jpeg_ssim::{parse_max_dimension, parse_target, run_batch, CompressConfig, ConfigError};
use shared_utils::image_metrics::DEFAULT_SSIM_WINDOW;
use shared_utils::logging::{init_logging, level_for_verbosity, LogConfig};
use shared_utils::types::budget::NORMAL_MAX_ITERATIONS;
use shared_utils::types::ssim::DEFAULT_TARGET_SSIM;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "jpeg-ssim")]
#[command(
    version,
    about = "Re-encode JPEGs at the lowest quality that keeps a target SSIM",
    long_about = None
)]
struct Cli {
    #[arg(value_name = "INPUT_DIR")]
    input_dir: PathBuf,

    #[arg(value_name = "OUTPUT_DIR")]
    output_dir: PathBuf,

    /// Target SSIM, strictly between 0 and 1
    #[arg(value_name = "SSIM_FACTOR", default_value_t = DEFAULT_TARGET_SSIM, allow_negative_numbers = true)]
    ssim_factor: f64,

    /// Downscale so the longer side is at most this many pixels
    #[arg(short = 'm', long, allow_negative_numbers = true)]
    max_dimension: Option<i64>,

    /// Keep trial encodes in per-image directories under this path instead of memory
    #[arg(long, value_name = "DIR")]
    scratch_dir: Option<PathBuf>,

    #[arg(short, long)]
    recursive: bool,

    /// Parallel images (0 = one per CPU)
    #[arg(short, long, default_value_t = 0)]
    jobs: usize,

    #[arg(long, default_value_t = DEFAULT_TOLERANCE)]
    tolerance: f64,

    #[arg(long, default_value_t = NORMAL_MAX_ITERATIONS)]
    max_iterations: u32,

    /// SSIM window edge in pixels
    #[arg(long, default_value_t = DEFAULT_SSIM_WINDOW)]
    window: u32,

    #[arg(short, long)]
    verbose: bool,

    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value = "human")]
    output_format: OutputFormat,
}

#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
enum OutputFormat {
    Human,
    Json,
}

impl Cli {
    fn compress_config(&self) -> Result<CompressConfig, ConfigError> {
        let target = parse_target(self.ssim_factor)?;
        let max_dimension = self.max_dimension.map(parse_max_dimension).transpose()?;
        let search = SearchConfig::default()
            .with_tolerance(self.tolerance)
            .with_max_iterations(self.max_iterations)
            .with_window(self.window);

        let mut config = CompressConfig::new(&self.input_dir, &self.output_dir, target)
            .with_max_dimension(max_dimension)
            .with_recursive(self.recursive)
            .with_jobs(self.jobs)
            .with_search(search);
        if let Some(dir) = &self.scratch_dir {
            config = config.with_scratch_root(dir);
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let mut log_config = LogConfig::new().with_level(level_for_verbosity(cli.verbose));
    if let Some(path) = &cli.log_file {
        log_config = log_config.with_log_file(path);
    }
    init_logging("jpeg_ssim", log_config)?;

    let config = match cli.compress_config() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            eprintln!("{}", e);
            return Ok(ExitCode::FAILURE);
        }
    };

    info!(
        input = %config.input_dir.display(),
        output = %config.output_dir.display(),
        target = config.target.value(),
        "starting"
    );

    let summary = run_batch(&config).context("Batch processing failed")?;

    match cli.output_format {
        OutputFormat::Human => {
            summary.print_report();
            println!("{}", summary.completion_line());
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&summary.to_json())?);
        }
    }

    Ok(ExitCode::SUCCESS)
}
