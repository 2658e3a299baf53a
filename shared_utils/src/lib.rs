//! Shared Utilities for the jpeg-ssim tools
//!
//! - Windowed SSIM / PSNR image metrics
//! - Type-safe SSIM, target SSIM, JPEG quality and search budget
//! - Batch file collection and outcome bookkeeping
//! - Summary reporting
//! - tracing-based logging setup
//! - Safety checks (protected directory detection)

pub mod batch;
pub mod common_utils;
pub mod image_metrics;
pub mod logging;
pub mod report;
pub mod safety;
pub mod types;

pub use batch::{collect_files, BatchResult, JPEG_EXTENSIONS};
pub use image_metrics::{
    calculate_psnr, calculate_ssim, ssim_quality_description, SimilarityError, SsimCalculator,
    DEFAULT_SSIM_WINDOW,
};
pub use report::{completion_line, format_bytes, format_duration, print_summary_report};
pub use safety::check_dangerous_directory;
pub use types::{
    BudgetExhausted, JpegQuality, QualityError, SearchBudget, Ssim, SsimError, TargetSsim,
};
