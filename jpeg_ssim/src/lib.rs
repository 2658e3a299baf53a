pub mod compressor;
pub mod config;
pub mod encoder;
pub mod error;
pub mod image_io;
pub mod quality_search;

pub use compressor::{compress_file, run_batch, BatchSummary, FileReport};
pub use config::{parse_max_dimension, parse_target, CompressConfig};
pub use encoder::{encode_jpeg_bytes, save_jpeg, JpegTrialEncoder, TrialEncoder, TrialStorage};
pub use error::{CompressError, ConfigError, EncodeError, ErrorCategory, Result, SearchError};
pub use image_io::{check_extension, load_image, output_path_for, resize_to_max_dimension};
pub use quality_search::{
    find_optimal_quality, ApproximateReason, QualitySearch, SearchConfig, SearchOutcome,
    SearchStatus, Trial,
};

pub use shared_utils::{calculate_ssim, JpegQuality, Ssim, SsimCalculator, TargetSsim};
