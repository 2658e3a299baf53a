//! Batch driver: find the right quality for every JPEG in a directory and
//! write the re-encoded result to the output directory.

use crate::config::CompressConfig;
use crate::encoder::{save_jpeg, JpegTrialEncoder};
use crate::error::{CompressError, EncodeError, ErrorCategory, Result};
use crate::image_io::{check_extension, load_image, output_path_for, resize_to_max_dimension};
use crate::quality_search::QualitySearch;
use anyhow::Context;
use image::{GenericImageView, ImageFormat};
use rayon::prelude::*;
use serde::Serialize;
use serde_json::json;
use shared_utils::common_utils::file_size;
use shared_utils::{
    calculate_psnr, collect_files, ssim_quality_description, BatchResult, JpegQuality, Ssim,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tracing::{debug, info, warn};

const SCRATCH_PREFIX: &str = "jpeg-ssim-";

#[derive(Debug, Clone)]
pub struct FileReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub quality: JpegQuality,
    pub score: Ssim,
    /// PSNR of the written file against the (resized) source; infinite when identical.
    pub psnr: Option<f64>,
    pub iterations: usize,
    pub converged: bool,
    pub width: u32,
    pub height: u32,
    pub input_bytes: u64,
    pub output_bytes: u64,
}

#[derive(Debug, Clone)]
pub struct BatchSummary {
    pub result: BatchResult,
    pub reports: Vec<FileReport>,
    pub input_bytes: u64,
    pub output_bytes: u64,
    pub duration: Duration,
}

impl BatchSummary {
    pub fn completion_line(&self) -> String {
        shared_utils::completion_line(&self.result)
    }

    pub fn print_report(&self) {
        shared_utils::print_summary_report(
            &self.result,
            self.duration,
            self.input_bytes,
            self.output_bytes,
            "JPEG SSIM Compression",
        );
    }

    pub fn to_json(&self) -> serde_json::Value {
        let files: Vec<JsonFileEntry> = self.reports.iter().map(JsonFileEntry::from).collect();
        let errors: Vec<_> = self
            .result
            .errors
            .iter()
            .map(|(path, error)| json!({ "path": path.display().to_string(), "error": error }))
            .collect();
        json!({
            "total": self.result.total,
            "succeeded": self.result.succeeded,
            "failed": self.result.failed,
            "skipped": self.result.skipped,
            "input_bytes": self.input_bytes,
            "output_bytes": self.output_bytes,
            "duration_secs": self.duration.as_secs_f64(),
            "files": files,
            "errors": errors,
        })
    }
}

#[derive(Serialize)]
struct JsonFileEntry {
    input: String,
    output: String,
    quality: u8,
    ssim: f64,
    ssim_rating: &'static str,
    psnr: Option<f64>,
    iterations: usize,
    converged: bool,
    width: u32,
    height: u32,
    input_bytes: u64,
    output_bytes: u64,
}

impl From<&FileReport> for JsonFileEntry {
    fn from(report: &FileReport) -> Self {
        Self {
            input: report.input.display().to_string(),
            output: report.output.display().to_string(),
            quality: report.quality.value(),
            ssim: report.score.value(),
            ssim_rating: ssim_quality_description(report.score.value()),
            psnr: report.psnr,
            iterations: report.iterations,
            converged: report.converged,
            width: report.width,
            height: report.height,
            input_bytes: report.input_bytes,
            output_bytes: report.output_bytes,
        }
    }
}

/// Unique per-image scratch directory, removed on drop.
fn scratch_dir(root: &Path) -> Result<TempDir> {
    let io_err = |source| CompressError::Io {
        path: root.to_path_buf(),
        source,
    };
    fs::create_dir_all(root).map_err(io_err)?;
    tempfile::Builder::new()
        .prefix(SCRATCH_PREFIX)
        .tempdir_in(root)
        .map_err(io_err)
}

/// Compresses one file into `config.output_dir`.
pub fn compress_file(path: &Path, config: &CompressConfig) -> Result<FileReport> {
    check_extension(path)?;

    let input_bytes = file_size(path);
    let mut image = load_image(path)?;
    if let Some(max) = config.max_dimension {
        image = resize_to_max_dimension(image, max);
    }
    let (width, height) = image.dimensions();

    let search = QualitySearch::new(config.search.clone())?;
    let scratch = config.scratch_root.as_deref().map(scratch_dir).transpose()?;
    let encoder = match &scratch {
        Some(dir) => JpegTrialEncoder::in_directory(dir.path()),
        None => JpegTrialEncoder::in_memory(),
    };

    let outcome = search.find_optimal_quality(&image, config.target, &encoder)?;
    let quality = outcome.jpeg_quality().map_err(EncodeError::from)?;

    let output = output_path_for(path, &config.output_dir);
    let bytes = save_jpeg(&image, quality, &output)?;
    let output_bytes = bytes.len() as u64;
    let written =
        image::load_from_memory_with_format(&bytes, ImageFormat::Jpeg).map_err(EncodeError::from)?;
    let psnr = calculate_psnr(&image, &written);

    info!(
        path = %path.display(),
        quality = quality.value(),
        ssim = outcome.score.value(),
        rating = ssim_quality_description(outcome.score.value()),
        psnr = psnr.unwrap_or(f64::NAN),
        iterations = outcome.iterations,
        input_bytes,
        output_bytes,
        "compressed"
    );

    Ok(FileReport {
        input: path.to_path_buf(),
        output,
        quality,
        score: outcome.score,
        psnr,
        iterations: outcome.iterations,
        converged: outcome.is_converged(),
        width,
        height,
        input_bytes,
        output_bytes,
    })
}

/// Processes every file in `config.input_dir`. Per-file failures are
/// recorded in the summary and never abort the batch.
pub fn run_batch(config: &CompressConfig) -> anyhow::Result<BatchSummary> {
    let start = Instant::now();

    fs::create_dir_all(&config.output_dir).with_context(|| {
        format!("Failed to create output directory {}", config.output_dir.display())
    })?;

    let files = collect_files(&config.input_dir, config.recursive);
    debug!(count = files.len(), input = %config.input_dir.display(), "collected files");

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.jobs)
        .build()
        .context("Failed to create thread pool")?;

    let outcomes: Vec<(PathBuf, Result<FileReport>)> = pool.install(|| {
        files
            .par_iter()
            .map(|path| (path.clone(), compress_file(path, config)))
            .collect()
    });

    let mut result = BatchResult::new();
    let mut reports = Vec::new();
    let mut input_bytes = 0;
    let mut output_bytes = 0;

    for (path, outcome) in outcomes {
        match outcome {
            Ok(report) => {
                result.success();
                input_bytes += report.input_bytes;
                output_bytes += report.output_bytes;
                reports.push(report);
            }
            Err(e) => match e.category() {
                ErrorCategory::Skip => {
                    debug!(path = %path.display(), "skipped: {}", e);
                    result.skip();
                }
                ErrorCategory::Fail => {
                    warn!(path = %path.display(), "failed: {}", e);
                    result.fail(path, e.to_string());
                }
            },
        }
    }

    Ok(BatchSummary {
        result,
        reports,
        input_bytes,
        output_bytes,
        duration: start.elapsed(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::encode_jpeg_bytes;
    use image::{DynamicImage, RgbImage};
    use shared_utils::TargetSsim;
    use tempfile::TempDir;

    fn photo(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            let mut h = x.wrapping_mul(73_856_093) ^ y.wrapping_mul(19_349_663);
            h ^= h >> 13;
            h = h.wrapping_mul(0x5bd1_e995);
            h ^= h >> 15;
            let grain = (h % 81) as f64 - 40.0;
            let base = 128.0 + 60.0 * (x as f64 * 0.09).sin() * (y as f64 * 0.06).cos();
            let v = (base + grain).clamp(0.0, 255.0) as u8;
            image::Rgb([v, v.saturating_sub(20), v.saturating_add(12)])
        }))
    }

    fn write_jpeg(path: &Path, image: &DynamicImage) {
        let bytes = encode_jpeg_bytes(image, JpegQuality::new(95).unwrap()).unwrap();
        fs::write(path, bytes).unwrap();
    }

    fn config(input: &Path, output: &Path) -> CompressConfig {
        CompressConfig::new(input, output, TargetSsim::default()).with_jobs(2)
    }

    #[test]
    fn test_compress_file_writes_output() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let path = input.path().join("photo.jpg");
        write_jpeg(&path, &photo(96, 64));

        let report = compress_file(&path, &config(input.path(), output.path())).unwrap();

        assert_eq!(report.output, output.path().join("photo.jpg"));
        assert!(report.output.exists());
        assert_eq!(report.output_bytes, fs::metadata(&report.output).unwrap().len());
        assert!(report.quality.value() >= 1 && report.quality.value() <= 100);
        assert_eq!((report.width, report.height), (96, 64));
        assert!(report.psnr.unwrap() > 20.0);
    }

    #[test]
    fn test_psnr_is_measured_against_the_file_on_disk() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let path = input.path().join("photo.jpg");
        let original = photo(96, 64);
        write_jpeg(&path, &original);

        let report = compress_file(&path, &config(input.path(), output.path())).unwrap();

        let reloaded = load_image(&path).unwrap();
        let on_disk = image::open(&report.output).unwrap();
        let expected = calculate_psnr(&reloaded, &on_disk).unwrap();
        assert!((report.psnr.unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_compress_file_resizes_before_search() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let path = input.path().join("wide.jpeg");
        write_jpeg(&path, &photo(160, 80));

        let cfg = config(input.path(), output.path()).with_max_dimension(Some(80));
        let report = compress_file(&path, &cfg).unwrap();

        assert_eq!((report.width, report.height), (80, 40));
        let written = image::open(&report.output).unwrap();
        assert_eq!(written.dimensions(), (80, 40));
    }

    #[test]
    fn test_compress_file_rejects_other_extensions() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let path = input.path().join("notes.txt");
        fs::write(&path, "hello").unwrap();

        let err = compress_file(&path, &config(input.path(), output.path())).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Skip);
    }

    #[test]
    fn test_scratch_directories_are_cleaned_up() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let scratch = TempDir::new().unwrap();
        let path = input.path().join("photo.jpg");
        write_jpeg(&path, &photo(64, 64));

        let cfg = config(input.path(), output.path()).with_scratch_root(scratch.path());
        compress_file(&path, &cfg).unwrap();

        assert_eq!(fs::read_dir(scratch.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_scratch_matches_in_memory_result() {
        let input = TempDir::new().unwrap();
        let out_a = TempDir::new().unwrap();
        let out_b = TempDir::new().unwrap();
        let scratch = TempDir::new().unwrap();
        let path = input.path().join("photo.jpg");
        write_jpeg(&path, &photo(64, 48));

        let mem = compress_file(&path, &config(input.path(), out_a.path())).unwrap();
        let disk = compress_file(
            &path,
            &config(input.path(), out_b.path()).with_scratch_root(scratch.path()),
        )
        .unwrap();
        assert_eq!(mem.quality, disk.quality);
        assert_eq!(fs::read(&mem.output).unwrap(), fs::read(&disk.output).unwrap());
    }

    #[test]
    fn test_run_batch_counts_outcomes() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        write_jpeg(&input.path().join("good.jpg"), &photo(64, 64));
        write_jpeg(&input.path().join("tiny.jpg"), &photo(10, 10));
        fs::write(input.path().join("broken.jpg"), b"not a jpeg").unwrap();
        fs::write(input.path().join("readme.txt"), b"skip me").unwrap();

        let out_dir = output.path().join("results");
        let summary = run_batch(&config(input.path(), &out_dir)).unwrap();

        assert_eq!(summary.result.total, 4);
        assert_eq!(summary.result.succeeded, 1);
        assert_eq!(summary.result.failed, 2);
        assert_eq!(summary.result.skipped, 1);
        assert_eq!(
            summary.completion_line(),
            "Processing completed. Successful: 1, failed: 2."
        );
        assert!(out_dir.join("good.jpg").exists());
        assert!(!out_dir.join("tiny.jpg").exists());
        assert_eq!(summary.reports.len(), 1);
        assert_eq!(summary.output_bytes, summary.reports[0].output_bytes);

        let doc = summary.to_json();
        assert_eq!(doc["succeeded"], 1);
        assert_eq!(doc["skipped"], 1);
        assert_eq!(doc["files"].as_array().unwrap().len(), 1);
        assert_eq!(doc["errors"].as_array().unwrap().len(), 2);
        assert!(doc["files"][0]["quality"].as_u64().unwrap() <= 100);
    }

    #[test]
    fn test_run_batch_recursive() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let nested = input.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        write_jpeg(&nested.join("deep.jpg"), &photo(48, 48));

        let flat = run_batch(&config(input.path(), output.path())).unwrap();
        assert_eq!(flat.result.total, 0);

        let deep = run_batch(&config(input.path(), output.path()).with_recursive(true)).unwrap();
        assert_eq!(deep.result.succeeded, 1);
        assert!(output.path().join("deep.jpg").exists());
    }

    #[test]
    fn test_run_batch_empty_directory() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let summary = run_batch(&config(input.path(), output.path())).unwrap();
        assert_eq!(summary.result.total, 0);
        assert_eq!(
            summary.completion_line(),
            "Processing completed. Successful: 0, failed: 0."
        );
    }
}
