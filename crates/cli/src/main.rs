use std::path::PathBuf;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;

use slidescan_core::capture::domain::frame_source::FrameSource;
use slidescan_core::capture::infrastructure::image_dir_source::ImageDirSource;
use slidescan_core::detection::domain::patch_classifier::PatchClassifier;
use slidescan_core::detection::domain::window_scanner::WindowScanner;
use slidescan_core::detection::infrastructure::http_patch_classifier::HttpPatchClassifier;
use slidescan_core::detection::infrastructure::onnx_patch_classifier::OnnxPatchClassifier;
use slidescan_core::pipeline::infrastructure::threaded_pipeline_executor::ThreadedPipelineExecutor;
use slidescan_core::pipeline::pipeline_executor::FrameErrorPolicy;
use slidescan_core::pipeline::scan_frames_use_case::ScanFramesUseCase;
use slidescan_core::report::domain::detection_sink::DetectionSink;
use slidescan_core::report::infrastructure::annotated_frame_sink::AnnotatedFrameSink;
use slidescan_core::report::infrastructure::fanout_sink::FanoutSink;
use slidescan_core::report::infrastructure::json_lines_sink::JsonLinesSink;
use slidescan_core::report::infrastructure::log_sink::LogSink;
use slidescan_core::shared::constants::{DEFAULT_STRIDE, DEFAULT_THRESHOLD};
use slidescan_core::shared::frame::PixelFormat;
use slidescan_core::shared::labels::LabelSet;
use slidescan_core::shared::scan_config::ScanConfig;

/// Sliding-window object detection for images and image sequences.
#[derive(Parser)]
#[command(name = "slidescan")]
struct Cli {
    /// Input image file or directory of frames.
    input: PathBuf,

    /// Labels file, one class per line, in classifier output order.
    #[arg(long)]
    labels: PathBuf,

    /// Class to detect (must appear in the labels file).
    #[arg(long)]
    target: String,

    /// Local ONNX classifier model.
    #[arg(long)]
    model: Option<PathBuf>,

    /// Remote classifier endpoint (one HTTP POST per window).
    #[arg(long)]
    endpoint: Option<String>,

    /// Detection score threshold (0.0-1.0, inclusive).
    #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
    threshold: f32,

    /// Window step in pixels, both axes.
    #[arg(long, default_value_t = DEFAULT_STRIDE)]
    stride: u32,

    /// Window width in pixels (default: the model's input width).
    #[arg(long)]
    window_width: Option<u32>,

    /// Window height in pixels (default: the model's input height).
    #[arg(long)]
    window_height: Option<u32>,

    /// Pixel format fed to the classifier: gray or rgb
    /// (default: inferred from the model input).
    #[arg(long)]
    pixel_format: Option<String>,

    /// Expected frame width; mismatching input is rejected at startup.
    #[arg(long)]
    frame_width: Option<u32>,

    /// Expected frame height; mismatching input is rejected at startup.
    #[arg(long)]
    frame_height: Option<u32>,

    /// Write per-frame detections as JSON lines to this file.
    #[arg(long)]
    jsonl: Option<PathBuf>,

    /// Save annotated copies of frames with detections to this directory.
    #[arg(long)]
    annotate: Option<PathBuf>,

    /// Abort the run on the first frame that fails to scan.
    #[arg(long)]
    halt_on_frame_error: bool,

    /// Use the model's output as-is instead of applying softmax.
    #[arg(long)]
    raw_scores: bool,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let labels = LabelSet::from_file(&cli.labels)?;
    let backend = build_classifier(&cli)?;

    let window_width = resolve_dim("window-width", cli.window_width, backend.window_width)?;
    let window_height = resolve_dim("window-height", cli.window_height, backend.window_height)?;
    let pixel_format = resolve_format(cli.pixel_format.as_deref(), backend.pixel_format)?;

    let mut source = ImageDirSource::new(&cli.input, pixel_format);
    let metadata = source.open()?;

    let config = ScanConfig {
        frame_width: cli.frame_width.unwrap_or(metadata.width),
        frame_height: cli.frame_height.unwrap_or(metadata.height),
        window_width,
        window_height,
        stride: cli.stride,
        pixel_format,
        target_label: cli.target.clone(),
        threshold: cli.threshold,
    };
    config.check_source(&metadata)?;
    let scanner = WindowScanner::new(&config, &labels)?;

    let grid = *scanner.grid();
    log::info!(
        "Input: {} frame(s), {}x{} {}",
        metadata
            .frame_count
            .map_or("?".to_string(), |n| n.to_string()),
        metadata.width,
        metadata.height,
        metadata.pixel_format
    );
    log::info!(
        "Scanning {}x{} window at stride {}: {} windows per frame, {} labels, detecting '{}' at threshold {}",
        grid.window_width(),
        grid.window_height(),
        grid.stride(),
        grid.window_count(),
        labels.len(),
        cli.target,
        cli.threshold
    );

    let mut sinks: Vec<Box<dyn DetectionSink>> = vec![Box::new(LogSink::new(cli.target.clone()))];
    if let Some(path) = &cli.jsonl {
        sinks.push(Box::new(JsonLinesSink::create(path)?));
    }
    if let Some(dir) = &cli.annotate {
        sinks.push(Box::new(AnnotatedFrameSink::new(dir)));
    }
    let sink: Box<dyn DetectionSink> = Box::new(FanoutSink::new(sinks));

    let cancelled = Arc::new(AtomicBool::new(false));
    let handler_flag = cancelled.clone();
    ctrlc::set_handler(move || {
        eprintln!("\nStopping after current frame...");
        handler_flag.store(true, Ordering::Relaxed);
    })?;

    let progress: Box<dyn Fn(usize, Option<usize>) -> bool + Send> =
        Box::new(|current, total| {
            match total {
                Some(total) => eprint!("\rScanning frame {current}/{total}"),
                None => eprint!("\rScanning frame {current}"),
            }
            true
        });

    let policy = if cli.halt_on_frame_error {
        FrameErrorPolicy::Halt
    } else {
        FrameErrorPolicy::SkipFrame
    };

    let mut use_case = ScanFramesUseCase::new(
        Box::new(source),
        backend.classifier,
        scanner,
        sink,
        Box::new(ThreadedPipelineExecutor::new()),
        policy,
        Some(progress),
        Some(cancelled),
    );
    use_case.execute(&metadata)?;
    eprintln!();

    if let Some(path) = &cli.jsonl {
        log::info!("Detections written to {}", path.display());
    }
    if let Some(dir) = &cli.annotate {
        log::info!("Annotated frames written to {}", dir.display());
    }

    Ok(())
}

/// A classifier plus whatever geometry it fixes. A remote endpoint fixes
/// nothing; an ONNX model usually fixes all three.
struct ClassifierBackend {
    classifier: Box<dyn PatchClassifier>,
    window_width: Option<u32>,
    window_height: Option<u32>,
    pixel_format: Option<PixelFormat>,
}

fn build_classifier(cli: &Cli) -> Result<ClassifierBackend, Box<dyn std::error::Error>> {
    if let Some(model_path) = &cli.model {
        log::info!("Loading model: {}", model_path.display());
        let classifier = OnnxPatchClassifier::new(model_path)?.with_softmax(!cli.raw_scores);
        Ok(ClassifierBackend {
            window_width: classifier.input_width(),
            window_height: classifier.input_height(),
            pixel_format: classifier.pixel_format(),
            classifier: Box::new(classifier),
        })
    } else if let Some(endpoint) = &cli.endpoint {
        log::info!("Using remote classifier: {endpoint}");
        Ok(ClassifierBackend {
            classifier: Box::new(HttpPatchClassifier::new(endpoint.clone())?),
            window_width: None,
            window_height: None,
            pixel_format: None,
        })
    } else {
        Err("Either --model or --endpoint is required".into())
    }
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.input.exists() {
        return Err(format!("Input not found: {}", cli.input.display()).into());
    }
    if !cli.labels.exists() {
        return Err(format!("Labels file not found: {}", cli.labels.display()).into());
    }
    match (&cli.model, &cli.endpoint) {
        (None, None) => return Err("Either --model or --endpoint is required".into()),
        (Some(_), Some(_)) => return Err("--model and --endpoint are mutually exclusive".into()),
        _ => {}
    }
    if let Some(model) = &cli.model {
        if !model.exists() {
            return Err(format!("Model file not found: {}", model.display()).into());
        }
    }
    if cli.raw_scores && cli.model.is_none() {
        return Err("--raw-scores only applies to --model".into());
    }
    if !(0.0..=1.0).contains(&cli.threshold) {
        return Err(format!(
            "Threshold must be between 0.0 and 1.0, got {}",
            cli.threshold
        )
        .into());
    }
    if cli.stride == 0 {
        return Err("Stride must be at least 1".into());
    }
    if let Some(format) = &cli.pixel_format {
        parse_pixel_format(format)?;
    }
    Ok(())
}

fn resolve_dim(
    flag_name: &str,
    flag: Option<u32>,
    from_model: Option<u32>,
) -> Result<u32, Box<dyn std::error::Error>> {
    match (flag, from_model) {
        (Some(f), Some(m)) if f != m => {
            Err(format!("--{flag_name} {f} does not match the model input ({m})").into())
        }
        (Some(f), _) => Ok(f),
        (None, Some(m)) => Ok(m),
        (None, None) => {
            Err(format!("--{flag_name} is required (the classifier does not declare it)").into())
        }
    }
}

fn resolve_format(
    flag: Option<&str>,
    from_model: Option<PixelFormat>,
) -> Result<PixelFormat, Box<dyn std::error::Error>> {
    match flag {
        Some(s) => {
            let requested = parse_pixel_format(s)?;
            if let Some(m) = from_model {
                if requested != m {
                    return Err(format!(
                        "--pixel-format {s} does not match the model input ({m})"
                    )
                    .into());
                }
            }
            Ok(requested)
        }
        None => from_model
            .ok_or_else(|| "--pixel-format is required (the classifier does not declare it)".into()),
    }
}

fn parse_pixel_format(format: &str) -> Result<PixelFormat, Box<dyn std::error::Error>> {
    match format {
        "gray" => Ok(PixelFormat::Gray8),
        "rgb" => Ok(PixelFormat::Rgb8),
        _ => Err(format!("Pixel format must be 'gray' or 'rgb', got '{format}'").into()),
    }
}
