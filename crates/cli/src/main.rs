use std::path::{Path, PathBuf};
use std::process;

use clap::{Args, Parser, Subcommand};

use facetrain_core::detection::domain::face_detector::FaceDetector;
use facetrain_core::detection::infrastructure::cascade_face_detector::CascadeFaceDetector;
use facetrain_core::detection::infrastructure::cascade_resolver;
use facetrain_core::imaging::infrastructure::image_file_reader::ImageFileReader;
use facetrain_core::imaging::infrastructure::image_file_writer::ImageFileWriter;
use facetrain_core::pipeline::enroll_faces_use_case::EnrollFacesUseCase;
use facetrain_core::pipeline::pipeline_logger::StdoutPipelineLogger;
use facetrain_core::pipeline::recognize_faces_use_case::RecognizeFacesUseCase;
use facetrain_core::pipeline::training_pipeline::TrainingPipeline;
use facetrain_core::recognition::infrastructure::lbph_recognizer::LbphRecognizer;
use facetrain_core::shared::config::TrainerConfig;
use facetrain_core::shared::constants::{CASCADE_URL, IMAGE_EXTENSIONS, MAX_ENROLL_IMAGES};
use facetrain_core::training::label_registry::LabelRegistry;

/// Train and run an LBPH face recognizer over a directory of labeled images.
#[derive(Parser)]
#[command(name = "facetrain")]
struct Cli {
    /// JSON config file (default: the platform config directory).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Haar cascade XML; downloaded into the cache if missing.
    #[arg(long, global = true)]
    cascade: Option<PathBuf>,

    /// Pyramid scale step for face detection (> 1.0).
    #[arg(long, global = true)]
    scale_factor: Option<f64>,

    /// Neighbouring raw detections required to keep a face.
    #[arg(long, global = true)]
    min_neighbors: Option<u32>,

    /// Root directory with one subdirectory of images per subject.
    #[arg(long, global = true)]
    training_images_dir: Option<PathBuf>,

    /// Directory for labels.pickle and trainer.yml.
    #[arg(long, global = true)]
    model_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Detect faces in the training images and write the trained model.
    Train(TrainArgs),
    /// Recognize faces in an image using a trained model.
    Recognize(RecognizeArgs),
    /// Copy images containing a face into a subject's training directory.
    Enroll(EnrollArgs),
    /// Write the effective configuration (defaults plus flags) to the config file.
    InitConfig(InitConfigArgs),
}

#[derive(Args)]
struct TrainArgs {
    /// Request removal of the training images after a successful run.
    #[arg(long)]
    delete_trained_images: bool,
}

#[derive(Args)]
struct RecognizeArgs {
    /// Image to analyse.
    input: PathBuf,

    /// Write a copy of the input with each face boxed.
    #[arg(long)]
    annotate: Option<PathBuf>,
}

#[derive(Args)]
struct EnrollArgs {
    /// Subject name; normalized to the directory name used for training.
    #[arg(long)]
    label: String,

    /// Source images.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Maximum images kept per subject.
    #[arg(long, default_value_t = MAX_ENROLL_IMAGES)]
    max_images: usize,
}

#[derive(Args)]
struct InitConfigArgs {
    /// Overwrite an existing config file.
    #[arg(long)]
    force: bool,
}

fn main() {
    env_logger::init();

    match run() {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}

fn run() -> Result<i32, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match cli.command {
        Command::Train(args) => run_train(&config, &args),
        Command::Recognize(args) => run_recognize(&config, &args).map(|_| 0),
        Command::Enroll(args) => run_enroll(&config, &args).map(|_| 0),
        Command::InitConfig(args) => {
            run_init_config(&config, cli.config.as_deref(), &args).map(|_| 0)
        }
    }
}

fn load_config(cli: &Cli) -> Result<TrainerConfig, Box<dyn std::error::Error>> {
    let mut config = match (&cli.command, cli.config.as_deref()) {
        (Command::InitConfig(_), Some(path)) if !path.exists() => TrainerConfig::default(),
        (_, explicit) => TrainerConfig::load_or_default(explicit)?,
    };
    if let Some(path) = &cli.cascade {
        config.cascade_path = path.clone();
    }
    if let Some(scale) = cli.scale_factor {
        config.detection.scale_factor = scale;
    }
    if let Some(n) = cli.min_neighbors {
        config.detection.min_neighbors = n;
    }
    if let Some(dir) = &cli.training_images_dir {
        config.training_images_dir = dir.clone();
    }
    if let Some(dir) = &cli.model_dir {
        config.model_dir = dir.clone();
    }
    config.validate()?;
    Ok(config)
}

fn run_train(config: &TrainerConfig, args: &TrainArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let mut pipeline = TrainingPipeline::new(
        Box::new(ImageFileReader::new()),
        build_detector(config)?,
        Box::new(LbphRecognizer::new(config.lbph.clone())?),
        Box::new(StdoutPipelineLogger::default()),
        config.training_images_dir.clone(),
        config.model_dir.clone(),
    );

    let Some(artifacts) = pipeline.run()? else {
        log::warn!(
            "No faces found in {}; nothing was trained",
            config.training_images_dir.display()
        );
        return Ok(1);
    };
    log::info!(
        "Model written to {} (labels: {})",
        artifacts.model_path.display(),
        artifacts.labels_path.display()
    );

    if args.delete_trained_images {
        pipeline.delete_trained_images();
    }
    Ok(0)
}

fn run_recognize(
    config: &TrainerConfig,
    args: &RecognizeArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    validate_image(&args.input)?;
    let registry = LabelRegistry::load(&config.labels_path())?;
    let recognizer = LbphRecognizer::load(&config.model_path())?;

    let mut use_case = RecognizeFacesUseCase::new(
        Box::new(ImageFileReader::new()),
        build_detector(config)?,
        Box::new(recognizer),
        Box::new(ImageFileWriter::new()),
        registry,
    );
    let results = use_case.execute(&args.input, args.annotate.as_deref())?;

    if results.is_empty() {
        println!("No faces found");
    }
    for r in &results {
        println!(
            "{},{},{},{}\t{}\t{:.2}",
            r.region.x,
            r.region.y,
            r.region.width,
            r.region.height,
            r.name.as_deref().unwrap_or("unknown"),
            r.prediction.distance
        );
    }
    if let Some(path) = &args.annotate {
        log::info!("Annotated image written to {}", path.display());
    }
    Ok(())
}

fn run_enroll(config: &TrainerConfig, args: &EnrollArgs) -> Result<(), Box<dyn std::error::Error>> {
    for input in &args.inputs {
        validate_image(input)?;
    }
    let mut use_case = EnrollFacesUseCase::new(
        Box::new(ImageFileReader::new()),
        build_detector(config)?,
        Box::new(ImageFileWriter::new()),
        Box::new(StdoutPipelineLogger::default()),
        config.training_images_dir.clone(),
        args.max_images,
    );
    let report = use_case.execute(&args.inputs, &args.label)?;
    for path in &report.saved {
        println!("{}", path.display());
    }
    if !report.skipped.is_empty() {
        log::warn!("{} images had no detectable face", report.skipped.len());
    }
    Ok(())
}

fn run_init_config(
    config: &TrainerConfig,
    explicit: Option<&Path>,
    args: &InitConfigArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => TrainerConfig::default_path().ok_or("could not determine config directory")?,
    };
    if path.exists() && !args.force {
        return Err(format!("{} already exists; pass --force to overwrite", path.display()).into());
    }
    config.save(&path)?;
    println!("{}", path.display());
    Ok(())
}

fn build_detector(
    config: &TrainerConfig,
) -> Result<Box<dyn FaceDetector>, Box<dyn std::error::Error>> {
    let cascade_path = cascade_resolver::resolve(
        &config.cascade_path,
        CASCADE_URL,
        Some(Box::new(download_progress)),
    )?;
    log::info!("Using cascade {}", cascade_path.display());
    Ok(Box::new(CascadeFaceDetector::from_file(
        &cascade_path,
        config.detection,
    )?))
}

fn validate_image(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if !path.exists() {
        return Err(format!("Input file not found: {}", path.display()).into());
    }
    if !is_image(path) {
        return Err(format!("Not a supported image: {}", path.display()).into());
    }
    Ok(())
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading face cascade... {pct}%");
    } else {
        eprint!("\rDownloading face cascade... {downloaded} bytes");
    }
}
