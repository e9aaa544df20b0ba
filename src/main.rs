use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use documind_ocr::error::OcrError;
use documind_ocr::ocr::OcrProcessor;
use documind_ocr::preprocessing::{self, Mode};
use documind_ocr::report::{FailureReport, OcrReport, PreprocessReport};
use documind_ocr::{imageio, server, Config};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "documind-ocr")]
#[command(about = "Document image preprocessing and OCR")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Tesseract executable (bare names are looked up on PATH)
    #[arg(long, global = true, env = "TESSERACT_CMD", default_value = "tesseract")]
    pub tesseract_cmd: PathBuf,

    /// Default language for OCR (e.g., "eng", "deu", "fra")
    #[arg(long, global = true, env = "OCR_DEFAULT_LANGUAGE", default_value = "eng")]
    pub default_language: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Preprocess an image and write the result as JPEG
    Preprocess {
        /// Input image or PDF
        image: PathBuf,

        /// auto, standard, aggressive, minimal or receipt
        #[arg(long, default_value = "auto")]
        mode: String,

        /// Output path (default: processed_<name>.jpg next to the input)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Extract text from an image, optionally preprocessing it first
    Ocr {
        /// Input image or PDF
        image: PathBuf,

        /// OCR language (defaults to --default-language)
        #[arg(long, short)]
        language: Option<String>,

        /// Preprocess with this mode before recognition
        #[arg(long)]
        mode: Option<String>,
    },

    /// Run the HTTP server
    Serve {
        /// Host address to bind to
        #[arg(long, env = "OCR_HOST", default_value = "127.0.0.1")]
        host: String,

        /// Port to listen on
        #[arg(long, env = "OCR_PORT", default_value = "9292")]
        port: u16,

        /// Maximum upload size in bytes (default: 50MB)
        #[arg(long, env = "OCR_MAX_FILE_SIZE", default_value = "52428800")]
        max_file_size: usize,
    },
}

impl Args {
    fn config(&self) -> Config {
        let mut config = Config {
            default_language: self.default_language.clone(),
            tesseract_cmd: self.tesseract_cmd.clone(),
            ..Config::default()
        };
        if let Command::Serve {
            host,
            port,
            max_file_size,
        } = &self.command
        {
            config.host = host.clone();
            config.port = *port;
            config.max_file_size = *max_file_size;
        }
        config
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            let message = match e.kind() {
                ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                    "expected a subcommand: preprocess, ocr or serve".to_string()
                }
                _ => e
                    .to_string()
                    .lines()
                    .next()
                    .unwrap_or_default()
                    .trim_start_matches("error: ")
                    .to_string(),
            };
            let failure = FailureReport::from(&OcrError::InvalidArguments(message));
            return emit(&failure, false);
        }
    };

    // Logs go to stderr; stdout carries the JSON report
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = args.config();

    match args.command {
        Command::Preprocess {
            image,
            mode,
            output,
        } => report(run_preprocess(&image, &mode, output)),
        Command::Ocr {
            image,
            language,
            mode,
        } => {
            let language = language.unwrap_or_else(|| config.default_language.clone());
            report(run_ocr(&config, &image, &language, mode.as_deref()))
        }
        Command::Serve { .. } => {
            tracing::info!("Starting documind-ocr v{}", env!("CARGO_PKG_VERSION"));
            match server::run(config).await {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    tracing::error!("Server error: {:#}", e);
                    ExitCode::FAILURE
                }
            }
        }
    }
}

fn run_preprocess(
    image: &Path,
    mode: &str,
    output: Option<PathBuf>,
) -> Result<PreprocessReport, OcrError> {
    let mode: Mode = mode.parse()?;
    let original = imageio::load(image)?;
    let outcome = preprocessing::preprocess(original, mode)?;

    let output = output.unwrap_or_else(|| imageio::processed_path(image));
    imageio::save_jpeg(&outcome.image, &output)?;
    tracing::info!("Wrote {}", output.display());

    Ok(PreprocessReport::new(&outcome)
        .with_paths(image.display().to_string(), output.display().to_string()))
}

fn run_ocr(
    config: &Config,
    image: &Path,
    language: &str,
    mode: Option<&str>,
) -> Result<OcrReport, OcrError> {
    let mode = mode.map(str::parse::<Mode>).transpose()?;
    let mut img = imageio::load(image)?;

    let mut resolved = None;
    if let Some(mode) = mode {
        let outcome = preprocessing::preprocess(img, mode)?;
        resolved = Some(outcome.mode);
        img = outcome.image;
    }

    let summary = OcrProcessor::from_config(config).extract(&img, language)?;
    let report = OcrReport::new(summary).with_image_path(image.display().to_string());
    Ok(match resolved {
        Some(mode) => report.with_mode(mode),
        None => report,
    })
}

fn report<T: Serialize>(result: Result<T, OcrError>) -> ExitCode {
    match result {
        Ok(report) => emit(&report, true),
        Err(e) => {
            tracing::error!("{}", e);
            emit(&FailureReport::from(&e), false)
        }
    }
}

fn emit<T: Serialize>(report: &T, success: bool) -> ExitCode {
    match serde_json::to_string_pretty(report) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Failed to serialize report: {e}");
            return ExitCode::FAILURE;
        }
    }
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
