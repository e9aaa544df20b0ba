use crate::config::Config;
use crate::error::OcrError;
use crate::imageio;
use crate::ocr::OcrProcessor;
use crate::preprocessing::{self, Mode};
use crate::report::{OcrReport, PreprocessReport};
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, State},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub ocr: Arc<OcrProcessor>,
    pub config: Arc<Config>,
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub engine: String,
}

/// Fields accepted by the upload endpoints
struct Upload {
    data: Bytes,
    mode: Option<String>,
    language: Option<String>,
}

/// Build the HTTP router
pub fn router(state: AppState) -> Router {
    let max_file_size = state.config.max_file_size;

    Router::new()
        .route("/preprocess", post(handle_preprocess))
        .route("/ocr", post(handle_ocr))
        .route("/health", get(handle_health))
        .layer(DefaultBodyLimit::max(max_file_size))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the HTTP server
pub async fn run(config: Config) -> anyhow::Result<()> {
    let ocr = OcrProcessor::from_config(&config);
    let addr = format!("{}:{}", config.host, config.port);

    let state = AppState {
        ocr: Arc::new(ocr),
        config: Arc::new(config),
    };

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, router(state)).await?;

    Ok(())
}

/// Handle preprocessing requests
async fn handle_preprocess(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<PreprocessReport>, OcrError> {
    let upload = read_upload(multipart, state.config.max_file_size).await?;
    let mode = parse_mode(upload.mode.as_deref())?;

    let outcome = tokio::task::spawn_blocking(move || {
        let image = imageio::load_from_memory(&upload.data)?;
        preprocessing::preprocess(image, mode)
    })
    .await
    .map_err(|e| OcrError::Internal(format!("Preprocessing task failed: {}", e)))??;

    Ok(Json(PreprocessReport::new(&outcome)))
}

/// Handle OCR requests, optionally preprocessing first
async fn handle_ocr(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<OcrReport>, OcrError> {
    let start = Instant::now();

    let upload = read_upload(multipart, state.config.max_file_size).await?;
    let mode = upload.mode.as_deref().map(str::parse::<Mode>).transpose()?;
    let language = upload
        .language
        .filter(|l| !l.trim().is_empty())
        .unwrap_or_else(|| state.config.default_language.clone());

    let ocr = Arc::clone(&state.ocr);
    let report = tokio::task::spawn_blocking(move || -> Result<OcrReport, OcrError> {
        let mut image = imageio::load_from_memory(&upload.data)?;
        let mut resolved = None;
        if let Some(mode) = mode {
            let outcome = preprocessing::preprocess(image, mode)?;
            resolved = Some(outcome.mode);
            image = outcome.image;
        }

        let report = OcrReport::new(ocr.extract(&image, &language)?);
        Ok(match resolved {
            Some(mode) => report.with_mode(mode),
            None => report,
        })
    })
    .await
    .map_err(|e| OcrError::Internal(format!("OCR task failed: {}", e)))??;

    tracing::info!(
        "OCR request completed in {}ms, {} words",
        start.elapsed().as_millis(),
        report.metadata.word_count
    );

    Ok(Json(report))
}

/// Handle health check requests
async fn handle_health(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        engine: state.ocr.engine_name().to_string(),
    })
}

fn parse_mode(mode: Option<&str>) -> Result<Mode, OcrError> {
    mode.map(str::parse).transpose().map(Option::unwrap_or_default)
}

async fn read_upload(mut multipart: Multipart, max_file_size: usize) -> Result<Upload, OcrError> {
    let mut file_data: Option<Bytes> = None;
    let mut mode: Option<String> = None;
    let mut language: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| OcrError::InvalidArguments(format!("Failed to parse multipart: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "file" => {
                file_data = Some(field.bytes().await.map_err(|e| {
                    OcrError::InvalidArguments(format!("Failed to read file data: {}", e))
                })?);
            }
            "mode" => {
                mode = Some(field.text().await.map_err(|e| {
                    OcrError::InvalidArguments(format!("Invalid mode field: {}", e))
                })?);
            }
            "language" => {
                language = Some(field.text().await.map_err(|e| {
                    OcrError::InvalidArguments(format!("Invalid language field: {}", e))
                })?);
            }
            _ => {
                // Ignore unknown fields
            }
        }
    }

    let data = file_data
        .ok_or_else(|| OcrError::InvalidArguments("Missing file in request".to_string()))?;

    if data.len() > max_file_size {
        return Err(OcrError::InvalidArguments(format!(
            "Image too large: {} bytes (max: {} bytes)",
            data.len(),
            max_file_size
        )));
    }

    Ok(Upload {
        data,
        mode,
        language,
    })
}
