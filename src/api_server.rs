// Axum API Server Module
//
// Purpose: JSON boundary around the diagnosis engine and the ailment catalogue.
// Request validation lives here; the engine itself never rejects a request.
// Images only arrive as multipart uploads, are written under the configured
// upload directory and removed once the diagnosis is done.

#[cfg(feature = "api")]
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, FromRequest, Multipart, Path, Query, Request, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};

#[cfg(feature = "api")]
use tower_http::{cors::CorsLayer, trace::TraceLayer};

#[cfg(feature = "api")]
use serde::Deserialize;

#[cfg(feature = "api")]
use std::path::PathBuf;

#[cfg(feature = "api")]
use std::sync::atomic::{AtomicU64, Ordering};

#[cfg(feature = "api")]
use std::sync::Arc;

#[cfg(feature = "api")]
use crate::config::{Config, DEFAULT_UPLOAD_DIR};

#[cfg(feature = "api")]
use crate::engine::DiagnosisEngine;

#[cfg(feature = "api")]
use crate::error::{DiagnosisError, KnowledgeBaseError};

#[cfg(feature = "api")]
use crate::knowledge_base::{InMemoryKnowledgeBase, KnowledgeBase};

#[cfg(feature = "api")]
use crate::types::{AilmentId, DiagnosisRequest};

#[cfg(feature = "api")]
use crate::vision::{classifier_from_config, VisionClassifier};

/// Multipart field carrying the leaf photo
#[cfg(feature = "api")]
const IMAGE_FIELD: &str = "image";

#[cfg(feature = "api")]
const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

#[cfg(feature = "api")]
static UPLOAD_SEQUENCE: AtomicU64 = AtomicU64::new(0);

// ============================================================================
// Application State
// ============================================================================

#[cfg(feature = "api")]
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<DiagnosisEngine>,
    pub knowledge_base: Arc<dyn KnowledgeBase>,
    pub upload_dir: PathBuf,
}

#[cfg(feature = "api")]
impl AppState {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        tracing::info!("Loading knowledge base from {}...", config.data_dir);
        let knowledge_base: Arc<dyn KnowledgeBase> =
            Arc::new(InMemoryKnowledgeBase::load(&config.data_dir)?);

        tracing::info!("Initializing vision classifier...");
        let vision = classifier_from_config(&config.vision);

        let engine = DiagnosisEngine::new(Arc::clone(&knowledge_base))
            .with_vision(vision)
            .with_vision_deadline(config.vision.timeout);

        Ok(Self {
            engine: Arc::new(engine),
            knowledge_base,
            upload_dir: PathBuf::from(&config.upload_dir),
        })
    }

    /// State over an existing knowledge base and classifier
    pub fn with_parts(knowledge_base: Arc<dyn KnowledgeBase>, vision: Arc<dyn VisionClassifier>) -> Self {
        let engine = DiagnosisEngine::new(Arc::clone(&knowledge_base)).with_vision(vision);
        Self {
            engine: Arc::new(engine),
            knowledge_base,
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
        }
    }

    pub fn with_upload_dir(mut self, upload_dir: impl Into<PathBuf>) -> Self {
        self.upload_dir = upload_dir.into();
        self
    }
}

// ============================================================================
// Router
// ============================================================================

#[cfg(feature = "api")]
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))

        // Diagnosis
        .route("/api/diseases/detect", post(detect_disease))

        // Ailment catalogue
        .route("/api/diseases/list", get(list_diseases))
        .route("/api/diseases/:id", get(get_disease))

        // Middleware (applied in reverse order)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============================================================================
// Endpoint Handlers
// ============================================================================

#[cfg(feature = "api")]
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Accepts a JSON body (no image) or a multipart form with an `image` file
#[cfg(feature = "api")]
async fn detect_disease(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<serde_json::Value>, AppError> {
    let is_multipart = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|content_type| content_type.starts_with("multipart/form-data"));

    let diagnosis_request = if is_multipart {
        let multipart = Multipart::from_request(request, &state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        read_upload_form(multipart, &state.upload_dir).await?
    } else {
        let Json(body) = Json::<DiagnosisRequest>::from_request(request, &state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        body
    };

    if diagnosis_request.crop_name_input().is_none() && diagnosis_request.image_path.is_none() {
        return Err(AppError::BadRequest("cropName or an image is required".to_string()));
    }

    let outcome = state.engine.diagnose(&diagnosis_request).await;

    if let Some(upload) = &diagnosis_request.image_path {
        discard_upload(upload).await;
    }
    let result = outcome?;

    Ok(Json(serde_json::json!({
        "success": true,
        "data": result
    })))
}

#[cfg(feature = "api")]
#[derive(Debug, Deserialize)]
struct ListParams {
    crop: Option<String>,
    search: Option<String>,
}

#[cfg(feature = "api")]
async fn list_diseases(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<serde_json::Value>, AppError> {
    let non_blank = |value: Option<String>| value.filter(|v| !v.trim().is_empty());

    // crop takes precedence over search
    let entries = match (non_blank(params.crop), non_blank(params.search)) {
        (Some(crop), _) => state.knowledge_base.ailments_by_crop_name(&crop)?,
        (None, Some(query)) => state.knowledge_base.search_ailments(&query)?,
        (None, None) => state.knowledge_base.all_ailments()?,
    };

    Ok(Json(serde_json::json!({
        "success": true,
        "count": entries.len(),
        "data": entries
    })))
}

#[cfg(feature = "api")]
async fn get_disease(
    State(state): State<AppState>,
    Path(id): Path<AilmentId>,
) -> Result<Json<serde_json::Value>, AppError> {
    let entry = state
        .knowledge_base
        .ailment(id)?
        .ok_or_else(|| AppError::NotFound(format!("Disease {} not found", id)))?;

    Ok(Json(serde_json::json!({
        "success": true,
        "data": entry
    })))
}

// ============================================================================
// Uploads
// ============================================================================

/// Text fields become the request; the image is saved only once they parse
#[cfg(feature = "api")]
async fn read_upload_form(
    mut multipart: Multipart,
    upload_dir: &std::path::Path,
) -> Result<DiagnosisRequest, AppError> {
    let mut fields = serde_json::Map::new();
    let mut image: Option<(&'static str, Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == IMAGE_FIELD {
            let extension = image_extension(field.file_name()).ok_or_else(|| {
                AppError::BadRequest("image must be a .jpg, .png, .gif, .webp or .bmp file".to_string())
            })?;
            let bytes = field.bytes().await.map_err(|e| AppError::BadRequest(e.body_text()))?;
            if !bytes.is_empty() {
                image = Some((extension, bytes));
            }
            continue;
        }

        let value = field.text().await.map_err(|e| AppError::BadRequest(e.body_text()))?;
        if !value.trim().is_empty() {
            fields.insert(name, serde_json::Value::String(value));
        }
    }

    let mut request: DiagnosisRequest = serde_json::from_value(serde_json::Value::Object(fields))
        .map_err(|e| AppError::BadRequest(format!("Invalid form field: {}", e)))?;

    if let Some((extension, bytes)) = image {
        request.image_path = Some(save_upload(upload_dir, extension, &bytes).await?);
    }

    Ok(request)
}

/// Stored extension for an uploaded file name; `None` for non-images
#[cfg(feature = "api")]
fn image_extension(file_name: Option<&str>) -> Option<&'static str> {
    let extension = std::path::Path::new(file_name?)
        .extension()?
        .to_str()?
        .to_ascii_lowercase();

    match extension.as_str() {
        "jpg" | "jpeg" => Some("jpg"),
        "png" => Some("png"),
        "gif" => Some("gif"),
        "webp" => Some("webp"),
        "bmp" => Some("bmp"),
        _ => None,
    }
}

/// Server-chosen file name under `upload_dir`; the client's name is never used
#[cfg(feature = "api")]
async fn save_upload(
    upload_dir: &std::path::Path,
    extension: &str,
    bytes: &[u8],
) -> Result<PathBuf, AppError> {
    tokio::fs::create_dir_all(upload_dir)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to prepare upload directory {:?}: {}", upload_dir, e)))?;

    let file_name = format!(
        "leaf-{}-{}-{}.{}",
        chrono::Utc::now().timestamp_millis(),
        std::process::id(),
        UPLOAD_SEQUENCE.fetch_add(1, Ordering::Relaxed),
        extension
    );
    let path = upload_dir.join(file_name);

    tokio::fs::write(&path, bytes)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to store upload {:?}: {}", path, e)))?;

    tracing::debug!(path = ?path, size = bytes.len(), "Stored upload");
    Ok(path)
}

#[cfg(feature = "api")]
async fn discard_upload(path: &std::path::Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        tracing::warn!("Failed to remove upload {:?}: {}", path, e);
    }
}

// ============================================================================
// Error Handling
// ============================================================================

#[cfg(feature = "api")]
#[derive(Debug)]
enum AppError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

#[cfg(feature = "api")]
impl From<KnowledgeBaseError> for AppError {
    fn from(e: KnowledgeBaseError) -> Self {
        AppError::Internal(e.to_string())
    }
}

#[cfg(feature = "api")]
impl From<DiagnosisError> for AppError {
    fn from(e: DiagnosisError) -> Self {
        AppError::Internal(format!("Diagnosis failed: {}", e))
    }
}

#[cfg(feature = "api")]
impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = Json(serde_json::json!({
            "success": false,
            "message": message
        }));

        (status, body).into_response()
    }
}
