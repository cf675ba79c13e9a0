use crate::Recognition;
use crate::error::RecognitionError;
use crate::pipeline::{ProcessResponse, Upload, UploadedFile};
use axum::Json;
use axum::extract::{Multipart, State};
use ocrhub_derive::{api_handler, api_model};
use ocrhub_domain::constants::{
    API_VERSION, ENDPOINTS, FILE_FIELD, LANGUAGE_FIELD, PROCESS_PATH, RECOGNITION_TAG, SERVICE_NAME,
    STATUS_PATH,
};
use ocrhub_domain::{DocumentFormat, Language};
use ocrhub_kernel::server::ApiState;
use tracing::debug;

#[api_model]
/// Service overview
pub struct IndexResponse {
    pub service: &'static str,
    pub endpoints: Vec<String>,
    pub languages: Vec<String>,
}

#[api_model]
/// Service information
pub struct StatusResponse {
    pub service: &'static str,
    pub version: &'static str,
    pub languages: Vec<String>,
    /// Accepted upload extensions
    pub formats: Vec<String>,
    /// Engine version detected at startup
    pub engine: Option<String>,
}

#[api_model]
/// Error body
pub struct ErrorResponse {
    pub error: String,
}

/// Multipart form accepted by `/process`.
#[derive(Debug, utoipa::ToSchema)]
#[allow(dead_code)]
pub struct ProcessForm {
    /// Document to recognize (png, jpg, jpeg, pdf, bmp, tiff)
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
    /// `es` (default) or `en`; unknown values fall back to `en`
    language: Option<String>,
}

fn owned(items: impl IntoIterator<Item = &'static str>) -> Vec<String> {
    items.into_iter().map(str::to_owned).collect()
}

#[api_handler(
    get,
    path = "/",
    responses((status = OK, description = "Service overview", body = IndexResponse)),
    tag = RECOGNITION_TAG,
)]
pub(crate) async fn index_handler() -> Json<IndexResponse> {
    Json(IndexResponse {
        service: SERVICE_NAME,
        endpoints: owned(ENDPOINTS),
        languages: owned(Language::codes()),
    })
}

#[api_handler(
    get,
    path = STATUS_PATH,
    responses((status = OK, description = "Service information", body = StatusResponse)),
    tag = RECOGNITION_TAG,
)]
pub(crate) async fn status_handler(State(state): State<ApiState>) -> Result<Json<StatusResponse>, RecognitionError> {
    let recognition = state.try_get_slice::<Recognition>()?;

    Ok(Json(StatusResponse {
        service: SERVICE_NAME,
        version: API_VERSION,
        languages: owned(Language::codes()),
        formats: owned(DocumentFormat::extensions()),
        engine: recognition.engine_version.clone(),
    }))
}

#[api_handler(
    post,
    path = PROCESS_PATH,
    request_body(content = ProcessForm, content_type = "multipart/form-data"),
    responses(
        (status = OK, description = "Recognized text", body = ProcessResponse),
        (status = BAD_REQUEST, description = "Missing or unsupported file", body = ErrorResponse),
        (status = PAYLOAD_TOO_LARGE, description = "Upload exceeds the size limit", body = ErrorResponse),
        (status = INTERNAL_SERVER_ERROR, description = "Recognition failed", body = ErrorResponse),
        (status = SERVICE_UNAVAILABLE, description = "OCR engine not available", body = ErrorResponse),
        (status = GATEWAY_TIMEOUT, description = "OCR engine timed out", body = ErrorResponse),
    ),
    tag = RECOGNITION_TAG,
)]
pub(crate) async fn process_handler(
    State(state): State<ApiState>,
    multipart: Option<Multipart>,
) -> Result<Json<ProcessResponse>, RecognitionError> {
    let recognition = state.try_get_slice::<Recognition>()?;

    let upload = match multipart {
        Some(multipart) => read_upload(multipart).await?,
        None => Upload::default(),
    };

    recognition.recognizer.process(upload).await.map(Json)
}

/// Collects the `file` and `language` parts; other parts are skipped.
///
/// A `file` part without a file name is a plain form field, not an upload.
async fn read_upload(mut multipart: Multipart) -> Result<Upload, RecognitionError> {
    let mut upload = Upload::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some(FILE_FIELD) if upload.file.is_none() => {
                let Some(file_name) = field.file_name().map(str::to_owned) else {
                    continue;
                };
                let bytes = field.bytes().await?;
                debug!(file_name = %file_name, bytes = bytes.len(), "Upload received");
                upload.file = Some(UploadedFile { name: file_name, bytes: bytes.into() });
            },
            Some(LANGUAGE_FIELD) => upload.language = Some(field.text().await?),
            _ => {},
        }
    }

    Ok(upload)
}
