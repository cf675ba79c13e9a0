//! Shared string constants (service identity, `OpenAPI` tags, routes).

/// Human-readable service name reported by `/` and `/status`.
pub const SERVICE_NAME: &str = "OcrHub Server";

/// API version reported by `/status`.
pub const API_VERSION: &str = "1.0";

pub const SYSTEM_TAG: &str = "System";
pub const RECOGNITION_TAG: &str = "Recognition";

pub const HEALTH_PATH: &str = "/health";
pub const PROCESS_PATH: &str = "/process";
pub const STATUS_PATH: &str = "/status";

/// Endpoints advertised by the index route.
pub const ENDPOINTS: [&str; 3] = [HEALTH_PATH, PROCESS_PATH, STATUS_PATH];

/// Multipart field carrying the uploaded document.
pub const FILE_FIELD: &str = "file";
/// Multipart field carrying the language selector.
pub const LANGUAGE_FIELD: &str = "language";
