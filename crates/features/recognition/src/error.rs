use std::borrow::Cow;

#[ocrhub_derive::ocrhub_error]
pub enum RecognitionError {
    #[public("No file provided")]
    #[error("No file provided")]
    NoFile { context: Option<Cow<'static, str>> },

    #[public("Invalid file")]
    #[error("Invalid file{}: {filename:?}", format_context(.context))]
    InvalidFile { filename: String, context: Option<Cow<'static, str>> },

    #[cfg(feature = "server")]
    #[error("Malformed upload{}: {source}", format_context(.context))]
    Multipart {
        #[source]
        source: axum::extract::multipart::MultipartError,
        context: Option<Cow<'static, str>>,
    },

    #[error("IO error{}: {source}", format_context(.context))]
    Io {
        #[source]
        source: std::io::Error,
        context: Option<Cow<'static, str>>,
    },

    #[error("Serialization error{}: {source}", format_context(.context))]
    Serialization {
        #[source]
        source: serde_json::Error,
        context: Option<Cow<'static, str>>,
    },

    #[error("OCR engine unavailable{}: {binary} could not be started", format_context(.context))]
    EngineUnavailable { binary: String, context: Option<Cow<'static, str>> },

    #[error("OCR engine failed{}: {message}", format_context(.context))]
    Engine { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("PDF conversion failed{}: {message}", format_context(.context))]
    Rasterize { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Timed out after {seconds}s{}", format_context(.context))]
    Timeout { seconds: u64, context: Option<Cow<'static, str>> },

    #[cfg(feature = "server")]
    #[error("State error{}: {source}", format_context(.context))]
    State {
        #[source]
        source: ocrhub_kernel::server::ApiStateError,
        context: Option<Cow<'static, str>>,
    },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

#[cfg(feature = "server")]
mod response {
    use super::RecognitionError;
    use axum::Json;
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};
    use tracing::{error, warn};

    impl RecognitionError {
        #[must_use]
        pub fn status_code(&self) -> StatusCode {
            match self {
                Self::NoFile { .. } | Self::InvalidFile { .. } => StatusCode::BAD_REQUEST,
                Self::Multipart { source, .. } => source.status(),
                Self::EngineUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
                Self::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
                Self::Io { .. }
                | Self::Serialization { .. }
                | Self::Engine { .. }
                | Self::Rasterize { .. }
                | Self::State { .. }
                | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            }
        }
    }

    impl IntoResponse for RecognitionError {
        fn into_response(self) -> Response {
            let status = self.status_code();
            if status.is_server_error() {
                error!(kind = self.kind(), status = status.as_u16(), error = %self, "Request failed");
            } else {
                warn!(kind = self.kind(), status = status.as_u16(), error = %self, "Request rejected");
            }

            let body = serde_json::json!({ "error": self.public_message() });
            (status, Json(body)).into_response()
        }
    }
}
