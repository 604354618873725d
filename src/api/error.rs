use crate::Error;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::FileTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Render(_)
            | Self::FileSystem(_)
            | Self::Image(_)
            | Self::Serialization(_)
            | Self::Config(_)
            | Self::Invariant(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "ValidationError",
            Self::NotFound(_) => "NotFound",
            Self::Upstream(_) => "UpstreamError",
            Self::FileTooLarge { .. } => "FileTooLarge",
            Self::Render(_) | Self::Image(_) => "RenderError",
            Self::FileSystem(_) | Self::Serialization(_) => "StorageError",
            Self::Config(_) | Self::Invariant(_) => "InternalError",
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        let mut body = json!({
            "error": self.code(),
            "message": self.to_string(),
        });
        if let Self::Validation { field, .. } = &self {
            body["field"] = json!(field);
        }

        (status, Json(body)).into_response()
    }
}
