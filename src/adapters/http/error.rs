use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use crate::application::AppError;

/// An [`AppError`] on its way out of a handler, plus how the endpoint
/// shapes its error body.
#[derive(Debug)]
pub struct ApiError {
    error: AppError,
    context: &'static str,
    enveloped: bool,
}

impl ApiError {
    pub fn new(error: AppError) -> Self {
        Self {
            error,
            context: "Server error",
            enveloped: false,
        }
    }

    /// Message sent in place of the diagnostic on a 500.
    pub fn context(mut self, context: &'static str) -> Self {
        self.context = context;
        self
    }

    /// Adds `success: false` to the body.
    pub fn enveloped(mut self) -> Self {
        self.enveloped = true;
        self
    }

    pub fn status(&self) -> StatusCode {
        match self.error {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::AuthenticationRequired => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Repository(_) | AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AppError> for ApiError {
    fn from(error: AppError) -> Self {
        Self::new(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let mut body = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("{}: {}", self.context, self.error);
            json!({ "message": self.context, "error": self.error.to_string() })
        } else {
            json!({ "message": self.error.to_string() })
        };
        if self.enveloped {
            if let Value::Object(fields) = &mut body {
                fields.insert("success".to_string(), Value::Bool(false));
            }
        }

        (status, Json(body)).into_response()
    }
}

/// Attaches endpoint-specific error shaping to a service result.
pub trait ApiResultExt<T> {
    fn context(self, context: &'static str) -> Result<T, ApiError>;
    fn enveloped(self, context: &'static str) -> Result<T, ApiError>;
}

impl<T> ApiResultExt<T> for Result<T, AppError> {
    fn context(self, context: &'static str) -> Result<T, ApiError> {
        self.map_err(|e| ApiError::new(e).context(context))
    }

    fn enveloped(self, context: &'static str) -> Result<T, ApiError> {
        self.map_err(|e| ApiError::new(e).context(context).enveloped())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::RepositoryError;

    async fn body_of(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_plain_error_body() {
        let response = ApiError::new(AppError::NotFound("Project not found".into())).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_of(response).await, json!({ "message": "Project not found" }));
    }

    #[tokio::test]
    async fn test_enveloped_error_body() {
        let response = ApiError::new(AppError::Forbidden("nope".into()))
            .enveloped()
            .into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            body_of(response).await,
            json!({ "success": false, "message": "nope" })
        );
    }

    #[tokio::test]
    async fn test_internal_error_hides_behind_context() {
        let error: AppError = RepositoryError::Storage("disk full".into()).into();
        let response = ApiError::new(error)
            .context("Error creating project")
            .into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_of(response).await;
        assert_eq!(body["message"], "Error creating project");
        assert!(body["error"].as_str().unwrap().contains("disk full"));
    }

    #[test]
    fn test_conflict_maps_to_409() {
        let error: AppError = RepositoryError::Conflict {
            id: "p".into(),
            expected: 0,
            found: 1,
        }
        .into();
        assert_eq!(ApiError::new(error).status(), StatusCode::CONFLICT);
    }
}
