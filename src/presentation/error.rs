use crate::domain::error::DomainError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

const GENERIC_INTERNAL_MESSAGE: &str = "Erro interno do servidor";

// Uniform error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
    pub code: String,
}

/// Errors as seen by HTTP clients. `Internal` only ever carries a public,
/// generic message; the underlying cause is logged where it is converted.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Maps a service failure, replacing anything that is not a client error
    /// with `fallback`.
    pub fn from_service(err: anyhow::Error, fallback: &str) -> Self {
        match err.downcast::<DomainError>() {
            Ok(domain) => Self::from_domain(domain, fallback),
            Err(err) => {
                error!(error = %err, "Unexpected failure");
                ApiError::Internal(fallback.to_string())
            }
        }
    }

    fn from_domain(err: DomainError, fallback: &str) -> Self {
        match err {
            DomainError::Validation(msg) => ApiError::Validation(msg),
            DomainError::NotFound(msg) => ApiError::NotFound(msg),
            DomainError::Unauthorized(msg) => ApiError::Unauthorized(msg),
            DomainError::Conflict(msg) => ApiError::Conflict(msg),
            DomainError::Internal(detail) => {
                error!(error = %detail, "Internal domain error");
                ApiError::Internal(fallback.to_string())
            }
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::Validation(msg)
            | ApiError::NotFound(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Conflict(msg)
            | ApiError::Internal(msg) => msg,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation_error",
            ApiError::NotFound(_) => "not_found",
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::Conflict(_) => "conflict",
            ApiError::Internal(_) => "internal_error",
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::from_service(err, GENERIC_INTERNAL_MESSAGE)
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::from_domain(err, GENERIC_INTERNAL_MESSAGE)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            // Duplicates are reported as 400 for route compatibility.
            ApiError::Conflict(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        // Internal causes are logged where they are converted.
        if !matches!(self, ApiError::Internal(_)) {
            warn!(error = %self, status = %status, code = self.code(), "Request rejected");
        }

        HttpResponse::build(status).json(ErrorResponse {
            message: self.message().to_string(),
            code: self.code().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::Layer;

    struct ErrorEventCounter(Arc<AtomicUsize>);

    impl<S: tracing::Subscriber> Layer<S> for ErrorEventCounter {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() == tracing::Level::ERROR {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    #[test]
    fn test_internal_failure_is_logged_once() {
        let errors = Arc::new(AtomicUsize::new(0));
        let subscriber =
            tracing_subscriber::registry().with(ErrorEventCounter(errors.clone()));

        tracing::subscriber::with_default(subscriber, || {
            let err = ApiError::from_service(anyhow::anyhow!("pool timed out"), "Erro no login");
            let response = err.error_response();
            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        });

        assert_eq!(errors.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_status_codes() {
        let cases = [
            (ApiError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (ApiError::Conflict("x".into()), StatusCode::BAD_REQUEST),
            (ApiError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (ApiError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (ApiError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(err.status_code(), status);
        }
    }

    #[test]
    fn test_domain_errors_keep_their_message() {
        let err = ApiError::from_service(
            DomainError::Conflict("E-mail já cadastrado".to_string()).into(),
            "fallback",
        );
        assert!(matches!(err, ApiError::Conflict(_)));
        assert_eq!(err.message(), "E-mail já cadastrado");
        assert_eq!(err.code(), "conflict");
    }

    #[test]
    fn test_unexpected_errors_use_fallback_message() {
        let err = ApiError::from_service(
            anyhow::anyhow!("disk I/O error at /var/lib/db"),
            "Erro ao buscar receitas",
        );
        assert!(matches!(err, ApiError::Internal(_)));
        assert_eq!(err.message(), "Erro ao buscar receitas");
    }

    #[test]
    fn test_internal_domain_detail_is_not_exposed() {
        let err = ApiError::from_service(
            DomainError::Internal("hash failure".to_string()).into(),
            "Erro no login",
        );
        assert_eq!(err.message(), "Erro no login");
    }
}
