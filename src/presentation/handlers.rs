use crate::data::user_repository::InMemoryUserRepository;
use crate::domain::error::DomainError;
use crate::domain::user::{AuthenticatedUser, BookInput, CreateUser, LoginRequest};
use crate::presentation::resolvers::Resolvers;
use actix_web::{FromRequest, HttpMessage, HttpResponse, ResponseError, web};
use chrono::Utc;
use serde::Serialize;
use std::pin::Pin;
use thiserror::Error;
use tracing::{error, info, instrument, warn};

// AppState holding the resolver dispatcher
pub struct AppState {
    pub resolvers: Resolvers<InMemoryUserRepository>,
}

// Uniform error response format
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    details: serde_json::Value,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Authentication(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Database error: {0}")]
    Database(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        match self {
            ApiError::Authentication(_) => actix_web::http::StatusCode::UNAUTHORIZED,
            ApiError::Validation(_) => actix_web::http::StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => actix_web::http::StatusCode::NOT_FOUND,
            ApiError::Database(_) => actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Internal(_) => actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let error_msg = self.to_string();

        let details = match self {
            ApiError::Authentication(msg)
            | ApiError::Validation(msg)
            | ApiError::NotFound(msg)
            | ApiError::Database(msg)
            | ApiError::Internal(msg) => serde_json::json!({ "message": msg }),
        };

        // Log error based on severity
        match self {
            ApiError::Authentication(_) => {
                warn!(error = %error_msg, status = %status, "Authentication error")
            }
            ApiError::Validation(_) => {
                warn!(error = %error_msg, status = %status, "Validation error")
            }
            ApiError::NotFound(_) => {
                warn!(error = %error_msg, status = %status, "Resource not found")
            }
            ApiError::Database(_) => {
                error!(error = %error_msg, status = %status, "Database error")
            }
            ApiError::Internal(_) => {
                error!(error = %error_msg, status = %status, "Internal error")
            }
        }

        let error_response = ErrorResponse {
            error: error_msg,
            details,
        };

        HttpResponse::build(status).json(error_response)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast_ref::<DomainError>() {
            Some(DomainError::Authentication(msg)) => ApiError::Authentication(msg.clone()),
            Some(DomainError::Validation(msg)) => ApiError::Validation(msg.clone()),
            Some(DomainError::NotFound(msg)) => ApiError::NotFound(msg.clone()),
            Some(DomainError::Internal(msg)) => ApiError::Internal(msg.clone()),
            None => ApiError::Database(err.to_string()),
        }
    }
}

// AuthenticatedUser extractor; handlers take Option<AuthenticatedUser>
// so anonymous requests reach the resolver, which owns the decision.
impl FromRequest for AuthenticatedUser {
    type Error = ApiError;
    type Future = Pin<Box<dyn std::future::Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(
        req: &actix_web::HttpRequest,
        _payload: &mut actix_web::dev::Payload,
    ) -> Self::Future {
        let user = req.extensions().get::<AuthenticatedUser>().cloned();
        Box::pin(async move {
            user.ok_or_else(|| ApiError::Authentication("Not logged in".to_string()))
        })
    }
}

// Handlers

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    timestamp: String,
}

#[instrument]
pub async fn health_check() -> HttpResponse {
    info!("Health check requested");
    let response = HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now().to_rfc3339(),
    };
    HttpResponse::Ok().json(response)
}

#[instrument(skip(state, identity))]
pub async fn me(
    state: web::Data<AppState>,
    identity: Option<AuthenticatedUser>,
) -> Result<HttpResponse, ApiError> {
    let profile = state.resolvers.me(identity.as_ref()).await.map_err(|e| {
        warn!(error = %e, "Failed to resolve current user");
        ApiError::from(e)
    })?;
    info!(user_id = %profile.id, "Current user resolved");
    Ok(HttpResponse::Ok().json(profile))
}

#[instrument(skip(state, req), fields(email = %req.email))]
pub async fn add_user(
    state: web::Data<AppState>,
    req: web::Json<CreateUser>,
) -> Result<HttpResponse, ApiError> {
    info!("Registration request received");
    let payload = state
        .resolvers
        .add_user(req.into_inner())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to register user");
            ApiError::from(e)
        })?;
    info!(user_id = %payload.user.id, "User registered successfully");
    Ok(HttpResponse::Created().json(payload))
}

#[instrument(skip(state, req), fields(email = %req.email))]
pub async fn login(
    state: web::Data<AppState>,
    req: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    info!("Login request received");
    let payload = state.resolvers.login(req.into_inner()).await.map_err(|e| {
        warn!(error = %e, "Failed to login");
        ApiError::from(e)
    })?;
    info!(user_id = %payload.user.id, "Login successful");
    Ok(HttpResponse::Ok().json(payload))
}

#[instrument(skip(state, identity, req), fields(book_id = %req.book_id))]
pub async fn save_book(
    state: web::Data<AppState>,
    identity: Option<AuthenticatedUser>,
    req: web::Json<BookInput>,
) -> Result<HttpResponse, ApiError> {
    info!("Save book request received");
    let profile = state
        .resolvers
        .save_book(identity.as_ref(), req.into_inner())
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to save book");
            ApiError::from(e)
        })?;
    info!(
        user_id = %profile.id,
        book_count = profile.book_count,
        "Book saved successfully"
    );
    Ok(HttpResponse::Ok().json(profile))
}

#[instrument(skip(state, identity), fields(book_id = %*path))]
pub async fn remove_book(
    state: web::Data<AppState>,
    identity: Option<AuthenticatedUser>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let book_id = path.into_inner();
    info!("Remove book request received");
    let profile = state
        .resolvers
        .remove_book(identity.as_ref(), &book_id)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to remove book");
            ApiError::from(e)
        })?;
    info!(
        user_id = %profile.id,
        book_count = profile.book_count,
        "Book removed successfully"
    );
    Ok(HttpResponse::Ok().json(profile))
}
