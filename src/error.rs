//! Errors returned by handlers, rendered as `{"error", "status"}` JSON.

use axum::{
	http::StatusCode,
	response::{IntoResponse, Response},
	Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
	/// Connectivity or constraint failure in the store.
	#[error("Database error: {0}")]
	Database(#[from] sqlx::Error),

	#[error("Authentication error: {0}")]
	Auth(String),

	/// Input that can't be turned into the type an action needs.
	#[error("Bad request: {0}")]
	BadRequest(String),

	/// A copy is already on loan.
	#[error("Conflict: {0}")]
	Conflict(String),
}

impl IntoResponse for AppError {
	fn into_response(self) -> Response {
		let (status, message) = match &self {
			AppError::Database(e) => {
				tracing::error!(error = %e, "Database error");
				(StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
			}
			AppError::Auth(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
			AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
			AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
		};

		let body = Json(json!({
			"error": message,
			"status": status.as_u16(),
		}));

		(status, body).into_response()
	}
}

pub type AppResult<T> = Result<T, AppError>;
