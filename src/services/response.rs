use axum::{
	http::StatusCode,
	response::{IntoResponse, Response},
	Json,
};
use serde::Serialize;
use thiserror::Error;

use super::validation::FieldErrors;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlashLevel {
	Success,
	Info,
	Error,
}

/// One-shot status line describing the outcome of the request it rides on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Flash {
	pub level: FlashLevel,
	pub text: String,
}

impl Flash {
	pub fn success(text: impl Into<String>) -> Self {
		Self {
			level: FlashLevel::Success,
			text: text.into(),
		}
	}
	pub fn info(text: impl Into<String>) -> Self {
		Self {
			level: FlashLevel::Info,
			text: text.into(),
		}
	}
	pub fn error(text: impl Into<String>) -> Self {
		Self {
			level: FlashLevel::Error,
			text: text.into(),
		}
	}
}

/// Body of every successful response: the page context plus the status line.
#[derive(Debug, Serialize)]
pub struct ServiceResponse<T: Serialize> {
	pub message: Option<Flash>,
	#[serde(flatten)]
	pub data: T,
}

impl<T: Serialize> ServiceResponse<T> {
	pub fn new(data: T) -> Self {
		Self { message: None, data }
	}

	pub fn with_message(
		message: Flash,
		data: T,
	) -> Self {
		Self {
			message: Some(message),
			data,
		}
	}
}

impl<T: Serialize> IntoResponse for ServiceResponse<T> {
	fn into_response(self) -> Response {
		Json(self).into_response()
	}
}

#[derive(Debug, Error)]
pub enum ServiceError {
	#[error("{0} not found")]
	NotFound(&'static str),

	/// Rejected form; `input` is the submission echoed back without secrets.
	#[error("invalid form input: {errors:?}")]
	InvalidForm {
		errors: FieldErrors,
		input: serde_json::Value,
	},

	#[error("authentication required for {next}")]
	AuthenticationRequired { next: String },

	#[error("database error: {0}")]
	Database(#[from] sqlx::Error),

	#[error("migration error: {0}")]
	Migration(#[from] sqlx::migrate::MigrateError),

	#[error("password hashing error: {0}")]
	Hashing(String),

	#[error("configuration error: {0}")]
	Config(String),
}

impl ServiceError {
	pub fn invalid_form<F: Serialize>(
		errors: FieldErrors,
		form: &F,
	) -> Self {
		Self::InvalidForm {
			errors,
			input: serde_json::to_value(form).unwrap_or(serde_json::Value::Null),
		}
	}

	pub fn status(&self) -> StatusCode {
		match self {
			Self::NotFound(_) => StatusCode::NOT_FOUND,
			Self::InvalidForm { .. } => StatusCode::UNPROCESSABLE_ENTITY,
			Self::AuthenticationRequired { .. } => StatusCode::UNAUTHORIZED,
			Self::Database(_) | Self::Migration(_) | Self::Hashing(_) | Self::Config(_) => {
				StatusCode::INTERNAL_SERVER_ERROR
			}
		}
	}
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	message: Flash,
	#[serde(skip_serializing_if = "Option::is_none")]
	errors: Option<FieldErrors>,
	#[serde(skip_serializing_if = "Option::is_none")]
	input: Option<serde_json::Value>,
	#[serde(skip_serializing_if = "Option::is_none")]
	login_url: Option<String>,
}

impl IntoResponse for ServiceError {
	fn into_response(self) -> Response {
		let status = self.status();
		let body = match self {
			Self::NotFound(what) => ErrorBody {
				message: Flash::error(format!("{what} not found.")),
				errors: None,
				input: None,
				login_url: None,
			},
			Self::InvalidForm { errors, input } => ErrorBody {
				message: Flash::error("Please correct the errors below."),
				errors: Some(errors),
				input: Some(input),
				login_url: None,
			},
			Self::AuthenticationRequired { next } => ErrorBody {
				message: Flash::error("Please log in to continue."),
				errors: None,
				input: None,
				login_url: Some(format!("/login/?next={next}")),
			},
			internal => {
				tracing::error!("Request failed: {}", internal);
				ErrorBody {
					message: Flash::error("Something went wrong. Please try again later."),
					errors: None,
					input: None,
					login_url: None,
				}
			}
		};
		(status, Json(body)).into_response()
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_envelope_flattens_context() {
		#[derive(Serialize)]
		struct Context {
			count: i64,
		}

		let body = serde_json::to_value(ServiceResponse::with_message(Flash::info("Post unliked!"), Context { count: 3 })).unwrap();
		assert_eq!(
			body,
			serde_json::json!({
				"message": { "level": "info", "text": "Post unliked!" },
				"count": 3
			})
		);
	}

	#[test]
	fn test_status_mapping() {
		assert_eq!(ServiceError::NotFound("Post").status(), StatusCode::NOT_FOUND);
		assert_eq!(
			ServiceError::AuthenticationRequired { next: "/like/5/".into() }.status(),
			StatusCode::UNAUTHORIZED
		);
		assert_eq!(ServiceError::Hashing("x".into()).status(), StatusCode::INTERNAL_SERVER_ERROR);
	}
}
