use axum::extract::State;
use axum::headers::{authorization::Bearer, Authorization, Cookie, HeaderMapExt};
use axum::http::{HeaderMap, Request};
use axum::middleware::Next;
use axum::response::Response;
use chrono::Utc;
use uuid::Uuid;

use crate::bootstrap::AppState;
use crate::domain::account::User;
use crate::services::response::ServiceError;

pub const SESSION_COOKIE: &str = "sessionid";

/// Who is making the request. Anonymous when no live session was presented.
#[derive(Clone, Debug, Default)]
pub struct CurrentSession {
	pub token: Option<Uuid>,
	pub user: Option<User>,
}

impl CurrentSession {
	pub fn user_id(&self) -> Option<i64> {
		self.user.as_ref().map(|user| user.id)
	}

	/// Guard for actions that need a signed-in user; `next` is where the
	/// login page should send the user back to.
	pub fn require_user(
		&self,
		next: &str,
	) -> Result<&User, ServiceError> {
		self.user.as_ref().ok_or_else(|| ServiceError::AuthenticationRequired { next: next.to_string() })
	}
}

/// Resolves the session token, from `Authorization: Bearer` or the session
/// cookie, and stores the result as a `CurrentSession` extension.
pub async fn resolve_session<B>(
	State(state): State<AppState>,
	mut request: Request<B>,
	next: Next<B>,
) -> Result<Response, ServiceError> {
	let session = match session_token(request.headers()) {
		Some(token) => match state.store.session_user(token, Utc::now()).await? {
			Some(user) => CurrentSession {
				token: Some(token),
				user: Some(user),
			},
			None => {
				tracing::debug!("Unknown or expired session presented");
				CurrentSession::default()
			}
		},
		None => CurrentSession::default(),
	};

	request.extensions_mut().insert(session);
	Ok(next.run(request).await)
}

fn session_token(headers: &HeaderMap) -> Option<Uuid> {
	if let Some(Authorization(bearer)) = headers.typed_get::<Authorization<Bearer>>() {
		return Uuid::parse_str(bearer.token()).ok();
	}
	headers
		.typed_get::<Cookie>()
		.and_then(|cookie| cookie.get(SESSION_COOKIE).and_then(|value| Uuid::parse_str(value).ok()))
}

#[cfg(test)]
mod test {
	use axum::http::{header, HeaderValue};

	use super::*;

	#[test]
	fn test_token_from_bearer_or_cookie() {
		let token = Uuid::new_v4();

		let mut headers = HeaderMap::new();
		headers.insert(header::AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {token}")).unwrap());
		assert_eq!(session_token(&headers), Some(token));

		let mut headers = HeaderMap::new();
		headers.insert(header::COOKIE, HeaderValue::from_str(&format!("theme=dark; {SESSION_COOKIE}={token}")).unwrap());
		assert_eq!(session_token(&headers), Some(token));

		let mut headers = HeaderMap::new();
		headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer not-a-uuid"));
		assert_eq!(session_token(&headers), None);
		assert_eq!(session_token(&HeaderMap::new()), None);
	}

	#[test]
	fn test_guard_points_back_to_the_request() {
		let anonymous = CurrentSession::default();
		match anonymous.require_user("/like/5/") {
			Err(ServiceError::AuthenticationRequired { next }) => assert_eq!(next, "/like/5/"),
			other => panic!("unexpected result {other:?}"),
		}
	}
}
