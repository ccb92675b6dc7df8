use axum::{
	extract::State,
	http::{header, StatusCode, Uri},
	response::IntoResponse,
	Extension, Json,
};
use serde::Serialize;

use crate::{
	bootstrap::AppState,
	common::middleware_session::{CurrentSession, SESSION_COOKIE},
	domain::account::{LoginForm, RegisterForm, Session, User},
	services::{
		accounts::AccountHandler,
		response::{Flash, ServiceError, ServiceResponse},
	},
};

use super::FormContext;

#[derive(Debug, Serialize)]
pub struct SignedInContext {
	user: User,
	token: uuid::Uuid,
	expires_at: chrono::DateTime<chrono::Utc>,
	redirect: &'static str,
}

impl SignedInContext {
	fn new(
		user: User,
		session: &Session,
	) -> Self {
		Self {
			user,
			token: session.token,
			expires_at: session.expires_at,
			redirect: "/",
		}
	}
}

fn session_cookie(session: &Session) -> String {
	let max_age = (session.expires_at - chrono::Utc::now()).num_seconds().max(0);
	format!("{SESSION_COOKIE}={}; HttpOnly; Path=/; SameSite=Lax; Max-Age={max_age}", session.token)
}

pub async fn register_form() -> ServiceResponse<FormContext> {
	ServiceResponse::new(FormContext {
		form: "register",
		fields: &["username", "password1", "password2"],
		categories: None,
	})
}

pub async fn register(
	State(state): State<AppState>,
	Json(form): Json<RegisterForm>,
) -> Result<impl IntoResponse, ServiceError> {
	let (user, session) = AccountHandler::register(state.store.as_ref(), form, state.session_ttl).await?;
	Ok((
		StatusCode::CREATED,
		[(header::SET_COOKIE, session_cookie(&session))],
		ServiceResponse::with_message(Flash::success("Registration successful!"), SignedInContext::new(user, &session)),
	))
}

pub async fn login_form() -> ServiceResponse<FormContext> {
	ServiceResponse::new(FormContext {
		form: "login",
		fields: &["username", "password"],
		categories: None,
	})
}

pub async fn login(
	State(state): State<AppState>,
	Json(form): Json<LoginForm>,
) -> Result<impl IntoResponse, ServiceError> {
	let (user, session) = AccountHandler::login(state.store.as_ref(), form, state.session_ttl).await?;
	let greeting = format!("Welcome back, {}!", user.username);
	Ok((
		[(header::SET_COOKIE, session_cookie(&session))],
		ServiceResponse::with_message(Flash::success(greeting), SignedInContext::new(user, &session)),
	))
}

#[derive(Debug, Serialize)]
pub struct SignedOutContext {
	redirect: &'static str,
}

pub async fn logout(
	State(state): State<AppState>,
	Extension(session): Extension<CurrentSession>,
	uri: Uri,
) -> Result<impl IntoResponse, ServiceError> {
	session.require_user(uri.path())?;
	if let Some(token) = session.token {
		AccountHandler::logout(state.store.as_ref(), token).await?;
	}
	Ok((
		[(header::SET_COOKIE, format!("{SESSION_COOKIE}=; HttpOnly; Path=/; SameSite=Lax; Max-Age=0"))],
		ServiceResponse::with_message(Flash::info("You have been logged out."), SignedOutContext { redirect: "/" }),
	))
}
