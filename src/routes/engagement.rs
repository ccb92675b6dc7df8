use axum::{
	extract::{Path, State},
	http::Uri,
	Extension,
};
use serde::Serialize;

use crate::{
	bootstrap::AppState,
	common::middleware_session::CurrentSession,
	domain::{
		engagement::{BookmarkEntry, EngagementKind, ToggleOutcome},
		post::entity::Category,
	},
	services::{
		handlers::EngagementHandler,
		response::{ServiceError, ServiceResponse},
	},
};

#[derive(Debug, Serialize)]
pub struct ToggleContext {
	#[serde(flatten)]
	outcome: ToggleOutcome,
	post_id: i64,
	redirect: String,
}

pub async fn like_post(
	State(state): State<AppState>,
	Extension(session): Extension<CurrentSession>,
	uri: Uri,
	Path(post_id): Path<i64>,
) -> Result<ServiceResponse<ToggleContext>, ServiceError> {
	toggle(state, session, uri, post_id, EngagementKind::Like).await
}

pub async fn bookmark_post(
	State(state): State<AppState>,
	Extension(session): Extension<CurrentSession>,
	uri: Uri,
	Path(post_id): Path<i64>,
) -> Result<ServiceResponse<ToggleContext>, ServiceError> {
	toggle(state, session, uri, post_id, EngagementKind::Bookmark).await
}

async fn toggle(
	state: AppState,
	session: CurrentSession,
	uri: Uri,
	post_id: i64,
	kind: EngagementKind,
) -> Result<ServiceResponse<ToggleContext>, ServiceError> {
	let user = session.require_user(uri.path())?;
	let (post, outcome) = EngagementHandler::toggle(state.store.as_ref(), post_id, user.id, kind).await?;
	Ok(ServiceResponse::with_message(
		outcome.flash(),
		ToggleContext {
			outcome,
			post_id: post.id,
			redirect: format!("/post/{}/", post.slug),
		},
	))
}

#[derive(Debug, Serialize)]
pub struct BookmarksContext {
	bookmarks: Vec<BookmarkEntry>,
	categories: Vec<Category>,
}

pub async fn my_bookmarks(
	State(state): State<AppState>,
	Extension(session): Extension<CurrentSession>,
	uri: Uri,
) -> Result<ServiceResponse<BookmarksContext>, ServiceError> {
	let user = session.require_user(uri.path())?;
	let bookmarks = EngagementHandler::bookmarks(state.store.as_ref(), user.id).await?;
	let categories = state.categories.get(state.store.as_ref()).await?;
	Ok(ServiceResponse::new(BookmarksContext { bookmarks, categories }))
}
