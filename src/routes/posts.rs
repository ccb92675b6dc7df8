use axum::{
	extract::{Path, Query, State},
	http::StatusCode,
	Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::{
	bootstrap::AppState,
	common::middleware_session::CurrentSession,
	domain::{
		contact::ContactMessage,
		post::{
			commands::DetailSubmission,
			entity::{Category, Comment},
			PostDetail,
		},
	},
	services::{
		handlers::{CategoryListing, ContactHandler, Listing, ModerationHandler, PostHandler},
		response::{Flash, ServiceError, ServiceResponse},
	},
};

#[derive(Debug, Deserialize)]
pub struct ListingParams {
	query: Option<String>,
	page: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HomeContext {
	#[serde(flatten)]
	listing: Listing,
	categories: Vec<Category>,
}

pub async fn home(
	State(state): State<AppState>,
	Query(params): Query<ListingParams>,
) -> Result<ServiceResponse<HomeContext>, ServiceError> {
	let listing = PostHandler::listing(state.store.as_ref(), params.query.as_deref(), params.page.as_deref()).await?;
	let categories = state.categories.get(state.store.as_ref()).await?;
	Ok(ServiceResponse::new(HomeContext { listing, categories }))
}

#[derive(Debug, Serialize)]
pub struct CategoryContext {
	#[serde(flatten)]
	listing: CategoryListing,
	categories: Vec<Category>,
}

pub async fn category_posts(
	State(state): State<AppState>,
	Path(slug): Path<String>,
	Query(params): Query<ListingParams>,
) -> Result<ServiceResponse<CategoryContext>, ServiceError> {
	let listing = PostHandler::category_listing(state.store.as_ref(), &slug, params.page.as_deref()).await?;
	let categories = state.categories.get(state.store.as_ref()).await?;
	Ok(ServiceResponse::new(CategoryContext { listing, categories }))
}

#[derive(Debug, Serialize)]
pub struct DetailContext {
	#[serde(flatten)]
	detail: PostDetail,
	categories: Vec<Category>,
}

pub async fn post_detail(
	State(state): State<AppState>,
	Extension(session): Extension<CurrentSession>,
	Path(slug): Path<String>,
) -> Result<ServiceResponse<DetailContext>, ServiceError> {
	let store = state.store.as_ref();
	let post = PostHandler::visit(store, &slug).await?;
	let detail = PostHandler::detail(store, post, session.user_id()).await?;
	let categories = state.categories.get(store).await?;
	Ok(ServiceResponse::new(DetailContext { detail, categories }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Submitted {
	Comment(Comment),
	ContactMessage(ContactMessage),
}

#[derive(Debug, Serialize)]
pub struct SubmittedContext {
	submitted: Submitted,
	redirect: String,
}

/// The detail page hosts both the comment form and the contact form. The
/// visit is counted before the submission is looked at.
pub async fn post_detail_submit(
	State(state): State<AppState>,
	Path(slug): Path<String>,
	Json(fields): Json<serde_json::Map<String, serde_json::Value>>,
) -> Result<(StatusCode, ServiceResponse<SubmittedContext>), ServiceError> {
	let store = state.store.as_ref();
	let post = PostHandler::visit(store, &slug).await?;
	let redirect = format!("/post/{}/", post.slug);

	let response = match DetailSubmission::from_fields(fields)? {
		DetailSubmission::Comment(form) => {
			let comment = ModerationHandler::submit_comment(store, post.id, form).await?;
			ServiceResponse::with_message(
				Flash::success("Your comment has been submitted for review!"),
				SubmittedContext {
					submitted: Submitted::Comment(comment),
					redirect,
				},
			)
		}
		DetailSubmission::Contact(form) => {
			let message = ContactHandler::submit_message(store, form).await?;
			ServiceResponse::with_message(
				Flash::success("Your message has been sent!"),
				SubmittedContext {
					submitted: Submitted::ContactMessage(message),
					redirect,
				},
			)
		}
	};
	Ok((StatusCode::CREATED, response))
}
