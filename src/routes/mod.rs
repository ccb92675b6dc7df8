mod accounts;
mod contact;
mod engagement;
mod posts;

use axum::{
	middleware,
	routing::{get, post},
	Router,
};
use serde::Serialize;

use crate::bootstrap::AppState;
use crate::common::middleware_session::resolve_session;
use crate::domain::post::entity::Category;

pub fn create_routes(state: AppState) -> Router {
	Router::new()
		.route("/", get(posts::home))
		.route("/post/:slug/", get(posts::post_detail).post(posts::post_detail_submit))
		.route("/category/:slug/", get(posts::category_posts))
		.route("/like/:post_id/", post(engagement::like_post))
		.route("/bookmark/:post_id/", post(engagement::bookmark_post))
		.route("/bookmarks/", get(engagement::my_bookmarks))
		.route("/contact/", get(contact::contact_form).post(contact::contact))
		.route("/register/", get(accounts::register_form).post(accounts::register))
		.route("/login/", get(accounts::login_form).post(accounts::login))
		.route("/logout/", post(accounts::logout))
		.layer(middleware::from_fn_with_state(state.clone(), resolve_session))
		.with_state(state)
}

/// Description of an empty form, for the GET side of a form route.
#[derive(Debug, Serialize)]
pub struct FormContext {
	form: &'static str,
	fields: &'static [&'static str],
	#[serde(skip_serializing_if = "Option::is_none")]
	categories: Option<Vec<Category>>,
}
