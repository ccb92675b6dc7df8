use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::{
	bootstrap::AppState,
	domain::contact::{ContactMessage, SubmitContact},
	services::{
		handlers::ContactHandler,
		response::{Flash, ServiceError, ServiceResponse},
	},
};

use super::FormContext;

pub async fn contact_form(State(state): State<AppState>) -> Result<ServiceResponse<FormContext>, ServiceError> {
	let categories = state.categories.get(state.store.as_ref()).await?;
	Ok(ServiceResponse::new(FormContext {
		form: "contact",
		fields: &["name", "email", "subject", "message"],
		categories: Some(categories),
	}))
}

#[derive(Debug, Serialize)]
pub struct ContactContext {
	contact_message: ContactMessage,
	redirect: &'static str,
}

pub async fn contact(
	State(state): State<AppState>,
	Json(form): Json<SubmitContact>,
) -> Result<(StatusCode, ServiceResponse<ContactContext>), ServiceError> {
	let contact_message = ContactHandler::submit_message(state.store.as_ref(), form).await?;
	Ok((
		StatusCode::CREATED,
		ServiceResponse::with_message(
			Flash::success("Your message has been sent successfully!"),
			ContactContext {
				contact_message,
				redirect: "/contact/",
			},
		),
	))
}
