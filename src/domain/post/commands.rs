use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::contact::SubmitContact;
use crate::services::response::ServiceError;
use crate::services::validation::{FieldErrors, FormInput, NON_FIELD_ERRORS};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct SubmitComment {
	#[validate(length(max = 80, message = "Ensure this value has at most 80 characters."))]
	pub author: String,
	#[validate(
		email(message = "Enter a valid email address."),
		length(max = 254, message = "Ensure this value has at most 254 characters.")
	)]
	pub email: String,
	#[validate(length(max = 5000, message = "Ensure this value has at most 5000 characters."))]
	pub content: String,
}

impl FormInput for SubmitComment {
	fn required(&self) -> Vec<(&'static str, &str)> {
		vec![("author", &self.author), ("email", &self.email), ("content", &self.content)]
	}
}

/// A post detail page accepts two different forms on the same URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DetailSubmission {
	Comment(SubmitComment),
	Contact(SubmitContact),
}

impl DetailSubmission {
	const COMMENT_FIELDS: [&'static str; 2] = ["author", "content"];
	const CONTACT_FIELDS: [&'static str; 3] = ["name", "subject", "message"];

	/// Picks the form by which of its distinctive fields are present. `email`
	/// belongs to both and decides nothing.
	pub fn from_fields(fields: serde_json::Map<String, serde_json::Value>) -> Result<Self, ServiceError> {
		let has_any = |names: &[&str]| names.iter().any(|name| fields.contains_key(*name));

		let body = serde_json::Value::Object(fields.clone());
		if has_any(&Self::COMMENT_FIELDS) {
			let form = serde_json::from_value(body).map_err(|err| Self::malformed(err, &fields))?;
			Ok(Self::Comment(form))
		} else if has_any(&Self::CONTACT_FIELDS) {
			let form = serde_json::from_value(body).map_err(|err| Self::malformed(err, &fields))?;
			Ok(Self::Contact(form))
		} else {
			let mut errors = FieldErrors::new();
			errors.insert(
				NON_FIELD_ERRORS.to_string(),
				vec!["Submit either a comment or a contact message.".to_string()],
			);
			Err(ServiceError::InvalidForm {
				errors,
				input: serde_json::Value::Object(fields),
			})
		}
	}

	fn malformed(
		err: serde_json::Error,
		fields: &serde_json::Map<String, serde_json::Value>,
	) -> ServiceError {
		let mut errors = FieldErrors::new();
		errors.insert(NON_FIELD_ERRORS.to_string(), vec![format!("Malformed submission: {err}")]);
		ServiceError::InvalidForm {
			errors,
			input: serde_json::Value::Object(fields.clone()),
		}
	}
}

#[cfg(test)]
mod test {
	use serde_json::json;

	use super::*;

	fn fields(value: serde_json::Value) -> serde_json::Map<String, serde_json::Value> {
		match value {
			serde_json::Value::Object(map) => map,
			_ => panic!("object expected"),
		}
	}

	#[test]
	fn test_comment_fields_select_comment_form() {
		let submission = DetailSubmission::from_fields(fields(json!({
			"author": "Ann",
			"email": "ann@example.com",
			"content": "Nice read"
		})))
		.unwrap();

		assert_eq!(
			submission,
			DetailSubmission::Comment(SubmitComment {
				author: "Ann".into(),
				email: "ann@example.com".into(),
				content: "Nice read".into(),
			})
		);
	}

	#[test]
	fn test_contact_fields_select_contact_form() {
		let submission = DetailSubmission::from_fields(fields(json!({
			"name": "Bo",
			"email": "bo@example.com",
			"subject": "Hello",
			"message": "Question about the post"
		})))
		.unwrap();

		assert!(matches!(submission, DetailSubmission::Contact(form) if form.subject == "Hello"));
	}

	#[test]
	fn test_email_alone_is_rejected() {
		let err = DetailSubmission::from_fields(fields(json!({ "email": "x@example.com" }))).unwrap_err();

		match err {
			ServiceError::InvalidForm { errors, input } => {
				assert!(errors.contains_key(NON_FIELD_ERRORS));
				assert_eq!(input["email"], "x@example.com");
			}
			other => panic!("unexpected error {other:?}"),
		}
	}

	#[test]
	fn test_wrong_field_type_is_a_form_error() {
		let err = DetailSubmission::from_fields(fields(json!({ "author": 12, "content": "hi" }))).unwrap_err();
		assert!(matches!(err, ServiceError::InvalidForm { .. }));
	}
}
