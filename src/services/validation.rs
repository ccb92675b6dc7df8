use std::collections::BTreeMap;

use serde::Serialize;
use validator::{Validate, ValidationError};

use super::response::ServiceError;

/// Field name to the messages shown next to that field.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Key for errors that belong to the form as a whole.
pub const NON_FIELD_ERRORS: &str = "__all__";

const REQUIRED: &str = "This field is required.";

/// A submitted form: declarative rules come from `Validate`, the rest from
/// the two hooks below.
pub trait FormInput: Validate + Serialize {
	/// Fields that must not be blank, with their submitted values.
	fn required(&self) -> Vec<(&'static str, &str)>;

	fn extra_errors(&self) -> FieldErrors {
		FieldErrors::new()
	}
}

/// Runs every rule of the form. A blank required field reports only
/// "required"; format rules on that field are skipped.
pub fn validate_form<F: FormInput>(form: &F) -> Result<(), ServiceError> {
	let mut errors = FieldErrors::new();

	let blank: Vec<&str> = form
		.required()
		.into_iter()
		.filter(|(_, value)| value.trim().is_empty())
		.map(|(field, _)| field)
		.collect();
	for field in &blank {
		errors.insert(field.to_string(), vec![REQUIRED.to_string()]);
	}

	if let Err(validation) = form.validate() {
		for (field, field_errors) in validation.field_errors() {
			let field = field.to_string();
			if blank.contains(&field.as_str()) {
				continue;
			}
			errors
				.entry(field)
				.or_default()
				.extend(field_errors.iter().map(message_of));
		}
	}

	for (field, messages) in form.extra_errors() {
		if blank.contains(&field.as_str()) {
			continue;
		}
		errors.entry(field).or_default().extend(messages);
	}

	if errors.is_empty() {
		Ok(())
	} else {
		Err(ServiceError::invalid_form(errors, form))
	}
}

fn message_of(error: &ValidationError) -> String {
	match &error.message {
		Some(message) => message.to_string(),
		None => match &*error.code {
			"email" => "Enter a valid email address.".to_string(),
			"length" => "Ensure this value has a valid length.".to_string(),
			_ => "Enter a valid value.".to_string(),
		},
	}
}
