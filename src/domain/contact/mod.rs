use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::services::validation::FormInput;

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct ContactMessage {
	pub id: i64,
	pub name: String,
	pub email: String,
	pub subject: String,
	pub message: String,
	pub create_dt: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct SubmitContact {
	#[validate(length(max = 100, message = "Ensure this value has at most 100 characters."))]
	pub name: String,
	#[validate(
		email(message = "Enter a valid email address."),
		length(max = 254, message = "Ensure this value has at most 254 characters.")
	)]
	pub email: String,
	#[validate(length(max = 200, message = "Ensure this value has at most 200 characters."))]
	pub subject: String,
	#[validate(length(max = 5000, message = "Ensure this value has at most 5000 characters."))]
	pub message: String,
}

impl FormInput for SubmitContact {
	fn required(&self) -> Vec<(&'static str, &str)> {
		vec![
			("name", &self.name),
			("email", &self.email),
			("subject", &self.subject),
			("message", &self.message),
		]
	}
}
