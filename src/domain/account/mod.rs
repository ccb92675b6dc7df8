use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::services::validation::{FieldErrors, FormInput};

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
	pub id: i64,
	pub username: String,
	#[serde(skip_serializing)]
	pub password_hash: String,
	pub create_dt: DateTime<Utc>,
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Session {
	pub token: Uuid,
	pub user_id: i64,
	pub expires_at: DateTime<Utc>,
}

impl Session {
	pub fn issue(
		user_id: i64,
		ttl: Duration,
	) -> Self {
		Self {
			token: Uuid::new_v4(),
			user_id,
			expires_at: Utc::now() + ttl,
		}
	}
}

pub const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Clone, Debug, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct RegisterForm {
	#[validate(length(max = 150, message = "Ensure this value has at most 150 characters."))]
	pub username: String,
	#[serde(skip_serializing)]
	pub password1: String,
	#[serde(skip_serializing)]
	pub password2: String,
}

impl FormInput for RegisterForm {
	fn required(&self) -> Vec<(&'static str, &str)> {
		vec![
			("username", &self.username),
			("password1", &self.password1),
			("password2", &self.password2),
		]
	}

	fn extra_errors(&self) -> FieldErrors {
		let mut errors = FieldErrors::new();
		let valid_username = self
			.username
			.chars()
			.all(|ch| ch.is_alphanumeric() || matches!(ch, '@' | '.' | '+' | '-' | '_'));
		if !valid_username {
			errors.entry("username".to_string()).or_default().push(
				"Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.".to_string(),
			);
		}

		if self.password1.is_empty() || self.password2.is_empty() {
			return errors;
		}
		if self.password1 != self.password2 {
			errors
				.entry("password2".to_string())
				.or_default()
				.push("The two password fields didn't match.".to_string());
			return errors;
		}
		let password_errors = errors.entry("password2".to_string()).or_default();
		if self.password1.chars().count() < MIN_PASSWORD_LENGTH {
			password_errors.push(format!(
				"This password is too short. It must contain at least {MIN_PASSWORD_LENGTH} characters."
			));
		}
		if self.password1.chars().all(|ch| ch.is_ascii_digit()) {
			password_errors.push("This password is entirely numeric.".to_string());
		}
		errors.retain(|_, messages| !messages.is_empty());
		errors
	}
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct LoginForm {
	pub username: String,
	#[serde(skip_serializing)]
	pub password: String,
}

impl FormInput for LoginForm {
	fn required(&self) -> Vec<(&'static str, &str)> {
		vec![("username", &self.username), ("password", &self.password)]
	}
}

#[cfg(test)]
mod test {
	use super::*;

	fn register(username: &str, password1: &str, password2: &str) -> RegisterForm {
		RegisterForm {
			username: username.into(),
			password1: password1.into(),
			password2: password2.into(),
		}
	}

	#[test]
	fn test_valid_registration_has_no_extra_errors() {
		assert!(register("ann.o+blog@x", "correct horse", "correct horse").extra_errors().is_empty());
	}

	#[test]
	fn test_password_rules() {
		let errors = register("ann", "123", "1234").extra_errors();
		assert_eq!(errors["password2"], vec!["The two password fields didn't match.".to_string()]);

		let errors = register("ann", "1234", "1234").extra_errors();
		assert_eq!(errors["password2"].len(), 2);
	}

	#[test]
	fn test_username_charset() {
		let errors = register("ann smith", "correct horse", "correct horse").extra_errors();
		assert!(errors.contains_key("username"));
	}

	#[test]
	fn test_password_never_serialized() {
		let body = serde_json::to_value(register("ann", "secret-pass", "secret-pass")).unwrap();
		assert_eq!(body, serde_json::json!({ "username": "ann" }));
	}
}
