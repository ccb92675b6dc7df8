use argon2::{
	password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
	Argon2,
};
use chrono::Duration;
use uuid::Uuid;

use crate::{
	adapters::repositories::ContentStore,
	domain::account::{LoginForm, RegisterForm, Session, User},
};

use super::{
	response::ServiceError,
	validation::{validate_form, FieldErrors, NON_FIELD_ERRORS},
};

pub struct AccountHandler;
impl AccountHandler {
	/// Creates the account and signs it in.
	pub async fn register(
		store: &dyn ContentStore,
		form: RegisterForm,
		ttl: Duration,
	) -> Result<(User, Session), ServiceError> {
		validate_form(&form)?;
		let password_hash = hash_password(&form.password1)?;

		let Some(user) = store.insert_user(&form.username, &password_hash).await? else {
			let mut errors = FieldErrors::new();
			errors.insert("username".to_string(), vec!["A user with that username already exists.".to_string()]);
			return Err(ServiceError::invalid_form(errors, &form));
		};
		tracing::info!(user_id = user.id, "user registered");

		let session = Self::open_session(store, &user, ttl).await?;
		Ok((user, session))
	}

	pub async fn login(
		store: &dyn ContentStore,
		form: LoginForm,
		ttl: Duration,
	) -> Result<(User, Session), ServiceError> {
		validate_form(&form)?;

		let user = store
			.user_by_username(&form.username)
			.await?
			.filter(|user| verify_password(&form.password, &user.password_hash));
		let Some(user) = user else {
			tracing::info!(username = %form.username, "login rejected");
			let mut errors = FieldErrors::new();
			errors.insert(
				NON_FIELD_ERRORS.to_string(),
				vec!["Please enter a correct username and password.".to_string()],
			);
			return Err(ServiceError::invalid_form(errors, &form));
		};

		let session = Self::open_session(store, &user, ttl).await?;
		Ok((user, session))
	}

	pub async fn logout(
		store: &dyn ContentStore,
		token: Uuid,
	) -> Result<(), ServiceError> {
		store.delete_session(token).await
	}

	async fn open_session(
		store: &dyn ContentStore,
		user: &User,
		ttl: Duration,
	) -> Result<Session, ServiceError> {
		let session = Session::issue(user.id, ttl);
		store.insert_session(&session).await?;
		tracing::debug!(user_id = user.id, "session opened");
		Ok(session)
	}
}

fn hash_password(password: &str) -> Result<String, ServiceError> {
	let salt = SaltString::generate(&mut OsRng);
	let hash = Argon2::default()
		.hash_password(password.as_bytes(), &salt)
		.map_err(|err| ServiceError::Hashing(err.to_string()))?;
	Ok(hash.to_string())
}

fn verify_password(
	password: &str,
	hash: &str,
) -> bool {
	match PasswordHash::new(hash) {
		Ok(parsed) => Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok(),
		Err(err) => {
			tracing::error!("Stored password hash is unreadable: {}", err);
			false
		}
	}
}
