pub mod memory;
pub(crate) mod post_repository;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::account::{Session, User};
use crate::domain::contact::{ContactMessage, SubmitContact};
use crate::domain::engagement::{BookmarkEntry, EngagementKind, ToggleState};
use crate::domain::post::commands::SubmitComment;
use crate::domain::post::entity::{Category, Comment, Post, PostSummary};
use crate::domain::post::PostFilter;
use crate::services::response::ServiceError;

pub use memory::InMemoryRepository;
pub use post_repository::PostRepository;

/// Durable storage behind every request. Listing queries see published posts
/// only; `post_by_*` lookups return unpublished posts as `None` as well.
#[async_trait]
pub trait ContentStore: Send + Sync {
	async fn categories(&self) -> Result<Vec<Category>, ServiceError>;
	async fn category_by_slug(
		&self,
		slug: &str,
	) -> Result<Option<Category>, ServiceError>;
	async fn category_by_id(
		&self,
		id: i64,
	) -> Result<Option<Category>, ServiceError>;

	async fn count_published(
		&self,
		filter: &PostFilter,
	) -> Result<i64, ServiceError>;
	/// Newest first, ties by id.
	async fn published_posts(
		&self,
		filter: &PostFilter,
		limit: i64,
		offset: i64,
	) -> Result<Vec<PostSummary>, ServiceError>;
	/// Most viewed first, ties by id ascending.
	async fn popular_posts(
		&self,
		limit: i64,
	) -> Result<Vec<PostSummary>, ServiceError>;
	async fn published_post_by_slug(
		&self,
		slug: &str,
	) -> Result<Option<Post>, ServiceError>;
	async fn published_post_by_id(
		&self,
		id: i64,
	) -> Result<Option<Post>, ServiceError>;

	/// Atomic `views + 1`; returns the new count, `None` for an unknown post.
	async fn increment_views(
		&self,
		post_id: i64,
	) -> Result<Option<i64>, ServiceError>;

	/// Inserts the (post, user) pair if absent, deletes it otherwise, as one
	/// atomic step.
	async fn toggle_engagement(
		&self,
		kind: EngagementKind,
		post_id: i64,
		user_id: i64,
	) -> Result<ToggleState, ServiceError>;
	async fn has_engagement(
		&self,
		kind: EngagementKind,
		post_id: i64,
		user_id: i64,
	) -> Result<bool, ServiceError>;
	async fn engagement_count(
		&self,
		kind: EngagementKind,
		post_id: i64,
	) -> Result<i64, ServiceError>;
	/// Bookmarks on published posts, most recent first.
	async fn bookmarks_for_user(
		&self,
		user_id: i64,
	) -> Result<Vec<BookmarkEntry>, ServiceError>;

	/// Stores the comment unapproved.
	async fn insert_comment(
		&self,
		post_id: i64,
		comment: &SubmitComment,
	) -> Result<Comment, ServiceError>;
	async fn approved_comments(
		&self,
		post_id: i64,
	) -> Result<Vec<Comment>, ServiceError>;
	/// Entry point for moderation tooling; returns false for an unknown id.
	async fn approve_comment(
		&self,
		comment_id: i64,
	) -> Result<bool, ServiceError>;

	async fn insert_contact_message(
		&self,
		message: &SubmitContact,
	) -> Result<ContactMessage, ServiceError>;

	/// `None` when the username is already taken.
	async fn insert_user(
		&self,
		username: &str,
		password_hash: &str,
	) -> Result<Option<User>, ServiceError>;
	async fn user_by_username(
		&self,
		username: &str,
	) -> Result<Option<User>, ServiceError>;
	async fn insert_session(
		&self,
		session: &Session,
	) -> Result<(), ServiceError>;
	/// The owner of a session that has not expired at `now`.
	async fn session_user(
		&self,
		token: Uuid,
		now: DateTime<Utc>,
	) -> Result<Option<User>, ServiceError>;
	async fn delete_session(
		&self,
		token: Uuid,
	) -> Result<(), ServiceError>;
}
