use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, PartialEq, Eq, Debug, Hash, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
	pub id: i64,
	pub slug: String,
	pub name: String,
}

#[derive(Clone, PartialEq, Eq, Debug, Hash, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
	pub id: i64,
	pub slug: String,
	pub title: String,
	pub content: String,
	pub excerpt: String,
	pub category_id: i64,
	pub is_published: bool,
	pub views: i64,
	pub create_dt: DateTime<Utc>,
}

/// Row shape of every listing: the post joined with its category and the
/// engagement counters shown on a card.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct PostSummary {
	pub id: i64,
	pub slug: String,
	pub title: String,
	pub excerpt: String,
	pub category_slug: String,
	pub category_name: String,
	pub views: i64,
	pub create_dt: DateTime<Utc>,
	pub like_count: i64,
	/// Approved comments only.
	pub comment_count: i64,
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
	pub id: i64,
	pub post_id: i64,
	pub author: String,
	#[serde(skip_serializing)]
	pub email: String,
	pub content: String,
	pub is_approved: bool,
	pub create_dt: DateTime<Utc>,
}
