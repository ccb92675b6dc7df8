use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::account::{Session, User};
use crate::domain::contact::{ContactMessage, SubmitContact};
use crate::domain::engagement::{BookmarkEntry, EngagementKind, ToggleState};
use crate::domain::post::commands::SubmitComment;
use crate::domain::post::entity::{Category, Comment, Post, PostSummary};
use crate::domain::post::PostFilter;
use crate::services::response::ServiceError;

use super::ContentStore;

const SUMMARY_COLUMNS: &str = r#"
	p.id, p.slug, p.title, p.excerpt, p.views, p.create_dt,
	c.slug AS category_slug, c.name AS category_name,
	(SELECT COUNT(*) FROM likes l WHERE l.post_id = p.id) AS like_count,
	(SELECT COUNT(*) FROM comments m WHERE m.post_id = p.id AND m.is_approved) AS comment_count
"#;

// $1: category id, $2: ILIKE pattern; both optional.
const PUBLISHED_FILTER: &str = r#"
	p.is_published
	AND ($1::BIGINT IS NULL OR p.category_id = $1)
	AND (
		$2::TEXT IS NULL
		OR p.title ILIKE $2 ESCAPE '\'
		OR p.content ILIKE $2 ESCAPE '\'
		OR p.excerpt ILIKE $2 ESCAPE '\'
		OR c.name ILIKE $2 ESCAPE '\'
	)
"#;

const POST_COLUMNS: &str = "id, slug, title, content, excerpt, category_id, is_published, views, create_dt";

/// Postgres-backed store.
#[derive(Clone)]
pub struct PostRepository {
	pool: PgPool,
}

impl PostRepository {
	pub fn new(pool: PgPool) -> Self {
		Self { pool }
	}
}

#[derive(sqlx::FromRow)]
struct BookmarkRow {
	#[sqlx(flatten)]
	post: PostSummary,
	bookmarked_at: DateTime<Utc>,
}

#[async_trait]
impl ContentStore for PostRepository {
	async fn categories(&self) -> Result<Vec<Category>, ServiceError> {
		let categories = sqlx::query_as::<_, Category>("SELECT id, slug, name FROM categories ORDER BY name, id")
			.fetch_all(&self.pool)
			.await?;
		Ok(categories)
	}

	async fn category_by_slug(
		&self,
		slug: &str,
	) -> Result<Option<Category>, ServiceError> {
		let category = sqlx::query_as::<_, Category>("SELECT id, slug, name FROM categories WHERE slug = $1")
			.bind(slug)
			.fetch_optional(&self.pool)
			.await?;
		Ok(category)
	}

	async fn category_by_id(
		&self,
		id: i64,
	) -> Result<Option<Category>, ServiceError> {
		let category = sqlx::query_as::<_, Category>("SELECT id, slug, name FROM categories WHERE id = $1")
			.bind(id)
			.fetch_optional(&self.pool)
			.await?;
		Ok(category)
	}

	async fn count_published(
		&self,
		filter: &PostFilter,
	) -> Result<i64, ServiceError> {
		let sql = format!("SELECT COUNT(*) FROM posts p JOIN categories c ON c.id = p.category_id WHERE {PUBLISHED_FILTER}");
		let count: i64 = sqlx::query_scalar(&sql)
			.bind(filter.category_id)
			.bind(filter.like_pattern())
			.fetch_one(&self.pool)
			.await?;
		Ok(count)
	}

	async fn published_posts(
		&self,
		filter: &PostFilter,
		limit: i64,
		offset: i64,
	) -> Result<Vec<PostSummary>, ServiceError> {
		let sql = format!(
			"SELECT {SUMMARY_COLUMNS} FROM posts p JOIN categories c ON c.id = p.category_id
			WHERE {PUBLISHED_FILTER}
			ORDER BY p.create_dt DESC, p.id DESC
			LIMIT $3 OFFSET $4"
		);
		let posts = sqlx::query_as::<_, PostSummary>(&sql)
			.bind(filter.category_id)
			.bind(filter.like_pattern())
			.bind(limit)
			.bind(offset)
			.fetch_all(&self.pool)
			.await?;
		Ok(posts)
	}

	async fn popular_posts(
		&self,
		limit: i64,
	) -> Result<Vec<PostSummary>, ServiceError> {
		let sql = format!(
			"SELECT {SUMMARY_COLUMNS} FROM posts p JOIN categories c ON c.id = p.category_id
			WHERE p.is_published
			ORDER BY p.views DESC, p.id ASC
			LIMIT $1"
		);
		let posts = sqlx::query_as::<_, PostSummary>(&sql).bind(limit).fetch_all(&self.pool).await?;
		Ok(posts)
	}

	async fn published_post_by_slug(
		&self,
		slug: &str,
	) -> Result<Option<Post>, ServiceError> {
		let sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE slug = $1 AND is_published");
		let post = sqlx::query_as::<_, Post>(&sql).bind(slug).fetch_optional(&self.pool).await?;
		Ok(post)
	}

	async fn published_post_by_id(
		&self,
		id: i64,
	) -> Result<Option<Post>, ServiceError> {
		let sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE id = $1 AND is_published");
		let post = sqlx::query_as::<_, Post>(&sql).bind(id).fetch_optional(&self.pool).await?;
		Ok(post)
	}

	async fn increment_views(
		&self,
		post_id: i64,
	) -> Result<Option<i64>, ServiceError> {
		let views: Option<i64> = sqlx::query_scalar("UPDATE posts SET views = views + 1 WHERE id = $1 RETURNING views")
			.bind(post_id)
			.fetch_optional(&self.pool)
			.await?;
		Ok(views)
	}

	async fn toggle_engagement(
		&self,
		kind: EngagementKind,
		post_id: i64,
		user_id: i64,
	) -> Result<ToggleState, ServiceError> {
		let table = kind.table();
		let mut trx = self.pool.begin().await?;

		let insert = format!(
			"INSERT INTO {table} (post_id, user_id) VALUES ($1, $2)
			ON CONFLICT (post_id, user_id) DO NOTHING
			RETURNING post_id"
		);
		let inserted: Option<i64> = sqlx::query_scalar(&insert)
			.bind(post_id)
			.bind(user_id)
			.fetch_optional(&mut *trx)
			.await?;

		let state = if inserted.is_some() {
			ToggleState::Added
		} else {
			let delete = format!("DELETE FROM {table} WHERE post_id = $1 AND user_id = $2");
			let deleted = sqlx::query(&delete).bind(post_id).bind(user_id).execute(&mut *trx).await?;
			if deleted.rows_affected() == 0 {
				// A concurrent toggle removed the row between our insert and delete.
				tracing::debug!(?kind, post_id, user_id, "toggle raced with another request, treating as removed");
			}
			ToggleState::Removed
		};

		trx.commit().await?;
		Ok(state)
	}

	async fn has_engagement(
		&self,
		kind: EngagementKind,
		post_id: i64,
		user_id: i64,
	) -> Result<bool, ServiceError> {
		let sql = format!(
			"SELECT EXISTS(SELECT 1 FROM {} WHERE post_id = $1 AND user_id = $2)",
			kind.table()
		);
		let exists: bool = sqlx::query_scalar(&sql).bind(post_id).bind(user_id).fetch_one(&self.pool).await?;
		Ok(exists)
	}

	async fn engagement_count(
		&self,
		kind: EngagementKind,
		post_id: i64,
	) -> Result<i64, ServiceError> {
		let sql = format!("SELECT COUNT(*) FROM {} WHERE post_id = $1", kind.table());
		let count: i64 = sqlx::query_scalar(&sql).bind(post_id).fetch_one(&self.pool).await?;
		Ok(count)
	}

	async fn bookmarks_for_user(
		&self,
		user_id: i64,
	) -> Result<Vec<BookmarkEntry>, ServiceError> {
		let sql = format!(
			"SELECT {SUMMARY_COLUMNS}, b.create_dt AS bookmarked_at
			FROM bookmarks b
			JOIN posts p ON p.id = b.post_id
			JOIN categories c ON c.id = p.category_id
			WHERE b.user_id = $1 AND p.is_published
			ORDER BY b.create_dt DESC, p.id DESC"
		);
		let rows = sqlx::query_as::<_, BookmarkRow>(&sql).bind(user_id).fetch_all(&self.pool).await?;
		Ok(rows
			.into_iter()
			.map(|row| BookmarkEntry {
				post: row.post,
				bookmarked_at: row.bookmarked_at,
			})
			.collect())
	}

	async fn insert_comment(
		&self,
		post_id: i64,
		comment: &SubmitComment,
	) -> Result<Comment, ServiceError> {
		let comment = sqlx::query_as::<_, Comment>(
			r#"
			INSERT INTO comments (post_id, author, email, content, is_approved)
			VALUES ($1, $2, $3, $4, FALSE)
			RETURNING id, post_id, author, email, content, is_approved, create_dt
			"#,
		)
		.bind(post_id)
		.bind(&comment.author)
		.bind(&comment.email)
		.bind(&comment.content)
		.fetch_one(&self.pool)
		.await?;
		Ok(comment)
	}

	async fn approved_comments(
		&self,
		post_id: i64,
	) -> Result<Vec<Comment>, ServiceError> {
		let comments = sqlx::query_as::<_, Comment>(
			r#"
			SELECT id, post_id, author, email, content, is_approved, create_dt
			FROM comments
			WHERE post_id = $1 AND is_approved
			ORDER BY create_dt, id
			"#,
		)
		.bind(post_id)
		.fetch_all(&self.pool)
		.await?;
		Ok(comments)
	}

	async fn approve_comment(
		&self,
		comment_id: i64,
	) -> Result<bool, ServiceError> {
		let result = sqlx::query("UPDATE comments SET is_approved = TRUE WHERE id = $1")
			.bind(comment_id)
			.execute(&self.pool)
			.await?;
		Ok(result.rows_affected() > 0)
	}

	async fn insert_contact_message(
		&self,
		message: &SubmitContact,
	) -> Result<ContactMessage, ServiceError> {
		let message = sqlx::query_as::<_, ContactMessage>(
			r#"
			INSERT INTO contact_messages (name, email, subject, message)
			VALUES ($1, $2, $3, $4)
			RETURNING id, name, email, subject, message, create_dt
			"#,
		)
		.bind(&message.name)
		.bind(&message.email)
		.bind(&message.subject)
		.bind(&message.message)
		.fetch_one(&self.pool)
		.await?;
		Ok(message)
	}

	async fn insert_user(
		&self,
		username: &str,
		password_hash: &str,
	) -> Result<Option<User>, ServiceError> {
		let user = sqlx::query_as::<_, User>(
			r#"
			INSERT INTO users (username, password_hash)
			VALUES ($1, $2)
			ON CONFLICT (username) DO NOTHING
			RETURNING id, username, password_hash, create_dt
			"#,
		)
		.bind(username)
		.bind(password_hash)
		.fetch_optional(&self.pool)
		.await?;
		Ok(user)
	}

	async fn user_by_username(
		&self,
		username: &str,
	) -> Result<Option<User>, ServiceError> {
		let user = sqlx::query_as::<_, User>("SELECT id, username, password_hash, create_dt FROM users WHERE username = $1")
			.bind(username)
			.fetch_optional(&self.pool)
			.await?;
		Ok(user)
	}

	async fn insert_session(
		&self,
		session: &Session,
	) -> Result<(), ServiceError> {
		sqlx::query("INSERT INTO sessions (token, user_id, expires_at) VALUES ($1, $2, $3)")
			.bind(session.token)
			.bind(session.user_id)
			.bind(session.expires_at)
			.execute(&self.pool)
			.await?;
		Ok(())
	}

	async fn session_user(
		&self,
		token: Uuid,
		now: DateTime<Utc>,
	) -> Result<Option<User>, ServiceError> {
		let user = sqlx::query_as::<_, User>(
			r#"
			SELECT u.id, u.username, u.password_hash, u.create_dt
			FROM sessions s JOIN users u ON u.id = s.user_id
			WHERE s.token = $1 AND s.expires_at > $2
			"#,
		)
		.bind(token)
		.bind(now)
		.fetch_optional(&self.pool)
		.await?;
		Ok(user)
	}

	async fn delete_session(
		&self,
		token: Uuid,
	) -> Result<(), ServiceError> {
		sqlx::query("DELETE FROM sessions WHERE token = $1").bind(token).execute(&self.pool).await?;
		Ok(())
	}
}
