use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::account::{Session, User};
use crate::domain::contact::{ContactMessage, SubmitContact};
use crate::domain::engagement::{BookmarkEntry, EngagementKind, ToggleState};
use crate::domain::post::commands::SubmitComment;
use crate::domain::post::entity::{Category, Comment, Post, PostSummary};
use crate::domain::post::PostFilter;
use crate::services::response::ServiceError;

use super::ContentStore;

/// Fields of a post as an authoring tool would create it.
#[derive(Debug, Clone)]
pub struct PostSeed {
	pub slug: String,
	pub title: String,
	pub content: String,
	pub excerpt: String,
	pub category_id: i64,
	pub is_published: bool,
	pub views: i64,
}

impl PostSeed {
	pub fn published(
		slug: &str,
		title: &str,
		category_id: i64,
	) -> Self {
		Self {
			slug: slug.to_string(),
			title: title.to_string(),
			content: format!("Content of {title}"),
			excerpt: format!("About {title}"),
			category_id,
			is_published: true,
			views: 0,
		}
	}

	pub fn draft(mut self) -> Self {
		self.is_published = false;
		self
	}

	pub fn views(
		mut self,
		views: i64,
	) -> Self {
		self.views = views;
		self
	}
}

// (post_id, user_id) -> created at
type Pairs = BTreeMap<(i64, i64), DateTime<Utc>>;

#[derive(Default)]
struct Tables {
	last_id: i64,
	categories: Vec<Category>,
	posts: Vec<Post>,
	comments: Vec<Comment>,
	likes: Pairs,
	bookmarks: Pairs,
	contact_messages: Vec<ContactMessage>,
	users: Vec<User>,
	sessions: HashMap<Uuid, Session>,
}

impl Tables {
	fn next_id(&mut self) -> i64 {
		self.last_id += 1;
		self.last_id
	}

	fn pairs(
		&self,
		kind: EngagementKind,
	) -> &Pairs {
		match kind {
			EngagementKind::Like => &self.likes,
			EngagementKind::Bookmark => &self.bookmarks,
		}
	}

	fn pairs_mut(
		&mut self,
		kind: EngagementKind,
	) -> &mut Pairs {
		match kind {
			EngagementKind::Like => &mut self.likes,
			EngagementKind::Bookmark => &mut self.bookmarks,
		}
	}

	fn category(
		&self,
		id: i64,
	) -> Option<&Category> {
		self.categories.iter().find(|category| category.id == id)
	}

	fn summary(
		&self,
		post: &Post,
	) -> Option<PostSummary> {
		let category = self.category(post.category_id)?;
		Some(PostSummary {
			id: post.id,
			slug: post.slug.clone(),
			title: post.title.clone(),
			excerpt: post.excerpt.clone(),
			category_slug: category.slug.clone(),
			category_name: category.name.clone(),
			views: post.views,
			create_dt: post.create_dt,
			like_count: self.likes.keys().filter(|(post_id, _)| *post_id == post.id).count() as i64,
			comment_count: self
				.comments
				.iter()
				.filter(|comment| comment.post_id == post.id && comment.is_approved)
				.count() as i64,
		})
	}

	fn published_matching(
		&self,
		filter: &PostFilter,
	) -> Vec<&Post> {
		let mut posts: Vec<&Post> = self
			.posts
			.iter()
			.filter(|post| post.is_published)
			.filter(|post| match self.category(post.category_id) {
				Some(category) => filter.matches(post, category),
				None => false,
			})
			.collect();
		posts.sort_by(|a, b| b.create_dt.cmp(&a.create_dt).then(b.id.cmp(&a.id)));
		posts
	}
}

/// Store kept in process memory. One lock guards every table, so each call
/// is atomic with respect to the others.
#[derive(Default)]
pub struct InMemoryRepository {
	tables: Mutex<Tables>,
}

impl InMemoryRepository {
	pub fn new() -> Self {
		Self::default()
	}

	pub async fn add_category(
		&self,
		slug: &str,
		name: &str,
	) -> Category {
		let mut tables = self.tables.lock().await;
		let category = Category {
			id: tables.next_id(),
			slug: slug.to_string(),
			name: name.to_string(),
		};
		tables.categories.push(category.clone());
		category
	}

	pub async fn add_post(
		&self,
		seed: PostSeed,
	) -> Post {
		let mut tables = self.tables.lock().await;
		let post = Post {
			id: tables.next_id(),
			slug: seed.slug,
			title: seed.title,
			content: seed.content,
			excerpt: seed.excerpt,
			category_id: seed.category_id,
			is_published: seed.is_published,
			views: seed.views,
			create_dt: Utc::now(),
		};
		tables.posts.push(post.clone());
		post
	}

	/// Every comment on a post, approved or not.
	pub async fn all_comments(
		&self,
		post_id: i64,
	) -> Vec<Comment> {
		let tables = self.tables.lock().await;
		tables.comments.iter().filter(|comment| comment.post_id == post_id).cloned().collect()
	}

	pub async fn contact_messages(&self) -> Vec<ContactMessage> {
		self.tables.lock().await.contact_messages.clone()
	}

	/// Number of stored rows of a kind across all posts.
	pub async fn engagement_rows(
		&self,
		kind: EngagementKind,
	) -> usize {
		self.tables.lock().await.pairs(kind).len()
	}

	pub async fn views(
		&self,
		post_id: i64,
	) -> Option<i64> {
		let tables = self.tables.lock().await;
		tables.posts.iter().find(|post| post.id == post_id).map(|post| post.views)
	}
}

#[async_trait]
impl ContentStore for InMemoryRepository {
	async fn categories(&self) -> Result<Vec<Category>, ServiceError> {
		let mut categories = self.tables.lock().await.categories.clone();
		categories.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
		Ok(categories)
	}

	async fn category_by_slug(
		&self,
		slug: &str,
	) -> Result<Option<Category>, ServiceError> {
		let tables = self.tables.lock().await;
		Ok(tables.categories.iter().find(|category| category.slug == slug).cloned())
	}

	async fn category_by_id(
		&self,
		id: i64,
	) -> Result<Option<Category>, ServiceError> {
		Ok(self.tables.lock().await.category(id).cloned())
	}

	async fn count_published(
		&self,
		filter: &PostFilter,
	) -> Result<i64, ServiceError> {
		Ok(self.tables.lock().await.published_matching(filter).len() as i64)
	}

	async fn published_posts(
		&self,
		filter: &PostFilter,
		limit: i64,
		offset: i64,
	) -> Result<Vec<PostSummary>, ServiceError> {
		let tables = self.tables.lock().await;
		Ok(tables
			.published_matching(filter)
			.into_iter()
			.skip(offset.max(0) as usize)
			.take(limit.max(0) as usize)
			.filter_map(|post| tables.summary(post))
			.collect())
	}

	async fn popular_posts(
		&self,
		limit: i64,
	) -> Result<Vec<PostSummary>, ServiceError> {
		let tables = self.tables.lock().await;
		let mut posts: Vec<&Post> = tables.posts.iter().filter(|post| post.is_published).collect();
		posts.sort_by(|a, b| b.views.cmp(&a.views).then(a.id.cmp(&b.id)));
		Ok(posts
			.into_iter()
			.filter_map(|post| tables.summary(post))
			.take(limit.max(0) as usize)
			.collect())
	}

	async fn published_post_by_slug(
		&self,
		slug: &str,
	) -> Result<Option<Post>, ServiceError> {
		let tables = self.tables.lock().await;
		Ok(tables.posts.iter().find(|post| post.slug == slug && post.is_published).cloned())
	}

	async fn published_post_by_id(
		&self,
		id: i64,
	) -> Result<Option<Post>, ServiceError> {
		let tables = self.tables.lock().await;
		Ok(tables.posts.iter().find(|post| post.id == id && post.is_published).cloned())
	}

	async fn increment_views(
		&self,
		post_id: i64,
	) -> Result<Option<i64>, ServiceError> {
		let mut tables = self.tables.lock().await;
		Ok(tables.posts.iter_mut().find(|post| post.id == post_id).map(|post| {
			post.views += 1;
			post.views
		}))
	}

	async fn toggle_engagement(
		&self,
		kind: EngagementKind,
		post_id: i64,
		user_id: i64,
	) -> Result<ToggleState, ServiceError> {
		let mut tables = self.tables.lock().await;
		let pairs = tables.pairs_mut(kind);
		if pairs.remove(&(post_id, user_id)).is_some() {
			Ok(ToggleState::Removed)
		} else {
			pairs.insert((post_id, user_id), Utc::now());
			Ok(ToggleState::Added)
		}
	}

	async fn has_engagement(
		&self,
		kind: EngagementKind,
		post_id: i64,
		user_id: i64,
	) -> Result<bool, ServiceError> {
		Ok(self.tables.lock().await.pairs(kind).contains_key(&(post_id, user_id)))
	}

	async fn engagement_count(
		&self,
		kind: EngagementKind,
		post_id: i64,
	) -> Result<i64, ServiceError> {
		let tables = self.tables.lock().await;
		Ok(tables.pairs(kind).keys().filter(|(id, _)| *id == post_id).count() as i64)
	}

	async fn bookmarks_for_user(
		&self,
		user_id: i64,
	) -> Result<Vec<BookmarkEntry>, ServiceError> {
		let tables = self.tables.lock().await;
		let mut entries: Vec<BookmarkEntry> = tables
			.bookmarks
			.iter()
			.filter(|((_, owner), _)| *owner == user_id)
			.filter_map(|((post_id, _), bookmarked_at)| {
				let post = tables.posts.iter().find(|post| post.id == *post_id && post.is_published)?;
				Some(BookmarkEntry {
					post: tables.summary(post)?,
					bookmarked_at: *bookmarked_at,
				})
			})
			.collect();
		entries.sort_by(|a, b| b.bookmarked_at.cmp(&a.bookmarked_at).then(b.post.id.cmp(&a.post.id)));
		Ok(entries)
	}

	async fn insert_comment(
		&self,
		post_id: i64,
		comment: &SubmitComment,
	) -> Result<Comment, ServiceError> {
		let mut tables = self.tables.lock().await;
		let comment = Comment {
			id: tables.next_id(),
			post_id,
			author: comment.author.clone(),
			email: comment.email.clone(),
			content: comment.content.clone(),
			is_approved: false,
			create_dt: Utc::now(),
		};
		tables.comments.push(comment.clone());
		Ok(comment)
	}

	async fn approved_comments(
		&self,
		post_id: i64,
	) -> Result<Vec<Comment>, ServiceError> {
		let tables = self.tables.lock().await;
		Ok(tables
			.comments
			.iter()
			.filter(|comment| comment.post_id == post_id && comment.is_approved)
			.cloned()
			.collect())
	}

	async fn approve_comment(
		&self,
		comment_id: i64,
	) -> Result<bool, ServiceError> {
		let mut tables = self.tables.lock().await;
		match tables.comments.iter_mut().find(|comment| comment.id == comment_id) {
			Some(comment) => {
				comment.is_approved = true;
				Ok(true)
			}
			None => Ok(false),
		}
	}

	async fn insert_contact_message(
		&self,
		message: &SubmitContact,
	) -> Result<ContactMessage, ServiceError> {
		let mut tables = self.tables.lock().await;
		let message = ContactMessage {
			id: tables.next_id(),
			name: message.name.clone(),
			email: message.email.clone(),
			subject: message.subject.clone(),
			message: message.message.clone(),
			create_dt: Utc::now(),
		};
		tables.contact_messages.push(message.clone());
		Ok(message)
	}

	async fn insert_user(
		&self,
		username: &str,
		password_hash: &str,
	) -> Result<Option<User>, ServiceError> {
		let mut tables = self.tables.lock().await;
		if tables.users.iter().any(|user| user.username == username) {
			return Ok(None);
		}
		let user = User {
			id: tables.next_id(),
			username: username.to_string(),
			password_hash: password_hash.to_string(),
			create_dt: Utc::now(),
		};
		tables.users.push(user.clone());
		Ok(Some(user))
	}

	async fn user_by_username(
		&self,
		username: &str,
	) -> Result<Option<User>, ServiceError> {
		let tables = self.tables.lock().await;
		Ok(tables.users.iter().find(|user| user.username == username).cloned())
	}

	async fn insert_session(
		&self,
		session: &Session,
	) -> Result<(), ServiceError> {
		self.tables.lock().await.sessions.insert(session.token, session.clone());
		Ok(())
	}

	async fn session_user(
		&self,
		token: Uuid,
		now: DateTime<Utc>,
	) -> Result<Option<User>, ServiceError> {
		let tables = self.tables.lock().await;
		Ok(tables
			.sessions
			.get(&token)
			.filter(|session| session.expires_at > now)
			.and_then(|session| tables.users.iter().find(|user| user.id == session.user_id))
			.cloned())
	}

	async fn delete_session(
		&self,
		token: Uuid,
	) -> Result<(), ServiceError> {
		self.tables.lock().await.sessions.remove(&token);
		Ok(())
	}
}

#[cfg(test)]
mod test {
	use std::sync::Arc;

	use futures::future::join_all;

	use super::*;

	#[tokio::test]
	async fn test_concurrent_toggles_never_duplicate_a_pair() {
		'_given: {
			let store = Arc::new(InMemoryRepository::new());
			let category = store.add_category("rust", "Rust").await;
			let post_id = store.add_post(PostSeed::published("p", "P", category.id)).await.id;

			'_when: {
				let toggles = (0..10).map(|_| {
					let store = store.clone();
					tokio::spawn(async move { store.toggle_engagement(EngagementKind::Like, post_id, 7).await })
				});
				let states: Vec<ToggleState> =
					join_all(toggles).await.into_iter().map(|joined| joined.unwrap().unwrap()).collect();

				'_then: {
					let added = states.iter().filter(|state| **state == ToggleState::Added).count();
					assert_eq!(added, 5);
					assert_eq!(store.engagement_rows(EngagementKind::Like).await, 0);
				}
			}
		}
	}

	#[tokio::test]
	async fn test_like_and_bookmark_are_independent() {
		let store = InMemoryRepository::new();
		let category = store.add_category("rust", "Rust").await;
		let post = store.add_post(PostSeed::published("p", "P", category.id)).await;

		store.toggle_engagement(EngagementKind::Like, post.id, 1).await.unwrap();

		assert!(store.has_engagement(EngagementKind::Like, post.id, 1).await.unwrap());
		assert!(!store.has_engagement(EngagementKind::Bookmark, post.id, 1).await.unwrap());
		assert_eq!(store.engagement_count(EngagementKind::Like, post.id).await.unwrap(), 1);
	}

	#[tokio::test]
	async fn test_expired_session_has_no_user() {
		let store = InMemoryRepository::new();
		let user = store.insert_user("ann", "hash").await.unwrap().unwrap();
		let session = Session::issue(user.id, chrono::Duration::hours(1));
		store.insert_session(&session).await.unwrap();

		assert_eq!(store.session_user(session.token, Utc::now()).await.unwrap(), Some(user));
		let later = Utc::now() + chrono::Duration::hours(2);
		assert_eq!(store.session_user(session.token, later).await.unwrap(), None);
	}

	#[tokio::test]
	async fn test_duplicate_username_is_refused() {
		let store = InMemoryRepository::new();
		assert!(store.insert_user("ann", "hash").await.unwrap().is_some());
		assert!(store.insert_user("ann", "other").await.unwrap().is_none());
	}
}
