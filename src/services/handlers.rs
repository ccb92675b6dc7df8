use serde::Serialize;

use crate::{
	adapters::repositories::ContentStore,
	domain::{
		contact::{ContactMessage, SubmitContact},
		engagement::{BookmarkEntry, EngagementKind, ToggleOutcome},
		post::{
			commands::SubmitComment,
			entity::{Category, Comment, Post, PostSummary},
			PostDetail, PostFilter, MAX_QUERY_LENGTH,
		},
	},
};

use super::{
	pagination::{Page, Paginator, PAGE_SIZE},
	response::ServiceError,
	validation::{validate_form, FieldErrors},
};

pub const POPULAR_POSTS: i64 = 5;

#[derive(Debug, Serialize)]
pub struct Listing {
	pub query: Option<String>,
	pub page_obj: Page<PostSummary>,
	pub popular_posts: Vec<PostSummary>,
}

#[derive(Debug, Serialize)]
pub struct CategoryListing {
	pub category: Category,
	pub page_obj: Page<PostSummary>,
}

pub struct PostHandler;
impl PostHandler {
	/// Home page: published posts, optionally searched, one page of them, plus
	/// the most viewed posts regardless of the search.
	pub async fn listing(
		store: &dyn ContentStore,
		query: Option<&str>,
		page: Option<&str>,
	) -> Result<Listing, ServiceError> {
		if let Some(query) = query {
			if query.chars().count() > MAX_QUERY_LENGTH {
				let mut errors = FieldErrors::new();
				errors.insert(
					"query".to_string(),
					vec![format!("Ensure this value has at most {MAX_QUERY_LENGTH} characters.")],
				);
				return Err(ServiceError::InvalidForm {
					errors,
					input: serde_json::json!({ "query": query }),
				});
			}
		}

		let filter = PostFilter::search(query);
		let page_obj = Self::paginate(store, &filter, page).await?;
		let popular_posts = store.popular_posts(POPULAR_POSTS).await?;
		tracing::debug!(query = ?filter.search, page = page_obj.number, "listing posts");

		Ok(Listing {
			query: filter.search,
			page_obj,
			popular_posts,
		})
	}

	pub async fn category_listing(
		store: &dyn ContentStore,
		slug: &str,
		page: Option<&str>,
	) -> Result<CategoryListing, ServiceError> {
		let category = store.category_by_slug(slug).await?.ok_or(ServiceError::NotFound("Category"))?;
		let page_obj = Self::paginate(store, &PostFilter::category(category.id), page).await?;
		Ok(CategoryListing { category, page_obj })
	}

	async fn paginate(
		store: &dyn ContentStore,
		filter: &PostFilter,
		page: Option<&str>,
	) -> Result<Page<PostSummary>, ServiceError> {
		let paginator = Paginator::new(store.count_published(filter).await?, PAGE_SIZE);
		let number = paginator.clamp(page);
		let items = store.published_posts(filter, paginator.limit(), paginator.offset(number)).await?;
		Ok(paginator.page(number, items))
	}

	/// Loads a published post and counts the visit. Every call is one view;
	/// repeated visits by the same reader are not deduplicated.
	pub async fn visit(
		store: &dyn ContentStore,
		slug: &str,
	) -> Result<Post, ServiceError> {
		let mut post = store.published_post_by_slug(slug).await?.ok_or(ServiceError::NotFound("Post"))?;
		post.views = Self::record_view(store, post.id).await?;
		Ok(post)
	}

	pub async fn record_view(
		store: &dyn ContentStore,
		post_id: i64,
	) -> Result<i64, ServiceError> {
		store.increment_views(post_id).await?.ok_or(ServiceError::NotFound("Post"))
	}

	/// Detail page context for an already visited post.
	pub async fn detail(
		store: &dyn ContentStore,
		post: Post,
		viewer: Option<i64>,
	) -> Result<PostDetail, ServiceError> {
		let category = store.category_by_id(post.category_id).await?.ok_or(ServiceError::NotFound("Category"))?;
		let comments = store.approved_comments(post.id).await?;
		let like_count = store.engagement_count(EngagementKind::Like, post.id).await?;
		let bookmark_count = store.engagement_count(EngagementKind::Bookmark, post.id).await?;

		let (user_liked, user_bookmarked) = match viewer {
			Some(user_id) => (
				store.has_engagement(EngagementKind::Like, post.id, user_id).await?,
				store.has_engagement(EngagementKind::Bookmark, post.id, user_id).await?,
			),
			None => (false, false),
		};

		Ok(PostDetail {
			post,
			category,
			comments,
			like_count,
			bookmark_count,
			user_liked,
			user_bookmarked,
		})
	}
}

pub struct EngagementHandler;
impl EngagementHandler {
	/// Flips the caller's like or bookmark on a published post.
	pub async fn toggle(
		store: &dyn ContentStore,
		post_id: i64,
		user_id: i64,
		kind: EngagementKind,
	) -> Result<(Post, ToggleOutcome), ServiceError> {
		let post = store.published_post_by_id(post_id).await?.ok_or(ServiceError::NotFound("Post"))?;
		let state = store.toggle_engagement(kind, post.id, user_id).await?;
		let count = store.engagement_count(kind, post.id).await?;
		tracing::info!(?kind, ?state, post_id, user_id, "engagement toggled");
		Ok((post, ToggleOutcome { kind, state, count }))
	}

	pub async fn bookmarks(
		store: &dyn ContentStore,
		user_id: i64,
	) -> Result<Vec<BookmarkEntry>, ServiceError> {
		store.bookmarks_for_user(user_id).await
	}
}

pub struct ModerationHandler;
impl ModerationHandler {
	/// Accepts a public comment. It is stored unapproved whoever sends it;
	/// only moderation makes it visible.
	pub async fn submit_comment(
		store: &dyn ContentStore,
		post_id: i64,
		form: SubmitComment,
	) -> Result<Comment, ServiceError> {
		let post = store.published_post_by_id(post_id).await?.ok_or(ServiceError::NotFound("Post"))?;
		validate_form(&form)?;
		let comment = store.insert_comment(post.id, &form).await?;
		tracing::info!(post_id, comment_id = comment.id, "comment submitted for review");
		Ok(comment)
	}
}

pub struct ContactHandler;
impl ContactHandler {
	pub async fn submit_message(
		store: &dyn ContentStore,
		form: SubmitContact,
	) -> Result<ContactMessage, ServiceError> {
		validate_form(&form)?;
		let message = store.insert_contact_message(&form).await?;
		tracing::info!(message_id = message.id, "contact message received");
		Ok(message)
	}
}

#[cfg(test)]
mod test {
	use std::sync::Arc;

	use futures::future::join_all;

	use crate::{
		adapters::repositories::{memory::PostSeed, InMemoryRepository},
		domain::engagement::ToggleState,
	};

	use super::*;

	async fn blog() -> (Arc<InMemoryRepository>, Category, Category) {
		let store = Arc::new(InMemoryRepository::new());
		let rust = store.add_category("rust", "Rust").await;
		let travel = store.add_category("travel", "Travel").await;
		(store, rust, travel)
	}

	fn comment() -> SubmitComment {
		SubmitComment {
			author: "Ann".into(),
			email: "ann@example.com".into(),
			content: "Great post".into(),
		}
	}

	#[tokio::test]
	async fn test_unpublished_posts_never_listed() {
		'_given: {
			let (store, rust, _) = blog().await;
			store.add_post(PostSeed::published("live", "Live ownership", rust.id)).await;
			store.add_post(PostSeed::published("draft", "Draft ownership", rust.id).draft().views(1000)).await;

			'_when: {
				let listing = PostHandler::listing(&*store, None, None).await.unwrap();
				let search = PostHandler::listing(&*store, Some("ownership"), None).await.unwrap();
				let category = PostHandler::category_listing(&*store, "rust", None).await.unwrap();

				'_then: {
					for page in [&listing.page_obj, &search.page_obj, &category.page_obj] {
						assert_eq!(page.total, 1);
						assert!(page.items.iter().all(|post| post.slug == "live"));
					}
					assert!(listing.popular_posts.iter().all(|post| post.slug == "live"));
					assert!(matches!(
						PostHandler::visit(&*store, "draft").await,
						Err(ServiceError::NotFound("Post"))
					));
				}
			}
		}
	}

	#[tokio::test]
	async fn test_search_matches_category_name() {
		let (store, rust, travel) = blog().await;
		store.add_post(PostSeed::published("lisbon", "Lisbon in spring", travel.id)).await;
		store.add_post(PostSeed::published("borrowck", "Borrow checker", rust.id)).await;

		let listing = PostHandler::listing(&*store, Some("travel"), None).await.unwrap();

		assert_eq!(listing.query.as_deref(), Some("travel"));
		assert_eq!(listing.page_obj.items.len(), 1);
		assert_eq!(listing.page_obj.items[0].slug, "lisbon");
	}

	#[tokio::test]
	async fn test_overlong_query_is_rejected() {
		let (store, _, _) = blog().await;
		let query = "q".repeat(MAX_QUERY_LENGTH + 1);

		let result = PostHandler::listing(&*store, Some(&query), None).await;

		assert!(matches!(result, Err(ServiceError::InvalidForm { errors, .. }) if errors.contains_key("query")));
	}

	#[tokio::test]
	async fn test_last_page_holds_remainder() {
		let (store, rust, _) = blog().await;
		let mut first = None;
		for n in 1..=13 {
			let post = store.add_post(PostSeed::published(&format!("post-{n}"), &format!("Post {n}"), rust.id)).await;
			first.get_or_insert(post.id);
		}

		let page3 = PostHandler::listing(&*store, None, Some("3")).await.unwrap().page_obj;
		let beyond = PostHandler::listing(&*store, None, Some("40")).await.unwrap().page_obj;

		assert_eq!(page3.number, 3);
		assert_eq!(page3.items.len(), 1);
		assert_eq!(Some(page3.items[0].id), first);
		assert_eq!(beyond, page3);
	}

	#[tokio::test]
	async fn test_popular_posts_top_five_by_views() {
		let (store, rust, _) = blog().await;
		for (n, views) in [3, 50, 7, 50, 1, 20, 9].into_iter().enumerate() {
			store.add_post(PostSeed::published(&format!("p{n}"), &format!("P{n}"), rust.id).views(views)).await;
		}

		let listing = PostHandler::listing(&*store, Some("P1"), Some("2")).await.unwrap();

		let slugs: Vec<&str> = listing.popular_posts.iter().map(|post| post.slug.as_str()).collect();
		assert_eq!(slugs, vec!["p1", "p3", "p5", "p6", "p2"]);
	}

	#[tokio::test]
	async fn test_unknown_category_is_not_found() {
		let (store, _, _) = blog().await;
		let result = PostHandler::category_listing(&*store, "unknown-slug", None).await;
		assert!(matches!(result, Err(ServiceError::NotFound("Category"))));
	}

	#[tokio::test]
	async fn test_concurrent_views_are_not_lost() {
		'_given: {
			let (store, rust, _) = blog().await;
			let post = store.add_post(PostSeed::published("hot", "Hot", rust.id).views(10)).await;

			'_when: {
				let visits = (0..2).map(|_| {
					let store = store.clone();
					tokio::spawn(async move { PostHandler::visit(&*store, "hot").await })
				});
				join_all(visits).await.into_iter().for_each(|joined| {
					joined.unwrap().unwrap();
				});

				'_then: {
					assert_eq!(store.views(post.id).await, Some(12));
				}
			}
		}
	}

	#[tokio::test]
	async fn test_record_view_counts_every_call() {
		let (store, rust, _) = blog().await;
		let post = store.add_post(PostSeed::published("p", "P", rust.id)).await;

		for _ in 0..25 {
			PostHandler::record_view(&*store, post.id).await.unwrap();
		}

		assert_eq!(store.views(post.id).await, Some(25));
		assert!(matches!(PostHandler::record_view(&*store, 9999).await, Err(ServiceError::NotFound(_))));
	}

	#[tokio::test]
	async fn test_toggle_twice_restores_state() {
		let (store, rust, _) = blog().await;
		let post = store.add_post(PostSeed::published("p", "P", rust.id)).await;

		let (_, first) = EngagementHandler::toggle(&*store, post.id, 1, EngagementKind::Like).await.unwrap();
		assert_eq!(first.state, ToggleState::Added);
		assert_eq!(first.count, 1);

		let (_, second) = EngagementHandler::toggle(&*store, post.id, 1, EngagementKind::Like).await.unwrap();
		assert_eq!(second.state, ToggleState::Removed);
		assert_eq!(second.count, 0);
		assert_eq!(store.engagement_rows(EngagementKind::Like).await, 0);
	}

	#[tokio::test]
	async fn test_toggle_unknown_post_has_no_effect() {
		let (store, rust, _) = blog().await;
		let draft = store.add_post(PostSeed::published("d", "D", rust.id).draft()).await;

		for post_id in [draft.id, 424242] {
			let result = EngagementHandler::toggle(&*store, post_id, 1, EngagementKind::Bookmark).await;
			assert!(matches!(result, Err(ServiceError::NotFound("Post"))));
		}
		assert_eq!(store.engagement_rows(EngagementKind::Bookmark).await, 0);
	}

	#[tokio::test]
	async fn test_bookmarks_list_only_the_callers() {
		let (store, rust, _) = blog().await;
		let a = store.add_post(PostSeed::published("a", "A", rust.id)).await;
		let b = store.add_post(PostSeed::published("b", "B", rust.id)).await;
		EngagementHandler::toggle(&*store, a.id, 1, EngagementKind::Bookmark).await.unwrap();
		EngagementHandler::toggle(&*store, b.id, 2, EngagementKind::Bookmark).await.unwrap();

		let mine = EngagementHandler::bookmarks(&*store, 1).await.unwrap();

		assert_eq!(mine.len(), 1);
		assert_eq!(mine[0].post.slug, "a");
	}

	#[tokio::test]
	async fn test_comment_waits_for_moderation() {
		'_given: {
			let (store, rust, _) = blog().await;
			let post = store.add_post(PostSeed::published("p", "P", rust.id)).await;

			'_when: {
				let comment = ModerationHandler::submit_comment(&*store, post.id, comment()).await.unwrap();

				'_then: {
					assert!(!comment.is_approved);
					let visited = PostHandler::visit(&*store, "p").await.unwrap();
					let detail = PostHandler::detail(&*store, visited, None).await.unwrap();
					assert!(detail.comments.is_empty());

					assert!(store.approve_comment(comment.id).await.unwrap());
					let visited = PostHandler::visit(&*store, "p").await.unwrap();
					let detail = PostHandler::detail(&*store, visited, None).await.unwrap();
					assert_eq!(detail.comments.len(), 1);
					assert_eq!(detail.post.views, 2);
				}
			}
		}
	}

	#[tokio::test]
	async fn test_comment_on_unpublished_post_is_not_found() {
		let (store, rust, _) = blog().await;
		let draft = store.add_post(PostSeed::published("d", "D", rust.id).draft()).await;

		let result = ModerationHandler::submit_comment(&*store, draft.id, comment()).await;

		assert!(matches!(result, Err(ServiceError::NotFound("Post"))));
		assert!(store.all_comments(draft.id).await.is_empty());
	}

	#[tokio::test]
	async fn test_invalid_comment_is_not_stored() {
		let (store, rust, _) = blog().await;
		let post = store.add_post(PostSeed::published("p", "P", rust.id)).await;
		let form = SubmitComment {
			email: "nope".into(),
			..comment()
		};

		let result = ModerationHandler::submit_comment(&*store, post.id, form).await;

		assert!(matches!(result, Err(ServiceError::InvalidForm { .. })));
		assert!(store.all_comments(post.id).await.is_empty());
	}

	#[tokio::test]
	async fn test_detail_reports_viewer_engagement() {
		let (store, rust, _) = blog().await;
		let post = store.add_post(PostSeed::published("p", "P", rust.id)).await;
		EngagementHandler::toggle(&*store, post.id, 1, EngagementKind::Like).await.unwrap();

		let visited = PostHandler::visit(&*store, "p").await.unwrap();
		let detail = PostHandler::detail(&*store, visited, Some(1)).await.unwrap();

		assert!(detail.user_liked);
		assert!(!detail.user_bookmarked);
		assert_eq!(detail.like_count, 1);
		assert_eq!(detail.category.slug, "rust");
	}

	#[tokio::test]
	async fn test_contact_message_is_stored() {
		let (store, _, _) = blog().await;
		let form = SubmitContact {
			name: "Bo".into(),
			email: "bo@example.com".into(),
			subject: "Hello".into(),
			message: "Love the blog".into(),
		};

		let message = ContactHandler::submit_message(&*store, form).await.unwrap();

		assert_eq!(store.contact_messages().await, vec![message]);
	}
}
