use serde::Serialize;

use self::entity::{Category, Comment, Post};
pub mod commands;
pub mod entity;

/// Everything a post detail page shows about one published post.
#[derive(Debug, Clone, Serialize)]
pub struct PostDetail {
	pub post: Post,
	pub category: Category,
	/// Approved comments only; pending ones never leave the store through here.
	pub comments: Vec<Comment>,
	pub like_count: i64,
	pub bookmark_count: i64,
	pub user_liked: bool,
	pub user_bookmarked: bool,
}

pub const MAX_QUERY_LENGTH: usize = 100;

/// Predicate over published posts used by every listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFilter {
	pub search: Option<String>,
	pub category_id: Option<i64>,
}

impl PostFilter {
	pub fn search(query: Option<&str>) -> Self {
		let search = query.map(str::trim).filter(|q| !q.is_empty()).map(str::to_string);
		Self { search, category_id: None }
	}

	pub fn category(category_id: i64) -> Self {
		Self {
			search: None,
			category_id: Some(category_id),
		}
	}

	/// Case-insensitive substring match against title, content, excerpt or the
	/// category name. Publication is not checked here.
	pub fn matches(
		&self,
		post: &Post,
		category: &Category,
	) -> bool {
		if let Some(category_id) = self.category_id {
			if post.category_id != category_id {
				return false;
			}
		}
		match &self.search {
			None => true,
			Some(search) => {
				let needle = search.to_lowercase();
				[&post.title, &post.content, &post.excerpt, &category.name]
					.iter()
					.any(|field| field.to_lowercase().contains(&needle))
			}
		}
	}

	/// `ILIKE` pattern with the wildcard characters of the search escaped, so
	/// `%` in a query matches a literal percent sign.
	pub fn like_pattern(&self) -> Option<String> {
		self.search.as_ref().map(|search| {
			let mut pattern = String::with_capacity(search.len() + 2);
			pattern.push('%');
			for ch in search.chars() {
				if matches!(ch, '%' | '_' | '\\') {
					pattern.push('\\');
				}
				pattern.push(ch);
			}
			pattern.push('%');
			pattern
		})
	}
}

#[cfg(test)]
mod test {
	use chrono::Utc;

	use super::*;

	fn post(title: &str, category_id: i64) -> Post {
		Post {
			id: 1,
			slug: "p".into(),
			title: title.into(),
			content: "Body text".into(),
			excerpt: "Short".into(),
			category_id,
			is_published: true,
			views: 0,
			create_dt: Utc::now(),
		}
	}

	fn category(id: i64, name: &str) -> Category {
		Category {
			id,
			slug: name.to_lowercase(),
			name: name.into(),
		}
	}

	#[test]
	fn test_blank_query_is_no_filter() {
		assert_eq!(PostFilter::search(Some("   ")), PostFilter::default());
		assert_eq!(PostFilter::search(None), PostFilter::default());
		assert_eq!(PostFilter::search(Some(" rust ")).search.as_deref(), Some("rust"));
	}

	#[test]
	fn test_search_is_case_insensitive_across_fields() {
		let travel = category(1, "Travel");
		let filter = PostFilter::search(Some("TRAV"));
		assert!(filter.matches(&post("Nothing here", 1), &travel));

		let filter = PostFilter::search(Some("body"));
		assert!(filter.matches(&post("Nothing here", 1), &travel));

		let filter = PostFilter::search(Some("cooking"));
		assert!(!filter.matches(&post("Nothing here", 1), &travel));
	}

	#[test]
	fn test_category_filter_is_exact() {
		let filter = PostFilter::category(2);
		assert!(!filter.matches(&post("A", 1), &category(1, "One")));
		assert!(filter.matches(&post("A", 2), &category(2, "Two")));
	}

	#[test]
	fn test_like_pattern_escapes_wildcards() {
		let filter = PostFilter::search(Some("100%_off\\"));
		assert_eq!(filter.like_pattern().as_deref(), Some("%100\\%\\_off\\\\%"));
		assert_eq!(PostFilter::default().like_pattern(), None);
	}
}
