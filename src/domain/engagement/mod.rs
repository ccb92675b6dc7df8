// domain for likes and bookmarks
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::post::entity::PostSummary;
use crate::services::response::Flash;

/// A user's relation to a post. Each kind is an independent (post, user)
/// pair that exists at most once.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementKind {
	Like,
	Bookmark,
}

impl EngagementKind {
	pub(crate) fn table(&self) -> &'static str {
		match self {
			Self::Like => "likes",
			Self::Bookmark => "bookmarks",
		}
	}
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleState {
	Added,
	Removed,
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct ToggleOutcome {
	pub kind: EngagementKind,
	pub state: ToggleState,
	/// Total of this kind on the post after the toggle.
	pub count: i64,
}

impl ToggleOutcome {
	pub fn flash(&self) -> Flash {
		match (self.kind, self.state) {
			(EngagementKind::Like, ToggleState::Added) => Flash::success("Post liked!"),
			(EngagementKind::Like, ToggleState::Removed) => Flash::info("Post unliked!"),
			(EngagementKind::Bookmark, ToggleState::Added) => Flash::success("Post bookmarked!"),
			(EngagementKind::Bookmark, ToggleState::Removed) => Flash::info("Post removed from bookmarks!"),
		}
	}
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct BookmarkEntry {
	pub post: PostSummary,
	pub bookmarked_at: DateTime<Utc>,
}
