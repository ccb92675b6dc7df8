use serde::Serialize;

/// Listing page size.
pub const PAGE_SIZE: i64 = 6;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
	pub items: Vec<T>,
	pub number: i64,
	pub num_pages: i64,
	pub total: i64,
	pub has_previous: bool,
	pub has_next: bool,
}

/// Splits `total` rows into fixed-size pages. There is always at least one
/// page, even when `total` is zero.
#[derive(Debug, Clone, Copy)]
pub struct Paginator {
	total: i64,
	per_page: i64,
}

impl Paginator {
	pub fn new(
		total: i64,
		per_page: i64,
	) -> Self {
		Self {
			total: total.max(0),
			per_page: per_page.max(1),
		}
	}

	pub fn num_pages(&self) -> i64 {
		if self.total == 0 {
			1
		} else {
			(self.total + self.per_page - 1) / self.per_page
		}
	}

	/// Resolves the raw `page` parameter to a valid page number: anything that
	/// is not a number, or is below one, means the first page; past the end
	/// means the last page.
	pub fn clamp(
		&self,
		requested: Option<&str>,
	) -> i64 {
		match requested.and_then(|raw| raw.trim().parse::<i64>().ok()) {
			Some(number) if number > self.num_pages() => self.num_pages(),
			Some(number) if number >= 1 => number,
			_ => 1,
		}
	}

	pub fn limit(&self) -> i64 {
		self.per_page
	}

	pub fn offset(
		&self,
		number: i64,
	) -> i64 {
		(number - 1) * self.per_page
	}

	pub fn page<T>(
		&self,
		number: i64,
		items: Vec<T>,
	) -> Page<T> {
		Page {
			items,
			number,
			num_pages: self.num_pages(),
			total: self.total,
			has_previous: number > 1,
			has_next: number < self.num_pages(),
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_num_pages() {
		assert_eq!(Paginator::new(0, 6).num_pages(), 1);
		assert_eq!(Paginator::new(6, 6).num_pages(), 1);
		assert_eq!(Paginator::new(13, 6).num_pages(), 3);
	}

	#[test]
	fn test_out_of_range_pages_clamp() {
		let paginator = Paginator::new(13, 6);
		assert_eq!(paginator.clamp(None), 1);
		assert_eq!(paginator.clamp(Some("abc")), 1);
		assert_eq!(paginator.clamp(Some("0")), 1);
		assert_eq!(paginator.clamp(Some("-2")), 1);
		assert_eq!(paginator.clamp(Some("2")), 2);
		assert_eq!(paginator.clamp(Some("3")), 3);
		assert_eq!(paginator.clamp(Some("99")), 3);
	}

	#[test]
	fn test_page_flags() {
		let paginator = Paginator::new(13, 6);
		let page = paginator.page(3, vec![13]);
		assert_eq!(paginator.offset(3), 12);
		assert!(page.has_previous);
		assert!(!page.has_next);
		assert_eq!(page.total, 13);
	}
}
