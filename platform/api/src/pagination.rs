use serde::Serialize;

/// Posts shown on every feed page.
pub const POSTS_PER_PAGE: i64 = 10;

/// Page-number pagination. A malformed page number resolves to the first
/// page and an out of range one to the last page, nothing fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
	per_page: i64,
}

impl Default for Paginator {
	fn default() -> Self {
		Self::new(POSTS_PER_PAGE)
	}
}

/// The slice of a result set a page covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
	pub number: i64,
	pub num_pages: i64,
	pub count: i64,
	pub limit: i64,
	pub offset: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
	pub object_list: Vec<T>,
	pub number: i64,
	pub num_pages: i64,
	pub count: i64,
	pub has_next: bool,
	pub has_previous: bool,
}

impl Paginator {
	pub fn new(per_page: i64) -> Self {
		Self {
			per_page: per_page.max(1),
		}
	}

	pub fn per_page(&self) -> i64 {
		self.per_page
	}

	/// An empty result set still has one, empty, page.
	pub fn num_pages(&self, count: i64) -> i64 {
		if count <= 0 {
			1
		} else {
			(count + self.per_page - 1) / self.per_page
		}
	}

	pub fn window(&self, count: i64, page: Option<&str>) -> Window {
		let num_pages = self.num_pages(count);

		let number = match page.map(str::trim).and_then(|page| page.parse::<i64>().ok()) {
			Some(number) if number < 1 || number > num_pages => num_pages,
			Some(number) => number,
			None => 1,
		};

		Window {
			number,
			num_pages,
			count: count.max(0),
			limit: self.per_page,
			offset: (number - 1) * self.per_page,
		}
	}
}

impl Window {
	pub fn has_next(&self) -> bool {
		self.number < self.num_pages
	}

	pub fn has_previous(&self) -> bool {
		self.number > 1
	}

	pub fn into_page<T>(self, object_list: Vec<T>) -> Page<T> {
		Page {
			object_list,
			number: self.number,
			num_pages: self.num_pages,
			count: self.count,
			has_next: self.has_next(),
			has_previous: self.has_previous(),
		}
	}
}

impl<T> Page<T> {
	pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
		Page {
			object_list: self.object_list.into_iter().map(f).collect(),
			number: self.number,
			num_pages: self.num_pages,
			count: self.count,
			has_next: self.has_next,
			has_previous: self.has_previous,
		}
	}
}
