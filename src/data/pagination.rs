pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// A resolved page request: clamped page and size, plus totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub size: i64,
    pub total_count: i64,
    pub total_pages: i64,
}

impl Pagination {
    pub fn new(page: Option<i64>, size: Option<i64>, total_count: i64) -> Self {
        let mut page = page.unwrap_or(DEFAULT_PAGE);
        let mut size = size.unwrap_or(DEFAULT_PAGE_SIZE);
        if page < 1 {
            page = 1;
        }
        if size < 1 {
            size = DEFAULT_PAGE_SIZE;
        }

        let total_count = total_count.max(0);
        let total_pages = (total_count / size + i64::from(total_count % size != 0)).max(1);

        Self {
            page: page.min(total_pages),
            size,
            total_count,
            total_pages,
        }
    }

    pub const fn offset(&self) -> i64 {
        (self.page - 1) * self.size
    }

    pub const fn previous(&self) -> Option<i64> {
        if self.page > 1 {
            Some(self.page - 1)
        } else {
            None
        }
    }

    pub const fn next(&self) -> Option<i64> {
        if self.page < self.total_pages {
            Some(self.page + 1)
        } else {
            None
        }
    }
}
