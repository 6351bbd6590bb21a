/// A page of a listing, 0-based
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub page_size: usize,
}

impl PageRequest {
    pub fn new(page: usize, page_size: usize) -> Self {
        Self {
            page,
            page_size: page_size.max(1),
        }
    }

    pub fn offset(&self) -> usize {
        self.page.saturating_mul(self.page_size)
    }

    /// Rows to fetch: one past the page so the caller can tell if more follow
    pub fn fetch_limit(&self) -> usize {
        self.page_size + 1
    }

    /// Cut `rows` (fetched with [`fetch_limit`](Self::fetch_limit)) down to
    /// the page and report whether another page follows
    pub fn split<T>(&self, mut rows: Vec<T>) -> (Vec<T>, bool) {
        let has_more = rows.len() > self.page_size;
        rows.truncate(self.page_size);
        (rows, has_more)
    }
}
