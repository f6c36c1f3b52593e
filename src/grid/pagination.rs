//! Pagination state and controls.
//!
//! The owner holds the page counter. The grid only renders the controls
//! and requests page changes; it never advances the counter itself.

/// Current page and page count, both 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    current_page: u32,
    total_pages: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

impl Pagination {
    /// Create pagination state. Values below 1 are raised to 1 and the
    /// current page is kept within the page count.
    pub fn new(current_page: u32, total_pages: u32) -> Self {
        let mut pagination = Self {
            current_page: 1,
            total_pages: total_pages.max(1),
        };
        pagination.current_page = pagination.clamp(i64::from(current_page));
        pagination
    }

    /// The current page.
    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    /// The number of pages.
    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    /// Whether the "previous" control is enabled.
    pub fn prev_enabled(&self, has_rows: bool) -> bool {
        has_rows && self.current_page != 1
    }

    /// Whether the "next" control is enabled.
    pub fn next_enabled(&self, has_rows: bool) -> bool {
        has_rows && self.current_page != self.total_pages
    }

    /// The page "previous" requests, if enabled.
    pub fn prev_request(&self, has_rows: bool) -> Option<u32> {
        self.prev_enabled(has_rows).then(|| self.current_page - 1)
    }

    /// The page "next" requests, if enabled.
    pub fn next_request(&self, has_rows: bool) -> Option<u32> {
        self.next_enabled(has_rows).then(|| self.current_page + 1)
    }

    /// Clamp an arbitrary page number into `1..=total_pages`.
    pub fn clamp(&self, page: i64) -> u32 {
        page.clamp(1, i64::from(self.total_pages)) as u32
    }

    /// Page indicator text for the table renderer.
    pub fn label(&self, has_rows: bool) -> String {
        if has_rows {
            format!("Página {} de {}", self.current_page, self.total_pages)
        } else {
            "Sem registros".to_string()
        }
    }

    /// Whether the compact renderer shows pagination at all.
    pub fn shown_in_cards(&self) -> bool {
        self.total_pages > 1
    }
}
