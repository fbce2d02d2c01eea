//! Pagination window.

/// The slice of the filtered rows shown on the current page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    /// 1-based page, clamped into `1..=total_pages`.
    pub current_page: usize,
    /// At least 1, even with no rows.
    pub total_pages: usize,
    /// Start offset into the filtered rows.
    pub start: usize,
    /// End offset (exclusive).
    pub end: usize,
}

impl PageWindow {
    /// Computes the window for `total` rows.
    ///
    /// `per_page` of `None` disables pagination: one page holding every row.
    ///
    /// # Example
    ///
    /// ```
    /// use datagrid_lib::view::PageWindow;
    ///
    /// let window = PageWindow::compute(12, Some(10), 2);
    /// assert_eq!(window.total_pages, 2);
    /// assert_eq!(window.start..window.end, 10..12);
    /// ```
    pub fn compute(total: usize, per_page: Option<usize>, requested_page: usize) -> Self {
        let Some(per_page) = per_page.map(|n| n.max(1)) else {
            return Self {
                current_page: 1,
                total_pages: 1,
                start: 0,
                end: total,
            };
        };

        let total_pages = total.div_ceil(per_page).max(1);
        let current_page = requested_page.clamp(1, total_pages);
        let start = (current_page - 1) * per_page;
        let end = (start + per_page).min(total);

        Self {
            current_page,
            total_pages,
            start,
            end,
        }
    }

    /// Number of rows on the page.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns `true` if the page holds no rows.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns `true` if a later page exists.
    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    /// Returns `true` if an earlier page exists.
    pub fn has_prev(&self) -> bool {
        self.current_page > 1
    }
}
