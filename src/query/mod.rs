//! List views over loaded records: filtering, sorting and pagination.

mod posts;
mod students;

pub use posts::{
    featured_today, filter_archive, filter_posts, sort_by_created_desc, ArchiveFilter, PostFilter,
};
pub use students::{
    parse_filter, sort_students, students_in_tab, SortDirection, SortKey, SortState,
    StudentFilter,
};

use serde::Serialize;

/// One page of a list, with the requested index already clamped
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    /// Zero-based index of this page
    pub index: usize,
    pub page_count: usize,
    pub total: usize,
}

impl<T> Page<'_, T> {
    pub fn has_previous(&self) -> bool {
        self.index > 0
    }

    pub fn has_next(&self) -> bool {
        self.index + 1 < self.page_count
    }
}

/// Number of pages for `total` items; never less than one
pub fn page_count(total: usize, page_size: usize) -> usize {
    let page_size = page_size.max(1);
    total.div_ceil(page_size).max(1)
}

/// Slice out page `requested`, clamping it into `[0, page_count - 1]`
pub fn paginate<T>(items: &[T], requested: usize, page_size: usize) -> Page<'_, T> {
    let page_size = page_size.max(1);
    let count = page_count(items.len(), page_size);
    let index = requested.min(count - 1);
    let start = (index * page_size).min(items.len());
    let end = (start + page_size).min(items.len());

    Page {
        items: &items[start..end],
        index,
        page_count: count,
        total: items.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_count_never_zero() {
        assert_eq!(page_count(0, 12), 1);
        assert_eq!(page_count(12, 12), 1);
        assert_eq!(page_count(13, 12), 2);
    }

    #[test]
    fn test_paginate_slices() {
        let items: Vec<u32> = (0..30).collect();
        let page = paginate(&items, 1, 12);
        assert_eq!(page.items.len(), 12);
        assert_eq!(page.items[0], 12);
        assert!(page.has_previous());
        assert!(page.has_next());

        let last = paginate(&items, 2, 12);
        assert_eq!(last.items, &[24, 25, 26, 27, 28, 29]);
        assert!(!last.has_next());
    }

    #[test]
    fn test_paginate_clamps_index() {
        let items: Vec<u32> = (0..5).collect();
        let page = paginate(&items, 9, 12);
        assert_eq!(page.index, 0);
        assert_eq!(page.items.len(), 5);
    }

    #[test]
    fn test_paginate_empty() {
        let items: Vec<u32> = Vec::new();
        let page = paginate(&items, 0, 12);
        assert!(page.items.is_empty());
        assert_eq!(page.page_count, 1);
        assert!(!page.has_next());
    }
}
