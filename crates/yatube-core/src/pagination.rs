//! Page-number pagination for post listings.
//!
//! A [`Paginator`] knows the size of a collection and turns a raw `?page=`
//! value into a [`PageWindow`] (offset and limit for the store). Once the
//! items for that window are loaded, [`Page::new`] wraps them with the
//! navigation metadata templates need.

use serde::Serialize;

/// Posts shown per listing page.
pub const POSTS_PER_PAGE: u64 = 10;

/// Page arithmetic for a collection of `count` items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    count: u64,
    per_page: u64,
}

/// The slice of the collection a page covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub number: u64,
    pub num_pages: u64,
    pub count: u64,
    pub offset: u64,
    pub limit: u64,
}

impl Paginator {
    pub fn new(count: u64, per_page: u64) -> Self {
        Self {
            count,
            per_page: per_page.max(1),
        }
    }

    /// Number of pages; an empty collection still has one (empty) page.
    pub fn num_pages(&self) -> u64 {
        if self.count == 0 {
            1
        } else {
            self.count.div_ceil(self.per_page)
        }
    }

    /// Resolve a raw page parameter.
    ///
    /// Missing, non-numeric and non-positive values give the first page;
    /// numbers past the end give the last page.
    pub fn get_page(&self, raw: Option<&str>) -> PageWindow {
        let requested = raw
            .and_then(|s| s.trim().parse::<u64>().ok())
            .filter(|n| *n >= 1)
            .unwrap_or(1);
        self.window(requested.min(self.num_pages()))
    }

    fn window(&self, number: u64) -> PageWindow {
        let offset = (number - 1) * self.per_page;
        PageWindow {
            number,
            num_pages: self.num_pages(),
            count: self.count,
            offset,
            limit: self.per_page.min(self.count.saturating_sub(offset)),
        }
    }
}

/// One page of a listing, as handed to templates under `page_obj`.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub object_list: Vec<T>,
    pub number: u64,
    pub num_pages: u64,
    pub count: u64,
    pub has_previous: bool,
    pub has_next: bool,
    pub previous_page_number: Option<u64>,
    pub next_page_number: Option<u64>,
}

impl<T> Page<T> {
    pub fn new(object_list: Vec<T>, window: PageWindow) -> Self {
        let has_previous = window.number > 1;
        let has_next = window.number < window.num_pages;
        Self {
            object_list,
            number: window.number,
            num_pages: window.num_pages,
            count: window.count,
            has_previous,
            has_next,
            previous_page_number: has_previous.then(|| window.number - 1),
            next_page_number: has_next.then(|| window.number + 1),
        }
    }

    pub fn len(&self) -> usize {
        self.object_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.object_list.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thirteen_items_split_ten_and_three() {
        let paginator = Paginator::new(13, POSTS_PER_PAGE);
        assert_eq!(paginator.num_pages(), 2);

        let first = paginator.get_page(None);
        assert_eq!((first.number, first.offset, first.limit), (1, 0, 10));

        let second = paginator.get_page(Some("2"));
        assert_eq!((second.number, second.offset, second.limit), (2, 10, 3));
    }

    #[test]
    fn test_invalid_page_falls_back_to_first() {
        let paginator = Paginator::new(25, 10);
        for raw in ["abc", "0", "-3", ""] {
            assert_eq!(paginator.get_page(Some(raw)).number, 1, "raw = {raw:?}");
        }
    }

    #[test]
    fn test_page_past_the_end_is_last_page() {
        let paginator = Paginator::new(25, 10);
        let window = paginator.get_page(Some("99"));
        assert_eq!(window.number, 3);
        assert_eq!(window.limit, 5);
    }

    #[test]
    fn test_empty_collection_has_one_empty_page() {
        let paginator = Paginator::new(0, 10);
        let window = paginator.get_page(Some("4"));
        assert_eq!(window.number, 1);
        assert_eq!(window.num_pages, 1);
        assert_eq!(window.limit, 0);

        let page: Page<i32> = Page::new(vec![], window);
        assert!(page.is_empty());
        assert!(!page.has_next);
        assert!(!page.has_previous);
    }

    #[test]
    fn test_page_navigation_metadata() {
        let paginator = Paginator::new(30, 10);
        let page = Page::new(vec![1; 10], paginator.get_page(Some("2")));

        assert_eq!(page.len(), 10);
        assert_eq!(page.previous_page_number, Some(1));
        assert_eq!(page.next_page_number, Some(3));
    }
}
