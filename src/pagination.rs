//! Page arithmetic for the blog list.

use serde::Serialize;

const MAX_PAGES_SHOWN: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Number(usize),
    Ellipsis,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub current_page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub per_page: usize,
}

impl<T> Page<T> {
    /// 1-based index of the first item shown, 0 when the page is empty.
    pub fn first_index(&self) -> usize {
        if self.items.is_empty() {
            0
        } else {
            (self.current_page - 1) * self.per_page + 1
        }
    }

    pub fn last_index(&self) -> usize {
        if self.items.is_empty() {
            return 0;
        }
        ((self.current_page - 1) * self.per_page + self.items.len()).min(self.total_items)
    }

    pub fn has_prev(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }
}

pub fn total_pages(total_items: usize, per_page: usize) -> usize {
    if per_page == 0 {
        return 0;
    }
    total_items.div_ceil(per_page)
}

/// Items of the 1-based `page`. Pages past the end are empty, not errors.
pub fn paginate<T: Clone>(items: &[T], page: usize, per_page: usize) -> Page<T> {
    let per_page = per_page.max(1);
    let current_page = page.max(1);
    let start = (current_page - 1).saturating_mul(per_page);
    let page_items = items
        .iter()
        .skip(start)
        .take(per_page)
        .cloned()
        .collect();

    Page {
        items: page_items,
        current_page,
        total_pages: total_pages(items.len(), per_page),
        total_items: items.len(),
        per_page,
    }
}

/// Page number from a query parameter; anything unusable means page 1.
pub fn parse_page(raw: Option<&str>) -> usize {
    raw.and_then(|p| p.trim().parse::<usize>().ok())
        .filter(|&p| p > 0)
        .unwrap_or(1)
}

/// Numbered links around the current page. The first and last pages are
/// always present; skipped runs collapse into `Ellipsis`.
pub fn page_window(current: usize, total: usize) -> Vec<PageItem> {
    if total <= 1 {
        return Vec::new();
    }
    let current = current.clamp(1, total);

    let mut pages = vec![PageItem::Number(1)];
    let inner = MAX_PAGES_SHOWN - 2;

    let mut range_start = current.saturating_sub(MAX_PAGES_SHOWN / 2).max(2);
    let range_end = (total - 1).min(range_start + inner);
    if range_end < range_start + inner {
        range_start = range_end.saturating_sub(inner).max(2);
    }

    if range_start > 2 {
        pages.push(PageItem::Ellipsis);
    }
    pages.extend((range_start..=range_end).map(PageItem::Number));
    if range_end < total - 1 {
        pages.push(PageItem::Ellipsis);
    }
    pages.push(PageItem::Number(total));
    pages
}

/// `base` with `page=N` appended, respecting an existing query string.
pub fn page_url(base: &str, page: usize) -> String {
    let separator = if base.contains('?') { '&' } else { '?' };
    format!("{base}{separator}page={page}")
}
