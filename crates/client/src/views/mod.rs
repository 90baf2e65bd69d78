//! View state for each screen of the client.
//!
//! Each container owns the filters, paging and selection of one invocation
//! and builds the request body from them. Nothing here renders; see
//! [`render`] for the text output.

pub mod add_transaction;
pub mod admin_transactions;
pub mod edit_transaction;
pub mod render;
pub mod transactions;

use engine::PAGE_SIZE;

/// 0-based page cursor shared by both transaction tables.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Pager {
    page: u64,
    total_pages: u64,
}

impl Pager {
    pub(crate) fn skip(self) -> u64 {
        self.page.saturating_mul(PAGE_SIZE)
    }

    /// 1-based page number, as shown to the user.
    pub(crate) fn current(self) -> u64 {
        self.page + 1
    }

    pub(crate) fn total(self) -> u64 {
        self.total_pages
    }

    pub(crate) fn go_to(&mut self, page: u64) {
        self.page = page.saturating_sub(1);
    }

    pub(crate) fn next(&mut self) -> bool {
        if self.page + 1 >= self.total_pages {
            return false;
        }
        self.page += 1;
        true
    }

    pub(crate) fn prev(&mut self) -> bool {
        if self.page == 0 {
            return false;
        }
        self.page -= 1;
        true
    }

    pub(crate) fn set_total(&mut self, total_pages: u64) {
        self.total_pages = total_pages;
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Cursor over the rows of the current page.
pub(crate) fn select_next(selected: &mut usize, len: usize) {
    if len == 0 {
        return;
    }
    *selected = (*selected + 1).min(len - 1);
}

pub(crate) fn select_prev(selected: &mut usize) {
    *selected = selected.saturating_sub(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pager_stays_in_bounds() {
        let mut pager = Pager::default();
        assert_eq!(pager.skip(), 0);
        assert!(!pager.next());

        pager.set_total(2);
        assert!(pager.next());
        assert_eq!(pager.current(), 2);
        assert_eq!(pager.skip(), 10);
        assert!(!pager.next());
        assert!(pager.prev());
        assert!(!pager.prev());

        pager.go_to(3);
        assert_eq!(pager.skip(), 20);
        pager.reset();
        assert_eq!(pager.current(), 1);
    }

    #[test]
    fn huge_page_numbers_saturate() {
        let mut pager = Pager::default();
        pager.go_to(u64::MAX);
        assert_eq!(pager.skip(), u64::MAX);
        assert_eq!(pager.current(), u64::MAX);
        assert!(!pager.next());
    }

    #[test]
    fn selection_is_clamped() {
        let mut selected = 0;
        select_next(&mut selected, 0);
        assert_eq!(selected, 0);
        select_next(&mut selected, 2);
        select_next(&mut selected, 2);
        assert_eq!(selected, 1);
        select_prev(&mut selected);
        select_prev(&mut selected);
        assert_eq!(selected, 0);
    }
}
