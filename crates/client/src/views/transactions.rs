//! The user's own transactions table.

use api_types::transaction::{
    TransactionKind, TransactionListQuery, TransactionPage, TransactionStatus, TransactionView,
};
use chrono::{DateTime, Utc};

use crate::client::{Client, ClientError, Credentials};

use super::{Pager, select_next, select_prev};

#[derive(Debug, Default, Clone, PartialEq)]
pub struct UserFilters {
    pub payment_id: Option<String>,
    pub status: Option<TransactionStatus>,
    pub kind: Option<TransactionKind>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
pub struct TransactionsTable {
    filters: UserFilters,
    pager: Pager,
    pub items: Vec<TransactionView>,
    pub selected: usize,
    pub error: Option<String>,
}

impl TransactionsTable {
    pub fn filters(&self) -> &UserFilters {
        &self.filters
    }

    /// Replacing the filters starts again from the first page.
    pub fn set_filters(&mut self, filters: UserFilters) {
        self.filters = filters;
        self.reset();
    }

    fn reset(&mut self) {
        self.pager.reset();
        self.items.clear();
        self.selected = 0;
        self.error = None;
    }

    pub fn page(&self) -> u64 {
        self.pager.current()
    }

    pub fn total_pages(&self) -> u64 {
        self.pager.total()
    }

    pub fn go_to_page(&mut self, page: u64) {
        self.pager.go_to(page);
    }

    pub fn next_page(&mut self) -> bool {
        self.pager.next()
    }

    pub fn prev_page(&mut self) -> bool {
        self.pager.prev()
    }

    pub fn query(&self, user_id: i32) -> TransactionListQuery {
        TransactionListQuery {
            skip: self.pager.skip(),
            user_id,
            payment_id: self.filters.payment_id.clone(),
            status: self.filters.status,
            kind: self.filters.kind,
            created_from: self.filters.created_from,
            created_to: self.filters.created_to,
        }
    }

    pub fn apply(&mut self, page: TransactionPage<TransactionView>) {
        self.items = page.transactions;
        self.pager.set_total(page.total_pages);
        self.selected = 0;
        self.error = None;
    }

    /// Fetches the current page. On failure the error is kept for display and
    /// returned.
    pub async fn load(
        &mut self,
        client: &Client,
        creds: &Credentials,
        user_id: i32,
    ) -> Result<(), ClientError> {
        match client.transactions_list(creds, &self.query(user_id)).await {
            Ok(page) => {
                self.apply(page);
                Ok(())
            }
            Err(err) => {
                tracing::error!("failed to load transactions: {err}");
                self.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    pub fn select_next(&mut self) {
        select_next(&mut self.selected, self.items.len());
    }

    pub fn select_prev(&mut self) {
        select_prev(&mut self.selected);
    }

    pub fn selected_item(&self) -> Option<&TransactionView> {
        self.items.get(self.selected)
    }
}
