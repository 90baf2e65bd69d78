//! The admin dashboard table.

use api_types::transaction::{
    AdminTransactionListQuery, AdminTransactionView, TransactionKind, TransactionPage,
    TransactionStatus,
};
use chrono::{DateTime, Utc};

use crate::client::{Client, ClientError, Credentials};

use super::{Pager, select_next, select_prev};

#[derive(Debug, Default, Clone, PartialEq)]
pub struct AdminFilters {
    pub payment_id: Option<String>,
    pub user_email: Option<String>,
    /// Any of these; empty means every status.
    pub statuses: Vec<TransactionStatus>,
    pub kind: Option<TransactionKind>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
    pub modified_by_email: Option<String>,
    pub modified_from: Option<DateTime<Utc>>,
    pub modified_to: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
pub struct AdminTransactionsTable {
    filters: AdminFilters,
    pager: Pager,
    pub items: Vec<AdminTransactionView>,
    pub selected: usize,
    pub error: Option<String>,
}

impl AdminTransactionsTable {
    pub fn filters(&self) -> &AdminFilters {
        &self.filters
    }

    pub fn set_filters(&mut self, filters: AdminFilters) {
        self.filters = filters;
        self.reset();
    }

    /// Adds the status to the filter set, or removes it if present.
    pub fn toggle_status(&mut self, status: TransactionStatus) {
        if let Some(pos) = self.filters.statuses.iter().position(|s| *s == status) {
            self.filters.statuses.remove(pos);
        } else {
            self.filters.statuses.push(status);
        }
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

    pub fn query(&self) -> AdminTransactionListQuery {
        let filters = &self.filters;
        AdminTransactionListQuery {
            skip: self.pager.skip(),
            payment_id: filters.payment_id.clone(),
            user_email: filters.user_email.clone(),
            statuses: (!filters.statuses.is_empty()).then(|| filters.statuses.clone()),
            kind: filters.kind,
            created_from: filters.created_from,
            created_to: filters.created_to,
            modified_by_email: filters.modified_by_email.clone(),
            modified_from: filters.modified_from,
            modified_to: filters.modified_to,
        }
    }

    pub fn apply(&mut self, page: TransactionPage<AdminTransactionView>) {
        self.items = page.transactions;
        self.pager.set_total(page.total_pages);
        self.selected = 0;
        self.error = None;
    }

    pub async fn load(&mut self, client: &Client, creds: &Credentials) -> Result<(), ClientError> {
        match client.admin_transactions_list(creds, &self.query()).await {
            Ok(page) => {
                self.apply(page);
                Ok(())
            }
            Err(err) => {
                tracing::error!("failed to load admin transactions: {err}");
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

    pub fn selected_item(&self) -> Option<&AdminTransactionView> {
        self.items.get(self.selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggling_statuses_builds_the_union() {
        let mut table = AdminTransactionsTable::default();
        assert_eq!(table.query().statuses, None);

        table.toggle_status(TransactionStatus::Pending);
        table.toggle_status(TransactionStatus::Failed);
        assert_eq!(
            table.query().statuses,
            Some(vec![TransactionStatus::Pending, TransactionStatus::Failed])
        );

        table.toggle_status(TransactionStatus::Pending);
        assert_eq!(
            table.query().statuses,
            Some(vec![TransactionStatus::Failed])
        );
    }

    #[test]
    fn query_keeps_email_filters() {
        let mut table = AdminTransactionsTable::default();
        table.set_filters(AdminFilters {
            user_email: Some("alice".to_string()),
            modified_by_email: Some("root".to_string()),
            ..Default::default()
        });
        table.apply(TransactionPage {
            transactions: Vec::new(),
            total_pages: 4,
        });
        table.go_to_page(4);

        let query = table.query();
        assert_eq!(query.skip, 30);
        assert_eq!(query.user_email.as_deref(), Some("alice"));
        assert_eq!(query.modified_by_email.as_deref(), Some("root"));
    }
}
