use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::{
    Condition, ConnectionTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait,
    prelude::*,
    sea_query::{Query, SimpleExpr},
};

use crate::{
    Caller, EngineError, ResultEngine, Transaction, TransactionKind, TransactionStatus,
    transactions, users,
};

use super::super::{Engine, access, currencies, normalize_optional_text, with_tx};
use super::contains_ci;

/// Fixed number of transactions per page.
pub const PAGE_SIZE: u64 = 10;

/// `ceil(count / PAGE_SIZE)`.
pub fn total_pages(count: u64) -> u64 {
    count.div_ceil(PAGE_SIZE)
}

/// Filters for a user's own transactions.
///
/// Blank strings are treated as absent. Date bounds are inclusive.
#[derive(Clone, Debug, Default)]
pub struct UserTransactionFilter {
    pub user_id: i32,
    /// Case-insensitive substring of the payment id.
    pub payment_id: Option<String>,
    pub status: Option<TransactionStatus>,
    pub kind: Option<TransactionKind>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
}

/// Filters for the admin transactions list.
#[derive(Clone, Debug, Default)]
pub struct AdminTransactionFilter {
    pub payment_id: Option<String>,
    /// Case-insensitive substring of the owner's email.
    pub user_email: Option<String>,
    /// Union of accepted statuses; empty means any status.
    pub statuses: Vec<TransactionStatus>,
    pub kind: Option<TransactionKind>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
    /// Case-insensitive substring of the last modifier's email.
    pub modified_by_email: Option<String>,
    pub modified_from: Option<DateTime<Utc>>,
    pub modified_to: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_pages: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TransactionRow {
    pub transaction: Transaction,
    pub fiat_currency: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AdminTransactionRow {
    pub transaction: Transaction,
    pub fiat_currency: String,
    pub user_email: String,
    pub last_modified_by_email: Option<String>,
}

fn validate_range(
    label: &str,
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
) -> ResultEngine<()> {
    if let (Some(from), Some(to)) = (from, to)
        && from > to
    {
        return Err(EngineError::InvalidInput(format!(
            "invalid {label} range: from must be <= to"
        )));
    }
    Ok(())
}

trait ConditionExt: Sized {
    fn add_range(
        self,
        column: transactions::Column,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Self;
}

impl ConditionExt for Condition {
    fn add_range(
        mut self,
        column: transactions::Column,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Self {
        if let Some(from) = from {
            self = self.add(column.gte(from));
        }
        if let Some(to) = to {
            self = self.add(column.lte(to));
        }
        self
    }
}

/// `column IN (SELECT id FROM users WHERE LOWER(email) LIKE ...)`
fn user_email_matches(column: transactions::Column, email: &str) -> SimpleExpr {
    column.in_subquery(
        Query::select()
            .column(users::Column::Id)
            .from(users::Entity)
            .and_where(contains_ci(users::Column::Email, email))
            .to_owned(),
    )
}

fn user_condition(filter: &UserTransactionFilter) -> ResultEngine<Condition> {
    validate_range("created", filter.created_from, filter.created_to)?;

    let mut condition = Condition::all().add(transactions::Column::UserId.eq(filter.user_id));
    if let Some(payment_id) = normalize_optional_text(filter.payment_id.as_deref()) {
        condition = condition.add(contains_ci(transactions::Column::PaymentId, &payment_id));
    }
    if let Some(status) = filter.status {
        condition = condition.add(transactions::Column::Status.eq(status.as_str()));
    }
    if let Some(kind) = filter.kind {
        condition = condition.add(transactions::Column::Kind.eq(kind.as_str()));
    }

    Ok(condition.add_range(
        transactions::Column::CreatedAt,
        filter.created_from,
        filter.created_to,
    ))
}

fn admin_condition(filter: &AdminTransactionFilter) -> ResultEngine<Condition> {
    validate_range("created", filter.created_from, filter.created_to)?;
    validate_range("modified", filter.modified_from, filter.modified_to)?;

    let mut condition = Condition::all();
    if let Some(payment_id) = normalize_optional_text(filter.payment_id.as_deref()) {
        condition = condition.add(contains_ci(transactions::Column::PaymentId, &payment_id));
    }
    if let Some(email) = normalize_optional_text(filter.user_email.as_deref()) {
        condition = condition.add(user_email_matches(transactions::Column::UserId, &email));
    }
    if !filter.statuses.is_empty() {
        condition = condition.add(
            transactions::Column::Status.is_in(filter.statuses.iter().map(|s| s.as_str())),
        );
    }
    if let Some(kind) = filter.kind {
        condition = condition.add(transactions::Column::Kind.eq(kind.as_str()));
    }
    if let Some(email) = normalize_optional_text(filter.modified_by_email.as_deref()) {
        condition = condition.add(user_email_matches(
            transactions::Column::LastModifiedBy,
            &email,
        ));
    }

    Ok(condition
        .add_range(
            transactions::Column::CreatedAt,
            filter.created_from,
            filter.created_to,
        )
        .add_range(
            transactions::Column::LastChangeDate,
            filter.modified_from,
            filter.modified_to,
        ))
}

/// Counts all matches and fetches the page starting at `skip`, newest first.
///
/// A `skip` at or past the count yields an empty page without querying rows.
async fn fetch_page<C: ConnectionTrait>(
    db: &C,
    condition: Condition,
    skip: u64,
) -> ResultEngine<(Vec<Transaction>, u64)> {
    let count = transactions::Entity::find()
        .filter(condition.clone())
        .count(db)
        .await?;
    if skip >= count {
        return Ok((Vec::new(), total_pages(count)));
    }

    let models = transactions::Entity::find()
        .filter(condition)
        .order_by_desc(transactions::Column::CreatedAt)
        .order_by_desc(transactions::Column::Id)
        .offset(skip)
        .limit(PAGE_SIZE)
        .all(db)
        .await?;

    let items = models
        .into_iter()
        .map(Transaction::try_from)
        .collect::<ResultEngine<Vec<_>>>()?;
    Ok((items, total_pages(count)))
}

fn currency_code(codes: &HashMap<i32, String>, id: i32) -> ResultEngine<String> {
    codes
        .get(&id)
        .cloned()
        .ok_or_else(|| EngineError::KeyNotFound(format!("fiat currency {id} not exists")))
}

impl Engine {
    /// Lists the caller's own transactions, newest first, `PAGE_SIZE` at a
    /// time.
    ///
    /// Fails with `Unauthorized` unless the caller is the user the query is
    /// scoped to.
    pub async fn list_user_transactions(
        &self,
        caller: Option<&Caller>,
        filter: &UserTransactionFilter,
        skip: u64,
    ) -> ResultEngine<Page<TransactionRow>> {
        access::require_same_user(caller, filter.user_id)?;
        let condition = user_condition(filter)?;

        with_tx!(self, |db_tx| {
            let (txs, total_pages) = fetch_page(&db_tx, condition, skip).await?;
            let codes =
                currencies::codes_by_id(&db_tx, txs.iter().map(|tx| tx.fiat_currency_id)).await?;

            let mut items = Vec::with_capacity(txs.len());
            for transaction in txs {
                items.push(TransactionRow {
                    fiat_currency: currency_code(&codes, transaction.fiat_currency_id)?,
                    transaction,
                });
            }

            Ok(Page { items, total_pages })
        })
    }

    /// Lists every user's transactions for the admin dashboard, newest first.
    ///
    /// Fails with `Unauthorized` unless the caller is an admin.
    pub async fn list_admin_transactions(
        &self,
        caller: Option<&Caller>,
        filter: &AdminTransactionFilter,
        skip: u64,
    ) -> ResultEngine<Page<AdminTransactionRow>> {
        access::require_admin(caller)?;
        let condition = admin_condition(filter)?;

        with_tx!(self, |db_tx| {
            let (txs, total_pages) = fetch_page(&db_tx, condition, skip).await?;
            let items = admin_rows(&db_tx, txs).await?;
            Ok(Page { items, total_pages })
        })
    }

    /// One transaction as the admin dashboard shows it.
    pub async fn admin_transaction(
        &self,
        caller: Option<&Caller>,
        id: i32,
    ) -> ResultEngine<AdminTransactionRow> {
        access::require_admin(caller)?;

        let model = transactions::Entity::find_by_id(id)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("transaction {id} not exists")))?;
        admin_rows(&self.database, vec![Transaction::try_from(model)?])
            .await?
            .pop()
            .ok_or_else(|| EngineError::KeyNotFound(format!("transaction {id} not exists")))
    }
}

/// Attaches currency codes and owner/modifier emails.
async fn admin_rows<C: ConnectionTrait>(
    db: &C,
    txs: Vec<Transaction>,
) -> ResultEngine<Vec<AdminTransactionRow>> {
    let codes = currencies::codes_by_id(db, txs.iter().map(|tx| tx.fiat_currency_id)).await?;

    let mut user_ids: Vec<i32> = txs
        .iter()
        .flat_map(|tx| std::iter::once(tx.user_id).chain(tx.last_modified_by))
        .collect();
    user_ids.sort_unstable();
    user_ids.dedup();
    let emails: HashMap<i32, String> = if user_ids.is_empty() {
        HashMap::new()
    } else {
        users::Entity::find()
            .filter(users::Column::Id.is_in(user_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|user| (user.id, user.email))
            .collect()
    };

    let mut items = Vec::with_capacity(txs.len());
    for transaction in txs {
        let user_email = emails
            .get(&transaction.user_id)
            .cloned()
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))?;
        let last_modified_by_email = transaction
            .last_modified_by
            .and_then(|id| emails.get(&id).cloned());
        items.push(AdminTransactionRow {
            fiat_currency: currency_code(&codes, transaction.fiat_currency_id)?,
            user_email,
            last_modified_by_email,
            transaction,
        });
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use sea_orm::{DbBackend, QueryTrait, sea_query::SqliteQueryBuilder};

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(0), 0);
        assert_eq!(total_pages(1), 1);
        assert_eq!(total_pages(10), 1);
        assert_eq!(total_pages(11), 2);
        assert_eq!(total_pages(15), 2);
    }

    #[test]
    fn inverted_range_is_rejected() {
        let from = Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let filter = UserTransactionFilter {
            user_id: 1,
            created_from: Some(from),
            created_to: Some(to),
            ..Default::default()
        };
        assert!(matches!(
            user_condition(&filter),
            Err(EngineError::InvalidInput(_))
        ));
        assert!(validate_range("created", Some(from), Some(from)).is_ok());
    }

    #[test]
    fn blank_filters_only_scope_by_user() {
        let filter = UserTransactionFilter {
            user_id: 7,
            payment_id: Some("  ".to_string()),
            ..Default::default()
        };
        let sql = transactions::Entity::find()
            .filter(user_condition(&filter).unwrap())
            .build(DbBackend::Sqlite)
            .to_string();
        assert!(sql.contains(r#""transactions"."user_id" = 7"#));
        assert!(!sql.contains("LIKE"));
    }

    #[test]
    fn admin_filters_use_subqueries_and_union() {
        let filter = AdminTransactionFilter {
            user_email: Some("Alice".to_string()),
            statuses: vec![TransactionStatus::Pending, TransactionStatus::Failed],
            ..Default::default()
        };
        let sql = transactions::Entity::find()
            .filter(admin_condition(&filter).unwrap())
            .into_query()
            .to_string(SqliteQueryBuilder);
        assert!(sql.contains("IN (SELECT"));
        assert!(sql.contains("'%alice%'"));
        assert!(sql.contains("IN ('Pending', 'Failed')"));
    }
}
