use sea_orm::DatabaseConnection;

use crate::{EngineError, ResultEngine};

mod access;
mod bank_details;
mod currencies;
mod transactions;
mod users;

pub use transactions::{
    AdminTransactionFilter, AdminTransactionRow, CreatedTransaction, NewTransactionCmd,
    PAGE_SIZE, Page, TransactionRow, TransactionUpdate, UserTransactionFilter, total_pages,
};
pub use users::UserNew;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

fn normalize_required_text(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidInput(format!("{label} must not be empty")));
    }
    Ok(trimmed.to_string())
}

/// Blank filter values mean "no filter".
fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

fn normalize_currency_code(value: &str) -> String {
    value.trim().to_ascii_uppercase()
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_filters_are_dropped() {
        assert_eq!(normalize_optional_text(None), None);
        assert_eq!(normalize_optional_text(Some("")), None);
        assert_eq!(normalize_optional_text(Some("   ")), None);
        assert_eq!(
            normalize_optional_text(Some(" pay-1 ")),
            Some("pay-1".to_string())
        );
    }

    #[test]
    fn required_text_rejects_blank() {
        assert!(normalize_required_text(" ", "crypto currency").is_err());
        assert_eq!(
            normalize_required_text(" USDT ", "crypto currency").unwrap(),
            "USDT"
        );
    }

    #[test]
    fn currency_codes_are_uppercased() {
        assert_eq!(normalize_currency_code(" usd "), "USD");
    }
}
