//! The admin edit form.

use api_types::transaction::{AdminTransactionView, TransactionEdit, TransactionStatus};
use rust_decimal::Decimal;

use crate::{
    client::{Client, Credentials},
    error::FormError,
};

/// Editable values as typed by the admin.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct EditFields {
    pub status: Option<TransactionStatus>,
    pub fiat_amount: String,
    pub crypto_currency: String,
    pub crypto_amount: String,
    pub wallet_address: String,
    pub commission: String,
    pub rate: String,
}

impl From<&AdminTransactionView> for EditFields {
    fn from(row: &AdminTransactionView) -> Self {
        Self {
            status: Some(row.status),
            fiat_amount: row.fiat_amount.to_string(),
            crypto_currency: row.crypto_currency.clone(),
            crypto_amount: row.crypto_amount.to_string(),
            wallet_address: row.wallet_address.clone(),
            commission: row.commission.to_string(),
            rate: row.rate.to_string(),
        }
    }
}

#[derive(Clone, Copy)]
enum Sign {
    Positive,
    NonNegative,
}

/// Only fields that differ from the baseline are sent.
#[derive(Debug, Clone)]
pub struct EditTransactionForm {
    id: i32,
    baseline: EditFields,
    pub fields: EditFields,
}

impl EditTransactionForm {
    /// Prefilled from an admin row.
    pub fn from_row(row: &AdminTransactionView) -> Self {
        let baseline = EditFields::from(row);
        Self {
            id: row.id,
            fields: baseline.clone(),
            baseline,
        }
    }

    /// Empty form: blank fields mean "unchanged".
    pub fn blank(id: i32) -> Self {
        Self {
            id,
            baseline: EditFields::default(),
            fields: EditFields::default(),
        }
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    /// Validates the changed fields and builds the partial update.
    pub fn changes(&self) -> Result<TransactionEdit, FormError> {
        let (fields, baseline) = (&self.fields, &self.baseline);

        let edit = TransactionEdit {
            status: fields.status.filter(|s| Some(*s) != baseline.status),
            fiat_amount: changed_amount(
                &fields.fiat_amount,
                &baseline.fiat_amount,
                "fiat amount",
                Sign::Positive,
            )?,
            crypto_currency: changed_text(
                &fields.crypto_currency,
                &baseline.crypto_currency,
                "crypto currency",
            )?,
            crypto_amount: changed_amount(
                &fields.crypto_amount,
                &baseline.crypto_amount,
                "crypto amount",
                Sign::Positive,
            )?,
            wallet_address: changed_text(
                &fields.wallet_address,
                &baseline.wallet_address,
                "wallet address",
            )?,
            commission: changed_amount(
                &fields.commission,
                &baseline.commission,
                "commission",
                Sign::NonNegative,
            )?,
            rate: changed_amount(&fields.rate, &baseline.rate, "rate", Sign::NonNegative)?,
        };

        if edit.is_empty() {
            return Err(FormError::Validation("nothing to change".to_string()));
        }
        Ok(edit)
    }

    pub async fn submit(
        &self,
        client: &Client,
        creds: &Credentials,
    ) -> Result<AdminTransactionView, FormError> {
        let edit = self.changes()?;
        let row = client
            .transaction_edit(creds, self.id, &edit)
            .await
            .inspect_err(|err| tracing::error!("failed to edit transaction {}: {err}", self.id))?;
        tracing::info!(id = self.id, status = row.status.as_str(), "transaction edited");
        Ok(row)
    }
}

fn changed_text(value: &str, baseline: &str, label: &str) -> Result<Option<String>, FormError> {
    let value = value.trim();
    if value == baseline.trim() {
        return Ok(None);
    }
    if value.is_empty() {
        return Err(FormError::Validation(format!("{label} must not be empty")));
    }
    Ok(Some(value.to_string()))
}

fn changed_amount(
    value: &str,
    baseline: &str,
    label: &str,
    sign: Sign,
) -> Result<Option<Decimal>, FormError> {
    if value.trim() == baseline.trim() {
        return Ok(None);
    }

    let parsed = engine::amount::parse(value)
        .and_then(|amount| match sign {
            Sign::Positive => engine::amount::require_positive(amount, label),
            Sign::NonNegative => engine::amount::require_non_negative(amount, label),
        })
        .map_err(|err| FormError::Validation(err.to_string()))?;

    // "100" and "100.00" are the same value.
    if engine::amount::parse(baseline).is_ok_and(|base| base == parsed) {
        return Ok(None);
    }
    Ok(Some(parsed))
}
