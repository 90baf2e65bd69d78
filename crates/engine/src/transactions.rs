//! Transaction primitives.
//!
//! A `Transaction` is an exchange order submitted by a user against a
//! `BankDetails` account. Its lifecycle is driven by `TransactionStatus`:
//!
//! ```text
//! New -> Pending -> Completed
//!  \        \
//!   +--------+--> Cancelled | Failed | Deleted
//! ```
//!
//! Only admins move a transaction along; nothing transitions automatically.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, amount};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionStatus {
    New,
    Pending,
    Completed,
    Cancelled,
    Deleted,
    Failed,
}

impl TransactionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "New",
            Self::Pending => "Pending",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
            Self::Deleted => "Deleted",
            Self::Failed => "Failed",
        }
    }

    /// Terminal statuses never change again.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Cancelled | Self::Deleted | Self::Failed
        )
    }

    /// Whether an admin edit may move a transaction from `self` to `next`.
    ///
    /// Re-applying the current status is always accepted.
    pub fn can_transition_to(self, next: TransactionStatus) -> bool {
        if self == next {
            return true;
        }
        if self.is_terminal() {
            return false;
        }
        match next {
            Self::New => false,
            Self::Pending => self == Self::New,
            Self::Completed | Self::Cancelled | Self::Deleted | Self::Failed => true,
        }
    }
}

impl core::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TransactionStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "new" => Ok(Self::New),
            "pending" | "in progress" => Ok(Self::Pending),
            "completed" | "done" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            "deleted" => Ok(Self::Deleted),
            "failed" => Ok(Self::Failed),
            other => Err(EngineError::InvalidStatus(format!(
                "invalid transaction status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    Buy,
    Sell,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
        }
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "BUY" => Ok(Self::Buy),
            "SELL" => Ok(Self::Sell),
            other => Err(EngineError::InvalidInput(format!(
                "invalid transaction kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i32,
    pub payment_id: String,
    pub user_id: i32,
    pub kind: TransactionKind,
    pub fiat_currency_id: i32,
    pub crypto_currency: String,
    pub fiat_amount: Decimal,
    pub crypto_amount: Decimal,
    pub rate: Decimal,
    pub commission: Decimal,
    pub wallet_address: String,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
    pub last_change_date: Option<DateTime<Utc>>,
    pub last_modified_by: Option<i32>,
    pub bank_details_id: i32,
}

/// Generates the user-facing payment reference, e.g. `PAY-3FA85F6457B2`.
pub(crate) fn new_payment_id() -> String {
    let raw = Uuid::new_v4().simple().to_string().to_ascii_uppercase();
    format!("PAY-{}", &raw[..12])
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub payment_id: String,
    pub user_id: i32,
    pub kind: String,
    pub fiat_currency_id: i32,
    pub crypto_currency: String,
    pub fiat_amount: String,
    pub crypto_amount: String,
    pub rate: String,
    pub commission: String,
    pub wallet_address: String,
    pub status: String,
    pub created_at: DateTimeUtc,
    pub last_change_date: Option<DateTimeUtc>,
    pub last_modified_by: Option<i32>,
    pub bank_details_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    Owner,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::LastModifiedBy",
        to = "super::users::Column::Id"
    )]
    LastModifiedBy,
    #[sea_orm(
        belongs_to = "super::bank_details::Entity",
        from = "Column::BankDetailsId",
        to = "super::bank_details::Column::Id"
    )]
    BankDetails,
    #[sea_orm(
        belongs_to = "super::fiat_currencies::Entity",
        from = "Column::FiatCurrencyId",
        to = "super::fiat_currencies::Column::Id"
    )]
    FiatCurrency,
}

impl Related<super::bank_details::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BankDetails.def()
    }
}

impl Related<super::fiat_currencies::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FiatCurrency.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            kind: TransactionKind::try_from(model.kind.as_str())?,
            status: TransactionStatus::try_from(model.status.as_str())?,
            fiat_amount: amount::from_storage(&model.fiat_amount, "fiat_amount")?,
            crypto_amount: amount::from_storage(&model.crypto_amount, "crypto_amount")?,
            rate: amount::from_storage(&model.rate, "rate")?,
            commission: amount::from_storage(&model.commission, "commission")?,
            payment_id: model.payment_id,
            user_id: model.user_id,
            fiat_currency_id: model.fiat_currency_id,
            crypto_currency: model.crypto_currency,
            wallet_address: model.wallet_address,
            created_at: model.created_at,
            last_change_date: model.last_change_date,
            last_modified_by: model.last_modified_by,
            bank_details_id: model.bank_details_id,
        })
    }
}
