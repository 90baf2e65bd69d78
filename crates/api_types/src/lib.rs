use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub mod user {
    use super::*;

    /// The authenticated caller, as seen by the server.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Me {
        pub id: i32,
        pub email: String,
        pub username: String,
        pub is_admin: bool,
        pub is_verified: bool,
    }
}

pub mod currency {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct FiatCurrency {
        pub id: i32,
        pub code: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct FiatCurrencyList {
        pub currencies: Vec<FiatCurrency>,
    }
}

pub mod bank_details {
    use super::*;

    /// Bank account used to receive a fiat payment.
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct BankDetails {
        pub id: i32,
        pub bank_name: String,
        pub account_holder: String,
        pub account_number: String,
        pub bank_address: String,
        pub iban: String,
        pub swift_code: String,
        /// Fiat currency codes this account accepts.
        pub currencies: Vec<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BankDetailsList {
        pub bank_details: Vec<BankDetails>,
    }
}

pub mod transaction {
    use super::*;
    use crate::bank_details::BankDetails;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub enum TransactionStatus {
        New,
        #[serde(alias = "In Progress")]
        Pending,
        #[serde(alias = "Done")]
        Completed,
        Cancelled,
        Deleted,
        Failed,
    }

    impl TransactionStatus {
        pub const ALL: [TransactionStatus; 6] = [
            Self::New,
            Self::Pending,
            Self::Completed,
            Self::Cancelled,
            Self::Deleted,
            Self::Failed,
        ];

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
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "UPPERCASE")]
    pub enum TransactionKind {
        Buy,
        Sell,
    }

    /// Request body for listing the caller's own transactions.
    ///
    /// Empty strings are treated as absent filters. `created_from` and
    /// `created_to` are both inclusive.
    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    pub struct TransactionListQuery {
        #[serde(default)]
        pub skip: u64,
        pub user_id: i32,
        pub payment_id: Option<String>,
        pub status: Option<TransactionStatus>,
        pub kind: Option<TransactionKind>,
        pub created_from: Option<DateTime<Utc>>,
        pub created_to: Option<DateTime<Utc>>,
    }

    /// Request body for the admin transactions list.
    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    pub struct AdminTransactionListQuery {
        #[serde(default)]
        pub skip: u64,
        pub payment_id: Option<String>,
        pub user_email: Option<String>,
        /// Union of accepted statuses. Empty means no filter.
        pub statuses: Option<Vec<TransactionStatus>>,
        pub kind: Option<TransactionKind>,
        pub created_from: Option<DateTime<Utc>>,
        pub created_to: Option<DateTime<Utc>>,
        pub modified_by_email: Option<String>,
        pub modified_from: Option<DateTime<Utc>>,
        pub modified_to: Option<DateTime<Utc>>,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: i32,
        pub payment_id: String,
        pub kind: TransactionKind,
        pub fiat_currency: String,
        pub fiat_amount: Decimal,
        pub crypto_currency: String,
        pub crypto_amount: Decimal,
        pub wallet_address: String,
        pub status: TransactionStatus,
        pub created_at: DateTime<Utc>,
        pub bank_details_id: i32,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct AdminTransactionView {
        pub id: i32,
        pub payment_id: String,
        pub user_email: String,
        pub kind: TransactionKind,
        pub fiat_currency: String,
        pub fiat_amount: Decimal,
        pub crypto_currency: String,
        pub crypto_amount: Decimal,
        pub wallet_address: String,
        pub status: TransactionStatus,
        pub commission: Decimal,
        pub rate: Decimal,
        pub created_at: DateTime<Utc>,
        pub last_change_date: Option<DateTime<Utc>>,
        pub last_modified_by_id: Option<i32>,
        /// `None` when the transaction was never edited.
        pub last_modified_by_email: Option<String>,
        pub bank_details_id: i32,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct TransactionPage<T> {
        pub transactions: Vec<T>,
        pub total_pages: u64,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct TransactionNew {
        /// Defaults to `BUY`.
        pub kind: Option<TransactionKind>,
        pub fiat_currency_id: i32,
        pub crypto_currency: String,
        pub fiat_amount: Decimal,
        pub crypto_amount: Option<Decimal>,
        pub rate: Option<Decimal>,
        pub commission: Option<Decimal>,
        pub wallet_address: String,
        pub bank_details_id: i32,
    }

    /// Response for a created transaction: what the user needs to pay.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct TransactionCreated {
        pub id: i32,
        pub payment_id: String,
        pub status: TransactionStatus,
        pub fiat_currency: String,
        pub fiat_amount: Decimal,
        pub bank_details: BankDetails,
    }

    /// Partial update applied by an admin. Absent fields are left unchanged.
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    pub struct TransactionEdit {
        pub fiat_amount: Option<Decimal>,
        pub crypto_currency: Option<String>,
        pub crypto_amount: Option<Decimal>,
        pub wallet_address: Option<String>,
        pub status: Option<TransactionStatus>,
        pub commission: Option<Decimal>,
        pub rate: Option<Decimal>,
    }

    impl TransactionEdit {
        pub fn is_empty(&self) -> bool {
            *self == Self::default()
        }
    }
}
