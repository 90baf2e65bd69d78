pub use bank_details::{BankDetails, BankDetailsNew};
pub use caller::Caller;
pub use error::EngineError;
pub use fiat_currencies::FiatCurrency;
pub use ops::{
    AdminTransactionFilter, AdminTransactionRow, CreatedTransaction, Engine, EngineBuilder,
    NewTransactionCmd, PAGE_SIZE, Page, TransactionRow, TransactionUpdate, UserNew,
    UserTransactionFilter, total_pages,
};
pub use transactions::{Transaction, TransactionKind, TransactionStatus};

pub mod amount;
mod bank_details;
mod bank_details_currencies;
mod caller;
mod error;
mod fiat_currencies;
mod ops;
mod transactions;
mod users;

type ResultEngine<T> = Result<T, EngineError>;
