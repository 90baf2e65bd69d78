use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveValue, TransactionTrait, prelude::*};

use crate::{
    BankDetails, Caller, EngineError, ResultEngine, Transaction, TransactionKind,
    TransactionStatus, amount, fiat_currencies,
    transactions::{self, new_payment_id},
};

use super::super::{Engine, access, bank_details, normalize_required_text, with_tx};

/// A user's exchange order, as submitted.
#[derive(Clone, Debug)]
pub struct NewTransactionCmd {
    pub kind: TransactionKind,
    pub fiat_currency_id: i32,
    pub crypto_currency: String,
    pub fiat_amount: Decimal,
    /// Derived from `fiat_amount * rate - commission` when absent.
    pub crypto_amount: Option<Decimal>,
    pub rate: Option<Decimal>,
    pub commission: Option<Decimal>,
    pub wallet_address: String,
    pub bank_details_id: i32,
}

/// What the user needs to complete the payment.
#[derive(Clone, Debug, PartialEq)]
pub struct CreatedTransaction {
    pub transaction: Transaction,
    pub fiat_currency: String,
    pub bank_details: BankDetails,
}

/// Partial admin edit. `None` leaves the field untouched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TransactionUpdate {
    pub fiat_amount: Option<Decimal>,
    pub crypto_currency: Option<String>,
    pub crypto_amount: Option<Decimal>,
    pub wallet_address: Option<String>,
    pub status: Option<TransactionStatus>,
    pub commission: Option<Decimal>,
    pub rate: Option<Decimal>,
}

impl TransactionUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

struct ValidatedNew {
    crypto_currency: String,
    wallet_address: String,
    fiat_amount: Decimal,
    crypto_amount: Decimal,
    rate: Decimal,
    commission: Decimal,
}

fn validate_new(cmd: &NewTransactionCmd) -> ResultEngine<ValidatedNew> {
    let crypto_currency =
        normalize_required_text(&cmd.crypto_currency, "crypto currency")?.to_ascii_uppercase();
    let wallet_address = normalize_required_text(&cmd.wallet_address, "wallet address")?;
    let fiat_amount = amount::require_positive(cmd.fiat_amount, "fiat_amount")?;
    let rate = amount::require_non_negative(cmd.rate.unwrap_or_default(), "rate")?;
    let commission =
        amount::require_non_negative(cmd.commission.unwrap_or_default(), "commission")?;

    let crypto_amount = match cmd.crypto_amount {
        Some(value) => amount::require_non_negative(value, "crypto_amount")?,
        None if rate > Decimal::ZERO => {
            let derived = fiat_amount * rate - commission;
            if derived < Decimal::ZERO {
                return Err(EngineError::InvalidAmount(
                    "commission exceeds the converted amount".to_string(),
                ));
            }
            derived
        }
        None => Decimal::ZERO,
    };

    Ok(ValidatedNew {
        crypto_currency,
        wallet_address,
        fiat_amount,
        crypto_amount,
        rate,
        commission,
    })
}

impl Engine {
    /// Records a new exchange order for the caller.
    ///
    /// The bank account must accept the chosen fiat currency. The order starts
    /// in `New`; only an admin edit moves it afterwards.
    pub async fn create_transaction(
        &self,
        caller: Option<&Caller>,
        cmd: NewTransactionCmd,
    ) -> ResultEngine<CreatedTransaction> {
        let caller = access::authenticated(caller)?;
        let valid = validate_new(&cmd)?;

        with_tx!(self, |db_tx| {
            access::require_user_exists(&db_tx, caller.user_id).await?;
            let currency = fiat_currencies::Entity::find_by_id(cmd.fiat_currency_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| {
                    EngineError::KeyNotFound(format!(
                        "No fiat currency found for id: {}",
                        cmd.fiat_currency_id
                    ))
                })?;
            let details = bank_details::require_bank_details(&db_tx, cmd.bank_details_id).await?;
            bank_details::require_accepts_currency(&db_tx, details.id, currency.id).await?;

            let model = transactions::ActiveModel {
                id: ActiveValue::NotSet,
                payment_id: ActiveValue::Set(new_payment_id()),
                user_id: ActiveValue::Set(caller.user_id),
                kind: ActiveValue::Set(cmd.kind.as_str().to_string()),
                fiat_currency_id: ActiveValue::Set(currency.id),
                crypto_currency: ActiveValue::Set(valid.crypto_currency),
                fiat_amount: ActiveValue::Set(amount::to_storage(valid.fiat_amount)),
                crypto_amount: ActiveValue::Set(amount::to_storage(valid.crypto_amount)),
                rate: ActiveValue::Set(amount::to_storage(valid.rate)),
                commission: ActiveValue::Set(amount::to_storage(valid.commission)),
                wallet_address: ActiveValue::Set(valid.wallet_address),
                status: ActiveValue::Set(TransactionStatus::New.as_str().to_string()),
                created_at: ActiveValue::Set(Utc::now()),
                last_change_date: ActiveValue::Set(None),
                last_modified_by: ActiveValue::Set(None),
                bank_details_id: ActiveValue::Set(details.id),
            }
            .insert(&db_tx)
            .await?;

            let transaction = Transaction::try_from(model)?;
            tracing::info!(
                id = transaction.id,
                payment_id = %transaction.payment_id,
                user_id = caller.user_id,
                "transaction created"
            );

            Ok(CreatedTransaction {
                transaction,
                fiat_currency: currency.currency_code,
                bank_details: details,
            })
        })
    }

    /// Applies an admin edit and stamps the admin as last modifier.
    ///
    /// Status changes must follow [`TransactionStatus::can_transition_to`].
    pub async fn edit_transaction(
        &self,
        caller: Option<&Caller>,
        id: i32,
        update: TransactionUpdate,
    ) -> ResultEngine<Transaction> {
        let caller = access::require_admin(caller)?;
        if update.is_empty() {
            return Err(EngineError::InvalidInput(
                "at least one field must be updated".to_string(),
            ));
        }

        let fiat_amount = update
            .fiat_amount
            .map(|v| amount::require_positive(v, "fiat_amount"))
            .transpose()?;
        let crypto_amount = update
            .crypto_amount
            .map(|v| amount::require_positive(v, "crypto_amount"))
            .transpose()?;
        let rate = update
            .rate
            .map(|v| amount::require_non_negative(v, "rate"))
            .transpose()?;
        let commission = update
            .commission
            .map(|v| amount::require_non_negative(v, "commission"))
            .transpose()?;
        let crypto_currency = update
            .crypto_currency
            .as_deref()
            .map(|v| normalize_required_text(v, "crypto currency").map(|s| s.to_ascii_uppercase()))
            .transpose()?;
        let wallet_address = update
            .wallet_address
            .as_deref()
            .map(|v| normalize_required_text(v, "wallet address"))
            .transpose()?;

        with_tx!(self, |db_tx| {
            let model = transactions::Entity::find_by_id(id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound(format!("transaction {id} not exists")))?;

            if let Some(next) = update.status {
                let current = TransactionStatus::try_from(model.status.as_str())?;
                if !current.can_transition_to(next) {
                    return Err(EngineError::InvalidStatus(format!(
                        "cannot move transaction from {current} to {next}"
                    )));
                }
            }

            let mut active: transactions::ActiveModel = model.into();
            if let Some(value) = fiat_amount {
                active.fiat_amount = ActiveValue::Set(amount::to_storage(value));
            }
            if let Some(value) = crypto_amount {
                active.crypto_amount = ActiveValue::Set(amount::to_storage(value));
            }
            if let Some(value) = rate {
                active.rate = ActiveValue::Set(amount::to_storage(value));
            }
            if let Some(value) = commission {
                active.commission = ActiveValue::Set(amount::to_storage(value));
            }
            if let Some(value) = crypto_currency {
                active.crypto_currency = ActiveValue::Set(value);
            }
            if let Some(value) = wallet_address {
                active.wallet_address = ActiveValue::Set(value);
            }
            if let Some(status) = update.status {
                active.status = ActiveValue::Set(status.as_str().to_string());
            }
            active.last_change_date = ActiveValue::Set(Some(Utc::now()));
            active.last_modified_by = ActiveValue::Set(Some(caller.user_id));

            let updated = active.update(&db_tx).await?;
            tracing::info!(id, admin = caller.user_id, status = %updated.status, "transaction edited");
            Transaction::try_from(updated)
        })
    }
}
