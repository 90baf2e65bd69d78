use std::collections::HashMap;

use sea_orm::{
    ConnectionTrait, PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait, prelude::*,
};

use crate::{
    BankDetails, BankDetailsNew, Caller, EngineError, ResultEngine, bank_details,
    bank_details_currencies, transactions,
};

use super::{Engine, access, currencies, normalize_currency_code, normalize_required_text, with_tx};

/// Loads the accepted currency codes of each bank-details row.
pub(super) async fn with_currencies<C: ConnectionTrait>(
    db: &C,
    models: Vec<bank_details::Model>,
) -> ResultEngine<Vec<BankDetails>> {
    let ids: Vec<i32> = models.iter().map(|m| m.id).collect();
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let links = bank_details_currencies::Entity::find()
        .filter(bank_details_currencies::Column::BankDetailsId.is_in(ids))
        .all(db)
        .await?;
    let codes = currencies::codes_by_id(db, links.iter().map(|l| l.fiat_currency_id)).await?;

    let mut by_bank: HashMap<i32, Vec<String>> = HashMap::new();
    for link in links {
        if let Some(code) = codes.get(&link.fiat_currency_id) {
            by_bank
                .entry(link.bank_details_id)
                .or_default()
                .push(code.clone());
        }
    }

    Ok(models
        .into_iter()
        .map(|model| {
            let mut currencies = by_bank.remove(&model.id).unwrap_or_default();
            currencies.sort();
            BankDetails::from_model(model, currencies)
        })
        .collect())
}

pub(super) async fn require_bank_details<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> ResultEngine<BankDetails> {
    let model = bank_details::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound(format!("No bank details found for the id: {id}")))?;
    with_currencies(db, vec![model])
        .await?
        .pop()
        .ok_or_else(|| EngineError::KeyNotFound(format!("No bank details found for the id: {id}")))
}

/// Fails with `CurrencyMismatch` if the bank account cannot receive the currency.
pub(super) async fn require_accepts_currency<C: ConnectionTrait>(
    db: &C,
    bank_details_id: i32,
    fiat_currency_id: i32,
) -> ResultEngine<()> {
    let link = bank_details_currencies::Entity::find_by_id((bank_details_id, fiat_currency_id))
        .one(db)
        .await?;
    if link.is_none() {
        return Err(EngineError::CurrencyMismatch(format!(
            "bank details {bank_details_id} do not accept currency {fiat_currency_id}"
        )));
    }
    Ok(())
}

impl Engine {
    /// Returns every bank account accepting the given fiat currency code.
    pub async fn bank_details_by_currency(
        &self,
        caller: Option<&Caller>,
        code: &str,
    ) -> ResultEngine<Vec<BankDetails>> {
        access::authenticated(caller)?;
        let code = normalize_currency_code(code);
        let not_found = || {
            EngineError::KeyNotFound(format!(
                "No bank details found for the currency code: {code}"
            ))
        };

        let currency = currencies::find_by_code(&self.database, &code)
            .await?
            .ok_or_else(not_found)?;

        let bank_ids: Vec<i32> = bank_details_currencies::Entity::find()
            .filter(bank_details_currencies::Column::FiatCurrencyId.eq(currency.id))
            .all(&self.database)
            .await?
            .into_iter()
            .map(|link| link.bank_details_id)
            .collect();
        if bank_ids.is_empty() {
            return Err(not_found());
        }

        let models = bank_details::Entity::find()
            .filter(bank_details::Column::Id.is_in(bank_ids))
            .order_by_asc(bank_details::Column::Id)
            .all(&self.database)
            .await?;
        with_currencies(&self.database, models).await
    }

    /// Returns one bank account, provided the caller has a transaction
    /// paying into it (or is an admin).
    pub async fn bank_details_by_id(
        &self,
        caller: Option<&Caller>,
        id: i32,
    ) -> ResultEngine<BankDetails> {
        let caller = access::authenticated(caller)?;

        let details = require_bank_details(&self.database, id).await?;

        let referencing = transactions::Entity::find()
            .filter(transactions::Column::BankDetailsId.eq(id));
        if referencing.clone().count(&self.database).await? == 0 {
            return Err(EngineError::KeyNotFound("Transaction not found".to_string()));
        }

        let owns = !caller.is_admin
            && referencing
                .filter(transactions::Column::UserId.eq(caller.user_id))
                .count(&self.database)
                .await?
                > 0;
        access::require_admin_or_owner(caller, owns)?;
        Ok(details)
    }

    /// Registers a bank account and the currencies it accepts. Used by the
    /// admin tooling.
    pub async fn new_bank_details(&self, details: BankDetailsNew) -> ResultEngine<i32> {
        let bank_name = normalize_required_text(&details.bank_name, "bank name")?;
        let account_holder = normalize_required_text(&details.account_holder, "account holder")?;
        let account_number = normalize_required_text(&details.account_number, "account number")?;
        let bank_address = normalize_required_text(&details.bank_address, "bank address")?;
        let iban = normalize_required_text(&details.iban, "iban")?;
        let swift_code = normalize_required_text(&details.swift_code, "swift code")?;
        if details.currencies.is_empty() {
            return Err(EngineError::InvalidInput(
                "bank details must accept at least one currency".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            let mut currency_ids = Vec::with_capacity(details.currencies.len());
            for code in &details.currencies {
                let currency = currencies::find_by_code(&db_tx, code)
                    .await?
                    .ok_or_else(|| {
                        EngineError::KeyNotFound(format!(
                            "No fiat currency found for code: {}",
                            normalize_currency_code(code)
                        ))
                    })?;
                if !currency_ids.contains(&currency.id) {
                    currency_ids.push(currency.id);
                }
            }

            let model = bank_details::ActiveModel {
                bank_name: Set(bank_name),
                account_holder: Set(account_holder),
                account_number: Set(account_number),
                bank_address: Set(bank_address),
                iban: Set(iban),
                swift_code: Set(swift_code),
                ..Default::default()
            }
            .insert(&db_tx)
            .await?;

            for fiat_currency_id in currency_ids {
                bank_details_currencies::ActiveModel {
                    bank_details_id: Set(model.id),
                    fiat_currency_id: Set(fiat_currency_id),
                }
                .insert(&db_tx)
                .await?;
            }

            tracing::info!(id = model.id, "bank details registered");
            Ok(model.id)
        })
    }
}
