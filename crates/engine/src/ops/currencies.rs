use std::collections::HashMap;

use sea_orm::{ConnectionTrait, QueryFilter, QueryOrder, Set, prelude::*};

use crate::{Caller, EngineError, FiatCurrency, ResultEngine, fiat_currencies};

use super::{Engine, access, normalize_currency_code};

pub(super) async fn find_by_code<C: ConnectionTrait>(
    db: &C,
    code: &str,
) -> ResultEngine<Option<fiat_currencies::Model>> {
    fiat_currencies::Entity::find()
        .filter(fiat_currencies::Column::CurrencyCode.eq(normalize_currency_code(code)))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Maps currency ids to their codes.
pub(super) async fn codes_by_id<C: ConnectionTrait>(
    db: &C,
    ids: impl IntoIterator<Item = i32>,
) -> ResultEngine<HashMap<i32, String>> {
    let mut ids: Vec<i32> = ids.into_iter().collect();
    ids.sort_unstable();
    ids.dedup();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = fiat_currencies::Entity::find()
        .filter(fiat_currencies::Column::Id.is_in(ids))
        .all(db)
        .await?;
    Ok(rows
        .into_iter()
        .map(|row| (row.id, row.currency_code))
        .collect())
}

fn validate_new_code(code: &str) -> ResultEngine<String> {
    let code = normalize_currency_code(code);
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(EngineError::InvalidInput(format!(
            "invalid currency code: {code}"
        )));
    }
    Ok(code)
}

impl Engine {
    /// Resolves a fiat currency code (e.g. `USD`) to its id.
    pub async fn fiat_currency_id(&self, caller: Option<&Caller>, code: &str) -> ResultEngine<i32> {
        access::authenticated(caller)?;

        find_by_code(&self.database, code)
            .await?
            .map(|model| model.id)
            .ok_or_else(|| {
                EngineError::KeyNotFound(format!(
                    "No fiat currency found for code: {}",
                    normalize_currency_code(code)
                ))
            })
    }

    /// Lists every supported fiat currency ordered by code.
    pub async fn fiat_currencies(&self, caller: Option<&Caller>) -> ResultEngine<Vec<FiatCurrency>> {
        access::authenticated(caller)?;

        let rows = fiat_currencies::Entity::find()
            .order_by_asc(fiat_currencies::Column::CurrencyCode)
            .all(&self.database)
            .await?;
        Ok(rows.into_iter().map(FiatCurrency::from).collect())
    }

    /// Registers a new fiat currency. Used by the admin tooling.
    pub async fn new_fiat_currency(&self, code: &str) -> ResultEngine<i32> {
        let code = validate_new_code(code)?;
        if find_by_code(&self.database, &code).await?.is_some() {
            return Err(EngineError::ExistingKey(code));
        }

        let model = fiat_currencies::ActiveModel {
            currency_code: Set(code.clone()),
            ..Default::default()
        }
        .insert(&self.database)
        .await?;

        tracing::info!(currency = %code, id = model.id, "fiat currency registered");
        Ok(model.id)
    }
}
