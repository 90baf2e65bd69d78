use api_types::currency::{FiatCurrency, FiatCurrencyList};
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use engine::Caller;

use crate::{ServerError, server::ServerState};

pub async fn list(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
) -> Result<Json<FiatCurrencyList>, ServerError> {
    let currencies = state.engine.fiat_currencies(Some(&caller)).await?;

    Ok(Json(FiatCurrencyList {
        currencies: currencies
            .into_iter()
            .map(|c| FiatCurrency {
                id: c.id,
                code: c.code,
            })
            .collect(),
    }))
}

pub async fn id_by_code(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    Path(code): Path<String>,
) -> Result<Json<FiatCurrency>, ServerError> {
    let id = state.engine.fiat_currency_id(Some(&caller), &code).await?;

    Ok(Json(FiatCurrency {
        id,
        code: code.trim().to_ascii_uppercase(),
    }))
}
