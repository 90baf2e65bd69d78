//! Bank-details lookup endpoints.

use api_types::bank_details::{BankDetails, BankDetailsList};
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use engine::Caller;

use crate::{ServerError, server::ServerState};

pub(crate) fn bank_details_view(details: engine::BankDetails) -> BankDetails {
    BankDetails {
        id: details.id,
        bank_name: details.bank_name,
        account_holder: details.account_holder,
        account_number: details.account_number,
        bank_address: details.bank_address,
        iban: details.iban,
        swift_code: details.swift_code,
        currencies: details.currencies,
    }
}

pub async fn by_currency(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    Path(code): Path<String>,
) -> Result<Json<BankDetailsList>, ServerError> {
    let details = state
        .engine
        .bank_details_by_currency(Some(&caller), &code)
        .await?;

    Ok(Json(BankDetailsList {
        bank_details: details.into_iter().map(bank_details_view).collect(),
    }))
}

pub async fn by_id(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<BankDetails>, ServerError> {
    let details = state.engine.bank_details_by_id(Some(&caller), id).await?;
    Ok(Json(bank_details_view(details)))
}
