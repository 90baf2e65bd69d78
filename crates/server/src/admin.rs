//! Admin dashboard endpoints.

use api_types::transaction::{
    AdminTransactionListQuery, AdminTransactionView, TransactionEdit, TransactionPage,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use engine::Caller;

use crate::{
    ServerError,
    server::ServerState,
    transactions::{map_kind, map_status, parse_kind, parse_status},
};

fn admin_view(row: engine::AdminTransactionRow) -> AdminTransactionView {
    let tx = row.transaction;
    AdminTransactionView {
        id: tx.id,
        payment_id: tx.payment_id,
        user_email: row.user_email,
        kind: map_kind(tx.kind),
        fiat_currency: row.fiat_currency,
        fiat_amount: tx.fiat_amount,
        crypto_currency: tx.crypto_currency,
        crypto_amount: tx.crypto_amount,
        wallet_address: tx.wallet_address,
        status: map_status(tx.status),
        commission: tx.commission,
        rate: tx.rate,
        created_at: tx.created_at,
        last_change_date: tx.last_change_date,
        last_modified_by_id: tx.last_modified_by,
        last_modified_by_email: row.last_modified_by_email,
        bank_details_id: tx.bank_details_id,
    }
}

pub async fn list(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    Json(payload): Json<AdminTransactionListQuery>,
) -> Result<Json<TransactionPage<AdminTransactionView>>, ServerError> {
    let filter = engine::AdminTransactionFilter {
        payment_id: payload.payment_id,
        user_email: payload.user_email,
        statuses: payload
            .statuses
            .unwrap_or_default()
            .into_iter()
            .map(parse_status)
            .collect(),
        kind: payload.kind.map(parse_kind),
        created_from: payload.created_from,
        created_to: payload.created_to,
        modified_by_email: payload.modified_by_email,
        modified_from: payload.modified_from,
        modified_to: payload.modified_to,
    };

    let page = state
        .engine
        .list_admin_transactions(Some(&caller), &filter, payload.skip)
        .await?;

    Ok(Json(TransactionPage {
        transactions: page.items.into_iter().map(admin_view).collect(),
        total_pages: page.total_pages,
    }))
}

pub async fn edit(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(payload): Json<TransactionEdit>,
) -> Result<Json<AdminTransactionView>, ServerError> {
    let update = engine::TransactionUpdate {
        fiat_amount: payload.fiat_amount,
        crypto_currency: payload.crypto_currency,
        crypto_amount: payload.crypto_amount,
        wallet_address: payload.wallet_address,
        status: payload.status.map(parse_status),
        commission: payload.commission,
        rate: payload.rate,
    };

    let engine = &state.engine;
    let tx = engine.edit_transaction(Some(&caller), id, update).await?;
    let row = engine.admin_transaction(Some(&caller), tx.id).await?;

    Ok(Json(admin_view(row)))
}
