//! End-user transaction endpoints.

use api_types::transaction::{
    TransactionCreated, TransactionKind as ApiKind, TransactionListQuery, TransactionNew,
    TransactionPage, TransactionStatus as ApiStatus, TransactionView,
};
use axum::{Extension, Json, extract::State, http::StatusCode};
use engine::{Caller, TransactionKind, TransactionStatus};

use crate::{ServerError, bank_details::bank_details_view, server::ServerState};

pub(crate) fn map_status(status: TransactionStatus) -> ApiStatus {
    match status {
        TransactionStatus::New => ApiStatus::New,
        TransactionStatus::Pending => ApiStatus::Pending,
        TransactionStatus::Completed => ApiStatus::Completed,
        TransactionStatus::Cancelled => ApiStatus::Cancelled,
        TransactionStatus::Deleted => ApiStatus::Deleted,
        TransactionStatus::Failed => ApiStatus::Failed,
    }
}

pub(crate) fn parse_status(status: ApiStatus) -> TransactionStatus {
    match status {
        ApiStatus::New => TransactionStatus::New,
        ApiStatus::Pending => TransactionStatus::Pending,
        ApiStatus::Completed => TransactionStatus::Completed,
        ApiStatus::Cancelled => TransactionStatus::Cancelled,
        ApiStatus::Deleted => TransactionStatus::Deleted,
        ApiStatus::Failed => TransactionStatus::Failed,
    }
}

pub(crate) fn map_kind(kind: TransactionKind) -> ApiKind {
    match kind {
        TransactionKind::Buy => ApiKind::Buy,
        TransactionKind::Sell => ApiKind::Sell,
    }
}

pub(crate) fn parse_kind(kind: ApiKind) -> TransactionKind {
    match kind {
        ApiKind::Buy => TransactionKind::Buy,
        ApiKind::Sell => TransactionKind::Sell,
    }
}

fn transaction_view(row: engine::TransactionRow) -> TransactionView {
    let tx = row.transaction;
    TransactionView {
        id: tx.id,
        payment_id: tx.payment_id,
        kind: map_kind(tx.kind),
        fiat_currency: row.fiat_currency,
        fiat_amount: tx.fiat_amount,
        crypto_currency: tx.crypto_currency,
        crypto_amount: tx.crypto_amount,
        wallet_address: tx.wallet_address,
        status: map_status(tx.status),
        created_at: tx.created_at,
        bank_details_id: tx.bank_details_id,
    }
}

pub async fn list(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    Json(payload): Json<TransactionListQuery>,
) -> Result<Json<TransactionPage<TransactionView>>, ServerError> {
    let filter = engine::UserTransactionFilter {
        user_id: payload.user_id,
        payment_id: payload.payment_id,
        status: payload.status.map(parse_status),
        kind: payload.kind.map(parse_kind),
        created_from: payload.created_from,
        created_to: payload.created_to,
    };

    let page = state
        .engine
        .list_user_transactions(Some(&caller), &filter, payload.skip)
        .await?;

    Ok(Json(TransactionPage {
        transactions: page.items.into_iter().map(transaction_view).collect(),
        total_pages: page.total_pages,
    }))
}

pub async fn create(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    Json(payload): Json<TransactionNew>,
) -> Result<(StatusCode, Json<TransactionCreated>), ServerError> {
    let cmd = engine::NewTransactionCmd {
        kind: payload.kind.map_or(TransactionKind::Buy, parse_kind),
        fiat_currency_id: payload.fiat_currency_id,
        crypto_currency: payload.crypto_currency,
        fiat_amount: payload.fiat_amount,
        crypto_amount: payload.crypto_amount,
        rate: payload.rate,
        commission: payload.commission,
        wallet_address: payload.wallet_address,
        bank_details_id: payload.bank_details_id,
    };

    let created = state.engine.create_transaction(Some(&caller), cmd).await?;
    let tx = created.transaction;

    Ok((
        StatusCode::CREATED,
        Json(TransactionCreated {
            id: tx.id,
            payment_id: tx.payment_id,
            status: map_status(tx.status),
            fiat_currency: created.fiat_currency,
            fiat_amount: tx.fiat_amount,
            bank_details: bank_details_view(created.bank_details),
        }),
    ))
}
