//! Plain-text output.

use api_types::{
    bank_details::BankDetails,
    currency::FiatCurrency,
    transaction::{AdminTransactionView, TransactionKind, TransactionView},
    user::Me,
};
use chrono_tz::Tz;

use crate::dates;

use super::{
    add_transaction::PaymentInstructions, admin_transactions::AdminTransactionsTable,
    transactions::TransactionsTable,
};

const NOT_AVAILABLE: &str = "N/A";

fn kind_label(kind: TransactionKind) -> &'static str {
    match kind {
        TransactionKind::Buy => "BUY",
        TransactionKind::Sell => "SELL",
    }
}

/// Left-aligned columns separated by two spaces.
fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: Vec<&str>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = vec![line(headers.to_vec())];
    out.extend(rows.iter().map(|row| line(row.iter().map(String::as_str).collect())));
    out.join("\n")
}

fn footer(page: u64, total_pages: u64) -> String {
    format!("page {page}/{}", total_pages.max(1))
}

pub fn transactions(table_state: &TransactionsTable, tz: Tz) -> String {
    if table_state.items.is_empty() {
        return format!(
            "no transactions\n{}",
            footer(table_state.page(), table_state.total_pages())
        );
    }

    let rows: Vec<Vec<String>> = table_state.items.iter().map(|tx| user_row(tx, tz)).collect();
    format!(
        "{}\n{}",
        table(
            &[
                "ID", "PAYMENT", "KIND", "FIAT", "CRYPTO", "WALLET", "STATUS", "CREATED", "BANK",
            ],
            &rows
        ),
        footer(table_state.page(), table_state.total_pages())
    )
}

fn user_row(tx: &TransactionView, tz: Tz) -> Vec<String> {
    vec![
        tx.id.to_string(),
        tx.payment_id.clone(),
        kind_label(tx.kind).to_string(),
        format!("{} {}", tx.fiat_amount, tx.fiat_currency),
        format!("{} {}", tx.crypto_amount, tx.crypto_currency),
        tx.wallet_address.clone(),
        tx.status.as_str().to_string(),
        dates::format(tx.created_at, tz),
        tx.bank_details_id.to_string(),
    ]
}

pub fn admin_transactions(table_state: &AdminTransactionsTable, tz: Tz) -> String {
    if table_state.items.is_empty() {
        return format!(
            "no transactions\n{}",
            footer(table_state.page(), table_state.total_pages())
        );
    }

    let rows: Vec<Vec<String>> = table_state
        .items
        .iter()
        .map(|tx| admin_row(tx, tz))
        .collect();
    format!(
        "{}\n{}",
        table(
            &[
                "ID", "PAYMENT", "USER", "KIND", "FIAT", "CRYPTO", "RATE", "COMMISSION", "STATUS",
                "CREATED", "CHANGED", "CHANGED BY",
            ],
            &rows
        ),
        footer(table_state.page(), table_state.total_pages())
    )
}

fn admin_row(tx: &AdminTransactionView, tz: Tz) -> Vec<String> {
    vec![
        tx.id.to_string(),
        tx.payment_id.clone(),
        tx.user_email.clone(),
        kind_label(tx.kind).to_string(),
        format!("{} {}", tx.fiat_amount, tx.fiat_currency),
        format!("{} {}", tx.crypto_amount, tx.crypto_currency),
        tx.rate.to_string(),
        tx.commission.to_string(),
        tx.status.as_str().to_string(),
        dates::format(tx.created_at, tz),
        tx.last_change_date
            .map_or_else(|| NOT_AVAILABLE.to_string(), |dt| dates::format(dt, tz)),
        tx.last_modified_by_email
            .clone()
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
    ]
}

pub fn admin_transaction(tx: &AdminTransactionView, tz: Tz) -> String {
    let row = admin_row(tx, tz);
    table(
        &[
            "ID", "PAYMENT", "USER", "KIND", "FIAT", "CRYPTO", "RATE", "COMMISSION", "STATUS",
            "CREATED", "CHANGED", "CHANGED BY",
        ],
        &[row],
    )
}

pub fn bank_details(details: &BankDetails) -> String {
    [
        format!("Bank:           {}", details.bank_name),
        format!("Account holder: {}", details.account_holder),
        format!("Account number: {}", details.account_number),
        format!("Bank address:   {}", details.bank_address),
        format!("IBAN:           {}", details.iban),
        format!("SWIFT:          {}", details.swift_code),
        format!("Currencies:     {}", details.currencies.join(", ")),
    ]
    .join("\n")
}

pub fn payment_instructions(instructions: &PaymentInstructions) -> String {
    format!(
        "Transaction {} created.\nTransfer {} {} and use {} as the payment reference.\n\n{}",
        instructions.id,
        instructions.fiat_amount,
        instructions.fiat_currency,
        instructions.payment_id,
        bank_details(&instructions.bank_details)
    )
}

pub fn currencies(currencies: &[FiatCurrency]) -> String {
    let rows: Vec<Vec<String>> = currencies
        .iter()
        .map(|c| vec![c.id.to_string(), c.code.clone()])
        .collect();
    table(&["ID", "CODE"], &rows)
}

pub fn me(me: &Me) -> String {
    format!(
        "{} <{}> id={}{}",
        me.username,
        me.email,
        me.id,
        if me.is_admin { " admin" } else { "" }
    )
}
