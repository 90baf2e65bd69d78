//! Command-line surface.

use api_types::transaction::{TransactionKind, TransactionStatus};
use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "cryptotx-client", disable_version_flag = true)]
pub struct Args {
    /// Optional config file path (TOML).
    #[arg(long)]
    pub config: Option<String>,
    /// Override base URL (e.g. http://127.0.0.1:3000).
    #[arg(long)]
    pub base_url: Option<String>,
    /// Override username (password is never read from CLI).
    #[arg(long)]
    pub username: Option<String>,
    /// Override timezone (IANA name) used to show and read dates.
    #[arg(long)]
    pub timezone: Option<String>,
    /// Override the wallet address prefilled in new transactions.
    #[arg(long)]
    pub wallet_address: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the authenticated user.
    Me,
    /// List supported fiat currencies.
    Currencies,
    /// List your own transactions.
    List(ListArgs),
    /// List every user's transactions (admin only).
    AdminList(AdminListArgs),
    /// Submit a new exchange order and print the payment instructions.
    Create(CreateArgs),
    /// Edit a transaction (admin only).
    Edit(EditArgs),
    /// Show bank details, by currency or by id.
    BankDetails(BankDetailsArgs),
}

#[derive(Debug, Default, ClapArgs)]
pub struct ListArgs {
    /// 1-based page number.
    #[arg(long, default_value_t = 1)]
    pub page: u64,
    #[arg(long)]
    pub payment_id: Option<String>,
    #[arg(long, value_parser = parse_status)]
    pub status: Option<TransactionStatus>,
    #[arg(long, value_parser = parse_kind)]
    pub kind: Option<TransactionKind>,
    /// `YYYY-MM-DD` or RFC 3339, inclusive.
    #[arg(long)]
    pub from: Option<String>,
    /// `YYYY-MM-DD` or RFC 3339, inclusive.
    #[arg(long)]
    pub to: Option<String>,
}

#[derive(Debug, Default, ClapArgs)]
pub struct AdminListArgs {
    #[arg(long, default_value_t = 1)]
    pub page: u64,
    #[arg(long)]
    pub payment_id: Option<String>,
    /// Substring of the owner's email.
    #[arg(long)]
    pub email: Option<String>,
    /// Repeatable; matches any of the given statuses.
    #[arg(long = "status", value_parser = parse_status)]
    pub statuses: Vec<TransactionStatus>,
    #[arg(long, value_parser = parse_kind)]
    pub kind: Option<TransactionKind>,
    #[arg(long)]
    pub from: Option<String>,
    #[arg(long)]
    pub to: Option<String>,
    /// Substring of the last modifier's email.
    #[arg(long)]
    pub modified_by: Option<String>,
    #[arg(long)]
    pub modified_from: Option<String>,
    #[arg(long)]
    pub modified_to: Option<String>,
}

#[derive(Debug, ClapArgs)]
pub struct CreateArgs {
    /// Fiat amount; `.` or `,` as decimal separator.
    #[arg(long)]
    pub amount: String,
    #[arg(long, default_value = "USD")]
    pub currency: String,
    #[arg(long, value_parser = parse_kind)]
    pub kind: Option<TransactionKind>,
    /// Bank details to pay into; defaults to the first one for the currency.
    #[arg(long)]
    pub bank_details_id: Option<i32>,
}

#[derive(Debug, Default, ClapArgs)]
pub struct EditArgs {
    pub id: i32,
    #[arg(long, value_parser = parse_status)]
    pub status: Option<TransactionStatus>,
    #[arg(long)]
    pub fiat_amount: Option<String>,
    #[arg(long)]
    pub crypto_currency: Option<String>,
    #[arg(long)]
    pub crypto_amount: Option<String>,
    #[arg(long)]
    pub wallet_address: Option<String>,
    #[arg(long)]
    pub commission: Option<String>,
    #[arg(long)]
    pub rate: Option<String>,
}

#[derive(Debug, ClapArgs)]
pub struct BankDetailsArgs {
    #[arg(long, conflicts_with = "id", required_unless_present = "id")]
    pub currency: Option<String>,
    #[arg(long)]
    pub id: Option<i32>,
}

/// Accepts status names case-insensitively, plus the labels `In Progress` and
/// `Done`.
pub fn parse_status(raw: &str) -> Result<TransactionStatus, String> {
    let wanted = raw.trim().to_ascii_lowercase();
    match wanted.as_str() {
        "in progress" | "in-progress" => return Ok(TransactionStatus::Pending),
        "done" => return Ok(TransactionStatus::Completed),
        _ => {}
    }
    TransactionStatus::ALL
        .into_iter()
        .find(|status| status.as_str().eq_ignore_ascii_case(&wanted))
        .ok_or_else(|| format!("unknown status: {raw}"))
}

pub fn parse_kind(raw: &str) -> Result<TransactionKind, String> {
    match raw.trim().to_ascii_uppercase().as_str() {
        "BUY" => Ok(TransactionKind::Buy),
        "SELL" => Ok(TransactionKind::Sell),
        _ => Err(format!("unknown kind: {raw}")),
    }
}
