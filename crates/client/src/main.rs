use std::io::Write;

use chrono_tz::Tz;
use clap::Parser;
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use tracing_subscriber::EnvFilter;

use cryptotx_client::{
    cli::{AdminListArgs, Args, BankDetailsArgs, Command, CreateArgs, EditArgs, ListArgs},
    client::{Client, Credentials},
    config::{self, AppConfig},
    dates::{self, Bound},
    error::{AppError, Result},
    views::{
        add_transaction::AddTransactionForm,
        admin_transactions::{AdminFilters, AdminTransactionsTable},
        edit_transaction::EditTransactionForm,
        render,
        transactions::{TransactionsTable, UserFilters},
    },
};

const PASSWORD_ENV: &str = "CRYPTOTX_PASSWORD";

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn prompt_password(prompt: &str) -> Result<String> {
    let _raw = RawModeGuard::enter()?;

    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(prompt)
    )?;
    out.flush()?;

    let mut buf = String::new();
    loop {
        let Event::Key(KeyEvent {
            code, modifiers, ..
        }) = event::read()?
        else {
            continue;
        };

        match code {
            KeyCode::Enter => {
                execute!(out, Print("\r\n"))?;
                break;
            }
            KeyCode::Backspace => {
                if buf.pop().is_some() {
                    execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
                }
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
                return Err(AppError::Input("interrupted".to_string()));
            }
            KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                buf.push(ch);
                execute!(out, Print("*"))?;
            }
            _ => {}
        }
        out.flush()?;
    }

    Ok(buf)
}

fn credentials(config: &AppConfig) -> Result<Credentials> {
    let username = config.username.trim();
    if username.is_empty() {
        return Err(AppError::Input(
            "username is not configured (set it in the config file or pass --username)"
                .to_string(),
        ));
    }

    let password = match std::env::var(PASSWORD_ENV) {
        Ok(password) if !password.is_empty() => password,
        _ => prompt_password(&format!("Password for {username}: "))?,
    };

    Ok(Credentials {
        username: username.to_string(),
        password,
    })
}

async fn list(client: &Client, creds: &Credentials, tz: Tz, args: ListArgs) -> Result<()> {
    let me = client.me(creds).await?;

    let mut table = TransactionsTable::default();
    table.set_filters(UserFilters {
        payment_id: args.payment_id,
        status: args.status,
        kind: args.kind,
        created_from: dates::parse_optional(args.from.as_deref(), tz, Bound::Start)?,
        created_to: dates::parse_optional(args.to.as_deref(), tz, Bound::End)?,
    });
    table.go_to_page(args.page);
    table.load(client, creds, me.id).await?;

    println!("{}", render::transactions(&table, tz));
    Ok(())
}

async fn admin_list(
    client: &Client,
    creds: &Credentials,
    tz: Tz,
    args: AdminListArgs,
) -> Result<()> {
    let mut table = AdminTransactionsTable::default();
    table.set_filters(AdminFilters {
        payment_id: args.payment_id,
        user_email: args.email,
        statuses: args.statuses,
        kind: args.kind,
        created_from: dates::parse_optional(args.from.as_deref(), tz, Bound::Start)?,
        created_to: dates::parse_optional(args.to.as_deref(), tz, Bound::End)?,
        modified_by_email: args.modified_by,
        modified_from: dates::parse_optional(args.modified_from.as_deref(), tz, Bound::Start)?,
        modified_to: dates::parse_optional(args.modified_to.as_deref(), tz, Bound::End)?,
    });
    table.go_to_page(args.page);
    table.load(client, creds).await?;

    println!("{}", render::admin_transactions(&table, tz));
    Ok(())
}

async fn create(
    client: &Client,
    creds: &Credentials,
    config: &AppConfig,
    args: CreateArgs,
) -> Result<()> {
    let mut form = AddTransactionForm::new(&config.wallet_address);
    if let Some(kind) = args.kind {
        form.kind = kind;
    }
    form.fiat_amount = args.amount;
    form.select_currency(client, creds, &args.currency).await?;
    if let Some(id) = args.bank_details_id {
        form.select_bank(id)?;
    }

    let instructions = form.submit(client, creds).await?;
    println!("{}", render::payment_instructions(&instructions));
    Ok(())
}

async fn edit(client: &Client, creds: &Credentials, tz: Tz, args: EditArgs) -> Result<()> {
    let mut form = EditTransactionForm::blank(args.id);
    form.fields.status = args.status;
    form.fields.fiat_amount = args.fiat_amount.unwrap_or_default();
    form.fields.crypto_currency = args.crypto_currency.unwrap_or_default();
    form.fields.crypto_amount = args.crypto_amount.unwrap_or_default();
    form.fields.wallet_address = args.wallet_address.unwrap_or_default();
    form.fields.commission = args.commission.unwrap_or_default();
    form.fields.rate = args.rate.unwrap_or_default();

    let row = form.submit(client, creds).await?;
    println!("{}", render::admin_transaction(&row, tz));
    Ok(())
}

async fn bank_details(client: &Client, creds: &Credentials, args: BankDetailsArgs) -> Result<()> {
    let details = match (args.id, args.currency) {
        (Some(id), _) => vec![client.bank_details_by_id(creds, id).await?],
        (None, Some(code)) => client.bank_details_by_currency(creds, &code).await?,
        (None, None) => {
            return Err(AppError::Input(
                "pass --currency or --id".to_string(),
            ));
        }
    };

    let blocks: Vec<String> = details.iter().map(render::bank_details).collect();
    println!("{}", blocks.join("\n\n"));
    Ok(())
}

async fn run(args: Args) -> Result<()> {
    let config = config::load(&args)?;
    let tz = dates::parse_timezone(&config.timezone)?;
    let client = Client::new(&config.base_url)?;
    let creds = credentials(&config)?;
    tracing::debug!(base_url = %config.base_url, username = %creds.username, "client ready");

    match args.command {
        Command::Me => println!("{}", render::me(&client.me(&creds).await?)),
        Command::Currencies => {
            println!("{}", render::currencies(&client.fiat_currencies(&creds).await?));
        }
        Command::List(list_args) => list(&client, &creds, tz, list_args).await?,
        Command::AdminList(list_args) => admin_list(&client, &creds, tz, list_args).await?,
        Command::Create(create_args) => create(&client, &creds, &config, create_args).await?,
        Command::Edit(edit_args) => edit(&client, &creds, tz, edit_args).await?,
        Command::BankDetails(bank_args) => bank_details(&client, &creds, bank_args).await?,
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("CRYPTOTX_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(Args::parse()).await {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
