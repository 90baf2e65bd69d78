use std::{error::Error, io::Write};

use clap::{Args, Parser, Subcommand};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use engine::{BankDetailsNew, Engine, EngineError, UserNew};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

#[derive(Parser, Debug)]
#[command(name = "cryptotx_admin")]
#[command(about = "Admin utilities for cryptotx (bootstrap users, currencies and bank details)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./cryptotx.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    Currency(Currency),
    BankDetails(BankDetails),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    /// Create a user; the password is prompted for.
    Create(UserCreateArgs),
    /// Grant the admin flag.
    Promote(UserNameArgs),
    /// Revoke the admin flag.
    Demote(UserNameArgs),
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    username: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    admin: bool,
}

#[derive(Args, Debug)]
struct UserNameArgs {
    #[arg(long)]
    username: String,
}

#[derive(Args, Debug)]
struct Currency {
    #[command(subcommand)]
    command: CurrencyCommand,
}

#[derive(Subcommand, Debug)]
enum CurrencyCommand {
    Add {
        /// ISO 4217 code, e.g. `CHF`.
        code: String,
    },
}

#[derive(Args, Debug)]
struct BankDetails {
    #[command(subcommand)]
    command: BankDetailsCommand,
}

#[derive(Subcommand, Debug)]
enum BankDetailsCommand {
    Add(BankDetailsAddArgs),
}

#[derive(Args, Debug)]
struct BankDetailsAddArgs {
    #[arg(long)]
    bank_name: String,
    #[arg(long)]
    account_holder: String,
    #[arg(long)]
    account_number: String,
    #[arg(long)]
    bank_address: String,
    #[arg(long)]
    iban: String,
    #[arg(long)]
    swift_code: String,
    /// Accepted fiat currency codes, comma separated.
    #[arg(long, value_delimiter = ',', required = true)]
    currencies: Vec<String>,
}

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> Result<Self, Box<dyn Error + Send + Sync>> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn prompt_password(prompt: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
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
                out.flush()?;
                break;
            }
            KeyCode::Backspace => {
                if buf.pop().is_some() {
                    execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
                    out.flush()?;
                }
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                return Err("interrupted".into());
            }
            KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                buf.push(ch);
                execute!(out, Print("*"))?;
                out.flush()?;
            }
            _ => {}
        }
    }

    Ok(buf)
}

fn prompt_password_twice() -> Result<String, Box<dyn Error + Send + Sync>> {
    let mut out = std::io::stderr();
    for _ in 0..3 {
        let p1 = prompt_password("Password: ")?;
        if p1.is_empty() {
            execute!(
                out,
                cursor::MoveToColumn(0),
                terminal::Clear(ClearType::CurrentLine),
                Print("Password must not be empty.\r\n")
            )?;
            continue;
        }

        let p2 = prompt_password("Confirm password: ")?;
        if p1 == p2 {
            return Ok(p1);
        }

        execute!(
            out,
            cursor::MoveToColumn(0),
            terminal::Clear(ClearType::CurrentLine),
            Print("Passwords do not match. Try again.\r\n")
        )?;
    }

    Err("too many attempts".into())
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

/// Duplicates and bad input are user errors: report them and exit non-zero.
fn exit_on_user_error<T>(result: Result<T, EngineError>) -> Result<T, EngineError> {
    match result {
        Err(
            err @ (EngineError::ExistingKey(_)
            | EngineError::KeyNotFound(_)
            | EngineError::InvalidInput(_)),
        ) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
        other => other,
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build().await?;

    match cli.command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            let password = prompt_password_twice()?;
            let id = exit_on_user_error(
                engine
                    .new_user(UserNew {
                        email: args.email,
                        username: args.username.clone(),
                        password,
                        is_admin: args.admin,
                    })
                    .await,
            )?;
            println!("created user: {} (id {id})", args.username);
        }
        Command::User(User {
            command: UserCommand::Promote(args),
        }) => {
            exit_on_user_error(engine.set_admin(&args.username, true).await)?;
            println!("promoted to admin: {}", args.username);
        }
        Command::User(User {
            command: UserCommand::Demote(args),
        }) => {
            exit_on_user_error(engine.set_admin(&args.username, false).await)?;
            println!("admin flag removed: {}", args.username);
        }
        Command::Currency(Currency {
            command: CurrencyCommand::Add { code },
        }) => {
            let id = exit_on_user_error(engine.new_fiat_currency(&code).await)?;
            println!("added currency: {} (id {id})", code.trim().to_ascii_uppercase());
        }
        Command::BankDetails(BankDetails {
            command: BankDetailsCommand::Add(args),
        }) => {
            let id = exit_on_user_error(
                engine
                    .new_bank_details(BankDetailsNew {
                        bank_name: args.bank_name,
                        account_holder: args.account_holder,
                        account_number: args.account_number,
                        bank_address: args.bank_address,
                        iban: args.iban,
                        swift_code: args.swift_code,
                        currencies: args.currencies,
                    })
                    .await,
            )?;
            println!("added bank details: id {id}");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bank_details_currencies_are_comma_separated() {
        let cli = Cli::try_parse_from([
            "cryptotx_admin",
            "--database-url",
            "sqlite::memory:",
            "bank-details",
            "add",
            "--bank-name",
            "First Bank",
            "--account-holder",
            "Exchange Ltd",
            "--account-number",
            "000123",
            "--bank-address",
            "1 Main St",
            "--iban",
            "GB00FIRS000123",
            "--swift-code",
            "FIRSGB22",
            "--currencies",
            "USD,EUR",
        ])
        .unwrap();

        let Command::BankDetails(BankDetails {
            command: BankDetailsCommand::Add(args),
        }) = cli.command
        else {
            panic!("unexpected command");
        };
        assert_eq!(args.currencies, vec!["USD", "EUR"]);
    }

    #[test]
    fn user_create_requires_email() {
        assert!(
            Cli::try_parse_from(["cryptotx_admin", "user", "create", "--username", "alice"])
                .is_err()
        );
    }
}
