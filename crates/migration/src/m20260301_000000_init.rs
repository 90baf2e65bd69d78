//! Initial schema.
//!
//! - `users`: accounts and the admin flag
//! - `fiat_currencies`: supported fiat currency codes
//! - `bank_details`: accounts users pay into
//! - `bank_details_currencies`: which currencies each account accepts
//! - `transactions`: exchange orders

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Email,
    Username,
    Password,
    IsAdmin,
    IsVerified,
}

#[derive(Iden)]
enum FiatCurrencies {
    Table,
    Id,
    CurrencyCode,
}

#[derive(Iden)]
enum BankDetails {
    Table,
    Id,
    BankName,
    AccountHolder,
    AccountNumber,
    BankAddress,
    Iban,
    SwiftCode,
}

#[derive(Iden)]
enum BankDetailsCurrencies {
    Table,
    BankDetailsId,
    FiatCurrencyId,
}

#[derive(Iden)]
enum Transactions {
    Table,
    Id,
    PaymentId,
    UserId,
    Kind,
    FiatCurrencyId,
    CryptoCurrency,
    FiatAmount,
    CryptoAmount,
    Rate,
    Commission,
    WalletAddress,
    Status,
    CreatedAt,
    LastChangeDate,
    LastModifiedBy,
    BankDetailsId,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Email).string().not_null().unique_key())
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .col(
                        ColumnDef::new(Users::IsAdmin)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Users::IsVerified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(FiatCurrencies::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FiatCurrencies::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(FiatCurrencies::CurrencyCode)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BankDetails::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BankDetails::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BankDetails::BankName).string().not_null())
                    .col(
                        ColumnDef::new(BankDetails::AccountHolder)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BankDetails::AccountNumber)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(BankDetails::BankAddress).string().not_null())
                    .col(ColumnDef::new(BankDetails::Iban).string().not_null())
                    .col(ColumnDef::new(BankDetails::SwiftCode).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BankDetailsCurrencies::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BankDetailsCurrencies::BankDetailsId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BankDetailsCurrencies::FiatCurrencyId)
                            .integer()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(BankDetailsCurrencies::BankDetailsId)
                            .col(BankDetailsCurrencies::FiatCurrencyId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-bank_details_currencies-bank_details_id")
                            .from(
                                BankDetailsCurrencies::Table,
                                BankDetailsCurrencies::BankDetailsId,
                            )
                            .to(BankDetails::Table, BankDetails::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-bank_details_currencies-fiat_currency_id")
                            .from(
                                BankDetailsCurrencies::Table,
                                BankDetailsCurrencies::FiatCurrencyId,
                            )
                            .to(FiatCurrencies::Table, FiatCurrencies::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-bank_details_currencies-fiat_currency_id")
                    .table(BankDetailsCurrencies::Table)
                    .col(BankDetailsCurrencies::FiatCurrencyId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transactions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Transactions::PaymentId)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Transactions::UserId).integer().not_null())
                    .col(ColumnDef::new(Transactions::Kind).string().not_null())
                    .col(
                        ColumnDef::new(Transactions::FiatCurrencyId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transactions::CryptoCurrency)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::FiatAmount).string().not_null())
                    .col(
                        ColumnDef::new(Transactions::CryptoAmount)
                            .string()
                            .not_null()
                            .default("0"),
                    )
                    .col(
                        ColumnDef::new(Transactions::Rate)
                            .string()
                            .not_null()
                            .default("0"),
                    )
                    .col(
                        ColumnDef::new(Transactions::Commission)
                            .string()
                            .not_null()
                            .default("0"),
                    )
                    .col(
                        ColumnDef::new(Transactions::WalletAddress)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transactions::Status)
                            .string()
                            .not_null()
                            .default("New"),
                    )
                    .col(
                        ColumnDef::new(Transactions::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::LastChangeDate).timestamp())
                    .col(ColumnDef::new(Transactions::LastModifiedBy).integer())
                    .col(
                        ColumnDef::new(Transactions::BankDetailsId)
                            .integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-user_id")
                            .from(Transactions::Table, Transactions::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-last_modified_by")
                            .from(Transactions::Table, Transactions::LastModifiedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-fiat_currency_id")
                            .from(Transactions::Table, Transactions::FiatCurrencyId)
                            .to(FiatCurrencies::Table, FiatCurrencies::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-bank_details_id")
                            .from(Transactions::Table, Transactions::BankDetailsId)
                            .to(BankDetails::Table, BankDetails::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-user_id-created_at")
                    .table(Transactions::Table)
                    .col(Transactions::UserId)
                    .col(Transactions::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-status")
                    .table(Transactions::Table)
                    .col(Transactions::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-bank_details_id")
                    .table(Transactions::Table)
                    .col(Transactions::BankDetailsId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Reverse creation order for the foreign keys.
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BankDetailsCurrencies::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BankDetails::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(FiatCurrencies::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
