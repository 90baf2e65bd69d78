//! Seeds the fiat currencies accepted at launch.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum FiatCurrencies {
    Table,
    CurrencyCode,
}

const CODES: [&str; 3] = ["USD", "EUR", "PLN"];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut insert = Query::insert()
            .into_table(FiatCurrencies::Table)
            .columns([FiatCurrencies::CurrencyCode])
            .to_owned();
        for code in CODES {
            insert
                .values([code.into()])
                .map_err(|err| DbErr::Custom(err.to_string()))?;
        }
        manager.exec_stmt(insert).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .exec_stmt(
                Query::delete()
                    .from_table(FiatCurrencies::Table)
                    .and_where(Expr::col(FiatCurrencies::CurrencyCode).is_in(CODES))
                    .to_owned(),
            )
            .await
    }
}
