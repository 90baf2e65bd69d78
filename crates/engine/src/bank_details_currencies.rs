//! Join table between bank details and the fiat currencies they accept.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "bank_details_currencies")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub bank_details_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub fiat_currency_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::bank_details::Entity",
        from = "Column::BankDetailsId",
        to = "super::bank_details::Column::Id"
    )]
    BankDetails,
    #[sea_orm(
        belongs_to = "super::fiat_currencies::Entity",
        from = "Column::FiatCurrencyId",
        to = "super::fiat_currencies::Column::Id"
    )]
    FiatCurrency,
}

impl Related<super::bank_details::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BankDetails.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbBackend, QuerySelect, QueryTrait};

    #[test]
    fn joins_bank_details_both_ways() {
        let sql = Entity::find()
            .inner_join(super::super::bank_details::Entity)
            .build(DbBackend::Sqlite)
            .to_string();
        assert!(sql.contains(r#"INNER JOIN "bank_details""#), "{sql}");

        let sql = super::super::bank_details::Entity::find()
            .inner_join(Entity)
            .build(DbBackend::Sqlite)
            .to_string();
        assert!(sql.contains(r#"INNER JOIN "bank_details_currencies""#), "{sql}");
    }
}
