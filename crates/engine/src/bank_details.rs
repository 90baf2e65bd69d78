//! Bank accounts published to users as payment instructions.
//!
//! A `BankDetails` row is read-only for the application: it is created by the
//! admin tooling and selected by currency when a transaction is submitted.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankDetails {
    pub id: i32,
    pub bank_name: String,
    pub account_holder: String,
    pub account_number: String,
    pub bank_address: String,
    pub iban: String,
    pub swift_code: String,
    /// Codes of the fiat currencies this account can receive, sorted.
    pub currencies: Vec<String>,
}

impl BankDetails {
    pub(crate) fn from_model(model: Model, currencies: Vec<String>) -> Self {
        Self {
            id: model.id,
            bank_name: model.bank_name,
            account_holder: model.account_holder,
            account_number: model.account_number,
            bank_address: model.bank_address,
            iban: model.iban,
            swift_code: model.swift_code,
            currencies,
        }
    }

    pub fn accepts(&self, code: &str) -> bool {
        self.currencies.iter().any(|c| c.eq_ignore_ascii_case(code))
    }
}

/// Input for registering new bank details.
#[derive(Clone, Debug, Default)]
pub struct BankDetailsNew {
    pub bank_name: String,
    pub account_holder: String,
    pub account_number: String,
    pub bank_address: String,
    pub iban: String,
    pub swift_code: String,
    pub currencies: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "bank_details")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub bank_name: String,
    pub account_holder: String,
    pub account_number: String,
    pub bank_address: String,
    pub iban: String,
    pub swift_code: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::bank_details_currencies::Entity")]
    Currencies,
}

impl Related<super::bank_details_currencies::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Currencies.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
