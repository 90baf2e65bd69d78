//! The "new exchange order" form.

use api_types::{
    bank_details::BankDetails,
    currency::FiatCurrency,
    transaction::{TransactionCreated, TransactionKind, TransactionNew},
};
use rust_decimal::Decimal;

use crate::{
    client::{Client, Credentials},
    error::FormError,
};

pub const DEFAULT_FIAT_CURRENCY: &str = "USD";
pub const CRYPTO_CURRENCY: &str = "USDT";

/// What the user needs to pay for a created order.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentInstructions {
    pub id: i32,
    pub payment_id: String,
    pub fiat_currency: String,
    pub fiat_amount: Decimal,
    pub bank_details: BankDetails,
}

impl From<TransactionCreated> for PaymentInstructions {
    fn from(created: TransactionCreated) -> Self {
        Self {
            id: created.id,
            payment_id: created.payment_id,
            fiat_currency: created.fiat_currency,
            fiat_amount: created.fiat_amount,
            bank_details: created.bank_details,
        }
    }
}

#[derive(Debug)]
pub struct AddTransactionForm {
    pub kind: TransactionKind,
    /// Raw input; `.` or `,` as decimal separator.
    pub fiat_amount: String,
    pub wallet_address: String,
    fiat_currency: String,
    fiat_currency_id: Option<i32>,
    crypto_currency: String,
    bank_details: Vec<BankDetails>,
    bank_details_id: Option<i32>,
    submitted: bool,
}

impl AddTransactionForm {
    pub fn new(wallet_address: &str) -> Self {
        Self {
            kind: TransactionKind::Buy,
            fiat_amount: String::new(),
            wallet_address: wallet_address.to_string(),
            fiat_currency: DEFAULT_FIAT_CURRENCY.to_string(),
            fiat_currency_id: None,
            crypto_currency: CRYPTO_CURRENCY.to_string(),
            bank_details: Vec::new(),
            bank_details_id: None,
            submitted: false,
        }
    }

    pub fn fiat_currency(&self) -> &str {
        &self.fiat_currency
    }

    /// Locked to USDT.
    pub fn crypto_currency(&self) -> &str {
        &self.crypto_currency
    }

    pub fn bank_details(&self) -> &[BankDetails] {
        &self.bank_details
    }

    pub fn selected_bank_details(&self) -> Option<&BankDetails> {
        let id = self.bank_details_id?;
        self.bank_details.iter().find(|b| b.id == id)
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    /// Switches to `currency` with the bank accounts accepting it. The first
    /// account is preselected.
    pub fn apply_currency(&mut self, currency: FiatCurrency, bank_details: Vec<BankDetails>) {
        self.fiat_currency = currency.code;
        self.fiat_currency_id = Some(currency.id);
        self.bank_details_id = bank_details.first().map(|b| b.id);
        self.bank_details = bank_details;
    }

    /// Resolves the currency id and its bank details from the server.
    pub async fn select_currency(
        &mut self,
        client: &Client,
        creds: &Credentials,
        code: &str,
    ) -> Result<(), FormError> {
        let currency = client.fiat_currency(creds, code).await.inspect_err(|err| {
            tracing::error!("failed to resolve currency {code}: {err}");
        })?;
        let bank_details = client
            .bank_details_by_currency(creds, &currency.code)
            .await
            .inspect_err(|err| {
                tracing::error!("failed to load bank details for {code}: {err}");
            })?;
        self.apply_currency(currency, bank_details);
        Ok(())
    }

    pub fn select_bank(&mut self, id: i32) -> Result<(), FormError> {
        if !self.bank_details.iter().any(|b| b.id == id) {
            return Err(FormError::Validation(format!(
                "bank details {id} do not accept {}",
                self.fiat_currency
            )));
        }
        self.bank_details_id = Some(id);
        Ok(())
    }

    /// Checks the form and builds the request body.
    pub fn validate(&self) -> Result<TransactionNew, FormError> {
        let fiat_currency_id = self
            .fiat_currency_id
            .ok_or_else(|| FormError::Validation("select a fiat currency".to_string()))?;
        if self.crypto_currency.trim().is_empty() {
            return Err(FormError::Validation(
                "crypto currency is required".to_string(),
            ));
        }
        let fiat_amount = engine::amount::parse(&self.fiat_amount)
            .and_then(|amount| engine::amount::require_positive(amount, "fiat amount"))
            .map_err(|err| FormError::Validation(err.to_string()))?;
        if self.wallet_address.trim().is_empty() {
            return Err(FormError::Validation(
                "wallet address is required".to_string(),
            ));
        }
        let bank_details_id = self
            .bank_details_id
            .ok_or_else(|| FormError::Validation("select bank details".to_string()))?;

        Ok(TransactionNew {
            kind: Some(self.kind),
            fiat_currency_id,
            crypto_currency: self.crypto_currency.clone(),
            fiat_amount,
            crypto_amount: None,
            rate: None,
            commission: None,
            wallet_address: self.wallet_address.trim().to_string(),
            bank_details_id,
        })
    }

    /// Validates and submits the order. A form can be submitted once.
    pub async fn submit(
        &mut self,
        client: &Client,
        creds: &Credentials,
    ) -> Result<PaymentInstructions, FormError> {
        if self.submitted {
            return Err(FormError::AlreadySubmitted);
        }
        let payload = self.validate()?;

        let created = client
            .transaction_new(creds, &payload)
            .await
            .inspect_err(|err| tracing::error!("failed to create transaction: {err}"))?;
        self.submitted = true;
        tracing::info!(payment_id = %created.payment_id, "transaction submitted");
        Ok(created.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bank(id: i32) -> BankDetails {
        BankDetails {
            id,
            bank_name: "First Bank".to_string(),
            account_holder: "Exchange Ltd".to_string(),
            account_number: "000123".to_string(),
            bank_address: "1 Main St".to_string(),
            iban: "GB00FIRS000123".to_string(),
            swift_code: "FIRSGB22".to_string(),
            currencies: vec!["USD".to_string()],
        }
    }

    fn ready_form() -> AddTransactionForm {
        let mut form = AddTransactionForm::new("TWallet");
        form.apply_currency(
            FiatCurrency {
                id: 1,
                code: "USD".to_string(),
            },
            vec![bank(4), bank(5)],
        );
        form.fiat_amount = "100,50".to_string();
        form
    }

    #[test]
    fn defaults() {
        let form = AddTransactionForm::new("TWallet");
        assert_eq!(form.fiat_currency(), "USD");
        assert_eq!(form.crypto_currency(), "USDT");
        assert_eq!(form.kind, TransactionKind::Buy);
        assert_eq!(form.wallet_address, "TWallet");
        assert!(form.selected_bank_details().is_none());
    }

    #[test]
    fn first_bank_is_preselected() {
        let mut form = ready_form();
        assert_eq!(form.selected_bank_details().map(|b| b.id), Some(4));
        form.select_bank(5).unwrap();
        assert_eq!(form.selected_bank_details().map(|b| b.id), Some(5));
        assert!(matches!(form.select_bank(9), Err(FormError::Validation(_))));
    }

    #[test]
    fn valid_form_builds_the_request() {
        let payload = ready_form().validate().unwrap();
        assert_eq!(payload.fiat_currency_id, 1);
        assert_eq!(payload.fiat_amount, Decimal::new(10050, 2));
        assert_eq!(payload.bank_details_id, 4);
        assert_eq!(payload.crypto_currency, "USDT");
        assert_eq!(payload.kind, Some(TransactionKind::Buy));
    }

    #[test]
    fn invalid_forms_are_rejected() {
        let unresolved = AddTransactionForm::new("TWallet");
        assert!(matches!(unresolved.validate(), Err(FormError::Validation(_))));

        for amount in ["0", "-5", "", "ten"] {
            let mut form = ready_form();
            form.fiat_amount = amount.to_string();
            assert!(matches!(form.validate(), Err(FormError::Validation(_))));
        }

        let mut form = ready_form();
        form.apply_currency(
            FiatCurrency {
                id: 3,
                code: "PLN".to_string(),
            },
            Vec::new(),
        );
        assert!(matches!(form.validate(), Err(FormError::Validation(_))));
    }

    #[tokio::test]
    async fn invalid_submit_never_reaches_the_network() {
        // Nothing listens on the discard port: a request would fail with Transport.
        let client = Client::new("http://127.0.0.1:9").unwrap();
        let creds = Credentials {
            username: "alice".to_string(),
            password: "secret".to_string(),
        };
        let mut form = ready_form();
        form.fiat_amount = "0".to_string();

        let err = form.submit(&client, &creds).await.unwrap_err();
        assert!(matches!(err, FormError::Validation(_)));
        assert!(!form.is_submitted());
    }
}
