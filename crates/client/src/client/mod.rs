use api_types::{
    bank_details::{BankDetails, BankDetailsList},
    currency::{FiatCurrency, FiatCurrencyList},
    transaction::{
        AdminTransactionListQuery, AdminTransactionView, TransactionCreated, TransactionEdit,
        TransactionListQuery, TransactionNew, TransactionPage, TransactionView,
    },
    user::Me,
};
use reqwest::{Method, RequestBuilder, StatusCode, Url};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;

use crate::error::{AppError, Result};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("forbidden")]
    Forbidden,
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("server error: {0}")]
    Server(String),
    #[error("server unreachable: {0}")]
    Transport(reqwest::Error),
}

impl ClientError {
    fn from_status(status: StatusCode, body: String) -> Self {
        match status.as_u16() {
            401 => ClientError::Unauthorized,
            403 => ClientError::Forbidden,
            404 => ClientError::NotFound(body),
            409 => ClientError::Conflict(body),
            422 => ClientError::Validation(body),
            _ => ClientError::Server(body),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

/// Basic credentials sent with every request.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    http: reqwest::Client,
}

impl Client {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|err| AppError::Input(format!("invalid base_url: {err}")))?;
        Ok(Self {
            base_url,
            http: reqwest::Client::new(),
        })
    }

    fn request(
        &self,
        method: Method,
        path: &str,
        creds: &Credentials,
    ) -> std::result::Result<RequestBuilder, ClientError> {
        let endpoint = self
            .base_url
            .join(path)
            .map_err(|err| ClientError::Server(format!("invalid base_url: {err}")))?;

        Ok(self
            .http
            .request(method, endpoint)
            .basic_auth(&creds.username, Some(&creds.password)))
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> std::result::Result<T, ClientError> {
        let res = request.send().await.map_err(ClientError::Transport)?;

        if res.status().is_success() {
            return res.json::<T>().await.map_err(ClientError::Transport);
        }

        let status = res.status();
        let body = res
            .json::<ErrorResponse>()
            .await
            .map(|err| err.error)
            .unwrap_or_else(|_| "unknown error".to_string());

        tracing::debug!(%status, error = %body, "request failed");
        Err(ClientError::from_status(status, body))
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        creds: &Credentials,
    ) -> std::result::Result<T, ClientError> {
        let request = self.request(Method::GET, path, creds)?;
        self.send(request).await
    }

    async fn with_body<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        creds: &Credentials,
        body: &B,
    ) -> std::result::Result<T, ClientError> {
        let request = self.request(method, path, creds)?.json(body);
        self.send(request).await
    }

    pub async fn me(&self, creds: &Credentials) -> std::result::Result<Me, ClientError> {
        self.get("me", creds).await
    }

    pub async fn transactions_list(
        &self,
        creds: &Credentials,
        query: &TransactionListQuery,
    ) -> std::result::Result<TransactionPage<TransactionView>, ClientError> {
        self.with_body(Method::POST, "transactions/list", creds, query)
            .await
    }

    pub async fn admin_transactions_list(
        &self,
        creds: &Credentials,
        query: &AdminTransactionListQuery,
    ) -> std::result::Result<TransactionPage<AdminTransactionView>, ClientError> {
        self.with_body(Method::POST, "admin/transactions/list", creds, query)
            .await
    }

    pub async fn transaction_new(
        &self,
        creds: &Credentials,
        payload: &TransactionNew,
    ) -> std::result::Result<TransactionCreated, ClientError> {
        self.with_body(Method::POST, "transactions", creds, payload)
            .await
    }

    pub async fn transaction_edit(
        &self,
        creds: &Credentials,
        id: i32,
        payload: &TransactionEdit,
    ) -> std::result::Result<AdminTransactionView, ClientError> {
        self.with_body(
            Method::PATCH,
            &format!("admin/transactions/{id}"),
            creds,
            payload,
        )
        .await
    }

    pub async fn fiat_currencies(
        &self,
        creds: &Credentials,
    ) -> std::result::Result<Vec<FiatCurrency>, ClientError> {
        let list: FiatCurrencyList = self.get("currencies", creds).await?;
        Ok(list.currencies)
    }

    pub async fn fiat_currency(
        &self,
        creds: &Credentials,
        code: &str,
    ) -> std::result::Result<FiatCurrency, ClientError> {
        self.get(&format!("currencies/{}", code.trim()), creds)
            .await
    }

    pub async fn bank_details_by_currency(
        &self,
        creds: &Credentials,
        code: &str,
    ) -> std::result::Result<Vec<BankDetails>, ClientError> {
        let list: BankDetailsList = self
            .get(&format!("bank-details/currency/{}", code.trim()), creds)
            .await?;
        Ok(list.bank_details)
    }

    pub async fn bank_details_by_id(
        &self,
        creds: &Credentials,
        id: i32,
    ) -> std::result::Result<BankDetails, ClientError> {
        self.get(&format!("bank-details/{id}"), creds).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_map_to_errors() {
        assert!(matches!(
            ClientError::from_status(StatusCode::UNAUTHORIZED, String::new()),
            ClientError::Unauthorized
        ));
        assert!(matches!(
            ClientError::from_status(StatusCode::FORBIDDEN, String::new()),
            ClientError::Forbidden
        ));
        assert!(matches!(
            ClientError::from_status(StatusCode::NOT_FOUND, "gone".to_string()),
            ClientError::NotFound(msg) if msg == "gone"
        ));
        assert!(matches!(
            ClientError::from_status(StatusCode::CONFLICT, String::new()),
            ClientError::Conflict(_)
        ));
        assert!(matches!(
            ClientError::from_status(StatusCode::UNPROCESSABLE_ENTITY, "bad".to_string()),
            ClientError::Validation(msg) if msg == "bad"
        ));
        assert!(matches!(
            ClientError::from_status(StatusCode::INTERNAL_SERVER_ERROR, String::new()),
            ClientError::Server(_)
        ));
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        assert!(matches!(Client::new("not a url"), Err(AppError::Input(_))));
        assert!(Client::new("http://127.0.0.1:3000").is_ok());
    }
}
