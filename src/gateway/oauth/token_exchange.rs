//! Usage: OAuth token endpoint client (authorization_code grant, JSON body).

use super::flow::AuthFlowError;
use super::providers::GRANT_TYPE_AUTHORIZATION_CODE;
use crate::domain::session::TokenSet;
use crate::infra::settings::ClientCredentials;
use crate::shared::security::sanitize_body_snippet;
use crate::shared::time::now_unix_seconds;
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;

pub type ExchangeFuture<'a> =
    Pin<Box<dyn Future<Output = Result<TokenSet, AuthFlowError>> + Send + 'a>>;

/// The upstream side of the code exchange. One call per incoming code; implementations must not
/// retry because the provider invalidates a code on first use.
pub trait TokenEndpoint: Send + Sync {
    fn exchange_code<'a>(&'a self, code: &'a str) -> ExchangeFuture<'a>;
}

#[derive(Debug, Serialize)]
struct TokenExchangeBody<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    code: &'a str,
    grant_type: &'static str,
}

#[derive(Debug, Clone)]
pub struct StravaTokenEndpoint {
    client: reqwest::Client,
    token_url: String,
    credentials: ClientCredentials,
}

impl StravaTokenEndpoint {
    pub fn new(client: reqwest::Client, token_url: String, credentials: ClientCredentials) -> Self {
        Self {
            client,
            token_url,
            credentials,
        }
    }
}

impl TokenEndpoint for StravaTokenEndpoint {
    fn exchange_code<'a>(&'a self, code: &'a str) -> ExchangeFuture<'a> {
        Box::pin(exchange_authorization_code(
            &self.client,
            &self.token_url,
            &self.credentials,
            code,
        ))
    }
}

pub(crate) async fn exchange_authorization_code(
    client: &reqwest::Client,
    token_url: &str,
    credentials: &ClientCredentials,
    code: &str,
) -> Result<TokenSet, AuthFlowError> {
    let body = TokenExchangeBody {
        client_id: credentials.client_id.trim(),
        client_secret: credentials.client_secret.trim(),
        code: code.trim(),
        grant_type: GRANT_TYPE_AUTHORIZATION_CODE,
    };

    let response = client
        .post(token_url.trim())
        .json(&body)
        .send()
        .await
        .map_err(|e| AuthFlowError::ExchangeFailed(format!("token request failed: {e}")))?;

    parse_token_response(response).await
}

async fn parse_token_response(response: reqwest::Response) -> Result<TokenSet, AuthFlowError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| AuthFlowError::ExchangeFailed(format!("token response read failed: {e}")))?;

    if !status.is_success() {
        return Err(AuthFlowError::ExchangeFailed(format!(
            "token endpoint returned status={} body={}",
            status.as_u16(),
            sanitize_body_snippet(&body)
        )));
    }

    let value: Value = serde_json::from_str(&body).map_err(|e| {
        AuthFlowError::ExchangeFailed(format!("token response json invalid: {e}"))
    })?;

    token_set_from_value(&value, now_unix_seconds())
}

fn token_set_from_value(value: &Value, now_unix: i64) -> Result<TokenSet, AuthFlowError> {
    let access_token = value
        .get("access_token")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(AuthFlowError::MissingToken)?
        .to_string();

    let refresh_token = value
        .get("refresh_token")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string);

    // Strava sends an absolute `expires_at`; plain OAuth servers only send `expires_in`.
    let expires_at = value
        .get("expires_at")
        .and_then(parse_i64_lossy)
        .filter(|v| *v > 0)
        .or_else(|| {
            value
                .get("expires_in")
                .and_then(parse_i64_lossy)
                .filter(|v| *v > 0)
                .map(|v| now_unix.saturating_add(v))
        });

    TokenSet::new(access_token, refresh_token, expires_at).map_err(|_| AuthFlowError::MissingToken)
}

fn parse_i64_lossy(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}
