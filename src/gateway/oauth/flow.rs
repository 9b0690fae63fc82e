//! Usage: Authorization-code flow outcomes and their conversion into redirects.
//!
//! `exchange` returns an explicit result; `exchange_redirect` maps every outcome to exactly one
//! redirect so the provider callback never fails with an unhandled error.

use super::token_exchange::TokenEndpoint;
use crate::domain::session::TokenSet;
use reqwest::Url;

pub(crate) const ENTRY_PATH: &str = "/";
pub(crate) const CALLBACK_PAGE_PATH: &str = "/auth/callback";
pub(crate) const EXCHANGE_PATH: &str = "/api/auth/callback";
pub(crate) const DASHBOARD_PATH: &str = "/dashboard";

pub const ERROR_NO_CODE: &str = "no_code";
pub const ERROR_AUTH_FAILED: &str = "auth_failed";
pub const ERROR_NO_TOKEN: &str = "no_token";
pub const ERROR_SAVE_FAILED: &str = "save_failed";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthFlowError {
    /// The provider redirected back with `error=<code>` instead of a code.
    #[error("authorization denied by provider: {0}")]
    AuthorizationDenied(String),
    #[error("callback carried neither code nor error")]
    MissingCode,
    /// Transport failure, non-success status or unreadable body. The detail stays server-side.
    #[error("token exchange failed: {0}")]
    ExchangeFailed(String),
    #[error("token exchange returned no usable access token")]
    MissingToken,
}

impl AuthFlowError {
    /// Value placed in the entry point's `error` query parameter.
    pub fn redirect_error_code(&self) -> &str {
        match self {
            Self::AuthorizationDenied(code) => code,
            Self::MissingCode => ERROR_NO_CODE,
            Self::ExchangeFailed(_) | Self::MissingToken => ERROR_AUTH_FAILED,
        }
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// A present `error` short-circuits before the token endpoint is touched.
pub async fn exchange(
    endpoint: &dyn TokenEndpoint,
    code: Option<&str>,
    error: Option<&str>,
) -> Result<TokenSet, AuthFlowError> {
    if let Some(error) = present(error) {
        return Err(AuthFlowError::AuthorizationDenied(error.to_string()));
    }
    let Some(code) = present(code) else {
        return Err(AuthFlowError::MissingCode);
    };
    endpoint.exchange_code(code).await
}

fn app_url(origin: &Url, path: &str) -> Url {
    let mut url = origin.clone();
    url.set_path(path);
    url.set_query(None);
    url.set_fragment(None);
    url
}

pub fn entry_url(origin: &Url) -> Url {
    app_url(origin, ENTRY_PATH)
}

pub fn entry_redirect_url(origin: &Url, error_code: &str) -> Url {
    let mut url = entry_url(origin);
    url.query_pairs_mut().append_pair("error", error_code);
    url
}

/// One-shot handoff to the callback page; optional values are omitted, never sent empty.
pub fn handoff_url(origin: &Url, tokens: &TokenSet) -> Url {
    let mut url = app_url(origin, CALLBACK_PAGE_PATH);
    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("access_token", tokens.access_token());
        if let Some(refresh) = tokens.refresh_token() {
            pairs.append_pair("refresh_token", refresh);
        }
        if let Some(expiry) = tokens.expires_at() {
            pairs.append_pair("expires_at", &expiry.to_string());
        }
    }
    url
}

pub fn dashboard_url(origin: &Url) -> Url {
    app_url(origin, DASHBOARD_PATH)
}

pub fn exchange_redirect(origin: &Url, outcome: &Result<TokenSet, AuthFlowError>) -> Url {
    match outcome {
        Ok(tokens) => handoff_url(origin, tokens),
        Err(err) => entry_redirect_url(origin, err.redirect_error_code()),
    }
}

/// Read the handoff parameters on the callback page. `None` means there is nothing to save.
pub fn parse_handoff(
    access_token: Option<&str>,
    refresh_token: Option<&str>,
    expires_at: Option<&str>,
) -> Option<TokenSet> {
    let access_token = present(access_token)?;
    let expires_at = present(expires_at).and_then(|raw| {
        let parsed = raw.trim().parse::<i64>().ok();
        if parsed.is_none() {
            tracing::warn!("callback expires_at is not a unix timestamp; dropping it");
        }
        parsed
    });
    TokenSet::new(
        access_token,
        present(refresh_token).map(str::to_string),
        expires_at,
    )
    .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::oauth::token_exchange::ExchangeFuture;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingEndpoint {
        calls: AtomicUsize,
        result: Result<TokenSet, AuthFlowError>,
    }

    impl CountingEndpoint {
        fn new(result: Result<TokenSet, AuthFlowError>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                result,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl TokenEndpoint for CountingEndpoint {
        fn exchange_code<'a>(&'a self, _code: &'a str) -> ExchangeFuture<'a> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let result = self.result.clone();
            Box::pin(async move { result })
        }
    }

    fn origin() -> Url {
        Url::parse("http://localhost:3000/").expect("origin")
    }

    fn tok1() -> TokenSet {
        TokenSet::new("tok1", Some("ref1".to_string()), Some(1_700_000_000)).expect("tokens")
    }

    fn query_value(url: &Url, key: &str) -> Option<String> {
        url.query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    #[tokio::test]
    async fn error_short_circuits_without_upstream_call() {
        let endpoint = CountingEndpoint::new(Ok(tok1()));
        let outcome = exchange(&endpoint, Some("abc123"), Some("access_denied")).await;
        assert_eq!(
            outcome,
            Err(AuthFlowError::AuthorizationDenied("access_denied".to_string()))
        );
        assert_eq!(endpoint.calls(), 0);

        let url = exchange_redirect(&origin(), &outcome);
        assert_eq!(url.path(), "/");
        assert_eq!(query_value(&url, "error").as_deref(), Some("access_denied"));
    }

    #[tokio::test]
    async fn unusual_error_values_are_preserved_verbatim() {
        let endpoint = CountingEndpoint::new(Ok(tok1()));
        let raw = "invalid scope & more=1";
        let outcome = exchange(&endpoint, None, Some(raw)).await;
        let url = exchange_redirect(&origin(), &outcome);
        assert_eq!(query_value(&url, "error").as_deref(), Some(raw));
        assert_eq!(endpoint.calls(), 0);
    }

    #[tokio::test]
    async fn missing_code_redirects_with_no_code() {
        let endpoint = CountingEndpoint::new(Ok(tok1()));
        for code in [None, Some(""), Some("   ")] {
            let outcome = exchange(&endpoint, code, None).await;
            assert_eq!(outcome, Err(AuthFlowError::MissingCode));
            let url = exchange_redirect(&origin(), &outcome);
            assert_eq!(query_value(&url, "error").as_deref(), Some("no_code"));
        }
        assert_eq!(endpoint.calls(), 0);
    }

    #[tokio::test]
    async fn empty_error_falls_through_to_code() {
        let endpoint = CountingEndpoint::new(Ok(tok1()));
        let outcome = exchange(&endpoint, Some("abc123"), Some("")).await;
        assert_eq!(outcome, Ok(tok1()));
        assert_eq!(endpoint.calls(), 1);
    }

    #[tokio::test]
    async fn success_hands_off_tokens_to_callback_page() {
        let endpoint = CountingEndpoint::new(Ok(tok1()));
        let outcome = exchange(&endpoint, Some("abc123"), None).await;
        assert_eq!(endpoint.calls(), 1);

        let url = exchange_redirect(&origin(), &outcome);
        assert_eq!(url.path(), "/auth/callback");
        assert_eq!(query_value(&url, "access_token").as_deref(), Some("tok1"));
        assert_eq!(query_value(&url, "refresh_token").as_deref(), Some("ref1"));
        assert_eq!(query_value(&url, "expires_at").as_deref(), Some("1700000000"));
    }

    #[tokio::test]
    async fn upstream_failures_surface_only_generic_marker() {
        for err in [
            AuthFlowError::ExchangeFailed("status=400 body={\"message\":\"Bad Request\"}".into()),
            AuthFlowError::MissingToken,
        ] {
            let endpoint = CountingEndpoint::new(Err(err));
            let outcome = exchange(&endpoint, Some("abc123"), None).await;
            let url = exchange_redirect(&origin(), &outcome);
            assert_eq!(query_value(&url, "error").as_deref(), Some("auth_failed"));
            assert!(!url.as_str().contains("Bad"));
            assert_eq!(endpoint.calls(), 1);
        }
    }

    #[test]
    fn handoff_omits_absent_optionals() {
        let tokens = TokenSet::new("tok1", None, None).expect("tokens");
        let url = handoff_url(&origin(), &tokens);
        assert_eq!(url.query(), Some("access_token=tok1"));
    }

    #[test]
    fn parse_handoff_requires_access_token() {
        assert_eq!(parse_handoff(None, Some("ref1"), Some("1")), None);
        assert_eq!(parse_handoff(Some(""), None, None), None);
        assert_eq!(
            parse_handoff(Some("tok1"), Some("ref1"), Some("1700000000")),
            Some(tok1())
        );
    }

    #[test]
    fn parse_handoff_drops_blank_and_invalid_optionals() {
        let tokens = parse_handoff(Some("tok1"), Some(""), Some("later")).expect("tokens");
        assert_eq!(tokens.refresh_token(), None);
        assert_eq!(tokens.expires_at(), None);
    }

    #[test]
    fn app_urls_ignore_origin_path() {
        let origin = Url::parse("https://viewer.example.com/").expect("origin");
        assert_eq!(
            dashboard_url(&origin).as_str(),
            "https://viewer.example.com/dashboard"
        );
        assert_eq!(
            entry_redirect_url(&origin, "no_token").as_str(),
            "https://viewer.example.com/?error=no_token"
        );
    }
}
