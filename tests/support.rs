#![allow(dead_code)]

use std::sync::Arc;

use reqwest::redirect::Policy;
use reqwest::Url;
use strava_data_viewer_lib::test_support::{endpoints_at, settings_for, spawn_app, SpawnedApp};
use strava_data_viewer_lib::{MemorySessionStore, SessionStore, TokenSet};
use wiremock::MockServer;

pub struct TestContext {
    pub upstream: MockServer,
    pub app: SpawnedApp,
    pub http: reqwest::Client,
}

impl TestContext {
    pub async fn new() -> Self {
        Self::with_store(Arc::new(MemorySessionStore::new())).await
    }

    pub async fn with_store(store: Arc<dyn SessionStore>) -> Self {
        let upstream = MockServer::start().await;
        let settings = settings_for(endpoints_at(&upstream.uri()));
        let app = spawn_app(settings, store).await.expect("spawn app");
        let http = reqwest::Client::builder()
            .redirect(Policy::none())
            .build()
            .expect("http client");
        Self {
            upstream,
            app,
            http,
        }
    }

    pub async fn signed_in(tokens: TokenSet) -> Self {
        let store = Arc::new(MemorySessionStore::new());
        store.save(&tokens).expect("seed session");
        Self::with_store(store).await
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.http
            .get(self.app.url(path))
            .send()
            .await
            .expect("send request")
    }

    pub async fn post(&self, path: &str) -> reqwest::Response {
        self.http
            .post(self.app.url(path))
            .send()
            .await
            .expect("send request")
    }

    pub async fn follow(&self, location: &Url) -> reqwest::Response {
        self.http
            .get(location.clone())
            .send()
            .await
            .expect("follow redirect")
    }
}

pub fn location(resp: &reqwest::Response) -> Url {
    let raw = resp
        .headers()
        .get(reqwest::header::LOCATION)
        .expect("location header")
        .to_str()
        .expect("location utf8");
    Url::parse(raw).expect("absolute location")
}

pub fn query_value(url: &Url, key: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

pub fn tokens(access: &str, refresh: Option<&str>, expires_at: Option<i64>) -> TokenSet {
    TokenSet::new(access, refresh.map(str::to_string), expires_at).expect("token set")
}
