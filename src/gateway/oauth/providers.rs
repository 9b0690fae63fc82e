//! Usage: Strava OAuth + REST endpoint definitions and the fixed authorize parameters.

use serde::{Deserialize, Serialize};

pub(crate) const STRAVA_AUTHORIZE_URL: &str = "https://www.strava.com/oauth/authorize";
pub(crate) const STRAVA_TOKEN_URL: &str = "https://www.strava.com/oauth/token";
pub(crate) const STRAVA_API_BASE_URL: &str = "https://www.strava.com/api/v3";

/// Read access to the public profile plus activity data.
pub(crate) const SCOPE: &str = "read,activity:read";
pub(crate) const RESPONSE_TYPE: &str = "code";
/// Forces the consent screen on every authorization (no silent re-consent).
pub(crate) const APPROVAL_PROMPT: &str = "force";
pub(crate) const GRANT_TYPE_AUTHORIZATION_CODE: &str = "authorization_code";

/// Provider endpoints; overridable so tests can point them at a local mock.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StravaEndpoints {
    pub authorize_url: String,
    pub token_url: String,
    pub api_base_url: String,
}

impl Default for StravaEndpoints {
    fn default() -> Self {
        Self {
            authorize_url: STRAVA_AUTHORIZE_URL.to_string(),
            token_url: STRAVA_TOKEN_URL.to_string(),
            api_base_url: STRAVA_API_BASE_URL.to_string(),
        }
    }
}

impl StravaEndpoints {
    pub(crate) fn sanitize(&mut self) -> bool {
        let mut changed = false;
        for (value, fallback) in [
            (&mut self.authorize_url, STRAVA_AUTHORIZE_URL),
            (&mut self.token_url, STRAVA_TOKEN_URL),
            (&mut self.api_base_url, STRAVA_API_BASE_URL),
        ] {
            let trimmed = value.trim().trim_end_matches('/');
            if trimmed.is_empty() {
                *value = fallback.to_string();
                changed = true;
            } else if trimmed.len() != value.len() {
                *value = trimmed.to_string();
                changed = true;
            }
        }
        changed
    }

    pub(crate) fn api_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_strava() {
        let endpoints = StravaEndpoints::default();
        assert_eq!(endpoints.authorize_url, "https://www.strava.com/oauth/authorize");
        assert_eq!(endpoints.token_url, "https://www.strava.com/oauth/token");
        assert_eq!(
            endpoints.api_url("/athlete"),
            "https://www.strava.com/api/v3/athlete"
        );
    }

    #[test]
    fn sanitize_strips_trailing_slash_and_fills_blanks() {
        let mut endpoints = StravaEndpoints {
            authorize_url: " ".to_string(),
            token_url: "http://127.0.0.1:9000/oauth/token".to_string(),
            api_base_url: "http://127.0.0.1:9000/api/v3/".to_string(),
        };
        assert!(endpoints.sanitize());
        assert_eq!(endpoints.authorize_url, STRAVA_AUTHORIZE_URL);
        assert_eq!(endpoints.api_base_url, "http://127.0.0.1:9000/api/v3");
        assert_eq!(
            endpoints.api_url("athletes/42/stats"),
            "http://127.0.0.1:9000/api/v3/athletes/42/stats"
        );
        assert!(!endpoints.sanitize());
    }
}
