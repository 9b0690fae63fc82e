//! Usage: Bearer-authenticated GETs against the provider data API.

use bytes::Bytes;
use serde::de::DeserializeOwned;

use super::errors::{classify_reqwest_error, classify_upstream_status, ProxyError};
use crate::gateway::oauth::providers::StravaEndpoints;
use crate::shared::security::sanitize_body_snippet;

pub(crate) const RECENT_ACTIVITIES_PER_PAGE: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StravaResource {
    Athlete,
    Activities,
    Stats { athlete_id: i64 },
}

impl StravaResource {
    pub(crate) fn label(&self) -> &'static str {
        match self {
            Self::Athlete => "athlete",
            Self::Activities => "activities",
            Self::Stats { .. } => "stats",
        }
    }

    pub(crate) fn path(&self) -> String {
        match self {
            Self::Athlete => "athlete".to_string(),
            Self::Activities => {
                format!("athlete/activities?per_page={RECENT_ACTIVITIES_PER_PAGE}")
            }
            Self::Stats { athlete_id } => format!("athletes/{athlete_id}/stats"),
        }
    }
}

/// Single attempt, no retry. A successful body is returned untouched.
pub(crate) async fn fetch_bytes(
    client: &reqwest::Client,
    endpoints: &StravaEndpoints,
    resource: StravaResource,
    access_token: &str,
) -> Result<Bytes, ProxyError> {
    let url = endpoints.api_url(&resource.path());
    let response = client
        .get(&url)
        .bearer_auth(access_token)
        .send()
        .await
        .map_err(|e| ProxyError::DownstreamFetchFailed {
            resource,
            detail: format!("{}: {e}", classify_reqwest_error(&e)),
        })?;

    let status = response.status();
    let body = response
        .bytes()
        .await
        .map_err(|e| ProxyError::DownstreamFetchFailed {
            resource,
            detail: format!("{}: {e}", classify_reqwest_error(&e)),
        })?;

    if !status.is_success() {
        let snippet = sanitize_body_snippet(&String::from_utf8_lossy(&body));
        return Err(classify_upstream_status(
            resource,
            status,
            format!("status={} body={snippet}", status.as_u16()),
        ));
    }

    Ok(body)
}

pub(crate) async fn fetch_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    endpoints: &StravaEndpoints,
    resource: StravaResource,
    access_token: &str,
) -> Result<T, ProxyError> {
    let body = fetch_bytes(client, endpoints, resource, access_token).await?;
    serde_json::from_slice(&body).map_err(|e| ProxyError::DownstreamFetchFailed {
        resource,
        detail: format!("UPSTREAM_BODY_DECODE_ERROR: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_paths_match_provider_api() {
        assert_eq!(StravaResource::Athlete.path(), "athlete");
        assert_eq!(
            StravaResource::Activities.path(),
            "athlete/activities?per_page=10"
        );
        assert_eq!(
            StravaResource::Stats { athlete_id: 42 }.path(),
            "athletes/42/stats"
        );
    }

    #[test]
    fn api_url_joins_query_paths() {
        let endpoints = StravaEndpoints::default();
        assert_eq!(
            endpoints.api_url(&StravaResource::Activities.path()),
            "https://www.strava.com/api/v3/athlete/activities?per_page=10"
        );
    }
}
