//! Usage: Build the provider authorization URL (scope + forced approval prompt).

use super::providers::{StravaEndpoints, APPROVAL_PROMPT, RESPONSE_TYPE, SCOPE};
use crate::infra::settings::ClientCredentials;

/// No validation happens here: a bad client id or redirect URI surfaces as a provider-side error
/// redirect back to the callback.
pub(crate) fn authorize_url(credentials: &ClientCredentials, endpoints: &StravaEndpoints) -> String {
    format!(
        "{}?client_id={}&redirect_uri={}&response_type={RESPONSE_TYPE}&scope={SCOPE}&approval_prompt={APPROVAL_PROMPT}",
        endpoints.authorize_url,
        urlencoding::encode(credentials.client_id.trim()),
        urlencoding::encode(credentials.redirect_uri.trim()),
    )
}
