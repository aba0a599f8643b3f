use serde_json::Value;

use crate::api::api_get;
use crate::errors::FlowError;

/// Check whether the user still has to grant this application access to an
/// organization. The platform signals that with a `connections` relation in
/// an organization's links; until the user visits that URI the API will not
/// return data for the organization.
///
/// Returns the connection URI (with our completion URL attached) for the
/// first such organization, or `None` when every organization is connected.
pub async fn needs_organization_access(
    client: &reqwest::Client,
    api_url: &str,
    access_token: &str,
    completed_url: &str,
) -> Result<Option<String>, FlowError> {
    let url = format!("{api_url}/organizations");
    let response = api_get(client, access_token, &url).await?;

    let body: Value = response
        .json()
        .await
        .map_err(|e| FlowError::Network("organizations response parse", e))?;

    connections_redirect(&body, completed_url)
}

/// Scan an organizations listing for the first `connections` link, in array
/// order. Missing keys anywhere in the listing are malformed-response
/// failures rather than "no redirect needed".
pub fn connections_redirect(
    organizations: &Value,
    completed_url: &str,
) -> Result<Option<String>, FlowError> {
    let values = organizations
        .get("values")
        .and_then(Value::as_array)
        .ok_or(FlowError::MalformedResponse("values"))?;

    for org in values {
        let links = org
            .get("links")
            .and_then(Value::as_array)
            .ok_or(FlowError::MalformedResponse("links"))?;

        for link in links {
            let rel = link
                .get("rel")
                .and_then(Value::as_str)
                .ok_or(FlowError::MalformedResponse("rel"))?;

            if rel == "connections" {
                let uri = link
                    .get("uri")
                    .and_then(Value::as_str)
                    .ok_or(FlowError::MalformedResponse("uri"))?;

                return Ok(Some(format!(
                    "{uri}?redirect_uri={}",
                    urlencoding::encode(completed_url)
                )));
            }
        }
    }

    Ok(None)
}
